use anchor_lang::prelude::*;
use arcium_anchor::prelude::*;

use crate::{InitAccumulatorCallback, OpenBatch};

// =============================================================================
// OPEN BATCH - Queue Encrypted Zero (owner, not paused)
// =============================================================================
// A batch starts life Seeding. Its accumulator must be an MXE-encrypted zero,
// which only the cluster can produce, so the handler queues init_accumulator
// and the callback flips the batch to Open.
//
// Flow:
// 1. Owner calls open_batch with a fresh batch_id
// 2. Handler creates the Batch PDA (status = Seeding)
// 3. Handler queues init_accumulator
// 4. Callback stores Enc<Mxe, Aggregate { total: 0 }>, status = Open
//
// If the cluster aborts step 4 the seed handle is cleared and the owner can
// call open_batch again for the same id.
//

/// Create a batch and queue its encrypted zero.
///
/// # Arguments
/// * `computation_offset` - Unique ID for this MPC computation
/// * `batch_id` - Caller-chosen batch identifier, must be unused
/// * `nonce` - Nonce for the MXE-owned output
pub fn handler(
    ctx: Context<OpenBatch>,
    computation_offset: u64,
    batch_id: u64,
    nonce: u128,
) -> Result<()> {
    let config = &mut ctx.accounts.config;
    config.require_owner(&ctx.accounts.owner.key())?;
    config.require_not_paused()?;

    let now = Clock::get()?.unix_timestamp;
    let batch = &mut ctx.accounts.batch;
    let fresh = !batch.exists;
    batch.open(
        batch_id,
        ctx.accounts.computation_account.key(),
        now,
        ctx.bumps.batch,
    )?;
    if fresh {
        config.total_batches_opened = config.total_batches_opened.saturating_add(1);
    }

    ctx.accounts.sign_pda_account.bump = ctx.bumps.sign_pda_account;

    // init_accumulator takes `mxe: Mxe`, which compiles to a bare nonce
    let args = ArgBuilder::new().plaintext_u128(nonce).build();

    use arcium_client::idl::arcium::types::CallbackAccount;
    queue_computation(
        ctx.accounts,
        computation_offset,
        args,
        vec![InitAccumulatorCallback::callback_ix(
            computation_offset,
            &ctx.accounts.mxe_account,
            &[CallbackAccount {
                pubkey: ctx.accounts.batch.key(),
                is_writable: true,
            }],
        )?],
        1, // number of callbacks
        0, // priority
    )?;

    msg!(
        "Batch seeding queued: batch_id={}, retry={}, computation={}",
        batch_id,
        !fresh,
        computation_offset
    );

    Ok(())
}
