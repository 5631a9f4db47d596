use anchor_lang::prelude::*;
use arcium_anchor::prelude::*;

use crate::state::{require_provider, ActionKind, Batch};
use crate::{AccumulateCallback, Contribute};

// =============================================================================
// CONTRIBUTE - Queue Encrypted Accumulation (provider, not paused)
// =============================================================================
// Fold one encrypted measurement into a batch's running total.
//
// Flow:
// 1. Provider calls contribute with a value encrypted under its x25519 key
// 2. Guards: provider capability, pause, submission cooldown, batch accepting
// 3. Handler locks the batch with a PendingContribution
// 4. Handler queues accumulate(contribution, batch accumulator)
// 5. Callback stores the new accumulator and releases the lock
//
// Guard order matters: a rejected cooldown or unavailable batch reverts the
// transaction, so the cooldown timestamp is only kept for accepted submissions.
//

/// Submit an encrypted contribution to an open batch.
///
/// # Arguments
/// * `computation_offset` - Unique ID for this MPC computation
/// * `batch_id` - Target batch
/// * `encrypted_value` - Contribution value encrypted with the provider's key
/// * `pubkey` - Provider's x25519 public key
/// * `nonce` - Encryption nonce for the contribution
pub fn handler(
    ctx: Context<Contribute>,
    computation_offset: u64,
    batch_id: u64,
    encrypted_value: [u8; 32],
    pubkey: [u8; 32],
    nonce: u128,
) -> Result<()> {
    let contributor = ctx.accounts.contributor.key();
    let config = &ctx.accounts.config;

    require_provider(ctx.accounts.provider_record.as_deref(), &contributor)?;
    config.require_not_paused()?;

    let now = Clock::get()?.unix_timestamp;
    let cooldown = &mut ctx.accounts.cooldown_record;
    cooldown.bind(contributor, ActionKind::Submission, ctx.bumps.cooldown_record);
    cooldown.check_and_record(now, config.cooldown_seconds)?;

    let batch = &mut ctx.accounts.batch;
    batch.begin_contribution(
        ctx.accounts.computation_account.key(),
        contributor,
        encrypted_value,
    )?;
    let accumulator_nonce = batch.accumulator.nonce;

    ctx.accounts.sign_pda_account.bump = ctx.bumps.sign_pda_account;

    let args = ArgBuilder::new()
        // Contribution (Enc<Shared>) - encrypted by the provider
        .x25519_pubkey(pubkey)
        .plaintext_u128(nonce)
        .encrypted_u64(encrypted_value)
        // Aggregate (Enc<Mxe>) - read straight from the batch account
        .plaintext_u128(accumulator_nonce)
        .account(
            ctx.accounts.batch.key(),
            Batch::ACCUMULATOR_OFFSET,
            Batch::ACCUMULATOR_LEN,
        )
        .build();

    use arcium_client::idl::arcium::types::CallbackAccount;
    queue_computation(
        ctx.accounts,
        computation_offset,
        args,
        vec![AccumulateCallback::callback_ix(
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
        "Contribution queued: provider={}, batch_id={}, computation={}",
        contributor,
        batch_id,
        computation_offset
    );

    Ok(())
}
