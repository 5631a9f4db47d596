use anchor_lang::prelude::*;
use arcium_anchor::prelude::*;

use crate::state::{ActionKind, Batch};
use crate::{DecryptionRequestedEvent, RequestDecryption, RevealAggregateCallback};

// =============================================================================
// REQUEST DECRYPTION (owner, not paused)
// =============================================================================
// Ask the cluster to reveal a closed batch's total. Everything the callback
// will later check is fixed here, in one transaction:
//
// 1. decryption_request cooldown for the caller
// 2. batch must be Closed
// 3. commitment over [batch.accumulator]
// 4. queue reveal_aggregate (request id = computation offset)
// 5. DecryptionRequest stored with processed = false
// 6. DecryptionRequestedEvent
//
// Multiple requests against the same batch are allowed; each is its own PDA
// and is fulfilled independently.
//

/// Request decryption of a closed batch's aggregate.
///
/// # Arguments
/// * `computation_offset` - Unique ID for this MPC computation; doubles as the request id
/// * `batch_id` - Closed batch to reveal
pub fn handler(
    ctx: Context<RequestDecryption>,
    computation_offset: u64,
    batch_id: u64,
) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let config = &mut ctx.accounts.config;
    config.require_owner(&owner)?;
    config.require_not_paused()?;

    let now = Clock::get()?.unix_timestamp;
    let cooldown = &mut ctx.accounts.cooldown_record;
    cooldown.bind(owner, ActionKind::DecryptionRequest, ctx.bumps.cooldown_record);
    cooldown.check_and_record(now, config.cooldown_seconds)?;

    let commitment = ctx.accounts.decryption_request.register(
        computation_offset,
        &ctx.accounts.batch,
        ctx.accounts.computation_account.key(),
        owner,
        now,
        ctx.bumps.decryption_request,
    )?;
    config.total_decryption_requests = config.total_decryption_requests.saturating_add(1);

    ctx.accounts.sign_pda_account.bump = ctx.bumps.sign_pda_account;

    let args = ArgBuilder::new()
        .plaintext_u128(ctx.accounts.batch.accumulator.nonce)
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
        vec![RevealAggregateCallback::callback_ix(
            computation_offset,
            &ctx.accounts.mxe_account,
            &[
                CallbackAccount {
                    pubkey: ctx.accounts.decryption_request.key(),
                    is_writable: true,
                },
                CallbackAccount {
                    pubkey: ctx.accounts.batch.key(),
                    is_writable: false,
                },
            ],
        )?],
        1, // number of callbacks
        0, // priority
    )?;

    emit!(DecryptionRequestedEvent {
        request_id: computation_offset,
        batch_id,
        commitment,
    });

    msg!(
        "Decryption requested: request_id={}, batch_id={}, by={}",
        computation_offset,
        batch_id,
        owner
    );

    Ok(())
}
