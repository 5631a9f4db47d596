use anchor_lang::prelude::*;

use crate::state::Batch;
use crate::{BatchClosedEvent, CloseBatch};

/// Seal a batch. After this the accumulator can only be decrypted, never
/// extended. A contribution still in flight is discarded when its result lands.
///
/// # Arguments
/// * `batch_id` - Batch to close
pub fn handler(ctx: Context<CloseBatch>, batch_id: u64) -> Result<()> {
    let config = &ctx.accounts.config;
    config.require_owner(&ctx.accounts.owner.key())?;
    config.require_not_paused()?;

    let now = Clock::get()?.unix_timestamp;
    let batch = &mut ctx.accounts.batch;
    let sealed = Batch::close(batch, now)?;

    emit!(BatchClosedEvent {
        batch_id,
        accumulator: sealed.ciphertext,
        nonce: sealed.nonce.to_le_bytes(),
        contribution_count: batch.contribution_count,
    });

    msg!(
        "Batch closed: batch_id={}, contributions={}",
        batch_id,
        batch.contribution_count
    );

    Ok(())
}
