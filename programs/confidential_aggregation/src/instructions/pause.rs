use anchor_lang::prelude::*;

use crate::{PausedEvent, SetPause, UnpausedEvent};

// =============================================================================
// EMERGENCY PAUSE (owner only)
// =============================================================================
// While paused, open/close batch, contribute, and request_decryption are all
// rejected with SystemPaused. Decryption callbacks are NOT paused: a request
// already in flight must still be able to complete.
//

pub fn pause(ctx: Context<SetPause>) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let config = &mut ctx.accounts.config;
    config.require_owner(&owner)?;
    config.pause()?;

    emit!(PausedEvent {
        owner,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Protocol paused by {}", owner);
    Ok(())
}

pub fn unpause(ctx: Context<SetPause>) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let config = &mut ctx.accounts.config;
    config.require_owner(&owner)?;
    let was_paused = config.unpause();

    emit!(UnpausedEvent {
        owner,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Protocol unpaused by {} (was_paused={})", owner, was_paused);
    Ok(())
}
