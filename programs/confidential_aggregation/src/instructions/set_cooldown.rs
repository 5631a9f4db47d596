use anchor_lang::prelude::*;

use crate::{CooldownChangedEvent, SetCooldown};

/// Replace the shared rate-limit window.
///
/// # Arguments
/// * `cooldown_seconds` - New window, must be > 0
pub fn handler(ctx: Context<SetCooldown>, cooldown_seconds: u64) -> Result<()> {
    let config = &mut ctx.accounts.config;
    config.require_owner(&ctx.accounts.owner.key())?;

    let previous = config.set_cooldown(cooldown_seconds)?;

    emit!(CooldownChangedEvent {
        previous_seconds: previous,
        cooldown_seconds,
    });

    msg!("Cooldown changed: {} -> {} seconds", previous, cooldown_seconds);
    Ok(())
}
