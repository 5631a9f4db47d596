use anchor_lang::prelude::*;

use crate::Initialize;

// =============================================================================
// INITIALIZE INSTRUCTION HANDLER
// =============================================================================
// Creates the ProtocolConfig singleton. The signer becomes the owner.
//

/// Initialize the protocol.
///
/// # Arguments
/// * `ctx` - The validated accounts context
/// * `cooldown_seconds` - Rate-limit window for submissions and decryption
///   requests (> 0). `None` starts at `DEFAULT_COOLDOWN_SECONDS`.
pub fn handler(ctx: Context<Initialize>, cooldown_seconds: Option<u64>) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let config = &mut ctx.accounts.config;

    config.init(owner, cooldown_seconds, ctx.bumps.config)?;

    msg!("Confidential aggregation protocol initialized!");
    msg!("Owner: {}", config.owner);
    msg!("Cooldown: {} seconds", config.cooldown_seconds);

    Ok(())
}
