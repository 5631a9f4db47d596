use anchor_lang::prelude::*;

use crate::constants::DEFAULT_COOLDOWN_SECONDS;
use crate::errors::ErrorCode;

// =============================================================================
// PROTOCOL CONFIG ACCOUNT
// =============================================================================
// The ProtocolConfig is the global state for the protocol: owner identity,
// emergency pause switch, and the shared rate-limit window.
// There is only ONE config account, derived from the seed "config".
//

/// Global protocol state.
/// PDA derived with seeds: ["config"]
#[account]
pub struct ProtocolConfig {
    /// Owner: opens/closes batches, requests decryption, manages providers.
    /// Set once by `initialize`, never rotated.
    pub owner: Pubkey,

    /// Emergency pause flag.
    /// When true, batch and contribution operations are blocked.
    pub paused: bool,

    /// Cooldown window (seconds) shared by submissions and decryption requests.
    /// Always > 0.
    pub cooldown_seconds: u64,

    /// Total batches opened (for analytics).
    pub total_batches_opened: u64,

    /// Total decryption requests issued (for analytics).
    pub total_decryption_requests: u64,

    /// PDA bump seed.
    pub bump: u8,
}

impl ProtocolConfig {
    /// Size of the ProtocolConfig account in bytes.
    ///
    /// Calculation:
    /// - 8 bytes: Anchor discriminator
    /// - 32 bytes: owner (Pubkey)
    /// - 1 byte: paused (bool)
    /// - 8 bytes: cooldown_seconds (u64)
    /// - 8 bytes: total_batches_opened (u64)
    /// - 8 bytes: total_decryption_requests (u64)
    /// - 1 byte: bump (u8)
    pub const SIZE: usize = 8 + // discriminator
        32 +  // owner
        1 +   // paused
        8 +   // cooldown_seconds
        8 +   // total_batches_opened
        8 +   // total_decryption_requests
        1; // bump

    /// Validate a cooldown window: any positive number of seconds.
    pub fn validate_cooldown(cooldown_seconds: u64) -> Result<()> {
        require!(cooldown_seconds > 0, ErrorCode::InvalidParameter);
        Ok(())
    }

    /// Set up a fresh config. Without an explicit window the protocol starts
    /// at `DEFAULT_COOLDOWN_SECONDS`.
    pub fn init(&mut self, owner: Pubkey, cooldown_seconds: Option<u64>, bump: u8) -> Result<()> {
        let cooldown_seconds = cooldown_seconds.unwrap_or(DEFAULT_COOLDOWN_SECONDS);
        Self::validate_cooldown(cooldown_seconds)?;
        self.owner = owner;
        self.paused = false;
        self.cooldown_seconds = cooldown_seconds;
        self.total_batches_opened = 0;
        self.total_decryption_requests = 0;
        self.bump = bump;
        Ok(())
    }

    pub fn require_owner(&self, actor: &Pubkey) -> Result<()> {
        require_keys_eq!(*actor, self.owner, ErrorCode::Unauthorized);
        Ok(())
    }

    pub fn require_not_paused(&self) -> Result<()> {
        require!(!self.paused, ErrorCode::SystemPaused);
        Ok(())
    }

    /// Engage the pause switch. Pausing an already paused system is rejected.
    pub fn pause(&mut self) -> Result<()> {
        self.require_not_paused()?;
        self.paused = true;
        Ok(())
    }

    /// Release the pause switch. Idempotent; returns whether it was engaged.
    pub fn unpause(&mut self) -> bool {
        let was_paused = self.paused;
        self.paused = false;
        was_paused
    }

    /// Replace the cooldown window, returning the previous value.
    /// On rejection the prior value is left untouched.
    pub fn set_cooldown(&mut self, cooldown_seconds: u64) -> Result<u64> {
        Self::validate_cooldown(cooldown_seconds)?;
        let previous = self.cooldown_seconds;
        self.cooldown_seconds = cooldown_seconds;
        Ok(previous)
    }
}
