use anchor_lang::prelude::*;

use crate::errors::ErrorCode;

// =============================================================================
// PROVIDER CAPABILITY RECORD
// =============================================================================
// One record per actor that has ever been granted the provider capability.
// Removal flips `active` rather than closing the account, so the same actor
// can be re-granted later without a new PDA.
//

/// Provider capability flag for a single actor.
/// PDA derived with seeds: ["provider", actor.key().as_ref()]
#[account]
pub struct ProviderRecord {
    /// The actor this record describes.
    pub provider: Pubkey,

    /// Whether the actor currently holds the provider capability.
    pub active: bool,

    /// Unix timestamp of the last membership change.
    pub updated_at: i64,

    /// PDA bump seed.
    pub bump: u8,
}

impl ProviderRecord {
    /// Size in bytes: 8 (discriminator) + 32 + 1 + 8 + 1 = 50
    pub const SIZE: usize = 8 + 32 + 1 + 8 + 1;

    /// Set membership. Returns true when the flag actually changed.
    pub fn set_active(&mut self, provider: Pubkey, active: bool, now: i64, bump: u8) -> bool {
        let changed = self.active != active;
        self.provider = provider;
        self.active = active;
        self.updated_at = now;
        self.bump = bump;
        changed
    }
}

/// Fails with `Unauthorized` unless `actor` holds an active provider record.
/// A missing record (actor never granted) is passed as `None`.
pub fn require_provider(record: Option<&ProviderRecord>, actor: &Pubkey) -> Result<()> {
    match record {
        Some(record) if record.active && record.provider == *actor => Ok(()),
        _ => err!(ErrorCode::Unauthorized),
    }
}
