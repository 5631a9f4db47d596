use anchor_lang::prelude::*;

use crate::constants::{DECRYPTION_REQUEST_ACTION_SEED, SUBMISSION_ACTION_SEED};
use crate::errors::ErrorCode;

// =============================================================================
// COOLDOWN RECORD (RATE LIMITER)
// =============================================================================
// Per actor, per action kind: when did this actor last perform this action?
// A coarse DoS throttle, not a fairness scheduler. The window itself lives in
// ProtocolConfig and is shared by both action kinds.
//

/// Gated action kinds.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActionKind {
    #[default]
    Submission,
    DecryptionRequest,
}

impl ActionKind {
    /// PDA seed component for this action's cooldown record
    pub fn seed(&self) -> &'static [u8] {
        match self {
            ActionKind::Submission => SUBMISSION_ACTION_SEED,
            ActionKind::DecryptionRequest => DECRYPTION_REQUEST_ACTION_SEED,
        }
    }
}

/// Last-action timestamp for one (actor, action) pair.
/// PDA derived with seeds: ["cooldown", actor.key().as_ref(), action.seed()]
#[account]
pub struct CooldownRecord {
    /// Actor being throttled.
    pub actor: Pubkey,

    /// Which gated action this record tracks.
    pub action: ActionKind,

    /// Unix timestamp of the last accepted action, None if never acted.
    pub last_action_at: Option<i64>,

    /// PDA bump seed.
    pub bump: u8,
}

impl CooldownRecord {
    /// Size in bytes: 8 (discriminator) + 32 + 1 + (1 + 8) + 1 = 51
    pub const SIZE: usize = 8 + 32 + 1 + (1 + 8) + 1;

    /// Bind a freshly created record to its actor and action.
    /// No-op for a record that has already been bound.
    pub fn bind(&mut self, actor: Pubkey, action: ActionKind, bump: u8) {
        if self.actor == Pubkey::default() {
            self.actor = actor;
            self.action = action;
            self.last_action_at = None;
            self.bump = bump;
        }
    }

    /// Earliest timestamp at which the next action is accepted.
    pub fn next_allowed_at(&self, cooldown_seconds: u64) -> Option<i64> {
        let window = i64::try_from(cooldown_seconds).unwrap_or(i64::MAX);
        self.last_action_at.map(|last| last.saturating_add(window))
    }

    /// Reject with `CooldownActive` if the window has not elapsed since the last
    /// accepted action; otherwise record `now`. A rejection writes nothing.
    pub fn check_and_record(&mut self, now: i64, cooldown_seconds: u64) -> Result<()> {
        if let Some(next_allowed_at) = self.next_allowed_at(cooldown_seconds) {
            require!(now >= next_allowed_at, ErrorCode::CooldownActive);
        }
        self.last_action_at = Some(now);
        Ok(())
    }
}
