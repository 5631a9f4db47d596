use anchor_lang::prelude::*;

use crate::engine::MxeCiphertext;
use crate::errors::ErrorCode;

// =============================================================================
// BATCH ACCOUNT (BATCH LEDGER)
// =============================================================================
// A batch owns one encrypted running total. Lifecycle:
//
//   Seeding --(encrypted zero arrives)--> Open --(owner closes)--> Closed
//
// Seeding exists because the MXE produces the encrypted zero asynchronously.
// While Open, at most one accumulation is in flight: every contribution is a
// read-modify-write of the accumulator, and two concurrent ones would both
// read the same total and one would be lost.
//
// Closed is terminal. After closing, the accumulator is frozen and can only
// be referenced by decryption requests. There is no deletion path. Closing
// does not wait for an in-flight accumulation: its handle stays behind, a
// late result is refused, and a late abort still releases the handle.
//

/// Lifecycle state of a batch
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BatchStatus {
    /// Created, waiting for the MXE to deliver the encrypted zero
    #[default]
    Seeding,
    /// Accepting contributions
    Open,
    /// Sealed; accumulator immutable
    Closed,
}

/// An accumulation queued with the MXE but not yet applied.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PendingContribution {
    /// Arcium computation account correlating the callback
    pub computation_account: Pubkey,
    /// Provider that submitted the value
    pub contributor: Pubkey,
    /// Canonical encoding of the submitted ciphertext (never plaintext)
    pub ciphertext: [u8; 32],
}

impl PendingContribution {
    /// Size in bytes: 32 + 32 + 32 = 96
    pub const SIZE: usize = 32 + 32 + 32;
}

/// Per-batch encrypted accumulator.
///
/// PDA derived with seeds: ["batch", batch_id.to_le_bytes()]
///
/// NOTE: `accumulator` must stay directly after `batch_id`; the MXE reads the
/// ciphertext straight out of the account at ACCUMULATOR_OFFSET.
#[account]
pub struct Batch {
    /// Caller-chosen batch identifier
    pub batch_id: u64,

    /// Encrypted running total (Enc<Mxe, Aggregate>)
    pub accumulator: MxeCiphertext,

    /// Set on first creation, never cleared
    pub exists: bool,

    /// Lifecycle state
    pub status: BatchStatus,

    /// In-flight init_accumulator computation, if any
    pub seed_computation: Option<Pubkey>,

    /// In-flight accumulate computation, if any
    pub pending_contribution: Option<PendingContribution>,

    /// Number of contributions folded into the accumulator
    pub contribution_count: u64,

    /// Unix timestamp the batch was created
    pub opened_at: i64,

    /// Unix timestamp the batch was closed
    pub closed_at: Option<i64>,

    /// PDA bump seed
    pub bump: u8,
}

impl Batch {
    /// Size of the Batch account in bytes.
    ///
    /// Calculation:
    /// - 8 bytes: Anchor discriminator
    /// - 8 bytes: batch_id (u64)
    /// - 48 bytes: accumulator (32 ciphertext + 16 nonce)
    /// - 1 byte: exists (bool)
    /// - 1 byte: status (enum)
    /// - 33 bytes: seed_computation (Option<Pubkey>)
    /// - 97 bytes: pending_contribution (Option<PendingContribution>)
    /// - 8 bytes: contribution_count (u64)
    /// - 8 bytes: opened_at (i64)
    /// - 9 bytes: closed_at (Option<i64>)
    /// - 1 byte: bump (u8)
    pub const SIZE: usize = 8 + // discriminator
        8 +   // batch_id
        MxeCiphertext::SIZE + // accumulator
        1 +   // exists
        1 +   // status
        (1 + 32) + // seed_computation
        (1 + PendingContribution::SIZE) + // pending_contribution
        8 +   // contribution_count
        8 +   // opened_at
        (1 + 8) + // closed_at
        1; // bump

    /// Byte offset of the accumulator ciphertext within the account data.
    /// Skip discriminator(8) + batch_id(8).
    pub const ACCUMULATOR_OFFSET: u32 = 8 + 8;

    /// Length of the accumulator ciphertext read by the MXE.
    pub const ACCUMULATOR_LEN: u32 = 32;

    /// Create the batch, or re-arm seeding for a batch whose previous seed
    /// computation was aborted. Any other existing batch is a duplicate.
    pub fn open(
        &mut self,
        batch_id: u64,
        seed_computation: Pubkey,
        now: i64,
        bump: u8,
    ) -> Result<()> {
        if self.exists {
            let reseedable =
                self.status == BatchStatus::Seeding && self.seed_computation.is_none();
            require!(reseedable, ErrorCode::InvalidParameter);
            self.seed_computation = Some(seed_computation);
            return Ok(());
        }

        self.batch_id = batch_id;
        self.accumulator = MxeCiphertext::default();
        self.exists = true;
        self.status = BatchStatus::Seeding;
        self.seed_computation = Some(seed_computation);
        self.pending_contribution = None;
        self.contribution_count = 0;
        self.opened_at = now;
        self.closed_at = None;
        self.bump = bump;
        Ok(())
    }

    /// Install the encrypted zero delivered by the MXE and start accepting
    /// contributions.
    pub fn complete_seed(&mut self, computation: &Pubkey, zero: MxeCiphertext) -> Result<()> {
        require!(
            self.exists && self.status == BatchStatus::Seeding,
            ErrorCode::BatchUnavailable
        );
        require!(
            self.seed_computation == Some(*computation),
            ErrorCode::ReplayAttempt
        );
        self.accumulator = zero;
        self.seed_computation = None;
        self.status = BatchStatus::Open;
        Ok(())
    }

    /// Drop an aborted seed computation so the owner can retry.
    pub fn abandon_seed(&mut self, computation: &Pubkey) -> Result<()> {
        require!(
            self.status == BatchStatus::Seeding,
            ErrorCode::BatchUnavailable
        );
        require!(
            self.seed_computation == Some(*computation),
            ErrorCode::ReplayAttempt
        );
        self.seed_computation = None;
        Ok(())
    }

    pub fn require_open(&self) -> Result<()> {
        require!(
            self.exists && self.status == BatchStatus::Open,
            ErrorCode::BatchUnavailable
        );
        Ok(())
    }

    /// Open and not mid-accumulation.
    pub fn require_accepting(&self) -> Result<()> {
        self.require_open()?;
        require!(
            self.pending_contribution.is_none(),
            ErrorCode::BatchUnavailable
        );
        Ok(())
    }

    pub fn require_closed(&self) -> Result<()> {
        require!(
            self.exists && self.status == BatchStatus::Closed,
            ErrorCode::BatchUnavailable
        );
        Ok(())
    }

    /// Reserve the accumulator for one contribution.
    pub fn begin_contribution(
        &mut self,
        computation_account: Pubkey,
        contributor: Pubkey,
        ciphertext: [u8; 32],
    ) -> Result<()> {
        self.require_accepting()?;
        self.pending_contribution = Some(PendingContribution {
            computation_account,
            contributor,
            ciphertext,
        });
        Ok(())
    }

    /// Apply the MXE's new accumulator for the in-flight contribution.
    pub fn complete_contribution(
        &mut self,
        computation: &Pubkey,
        accumulator: MxeCiphertext,
    ) -> Result<PendingContribution> {
        // a result landing after close is refused; the accumulator is frozen
        self.require_open()?;
        let pending = self.take_pending(computation)?;
        self.accumulator = accumulator;
        self.contribution_count = self.contribution_count.saturating_add(1);
        Ok(pending)
    }

    /// Release the accumulator after the MXE aborted the contribution.
    /// The accumulator is left exactly as it was. Works on a closed batch too.
    pub fn abandon_contribution(&mut self, computation: &Pubkey) -> Result<PendingContribution> {
        self.take_pending(computation)
    }

    fn take_pending(&mut self, computation: &Pubkey) -> Result<PendingContribution> {
        match self.pending_contribution {
            Some(pending) if pending.computation_account == *computation => {
                self.pending_contribution = None;
                Ok(pending)
            }
            _ => err!(ErrorCode::ReplayAttempt),
        }
    }

    /// Seal the batch. Returns the frozen accumulator for publication.
    /// An in-flight contribution does not hold the batch open.
    pub fn close(&mut self, now: i64) -> Result<MxeCiphertext> {
        self.require_open()?;
        self.status = BatchStatus::Closed;
        self.closed_at = Some(now);
        Ok(self.accumulator)
    }

    /// The ciphertext set a decryption of this batch covers.
    pub fn ciphertext_set(&self) -> [MxeCiphertext; 1] {
        [self.accumulator]
    }
}
