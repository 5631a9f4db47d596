use anchor_lang::prelude::*;

use crate::constants::DECRYPTION_REQUEST_SEED;
use crate::engine;
use crate::errors::ErrorCode;
use crate::state::Batch;

// =============================================================================
// DECRYPTION REQUEST (ORACLE PROTOCOL STATE MACHINE)
// =============================================================================
// Pending --(first valid callback)--> Processed
//
// Processed is the only terminal state. A request whose callback never arrives,
// or whose callbacks all fail verification, stays Pending forever.
//
// Fulfillment order matters:
//   0. unknown id  (no live request account at that address) -> ReplayAttempt
//   1. replay      (already processed / wrong correlation)  -> ReplayAttempt
//   2. commitment  (batch changed since request)            -> StateMismatch
//   3. proof       (cluster signature did not verify)       -> DecryptionFailed
//   4. mark processed, then publish
// Checks 1-3 mutate nothing, so a rejected callback leaves the request Pending.
//

/// Derived view of a request's position in the state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    Processed,
}

/// One outstanding or fulfilled decryption of a closed batch.
///
/// PDA derived with seeds: ["decryption_request", request_id.to_le_bytes()]
#[account]
pub struct DecryptionRequest {
    /// Engine-issued correlation id (Arcium computation offset)
    pub request_id: u64,

    /// Batch whose accumulator was submitted for decryption
    pub batch_id: u64,

    /// Arcium computation account the callback must originate from
    pub computation_account: Pubkey,

    /// Digest of the ciphertext set at request time, bound to this program
    pub commitment: [u8; 32],

    /// Owner that issued the request
    pub requested_by: Pubkey,

    /// Unix timestamp of the request
    pub requested_at: i64,

    /// Set exactly once by the first valid callback
    pub processed: bool,

    /// Revealed aggregate, once processed
    pub aggregate: Option<u64>,

    /// Unix timestamp of fulfillment
    pub processed_at: Option<i64>,

    /// PDA bump seed
    pub bump: u8,
}

impl DecryptionRequest {
    /// Size of the DecryptionRequest account in bytes.
    ///
    /// Calculation:
    /// - 8 bytes: Anchor discriminator
    /// - 8 bytes: request_id (u64)
    /// - 8 bytes: batch_id (u64)
    /// - 32 bytes: computation_account (Pubkey)
    /// - 32 bytes: commitment
    /// - 32 bytes: requested_by (Pubkey)
    /// - 8 bytes: requested_at (i64)
    /// - 1 byte: processed (bool)
    /// - 9 bytes: aggregate (Option<u64>)
    /// - 9 bytes: processed_at (Option<i64>)
    /// - 1 byte: bump (u8)
    pub const SIZE: usize = 8 + // discriminator
        8 +   // request_id
        8 +   // batch_id
        32 +  // computation_account
        32 +  // commitment
        32 +  // requested_by
        8 +   // requested_at
        1 +   // processed
        (1 + 8) + // aggregate
        (1 + 8) + // processed_at
        1; // bump

    /// Record a new pending request against a closed batch.
    /// Returns the commitment so the caller can publish it.
    pub fn register(
        &mut self,
        request_id: u64,
        batch: &Batch,
        computation_account: Pubkey,
        requested_by: Pubkey,
        now: i64,
        bump: u8,
    ) -> Result<[u8; 32]> {
        batch.require_closed()?;

        let commitment = engine::commitment(&crate::ID, &batch.ciphertext_set());

        self.request_id = request_id;
        self.batch_id = batch.batch_id;
        self.computation_account = computation_account;
        self.commitment = commitment;
        self.requested_by = requested_by;
        self.requested_at = now;
        self.processed = false;
        self.aggregate = None;
        self.processed_at = None;
        self.bump = bump;
        Ok(commitment)
    }

    /// Decode the request a callback names from raw account parts.
    ///
    /// Anything other than an initialized request owned by this program, at
    /// the address its own seeds derive, is an unknown request id.
    pub fn resolve(key: &Pubkey, owner: &Pubkey, mut data: &[u8]) -> Result<Self> {
        require_keys_eq!(*owner, crate::ID, ErrorCode::ReplayAttempt);
        let request = Self::try_deserialize(&mut data)
            .map_err(|_| ErrorCode::ReplayAttempt)?;
        let derived = Pubkey::create_program_address(
            &[
                DECRYPTION_REQUEST_SEED,
                &request.request_id.to_le_bytes(),
                &[request.bump],
            ],
            &crate::ID,
        )
        .map_err(|_| ErrorCode::ReplayAttempt)?;
        require_keys_eq!(derived, *key, ErrorCode::ReplayAttempt);
        Ok(request)
    }

    /// Load the request behind a callback account. See `resolve`.
    pub fn load(info: &AccountInfo) -> Result<Self> {
        let data = info.try_borrow_data()?;
        Self::resolve(info.key, info.owner, &data)
    }

    /// Write the request back into its account.
    pub fn store(&self, info: &AccountInfo) -> Result<()> {
        let mut data = info.try_borrow_mut_data()?;
        self.try_serialize(&mut &mut data[..])
    }

    pub fn status(&self) -> RequestStatus {
        if self.processed {
            RequestStatus::Processed
        } else {
            RequestStatus::Pending
        }
    }

    /// Recompute the commitment over the batch's current ciphertext set.
    fn current_commitment(batch: &Batch) -> [u8; 32] {
        engine::commitment(&crate::ID, &batch.ciphertext_set())
    }

    /// Apply a decryption callback.
    ///
    /// `verified` is the engine output after signature verification: `Some`
    /// carries the decrypted aggregate, `None` means the proof was rejected.
    /// Returns the aggregate to publish.
    pub fn fulfill(
        &mut self,
        computation_account: &Pubkey,
        batch: &Batch,
        verified: Option<u64>,
        now: i64,
    ) -> Result<u64> {
        require!(
            self.status() == RequestStatus::Pending,
            ErrorCode::ReplayAttempt
        );
        require_keys_eq!(
            *computation_account,
            self.computation_account,
            ErrorCode::ReplayAttempt
        );

        require!(batch.batch_id == self.batch_id, ErrorCode::StateMismatch);
        require!(
            Self::current_commitment(batch) == self.commitment,
            ErrorCode::StateMismatch
        );

        let aggregate = verified.ok_or(ErrorCode::DecryptionFailed)?;

        self.processed = true;
        self.aggregate = Some(aggregate);
        self.processed_at = Some(now);
        Ok(aggregate)
    }
}
