use anchor_lang::prelude::*;

// =============================================================================
// ERROR CODES
// =============================================================================
// Every failure is a terminal rejection of the triggering instruction; Solana
// reverts the whole transaction, so no partial mutation survives.
//

#[error_code]
pub enum ErrorCode {
    // =========================================================================
    // ACCESS CONTROL ERRORS
    // =========================================================================
    /// Caller lacks the owner or provider capability
    #[msg("Unauthorized")]
    Unauthorized,

    /// Global pause is active
    #[msg("System is paused")]
    SystemPaused,

    // =========================================================================
    // RATE LIMITING ERRORS
    // =========================================================================
    /// Caller acted too recently for this action kind
    #[msg("Cooldown still active for this action")]
    CooldownActive,

    // =========================================================================
    // BATCH LEDGER ERRORS
    // =========================================================================
    /// Batch missing, or in the wrong lifecycle state for this operation
    #[msg("Batch unavailable for this operation")]
    BatchUnavailable,

    /// Caller-supplied value violates a precondition (zero cooldown, duplicate batch id)
    #[msg("Invalid parameter")]
    InvalidParameter,

    // =========================================================================
    // DECRYPTION ORACLE ERRORS
    // =========================================================================
    /// Request already processed, or callback does not correlate to a known request
    #[msg("Decryption result already applied or unknown request")]
    ReplayAttempt,

    /// Ciphertext set changed between request and fulfillment
    #[msg("Batch state does not match the decryption commitment")]
    StateMismatch,

    /// Cluster signature over the decryption output did not verify
    #[msg("Decryption proof did not verify")]
    DecryptionFailed,

    // =========================================================================
    // ARCIUM MPC ERRORS
    // =========================================================================
    /// Arcium cluster not properly configured
    #[msg("Cluster not set")]
    ClusterNotSet,
}
