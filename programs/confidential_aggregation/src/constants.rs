// =============================================================================
// PDA SEEDS
// =============================================================================
// PDA (Program Derived Address) seeds are used to derive deterministic addresses.

/// Seed for the singleton protocol config account
pub const CONFIG_SEED: &[u8] = b"config";

/// Seed prefix for provider capability records
pub const PROVIDER_SEED: &[u8] = b"provider";

/// Seed prefix for batch accounts (combined with batch_id LE bytes)
pub const BATCH_SEED: &[u8] = b"batch";

/// Seed prefix for decryption request accounts (combined with request_id LE bytes)
pub const DECRYPTION_REQUEST_SEED: &[u8] = b"decryption_request";

/// Seed prefix for cooldown records (combined with actor + action seed)
pub const COOLDOWN_SEED: &[u8] = b"cooldown";

// Action-specific cooldown seeds (combined with COOLDOWN_SEED)
pub const SUBMISSION_ACTION_SEED: &[u8] = b"submission";
pub const DECRYPTION_REQUEST_ACTION_SEED: &[u8] = b"decryption_request";

// =============================================================================
// RATE LIMITING
// =============================================================================

/// Cooldown window used when `initialize` is not given one (seconds)
pub const DEFAULT_COOLDOWN_SECONDS: u64 = 60;

// =============================================================================
// COMMITMENTS
// =============================================================================

/// Domain separator mixed into every decryption commitment
pub const COMMITMENT_DOMAIN: &[u8] = b"confidential-aggregation:commitment:v1";
