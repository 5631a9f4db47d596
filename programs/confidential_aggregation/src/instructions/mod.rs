// =============================================================================
// INSTRUCTIONS MODULE
// =============================================================================
// Instruction handlers for the confidential aggregation protocol.
//
// Note: Account structs are defined in lib.rs for Anchor's IDL generation.
// Only handlers live in this module; state transitions live in `state`.
//

pub mod close_batch;
pub mod contribute;
pub mod initialize;
pub mod manage_providers;
pub mod open_batch;
pub mod pause;
pub mod request_decryption;
pub mod set_cooldown;
