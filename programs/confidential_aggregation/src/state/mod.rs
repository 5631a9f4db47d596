// =============================================================================
// STATE MODULE
// =============================================================================
// Account structures for the confidential aggregation protocol, together with
// the state transitions that govern them. Instruction handlers load accounts
// and call these methods; nothing else mutates protocol state.
//

// Re-export all state structs for easy importing
// Usage: `use crate::state::{ProtocolConfig, Batch, DecryptionRequest};`

mod batch;
mod config;
mod cooldown;
mod decryption;
mod provider;

pub use batch::*;
pub use config::*;
pub use cooldown::*;
pub use decryption::*;
pub use provider::*;
