use anchor_lang::prelude::*;
use solana_program::hash::Hasher;

use crate::constants::COMMITMENT_DOMAIN;

// =============================================================================
// CONFIDENTIAL-COMPUTE ENGINE SURFACE
// =============================================================================
// The program never encrypts, adds, or decrypts anything itself. Those are
// Arcium MXE computations (see encrypted-ixs):
//
//   zero()               -> init_accumulator circuit, applied in its callback
//   add(acc, value)      -> accumulate circuit, applied in its callback
//   request_decryption() -> reveal_aggregate circuit, fulfilled by callback
//   verify proof         -> SignedComputationOutputs::verify_output
//
// The one engine operation that runs on-chain is the commitment digest below,
// which binds a decryption request to the exact ciphertexts it was issued for.
//

/// An MXE-owned ciphertext as stored on-chain: one 32-byte ciphertext plus the
/// output nonce the cluster encrypted it under. Both are needed to read it back.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct MxeCiphertext {
    pub ciphertext: [u8; 32],
    pub nonce: u128,
}

impl MxeCiphertext {
    /// Size in bytes: 32 + 16 = 48
    pub const SIZE: usize = 32 + 16;

    pub fn new(ciphertext: [u8; 32], nonce: u128) -> Self {
        Self { ciphertext, nonce }
    }
}

/// Binding digest over a ciphertext sequence.
///
/// `program_id` is mixed in so two deployments committing to the same
/// ciphertexts produce different digests. The count is hashed ahead of the
/// elements so sequences of different lengths cannot collide by concatenation.
pub fn commitment(program_id: &Pubkey, ciphertexts: &[MxeCiphertext]) -> [u8; 32] {
    let mut hasher = Hasher::default();
    hasher.hash(COMMITMENT_DOMAIN);
    hasher.hash(program_id.as_ref());
    hasher.hash(&(ciphertexts.len() as u64).to_le_bytes());
    for ct in ciphertexts {
        hasher.hash(&ct.ciphertext);
        hasher.hash(&ct.nonce.to_le_bytes());
    }
    hasher.result().to_bytes()
}
