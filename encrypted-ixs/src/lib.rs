// =============================================================================
// ARCIS CIRCUITS FOR CONFIDENTIAL BATCH AGGREGATION
// =============================================================================
// The MXE side of the aggregation protocol. The on-chain program never sees a
// plaintext measurement; it only stores the Enc<Mxe, Aggregate> ciphertext and
// asks these circuits to produce, extend, or reveal it.
//
// Key Pattern:
// - Contributors submit Enc<Shared, Contribution> (encrypted with their own key)
// - The running total is Enc<Mxe, Aggregate> (protocol-owned, nobody can read it)
// - Only reveal_aggregate ever produces plaintext, and only the batch total

use arcis::*;

#[encrypted]
mod circuits {
    use arcis::*;

    // =========================================================================
    // DATA STRUCTURES
    // =========================================================================

    /// A single encrypted measurement submitted by a provider.
    #[derive(Copy, Clone)]
    pub struct Contribution {
        pub value: u64,
    }

    /// Running batch total (stored on-chain as Enc<Mxe, Aggregate>).
    #[derive(Copy, Clone, Default)]
    pub struct Aggregate {
        pub total: u64,
    }

    // =========================================================================
    // ACCUMULATOR CIRCUITS
    // =========================================================================

    /// Encrypted zero for a freshly opened batch.
    #[instruction]
    pub fn init_accumulator(mxe: Mxe) -> Enc<Mxe, Aggregate> {
        mxe.from_arcis(Aggregate { total: 0 })
    }

    /// Fold one contribution into the batch total.
    /// u64 addition is commutative and associative, so the revealed total does
    /// not depend on the order contributions were applied in.
    #[instruction]
    pub fn accumulate(
        contribution_ctxt: Enc<Shared, Contribution>,
        aggregate_ctxt: Enc<Mxe, Aggregate>,
    ) -> Enc<Mxe, Aggregate> {
        let contribution = contribution_ctxt.to_arcis();
        let mut aggregate = aggregate_ctxt.to_arcis();

        aggregate.total += contribution.value;

        aggregate_ctxt.owner.from_arcis(aggregate)
    }

    // =========================================================================
    // REVEAL CIRCUIT
    // =========================================================================

    /// Decrypt the sealed batch total. The cluster signs this output; the
    /// program verifies that signature before accepting the value.
    #[instruction]
    pub fn reveal_aggregate(aggregate_ctxt: Enc<Mxe, Aggregate>) -> u64 {
        let aggregate = aggregate_ctxt.to_arcis();
        aggregate.total.reveal()
    }
}
