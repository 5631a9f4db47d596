//! End-to-end protocol scenarios.
//!
//! Each method on `Protocol` mirrors one instruction or callback: it runs the
//! same guards in the same order against copies of the accounts it touches and
//! only writes them back on success, the way a reverted transaction would.
//! `FakeMxe` stands in for the cluster and tracks the plaintext behind every
//! ciphertext it hands out.

use std::collections::HashMap;

use anchor_lang::prelude::*;

use crate::constants::DEFAULT_COOLDOWN_SECONDS;
use crate::engine::MxeCiphertext;
use crate::errors::ErrorCode;
use crate::state::*;
use crate::test_support::{assert_error, blank_batch, blank_request};

#[derive(Default)]
struct FakeMxe {
    sealed: u128,
    plaintexts: HashMap<[u8; 32], u64>,
}

impl FakeMxe {
    fn seal(&mut self, value: u64) -> MxeCiphertext {
        self.sealed += 1;
        let mut ciphertext = [0u8; 32];
        ciphertext[..16].copy_from_slice(&self.sealed.to_le_bytes());
        ciphertext[16] = 0xC7;
        self.plaintexts.insert(ciphertext, value);
        MxeCiphertext::new(ciphertext, self.sealed)
    }

    fn add(&mut self, accumulator: &MxeCiphertext, contribution: &[u8; 32]) -> MxeCiphertext {
        let total = self.plaintexts[&accumulator.ciphertext] + self.plaintexts[contribution];
        self.seal(total)
    }

    fn reveal(&self, ciphertext: &MxeCiphertext) -> u64 {
        self.plaintexts[&ciphertext.ciphertext]
    }
}

struct Protocol {
    owner: Pubkey,
    config: ProtocolConfig,
    providers: HashMap<Pubkey, ProviderRecord>,
    cooldowns: HashMap<(Pubkey, &'static [u8]), CooldownRecord>,
    batches: HashMap<u64, Batch>,
    requests: HashMap<u64, DecryptionRequest>,
    mxe: FakeMxe,
    next_request_id: u64,
}

impl Protocol {
    fn new(cooldown_seconds: u64) -> Self {
        let owner = Pubkey::new_unique();
        let mut config = ProtocolConfig {
            owner: Pubkey::default(),
            paused: false,
            cooldown_seconds: 0,
            total_batches_opened: 0,
            total_decryption_requests: 0,
            bump: 0,
        };
        config.init(owner, Some(cooldown_seconds), 255).unwrap();
        Self {
            owner,
            config,
            providers: HashMap::new(),
            cooldowns: HashMap::new(),
            batches: HashMap::new(),
            requests: HashMap::new(),
            mxe: FakeMxe::default(),
            next_request_id: 1,
        }
    }

    fn grant_provider(&mut self, actor: Pubkey, provider: Pubkey, now: i64) -> Result<()> {
        self.config.require_owner(&actor)?;
        let record = self.providers.entry(provider).or_insert(ProviderRecord {
            provider,
            active: false,
            updated_at: 0,
            bump: 0,
        });
        record.set_active(provider, true, now, 254);
        Ok(())
    }

    fn add_provider(&mut self, provider: Pubkey, now: i64) {
        let owner = self.owner;
        self.grant_provider(owner, provider, now).unwrap();
    }

    fn remove_provider(&mut self, actor: Pubkey, provider: Pubkey, now: i64) -> Result<()> {
        self.config.require_owner(&actor)?;
        let mut record = self.providers[&provider].clone();
        let bump = record.bump;
        record.set_active(provider, false, now, bump);
        self.providers.insert(provider, record);
        Ok(())
    }

    fn pause(&mut self, actor: Pubkey) -> Result<()> {
        self.config.require_owner(&actor)?;
        self.config.pause()
    }

    fn unpause(&mut self, actor: Pubkey) -> Result<bool> {
        self.config.require_owner(&actor)?;
        Ok(self.config.unpause())
    }

    fn set_cooldown(&mut self, actor: Pubkey, cooldown_seconds: u64) -> Result<u64> {
        self.config.require_owner(&actor)?;
        self.config.set_cooldown(cooldown_seconds)
    }

    fn cooldown(&self, actor: Pubkey, action: ActionKind) -> CooldownRecord {
        let mut record = self
            .cooldowns
            .get(&(actor, action.seed()))
            .cloned()
            .unwrap_or(CooldownRecord {
                actor: Pubkey::default(),
                action: ActionKind::default(),
                last_action_at: None,
                bump: 0,
            });
        record.bind(actor, action, 253);
        record
    }

    /// open_batch followed by a successful init_accumulator callback
    fn open_batch(&mut self, actor: Pubkey, batch_id: u64, now: i64) -> Result<()> {
        self.config.require_owner(&actor)?;
        self.config.require_not_paused()?;

        let mut batch = self.batches.get(&batch_id).cloned().unwrap_or_else(blank_batch);
        let seed = Pubkey::new_unique();
        batch.open(batch_id, seed, now, 250)?;
        let zero = self.mxe.seal(0);
        batch.complete_seed(&seed, zero)?;

        self.batches.insert(batch_id, batch);
        Ok(())
    }

    fn close_batch(&mut self, actor: Pubkey, batch_id: u64, now: i64) -> Result<()> {
        self.config.require_owner(&actor)?;
        self.config.require_not_paused()?;

        let mut batch = self.batches.get(&batch_id).cloned().unwrap_or_else(blank_batch);
        batch.close(now)?;
        self.batches.insert(batch_id, batch);
        Ok(())
    }

    /// contribute; returns the computation the accumulate callback must match
    fn submit(&mut self, actor: Pubkey, batch_id: u64, value: u64, now: i64) -> Result<Pubkey> {
        require_provider(self.providers.get(&actor), &actor)?;
        self.config.require_not_paused()?;

        let mut cooldown = self.cooldown(actor, ActionKind::Submission);
        cooldown.check_and_record(now, self.config.cooldown_seconds)?;

        let mut batch = self.batches.get(&batch_id).cloned().unwrap_or_else(blank_batch);
        let computation = Pubkey::new_unique();
        let encrypted = self.mxe.seal(value).ciphertext;
        batch.begin_contribution(computation, actor, encrypted)?;

        self.cooldowns.insert((actor, ActionKind::Submission.seed()), cooldown);
        self.batches.insert(batch_id, batch);
        Ok(computation)
    }

    /// accumulate callback with a verified output
    fn settle(&mut self, batch_id: u64, computation: &Pubkey) -> Result<()> {
        let mut batch = self.batches[&batch_id].clone();
        let next = match batch.pending_contribution {
            Some(pending) => self.mxe.add(&batch.accumulator, &pending.ciphertext),
            None => MxeCiphertext::default(),
        };
        batch.complete_contribution(computation, next)?;
        self.batches.insert(batch_id, batch);
        Ok(())
    }

    /// accumulate callback carrying an aborted computation
    fn abort(&mut self, batch_id: u64, computation: &Pubkey) -> Result<()> {
        let mut batch = self.batches[&batch_id].clone();
        batch.abandon_contribution(computation)?;
        self.batches.insert(batch_id, batch);
        Ok(())
    }

    fn contribute(&mut self, actor: Pubkey, batch_id: u64, value: u64, now: i64) -> Result<()> {
        let computation = self.submit(actor, batch_id, value, now)?;
        self.settle(batch_id, &computation)
    }

    /// request_decryption; returns (request_id, computation)
    fn request_decryption(
        &mut self,
        actor: Pubkey,
        batch_id: u64,
        now: i64,
    ) -> Result<(u64, Pubkey)> {
        self.config.require_owner(&actor)?;
        self.config.require_not_paused()?;

        let mut cooldown = self.cooldown(actor, ActionKind::DecryptionRequest);
        cooldown.check_and_record(now, self.config.cooldown_seconds)?;

        let batch = self.batches.get(&batch_id).cloned().unwrap_or_else(blank_batch);
        let request_id = self.next_request_id;
        let computation = Pubkey::new_unique();
        let mut request = blank_request();
        request.register(request_id, &batch, computation, actor, now, 252)?;

        self.next_request_id += 1;
        self.cooldowns
            .insert((actor, ActionKind::DecryptionRequest.seed()), cooldown);
        self.requests.insert(request_id, request);
        Ok((request_id, computation))
    }

    /// reveal_aggregate callback. `proof_ok = false` models a signature that
    /// fails verification.
    fn deliver(
        &mut self,
        request_id: u64,
        computation: &Pubkey,
        proof_ok: bool,
        now: i64,
    ) -> Result<u64> {
        let mut request = self.requests[&request_id].clone();
        let batch = &self.batches[&request.batch_id];
        let verified = proof_ok.then(|| self.mxe.reveal(&batch.accumulator));
        let aggregate = request.fulfill(computation, batch, verified, now)?;
        self.requests.insert(request_id, request);
        Ok(aggregate)
    }
}

fn permutations(values: &[u64]) -> Vec<Vec<u64>> {
    if values.len() <= 1 {
        return vec![values.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..values.len() {
        let mut rest = values.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head);
            out.push(tail);
        }
    }
    out
}

#[test]
fn aggregate_is_independent_of_contribution_order() {
    let values = [3u64, 10, 15, 1_000];
    for (round, order) in permutations(&values).into_iter().enumerate() {
        let mut p = Protocol::new(DEFAULT_COOLDOWN_SECONDS);
        let owner = p.owner;
        p.open_batch(owner, 1, 0).unwrap();

        for (i, value) in order.iter().enumerate() {
            let provider = Pubkey::new_unique();
            p.add_provider(provider, 0);
            p.contribute(provider, 1, *value, i as i64).unwrap();
        }

        p.close_batch(owner, 1, 100).unwrap();
        let (request_id, comp) = p.request_decryption(owner, 1, 100).unwrap();
        assert_eq!(
            p.deliver(request_id, &comp, true, 101).unwrap(),
            1_028,
            "order #{} {:?}",
            round,
            order
        );
    }
}

#[test]
fn contribution_after_close_is_rejected_and_changes_nothing() {
    let mut p = Protocol::new(DEFAULT_COOLDOWN_SECONDS);
    let owner = p.owner;
    let provider = Pubkey::new_unique();
    p.add_provider(provider, 0);
    p.open_batch(owner, 3, 0).unwrap();
    p.contribute(provider, 3, 5, 0).unwrap();
    p.close_batch(owner, 3, 10).unwrap();

    let sealed = p.batches[&3].accumulator;
    assert_error(p.contribute(provider, 3, 7, 100), ErrorCode::BatchUnavailable);
    assert_eq!(p.batches[&3].accumulator, sealed);
    assert_eq!(p.batches[&3].contribution_count, 1);

    // the reverted submission did not consume the provider's cooldown slot
    assert_eq!(
        p.cooldowns[&(provider, ActionKind::Submission.seed())].last_action_at,
        Some(0)
    );
}

#[test]
fn batch_seven_reveals_twenty_five_exactly_once() {
    let mut p = Protocol::new(DEFAULT_COOLDOWN_SECONDS);
    let owner = p.owner;
    let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());
    p.add_provider(a, 0);
    p.add_provider(b, 0);

    p.open_batch(owner, 7, 0).unwrap();
    p.contribute(a, 7, 10, 1).unwrap();
    p.contribute(b, 7, 15, 2).unwrap();
    p.close_batch(owner, 7, 3).unwrap();

    let (request_id, comp) = p.request_decryption(owner, 7, 4).unwrap();
    let c1 = p.requests[&request_id].commitment;
    assert_eq!(
        c1,
        crate::engine::commitment(&crate::ID, &p.batches[&7].ciphertext_set())
    );

    assert_eq!(p.deliver(request_id, &comp, true, 5).unwrap(), 25);
    let fulfilled = p.requests[&request_id].clone();
    assert_eq!(fulfilled.status(), RequestStatus::Processed);
    assert_eq!(fulfilled.aggregate, Some(25));

    assert_error(p.deliver(request_id, &comp, true, 6), ErrorCode::ReplayAttempt);
    assert_eq!(p.requests[&request_id].processed_at, Some(5));
}

#[test]
fn stale_callback_after_accumulator_mutation_is_state_mismatch() {
    let mut p = Protocol::new(DEFAULT_COOLDOWN_SECONDS);
    let owner = p.owner;
    let a = Pubkey::new_unique();
    p.add_provider(a, 0);

    p.open_batch(owner, 7, 0).unwrap();
    p.contribute(a, 7, 10, 1).unwrap();
    p.close_batch(owner, 7, 2).unwrap();
    let (first, first_comp) = p.request_decryption(owner, 7, 3).unwrap();

    // Hypothetical: the sealed accumulator is rewritten before the callback.
    let mutated = p.mxe.seal(999);
    p.batches.get_mut(&7).unwrap().accumulator = mutated;
    let (second, second_comp) = p.request_decryption(owner, 7, 3 + 60).unwrap();

    assert_error(p.deliver(first, &first_comp, true, 70), ErrorCode::StateMismatch);
    assert_eq!(p.requests[&first].status(), RequestStatus::Pending);
    assert_eq!(p.requests[&first].aggregate, None);

    // the request issued against the current state still completes
    assert_eq!(p.deliver(second, &second_comp, true, 71).unwrap(), 999);
}

#[test]
fn failed_proof_is_rejected_and_request_stays_pending() {
    let mut p = Protocol::new(DEFAULT_COOLDOWN_SECONDS);
    let owner = p.owner;
    p.open_batch(owner, 2, 0).unwrap();
    p.close_batch(owner, 2, 1).unwrap();
    let (request_id, comp) = p.request_decryption(owner, 2, 2).unwrap();

    assert_error(p.deliver(request_id, &comp, false, 3), ErrorCode::DecryptionFailed);
    assert_eq!(p.requests[&request_id].status(), RequestStatus::Pending);

    // empty batch reveals zero once a verified output arrives
    assert_eq!(p.deliver(request_id, &comp, true, 4).unwrap(), 0);
}

#[test]
fn non_provider_cannot_contribute() {
    let mut p = Protocol::new(DEFAULT_COOLDOWN_SECONDS);
    let owner = p.owner;
    p.open_batch(owner, 1, 0).unwrap();
    let before = p.batches[&1].accumulator;

    let stranger = Pubkey::new_unique();
    assert_error(p.contribute(stranger, 1, 10, 0), ErrorCode::Unauthorized);

    // owner is not implicitly a provider either
    assert_error(p.contribute(owner, 1, 10, 0), ErrorCode::Unauthorized);

    assert_eq!(p.batches[&1].accumulator, before);
    assert!(p.batches[&1].pending_contribution.is_none());
}

#[test]
fn removed_provider_loses_access() {
    let mut p = Protocol::new(DEFAULT_COOLDOWN_SECONDS);
    let owner = p.owner;
    let a = Pubkey::new_unique();
    p.add_provider(a, 0);
    p.open_batch(owner, 1, 0).unwrap();
    p.contribute(a, 1, 1, 0).unwrap();

    p.remove_provider(owner, a, 10).unwrap();
    assert_error(p.contribute(a, 1, 1, 1_000), ErrorCode::Unauthorized);
}

#[test]
fn submissions_respect_cooldown_spacing() {
    let mut p = Protocol::new(60);
    let owner = p.owner;
    let a = Pubkey::new_unique();
    p.add_provider(a, 0);
    p.open_batch(owner, 1, 0).unwrap();

    p.contribute(a, 1, 1, 1_000).unwrap();
    assert_error(p.contribute(a, 1, 1, 1_059), ErrorCode::CooldownActive);
    p.contribute(a, 1, 1, 1_060).unwrap();
    assert_eq!(p.batches[&1].contribution_count, 2);
}

#[test]
fn decryption_requests_respect_cooldown_spacing() {
    let mut p = Protocol::new(60);
    let owner = p.owner;
    p.open_batch(owner, 1, 0).unwrap();
    p.close_batch(owner, 1, 1).unwrap();

    p.request_decryption(owner, 1, 100).unwrap();
    assert_error(p.request_decryption(owner, 1, 159), ErrorCode::CooldownActive);
    p.request_decryption(owner, 1, 160).unwrap();
}

#[test]
fn cooldowns_are_tracked_per_action_kind() {
    let mut p = Protocol::new(60);
    let owner = p.owner;
    p.add_provider(owner, 0);
    p.open_batch(owner, 1, 0).unwrap();
    p.contribute(owner, 1, 4, 100).unwrap();
    p.close_batch(owner, 1, 100).unwrap();

    // a single identity can hold both capabilities; the submission just made
    // does not block a decryption request in the same second
    p.request_decryption(owner, 1, 100).unwrap();
}

#[test]
fn zero_cooldown_is_rejected_and_prior_value_kept() {
    let mut p = Protocol::new(45);
    let owner = p.owner;
    assert_error(p.set_cooldown(owner, 0), ErrorCode::InvalidParameter);
    assert_eq!(p.config.cooldown_seconds, 45);
}

#[test]
fn pause_blocks_gated_actions_but_not_pending_callbacks() {
    let mut p = Protocol::new(DEFAULT_COOLDOWN_SECONDS);
    let owner = p.owner;
    let a = Pubkey::new_unique();
    p.add_provider(a, 0);
    p.open_batch(owner, 1, 0).unwrap();
    p.contribute(a, 1, 8, 0).unwrap();
    p.close_batch(owner, 1, 1).unwrap();
    let (request_id, comp) = p.request_decryption(owner, 1, 2).unwrap();

    p.open_batch(owner, 2, 2).unwrap();

    p.pause(owner).unwrap();
    assert_error(p.open_batch(owner, 3, 3), ErrorCode::SystemPaused);
    assert_error(p.close_batch(owner, 2, 3), ErrorCode::SystemPaused);
    assert_eq!(p.batches[&2].status, BatchStatus::Open);
    assert_error(p.contribute(a, 2, 1, 1_000), ErrorCode::SystemPaused);
    assert_error(p.request_decryption(owner, 1, 1_000), ErrorCode::SystemPaused);

    assert_eq!(p.deliver(request_id, &comp, true, 4).unwrap(), 8);

    assert!(p.unpause(owner).unwrap());
    p.open_batch(owner, 3, 5).unwrap();
    p.close_batch(owner, 2, 5).unwrap();
}

#[test]
fn only_owner_manages_providers_pause_and_cooldown() {
    let mut p = Protocol::new(DEFAULT_COOLDOWN_SECONDS);
    let owner = p.owner;
    let stranger = Pubkey::new_unique();
    let a = Pubkey::new_unique();

    assert_error(p.grant_provider(stranger, a, 0), ErrorCode::Unauthorized);
    assert!(!p.providers.contains_key(&a));

    p.add_provider(a, 0);
    assert_error(p.remove_provider(stranger, a, 1), ErrorCode::Unauthorized);
    assert!(p.providers[&a].active);

    assert_error(p.pause(stranger), ErrorCode::Unauthorized);
    assert!(!p.config.paused);
    p.pause(owner).unwrap();
    assert_error(p.unpause(stranger), ErrorCode::Unauthorized);
    assert!(p.config.paused);
    p.unpause(owner).unwrap();

    assert_error(p.set_cooldown(stranger, 5), ErrorCode::Unauthorized);
    assert_eq!(p.config.cooldown_seconds, DEFAULT_COOLDOWN_SECONDS);
    assert_eq!(p.set_cooldown(owner, 5).unwrap(), DEFAULT_COOLDOWN_SECONDS);
}

#[test]
fn only_owner_manages_batches_and_decryption() {
    let mut p = Protocol::new(DEFAULT_COOLDOWN_SECONDS);
    let owner = p.owner;
    let stranger = Pubkey::new_unique();

    assert_error(p.open_batch(stranger, 1, 0), ErrorCode::Unauthorized);
    p.open_batch(owner, 1, 0).unwrap();
    assert_error(p.close_batch(stranger, 1, 1), ErrorCode::Unauthorized);
    p.close_batch(owner, 1, 1).unwrap();
    assert_error(p.request_decryption(stranger, 1, 2), ErrorCode::Unauthorized);
}

#[test]
fn decryption_requires_a_closed_batch() {
    let mut p = Protocol::new(DEFAULT_COOLDOWN_SECONDS);
    let owner = p.owner;
    assert_error(p.request_decryption(owner, 9, 0), ErrorCode::BatchUnavailable);

    p.open_batch(owner, 9, 0).unwrap();
    assert_error(p.request_decryption(owner, 9, 1), ErrorCode::BatchUnavailable);
    assert!(p.requests.is_empty());
}

#[test]
fn duplicate_batch_id_is_invalid() {
    let mut p = Protocol::new(DEFAULT_COOLDOWN_SECONDS);
    let owner = p.owner;
    p.open_batch(owner, 4, 0).unwrap();
    assert_error(p.open_batch(owner, 4, 1), ErrorCode::InvalidParameter);
    p.close_batch(owner, 4, 2).unwrap();
    assert_error(p.open_batch(owner, 4, 3), ErrorCode::InvalidParameter);
}

#[test]
fn close_of_missing_or_closed_batch_is_unavailable() {
    let mut p = Protocol::new(DEFAULT_COOLDOWN_SECONDS);
    let owner = p.owner;
    assert_error(p.close_batch(owner, 5, 0), ErrorCode::BatchUnavailable);
    p.open_batch(owner, 5, 0).unwrap();
    p.close_batch(owner, 5, 1).unwrap();
    assert_error(p.close_batch(owner, 5, 2), ErrorCode::BatchUnavailable);
}

#[test]
fn one_batch_may_be_decrypted_by_several_requests() {
    let mut p = Protocol::new(60);
    let owner = p.owner;
    let a = Pubkey::new_unique();
    p.add_provider(a, 0);
    p.open_batch(owner, 1, 0).unwrap();
    p.contribute(a, 1, 12, 0).unwrap();
    p.close_batch(owner, 1, 1).unwrap();

    let (r1, c1) = p.request_decryption(owner, 1, 100).unwrap();
    let (r2, c2) = p.request_decryption(owner, 1, 160).unwrap();
    assert_ne!(r1, r2);
    assert_eq!(p.requests[&r1].commitment, p.requests[&r2].commitment);

    // each request is fulfilled independently, and neither callback can
    // be replayed against the other's id
    assert_error(p.deliver(r1, &c2, true, 161), ErrorCode::ReplayAttempt);
    assert_eq!(p.deliver(r2, &c2, true, 162).unwrap(), 12);
    assert_eq!(p.deliver(r1, &c1, true, 163).unwrap(), 12);
}

#[test]
fn close_with_contribution_in_flight_discards_late_result() {
    let mut p = Protocol::new(DEFAULT_COOLDOWN_SECONDS);
    let owner = p.owner;
    let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());
    p.add_provider(a, 0);
    p.add_provider(b, 0);
    p.open_batch(owner, 1, 0).unwrap();
    p.contribute(a, 1, 4, 0).unwrap();

    // the accumulate callback for this submission never lands before close
    let late = p.submit(b, 1, 6, 1).unwrap();
    p.close_batch(owner, 1, 2).unwrap();
    let sealed = p.batches[&1].accumulator;

    assert_error(p.settle(1, &late), ErrorCode::BatchUnavailable);
    assert_eq!(p.batches[&1].accumulator, sealed);
    assert_eq!(p.batches[&1].contribution_count, 1);

    let (request_id, comp) = p.request_decryption(owner, 1, 3).unwrap();
    assert_eq!(p.deliver(request_id, &comp, true, 4).unwrap(), 4);

    // an abort arriving after close still releases the stale handle
    p.abort(1, &late).unwrap();
    assert!(p.batches[&1].pending_contribution.is_none());
    assert_eq!(p.batches[&1].status, BatchStatus::Closed);
}
