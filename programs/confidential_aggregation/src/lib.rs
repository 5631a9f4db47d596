use anchor_lang::prelude::*;
use arcium_anchor::prelude::*;

// =============================================================================
// MODULE DECLARATIONS
// =============================================================================

/// PDA seeds, rate-limit defaults, commitment domain
pub mod constants;

/// Commitment digest and the on-chain shape of MXE ciphertexts
pub mod engine;

/// Error codes returned by our program
pub mod errors;

/// Instruction handlers: initialize, providers, pause, batches, decryption
pub mod instructions;

/// Account state: ProtocolConfig, ProviderRecord, CooldownRecord, Batch, DecryptionRequest
pub mod state;

#[cfg(test)]
mod scenarios;


// Re-export errors for easier access
pub use errors::ErrorCode;

use crate::constants::*;
use crate::engine::MxeCiphertext;
use crate::state::{
    ActionKind, Batch, CooldownRecord, DecryptionRequest, ProtocolConfig, ProviderRecord,
};

// =============================================================================
// ARCIUM COMPUTATION DEFINITION OFFSETS
// =============================================================================

const COMP_DEF_OFFSET_INIT_ACCUMULATOR: u32 = comp_def_offset("init_accumulator");
const COMP_DEF_OFFSET_ACCUMULATE: u32 = comp_def_offset("accumulate");
const COMP_DEF_OFFSET_REVEAL_AGGREGATE: u32 = comp_def_offset("reveal_aggregate");

// =============================================================================
// PROGRAM ID
// =============================================================================

declare_id!("EsxchY6BwdNv59F3uAHDHbTu7u6dLfbCFRsg8f9S3HHD");

// Confidential Aggregation - encrypted batch totals with replay-safe decryption
//
// - Providers submit encrypted measurements into owner-managed batches
// - The MXE folds them into one Enc<Mxe> running total per batch
// - A closed batch's total is revealed once per request, and only if the
//   accumulator still matches the commitment taken at request time
//

#[arcium_program]
pub mod confidential_aggregation {
    use super::*;
    use crate::instructions;

    // =========================================================================
    // PROTOCOL INITIALIZATION
    // =========================================================================

    /// Initialize the protocol. The signer becomes the owner.
    ///
    /// # Arguments
    /// * `cooldown_seconds` - Shared rate-limit window (> 0), default when `None`
    pub fn initialize(ctx: Context<Initialize>, cooldown_seconds: Option<u64>) -> Result<()> {
        instructions::initialize::handler(ctx, cooldown_seconds)
    }

    // =========================================================================
    // ACCESS CONTROL
    // =========================================================================

    pub fn add_provider(ctx: Context<AddProvider>, provider: Pubkey) -> Result<()> {
        instructions::manage_providers::add(ctx, provider)
    }

    pub fn remove_provider(ctx: Context<RemoveProvider>, provider: Pubkey) -> Result<()> {
        instructions::manage_providers::remove(ctx, provider)
    }

    pub fn pause(ctx: Context<SetPause>) -> Result<()> {
        instructions::pause::pause(ctx)
    }

    pub fn unpause(ctx: Context<SetPause>) -> Result<()> {
        instructions::pause::unpause(ctx)
    }

    /// Replace the cooldown window shared by submissions and decryption requests.
    pub fn set_cooldown(ctx: Context<SetCooldown>, cooldown_seconds: u64) -> Result<()> {
        instructions::set_cooldown::handler(ctx, cooldown_seconds)
    }

    // =========================================================================
    // ARCIUM MPC SETUP
    // =========================================================================

    /// Initialize the init_accumulator computation definition.
    /// This must be called once before any batch can be opened.
    pub fn init_init_accumulator_comp_def(ctx: Context<InitInitAccumulatorCompDef>) -> Result<()> {
        init_comp_def(ctx.accounts, None, None)?;
        Ok(())
    }

    /// Initialize the accumulate computation definition.
    /// This must be called once before contributions can be submitted.
    pub fn init_accumulate_comp_def(ctx: Context<InitAccumulateCompDef>) -> Result<()> {
        init_comp_def(ctx.accounts, None, None)?;
        Ok(())
    }

    /// Initialize the reveal_aggregate computation definition.
    /// This must be called once before decryption can be requested.
    pub fn init_reveal_aggregate_comp_def(ctx: Context<InitRevealAggregateCompDef>) -> Result<()> {
        init_comp_def(ctx.accounts, None, None)?;
        Ok(())
    }

    // =========================================================================
    // OPEN BATCH
    // =========================================================================

    /// Create a batch and queue its encrypted zero.
    ///
    /// # Arguments
    /// * `computation_offset` - Unique ID for MPC computation
    /// * `batch_id` - Caller-chosen batch identifier
    /// * `nonce` - Nonce for the MXE-owned accumulator
    pub fn open_batch(
        ctx: Context<OpenBatch>,
        computation_offset: u64,
        batch_id: u64,
        nonce: u128,
    ) -> Result<()> {
        instructions::open_batch::handler(ctx, computation_offset, batch_id, nonce)
    }

    /// Callback: store the encrypted zero and start accepting contributions.
    /// An aborted computation releases the seed handle so open_batch can be retried.
    #[arcium_callback(encrypted_ix = "init_accumulator")]
    pub fn init_accumulator_callback(
        ctx: Context<InitAccumulatorCallback>,
        output: SignedComputationOutputs<InitAccumulatorOutput>,
    ) -> Result<()> {
        let computation = ctx.accounts.computation_account.key();
        let batch = &mut ctx.accounts.batch;

        let o = match output.verify_output(
            &ctx.accounts.cluster_account,
            &ctx.accounts.computation_account,
        ) {
            Ok(InitAccumulatorOutput { field_0 }) => field_0,
            Err(_) => {
                batch.abandon_seed(&computation)?;
                emit!(AccumulatorSeedFailedEvent {
                    batch_id: batch.batch_id,
                });
                msg!("Batch seeding aborted: batch_id={}", batch.batch_id);
                return Ok(());
            }
        };

        let zero = MxeCiphertext::new(o.ciphertexts[0], o.nonce);
        batch.complete_seed(&computation, zero)?;

        emit!(BatchOpenedEvent {
            batch_id: batch.batch_id,
            accumulator: zero.ciphertext,
            nonce: zero.nonce.to_le_bytes(),
        });

        msg!(
            "Batch opened: batch_id={}, mxe_nonce={}",
            batch.batch_id,
            zero.nonce
        );

        Ok(())
    }

    // =========================================================================
    // CLOSE BATCH
    // =========================================================================

    pub fn close_batch(ctx: Context<CloseBatch>, batch_id: u64) -> Result<()> {
        instructions::close_batch::handler(ctx, batch_id)
    }

    // =========================================================================
    // CONTRIBUTE
    // =========================================================================

    /// Submit an encrypted contribution to an open batch.
    ///
    /// # Arguments
    /// * `computation_offset` - Unique ID for MPC computation
    /// * `batch_id` - Target batch
    /// * `encrypted_value` - u64 measurement encrypted with the provider's key
    /// * `pubkey` - Provider's x25519 public key
    /// * `nonce` - Encryption nonce
    pub fn contribute(
        ctx: Context<Contribute>,
        computation_offset: u64,
        batch_id: u64,
        encrypted_value: [u8; 32],
        pubkey: [u8; 32],
        nonce: u128,
    ) -> Result<()> {
        instructions::contribute::handler(
            ctx,
            computation_offset,
            batch_id,
            encrypted_value,
            pubkey,
            nonce,
        )
    }

    /// Callback: apply the new encrypted total and release the batch.
    /// An aborted computation releases the batch with the accumulator untouched.
    #[arcium_callback(encrypted_ix = "accumulate")]
    pub fn accumulate_callback(
        ctx: Context<AccumulateCallback>,
        output: SignedComputationOutputs<AccumulateOutput>,
    ) -> Result<()> {
        let computation = ctx.accounts.computation_account.key();
        let batch = &mut ctx.accounts.batch;

        let o = match output.verify_output(
            &ctx.accounts.cluster_account,
            &ctx.accounts.computation_account,
        ) {
            Ok(AccumulateOutput { field_0 }) => field_0,
            Err(_) => {
                let dropped = batch.abandon_contribution(&computation)?;
                emit!(ContributionAbortedEvent {
                    contributor: dropped.contributor,
                    batch_id: batch.batch_id,
                });
                msg!(
                    "Contribution aborted: provider={}, batch_id={}",
                    dropped.contributor,
                    batch.batch_id
                );
                return Ok(());
            }
        };

        let accumulator = MxeCiphertext::new(o.ciphertexts[0], o.nonce);
        let applied = batch.complete_contribution(&computation, accumulator)?;

        emit!(ContributionRecordedEvent {
            contributor: applied.contributor,
            batch_id: batch.batch_id,
            ciphertext: applied.ciphertext,
        });

        msg!(
            "Contribution recorded: provider={}, batch_id={}, contributions={}",
            applied.contributor,
            batch.batch_id,
            batch.contribution_count
        );

        Ok(())
    }

    // =========================================================================
    // DECRYPTION ORACLE
    // =========================================================================

    /// Request decryption of a closed batch.
    ///
    /// # Arguments
    /// * `computation_offset` - Unique ID for MPC computation, used as the request id
    /// * `batch_id` - Closed batch to reveal
    pub fn request_decryption(
        ctx: Context<RequestDecryption>,
        computation_offset: u64,
        batch_id: u64,
    ) -> Result<()> {
        instructions::request_decryption::handler(ctx, computation_offset, batch_id)
    }

    /// Callback: fulfill a decryption request.
    /// Replay, commitment, and signature checks run in that order; any failure
    /// reverts and leaves the request Pending.
    #[arcium_callback(encrypted_ix = "reveal_aggregate")]
    pub fn reveal_aggregate_callback(
        ctx: Context<RevealAggregateCallback>,
        output: SignedComputationOutputs<RevealAggregateOutput>,
    ) -> Result<()> {
        let verified = match output.verify_output(
            &ctx.accounts.cluster_account,
            &ctx.accounts.computation_account,
        ) {
            Ok(RevealAggregateOutput { field_0 }) => Some(field_0),
            Err(_) => None,
        };

        let computation = ctx.accounts.computation_account.key();
        let now = Clock::get()?.unix_timestamp;
        let request_info = ctx.accounts.decryption_request.to_account_info();
        let mut request = DecryptionRequest::load(&request_info)?;
        let aggregate = request.fulfill(&computation, &ctx.accounts.batch, verified, now)?;
        request.store(&request_info)?;

        emit!(DecryptionCompletedEvent {
            request_id: request.request_id,
            batch_id: request.batch_id,
            aggregate,
        });

        msg!(
            "Decryption completed: request_id={}, batch_id={}, aggregate={}",
            request.request_id,
            request.batch_id,
            aggregate
        );

        Ok(())
    }
}

// =============================================================================
// INITIALIZE ACCOUNTS
// =============================================================================

#[derive(Accounts)]
pub struct Initialize<'info> {
    /// Becomes the protocol owner. Pays for the config account.
    #[account(mut)]
    pub owner: Signer<'info>,

    /// PDA derived from seeds: ["config"]
    #[account(
        init,
        payer = owner,
        space = ProtocolConfig::SIZE,
        seeds = [CONFIG_SEED],
        bump,
    )]
    pub config: Box<Account<'info, ProtocolConfig>>,

    pub system_program: Program<'info, System>,
}

// =============================================================================
// ACCESS CONTROL ACCOUNTS
// =============================================================================

#[derive(Accounts)]
#[instruction(provider: Pubkey)]
pub struct AddProvider<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, ProtocolConfig>>,

    /// Created on first grant, reused on re-grant
    #[account(
        init_if_needed,
        payer = owner,
        space = ProviderRecord::SIZE,
        seeds = [PROVIDER_SEED, provider.as_ref()],
        bump,
    )]
    pub provider_record: Account<'info, ProviderRecord>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(provider: Pubkey)]
pub struct RemoveProvider<'info> {
    pub owner: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, ProtocolConfig>>,

    #[account(
        mut,
        seeds = [PROVIDER_SEED, provider.as_ref()],
        bump = provider_record.bump,
    )]
    pub provider_record: Account<'info, ProviderRecord>,
}

#[derive(Accounts)]
pub struct SetPause<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, ProtocolConfig>>,
}

#[derive(Accounts)]
pub struct SetCooldown<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, ProtocolConfig>>,
}

// =============================================================================
// COMPUTATION DEFINITION ACCOUNTS
// =============================================================================

#[init_computation_definition_accounts("init_accumulator", payer)]
#[derive(Accounts)]
pub struct InitInitAccumulatorCompDef<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    #[account(
        mut,
        address = derive_mxe_pda!()
    )]
    pub mxe_account: Box<Account<'info, MXEAccount>>,
    #[account(mut)]
    /// CHECK: comp_def_account, checked by arcium program.
    pub comp_def_account: UncheckedAccount<'info>,
    pub arcium_program: Program<'info, Arcium>,
    pub system_program: Program<'info, System>,
}

#[init_computation_definition_accounts("accumulate", payer)]
#[derive(Accounts)]
pub struct InitAccumulateCompDef<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    #[account(
        mut,
        address = derive_mxe_pda!()
    )]
    pub mxe_account: Box<Account<'info, MXEAccount>>,
    #[account(mut)]
    /// CHECK: comp_def_account, checked by arcium program.
    pub comp_def_account: UncheckedAccount<'info>,
    pub arcium_program: Program<'info, Arcium>,
    pub system_program: Program<'info, System>,
}

#[init_computation_definition_accounts("reveal_aggregate", payer)]
#[derive(Accounts)]
pub struct InitRevealAggregateCompDef<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    #[account(
        mut,
        address = derive_mxe_pda!()
    )]
    pub mxe_account: Box<Account<'info, MXEAccount>>,
    #[account(mut)]
    /// CHECK: comp_def_account, checked by arcium program.
    pub comp_def_account: UncheckedAccount<'info>,
    pub arcium_program: Program<'info, Arcium>,
    pub system_program: Program<'info, System>,
}

// =============================================================================
// OPEN BATCH ACCOUNTS
// =============================================================================

#[queue_computation_accounts("init_accumulator", payer)]
#[derive(Accounts)]
#[instruction(computation_offset: u64, batch_id: u64)]
pub struct OpenBatch<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, ProtocolConfig>>,

    /// init_if_needed so an aborted seed can be retried on the same PDA;
    /// Batch::open rejects every other existing batch.
    #[account(
        init_if_needed,
        payer = payer,
        space = Batch::SIZE,
        seeds = [BATCH_SEED, &batch_id.to_le_bytes()],
        bump,
    )]
    pub batch: Box<Account<'info, Batch>>,

    // =========================================================================
    // ARCIUM MPC ACCOUNTS
    // =========================================================================
    #[account(
        init_if_needed,
        space = 9,
        payer = payer,
        seeds = [&SIGN_PDA_SEED],
        bump,
        address = derive_sign_pda!(),
    )]
    pub sign_pda_account: Box<Account<'info, ArciumSignerAccount>>,

    #[account(address = derive_mxe_pda!())]
    pub mxe_account: Box<Account<'info, MXEAccount>>,

    #[account(
        mut,
        address = derive_mempool_pda!(mxe_account, ErrorCode::ClusterNotSet)
    )]
    /// CHECK: mempool_account, checked by the arcium program.
    pub mempool_account: UncheckedAccount<'info>,

    #[account(
        mut,
        address = derive_execpool_pda!(mxe_account, ErrorCode::ClusterNotSet)
    )]
    /// CHECK: executing_pool, checked by the arcium program.
    pub executing_pool: UncheckedAccount<'info>,

    #[account(
        mut,
        address = derive_comp_pda!(computation_offset, mxe_account, ErrorCode::ClusterNotSet)
    )]
    /// CHECK: computation_account, checked by the arcium program.
    pub computation_account: UncheckedAccount<'info>,

    #[account(address = derive_comp_def_pda!(COMP_DEF_OFFSET_INIT_ACCUMULATOR))]
    pub comp_def_account: Box<Account<'info, ComputationDefinitionAccount>>,

    #[account(
        mut,
        address = derive_cluster_pda!(mxe_account, ErrorCode::ClusterNotSet)
    )]
    pub cluster_account: Box<Account<'info, Cluster>>,

    #[account(
        mut,
        address = ARCIUM_FEE_POOL_ACCOUNT_ADDRESS,
    )]
    pub pool_account: Box<Account<'info, FeePool>>,

    #[account(
        mut,
        address = ARCIUM_CLOCK_ACCOUNT_ADDRESS
    )]
    pub clock_account: Box<Account<'info, ClockAccount>>,

    pub system_program: Program<'info, System>,
    pub arcium_program: Program<'info, Arcium>,
}

#[callback_accounts("init_accumulator")]
#[derive(Accounts)]
pub struct InitAccumulatorCallback<'info> {
    pub arcium_program: Program<'info, Arcium>,

    #[account(address = derive_comp_def_pda!(COMP_DEF_OFFSET_INIT_ACCUMULATOR))]
    pub comp_def_account: Account<'info, ComputationDefinitionAccount>,

    #[account(address = derive_mxe_pda!())]
    pub mxe_account: Account<'info, MXEAccount>,

    /// CHECK: computation_account, checked by arcium program.
    pub computation_account: UncheckedAccount<'info>,

    #[account(address = derive_cluster_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    pub cluster_account: Account<'info, Cluster>,

    #[account(address = ::anchor_lang::solana_program::sysvar::instructions::ID)]
    /// CHECK: instructions_sysvar
    pub instructions_sysvar: AccountInfo<'info>,

    // Application accounts (passed via CallbackAccount)
    #[account(
        mut,
        seeds = [BATCH_SEED, &batch.batch_id.to_le_bytes()],
        bump = batch.bump,
    )]
    pub batch: Box<Account<'info, Batch>>,
}

// =============================================================================
// CLOSE BATCH ACCOUNTS
// =============================================================================

#[derive(Accounts)]
#[instruction(batch_id: u64)]
pub struct CloseBatch<'info> {
    pub owner: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, ProtocolConfig>>,

    #[account(
        mut,
        seeds = [BATCH_SEED, &batch_id.to_le_bytes()],
        bump = batch.bump,
    )]
    pub batch: Box<Account<'info, Batch>>,
}

// =============================================================================
// CONTRIBUTE ACCOUNTS
// =============================================================================

#[queue_computation_accounts("accumulate", payer)]
#[derive(Accounts)]
#[instruction(computation_offset: u64, batch_id: u64)]
pub struct Contribute<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    /// Provider submitting the value
    pub contributor: Signer<'info>,

    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, ProtocolConfig>>,

    /// Absent for actors that were never granted the capability
    #[account(
        seeds = [PROVIDER_SEED, contributor.key().as_ref()],
        bump,
    )]
    pub provider_record: Option<Account<'info, ProviderRecord>>,

    #[account(
        init_if_needed,
        payer = payer,
        space = CooldownRecord::SIZE,
        seeds = [COOLDOWN_SEED, contributor.key().as_ref(), ActionKind::Submission.seed()],
        bump,
    )]
    pub cooldown_record: Box<Account<'info, CooldownRecord>>,

    #[account(
        mut,
        seeds = [BATCH_SEED, &batch_id.to_le_bytes()],
        bump = batch.bump,
    )]
    pub batch: Box<Account<'info, Batch>>,

    // =========================================================================
    // ARCIUM MPC ACCOUNTS
    // =========================================================================
    #[account(
        init_if_needed,
        space = 9,
        payer = payer,
        seeds = [&SIGN_PDA_SEED],
        bump,
        address = derive_sign_pda!(),
    )]
    pub sign_pda_account: Box<Account<'info, ArciumSignerAccount>>,

    #[account(address = derive_mxe_pda!())]
    pub mxe_account: Box<Account<'info, MXEAccount>>,

    #[account(
        mut,
        address = derive_mempool_pda!(mxe_account, ErrorCode::ClusterNotSet)
    )]
    /// CHECK: mempool_account, checked by the arcium program.
    pub mempool_account: UncheckedAccount<'info>,

    #[account(
        mut,
        address = derive_execpool_pda!(mxe_account, ErrorCode::ClusterNotSet)
    )]
    /// CHECK: executing_pool, checked by the arcium program.
    pub executing_pool: UncheckedAccount<'info>,

    #[account(
        mut,
        address = derive_comp_pda!(computation_offset, mxe_account, ErrorCode::ClusterNotSet)
    )]
    /// CHECK: computation_account, checked by the arcium program.
    pub computation_account: UncheckedAccount<'info>,

    #[account(address = derive_comp_def_pda!(COMP_DEF_OFFSET_ACCUMULATE))]
    pub comp_def_account: Box<Account<'info, ComputationDefinitionAccount>>,

    #[account(
        mut,
        address = derive_cluster_pda!(mxe_account, ErrorCode::ClusterNotSet)
    )]
    pub cluster_account: Box<Account<'info, Cluster>>,

    #[account(
        mut,
        address = ARCIUM_FEE_POOL_ACCOUNT_ADDRESS,
    )]
    pub pool_account: Box<Account<'info, FeePool>>,

    #[account(
        mut,
        address = ARCIUM_CLOCK_ACCOUNT_ADDRESS
    )]
    pub clock_account: Box<Account<'info, ClockAccount>>,

    pub system_program: Program<'info, System>,
    pub arcium_program: Program<'info, Arcium>,
}

#[callback_accounts("accumulate")]
#[derive(Accounts)]
pub struct AccumulateCallback<'info> {
    pub arcium_program: Program<'info, Arcium>,

    #[account(address = derive_comp_def_pda!(COMP_DEF_OFFSET_ACCUMULATE))]
    pub comp_def_account: Account<'info, ComputationDefinitionAccount>,

    #[account(address = derive_mxe_pda!())]
    pub mxe_account: Account<'info, MXEAccount>,

    /// CHECK: computation_account, checked by arcium program.
    pub computation_account: UncheckedAccount<'info>,

    #[account(address = derive_cluster_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    pub cluster_account: Account<'info, Cluster>,

    #[account(address = ::anchor_lang::solana_program::sysvar::instructions::ID)]
    /// CHECK: instructions_sysvar
    pub instructions_sysvar: AccountInfo<'info>,

    // Application accounts (passed via CallbackAccount)
    #[account(
        mut,
        seeds = [BATCH_SEED, &batch.batch_id.to_le_bytes()],
        bump = batch.bump,
    )]
    pub batch: Box<Account<'info, Batch>>,
}

// =============================================================================
// REQUEST DECRYPTION ACCOUNTS
// =============================================================================

#[queue_computation_accounts("reveal_aggregate", payer)]
#[derive(Accounts)]
#[instruction(computation_offset: u64, batch_id: u64)]
pub struct RequestDecryption<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
    )]
    pub config: Box<Account<'info, ProtocolConfig>>,

    /// Keyed by the requesting owner, not by batch
    #[account(
        init_if_needed,
        payer = payer,
        space = CooldownRecord::SIZE,
        seeds = [
            COOLDOWN_SEED,
            owner.key().as_ref(),
            ActionKind::DecryptionRequest.seed(),
        ],
        bump,
    )]
    pub cooldown_record: Box<Account<'info, CooldownRecord>>,

    #[account(
        seeds = [BATCH_SEED, &batch_id.to_le_bytes()],
        bump = batch.bump,
    )]
    pub batch: Box<Account<'info, Batch>>,

    /// `init` makes every request id single-use
    #[account(
        init,
        payer = payer,
        space = DecryptionRequest::SIZE,
        seeds = [DECRYPTION_REQUEST_SEED, &computation_offset.to_le_bytes()],
        bump,
    )]
    pub decryption_request: Box<Account<'info, DecryptionRequest>>,

    // =========================================================================
    // ARCIUM MPC ACCOUNTS
    // =========================================================================
    #[account(
        init_if_needed,
        space = 9,
        payer = payer,
        seeds = [&SIGN_PDA_SEED],
        bump,
        address = derive_sign_pda!(),
    )]
    pub sign_pda_account: Box<Account<'info, ArciumSignerAccount>>,

    #[account(address = derive_mxe_pda!())]
    pub mxe_account: Box<Account<'info, MXEAccount>>,

    #[account(
        mut,
        address = derive_mempool_pda!(mxe_account, ErrorCode::ClusterNotSet)
    )]
    /// CHECK: mempool_account, checked by the arcium program.
    pub mempool_account: UncheckedAccount<'info>,

    #[account(
        mut,
        address = derive_execpool_pda!(mxe_account, ErrorCode::ClusterNotSet)
    )]
    /// CHECK: executing_pool, checked by the arcium program.
    pub executing_pool: UncheckedAccount<'info>,

    #[account(
        mut,
        address = derive_comp_pda!(computation_offset, mxe_account, ErrorCode::ClusterNotSet)
    )]
    /// CHECK: computation_account, checked by the arcium program.
    pub computation_account: UncheckedAccount<'info>,

    #[account(address = derive_comp_def_pda!(COMP_DEF_OFFSET_REVEAL_AGGREGATE))]
    pub comp_def_account: Box<Account<'info, ComputationDefinitionAccount>>,

    #[account(
        mut,
        address = derive_cluster_pda!(mxe_account, ErrorCode::ClusterNotSet)
    )]
    pub cluster_account: Box<Account<'info, Cluster>>,

    #[account(
        mut,
        address = ARCIUM_FEE_POOL_ACCOUNT_ADDRESS,
    )]
    pub pool_account: Box<Account<'info, FeePool>>,

    #[account(
        mut,
        address = ARCIUM_CLOCK_ACCOUNT_ADDRESS
    )]
    pub clock_account: Box<Account<'info, ClockAccount>>,

    pub system_program: Program<'info, System>,
    pub arcium_program: Program<'info, Arcium>,
}

#[callback_accounts("reveal_aggregate")]
#[derive(Accounts)]
pub struct RevealAggregateCallback<'info> {
    pub arcium_program: Program<'info, Arcium>,

    #[account(address = derive_comp_def_pda!(COMP_DEF_OFFSET_REVEAL_AGGREGATE))]
    pub comp_def_account: Account<'info, ComputationDefinitionAccount>,

    #[account(address = derive_mxe_pda!())]
    pub mxe_account: Account<'info, MXEAccount>,

    /// CHECK: computation_account, checked by arcium program.
    pub computation_account: UncheckedAccount<'info>,

    #[account(address = derive_cluster_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    pub cluster_account: Account<'info, Cluster>,

    #[account(address = ::anchor_lang::solana_program::sysvar::instructions::ID)]
    /// CHECK: instructions_sysvar
    pub instructions_sysvar: AccountInfo<'info>,

    // Application accounts (passed via CallbackAccount)
    /// CHECK: decoded by DecryptionRequest::load, which checks owner, type and
    /// seeds and rejects anything else as an unknown request id
    #[account(mut)]
    pub decryption_request: UncheckedAccount<'info>,

    /// Re-read to recompute the commitment; mismatches are rejected in fulfill
    #[account(
        seeds = [BATCH_SEED, &batch.batch_id.to_le_bytes()],
        bump = batch.bump,
    )]
    pub batch: Box<Account<'info, Batch>>,
}

// =============================================================================
// EVENTS
// =============================================================================

#[event]
pub struct ProviderUpdatedEvent {
    pub provider: Pubkey,
    pub active: bool,
    pub timestamp: i64,
}

#[event]
pub struct PausedEvent {
    pub owner: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct UnpausedEvent {
    pub owner: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct CooldownChangedEvent {
    pub previous_seconds: u64,
    pub cooldown_seconds: u64,
}

/// Emitted once the encrypted zero is in place and the batch accepts contributions
#[event]
pub struct BatchOpenedEvent {
    pub batch_id: u64,
    pub accumulator: [u8; 32],
    pub nonce: [u8; 16],
}

/// Emitted when the cluster aborted seeding; open_batch may be retried
#[event]
pub struct AccumulatorSeedFailedEvent {
    pub batch_id: u64,
}

/// Carries the sealed accumulator ciphertext, never a plaintext
#[event]
pub struct BatchClosedEvent {
    pub batch_id: u64,
    pub accumulator: [u8; 32],
    pub nonce: [u8; 16],
    pub contribution_count: u64,
}

#[event]
pub struct ContributionRecordedEvent {
    pub contributor: Pubkey,
    pub batch_id: u64,
    pub ciphertext: [u8; 32],
}

#[event]
pub struct ContributionAbortedEvent {
    pub contributor: Pubkey,
    pub batch_id: u64,
}

#[event]
pub struct DecryptionRequestedEvent {
    pub request_id: u64,
    pub batch_id: u64,
    pub commitment: [u8; 32],
}

#[event]
pub struct DecryptionCompletedEvent {
    pub request_id: u64,
    pub batch_id: u64,
    pub aggregate: u64,
}
