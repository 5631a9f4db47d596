use anchor_lang::prelude::*;

use crate::{AddProvider, ProviderUpdatedEvent, RemoveProvider};

// =============================================================================
// PROVIDER MEMBERSHIP (owner only)
// =============================================================================
// Providers are the only actors allowed to contribute ciphertexts. A record
// is created on first grant and toggled afterwards, never closed.
//

/// Grant the provider capability to `provider`.
pub fn add(ctx: Context<AddProvider>, provider: Pubkey) -> Result<()> {
    ctx.accounts.config.require_owner(&ctx.accounts.owner.key())?;

    let now = Clock::get()?.unix_timestamp;
    let changed = ctx.accounts.provider_record.set_active(
        provider,
        true,
        now,
        ctx.bumps.provider_record,
    );

    emit!(ProviderUpdatedEvent {
        provider,
        active: true,
        timestamp: now,
    });

    msg!("Provider added: provider={}, changed={}", provider, changed);
    Ok(())
}

/// Revoke the provider capability from `provider`.
pub fn remove(ctx: Context<RemoveProvider>, provider: Pubkey) -> Result<()> {
    ctx.accounts.config.require_owner(&ctx.accounts.owner.key())?;

    let now = Clock::get()?.unix_timestamp;
    let record = &mut ctx.accounts.provider_record;
    let bump = record.bump;
    let changed = record.set_active(provider, false, now, bump);

    emit!(ProviderUpdatedEvent {
        provider,
        active: false,
        timestamp: now,
    });

    msg!("Provider removed: provider={}, changed={}", provider, changed);
    Ok(())
}
