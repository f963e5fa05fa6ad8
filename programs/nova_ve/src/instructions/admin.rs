/// Admin instruction handlers.
///
/// ## Security Guarantees
/// - Every handler requires the stored authority's signature
/// - PDA validation ensures the right escrow, minter, voter and gauge
/// - Parameter bounds are checked before anything is stored

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VeError;
use crate::state::{EmissionParams, Escrow, Gauge, Minter, Voter};

/// Accounts required for escrow admin operations.
#[derive(Accounts)]
pub struct EscrowAdmin<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [ESCROW_SEED, escrow.base_mint.as_ref()],
        bump = escrow.bump,
        has_one = authority @ VeError::Unauthorized
    )]
    pub escrow: Account<'info, Escrow>,
}

/// Pause or resume new locks.
///
/// Withdrawals, claims and votes stay available while paused.
pub fn set_paused_handler(ctx: Context<EscrowAdmin>, paused: bool) -> Result<()> {
    let escrow = &mut ctx.accounts.escrow;
    let clock = Clock::get()?;

    let previous_state = escrow.paused;
    escrow.paused = paused;
    escrow.last_updated = clock.unix_timestamp;

    msg!(
        "Locking {} (was {})",
        if paused { "PAUSED" } else { "RESUMED" },
        if previous_state { "paused" } else { "active" }
    );
    msg!("Admin: {}", ctx.accounts.authority.key());

    Ok(())
}

/// Accounts required to hand over every authority at once.
#[derive(Accounts)]
pub struct TransferAuthority<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [ESCROW_SEED, escrow.base_mint.as_ref()],
        bump = escrow.bump,
        has_one = authority @ VeError::Unauthorized
    )]
    pub escrow: Account<'info, Escrow>,

    #[account(
        mut,
        seeds = [MINTER_SEED, escrow.key().as_ref()],
        bump = minter.bump,
        has_one = authority @ VeError::Unauthorized
    )]
    pub minter: Account<'info, Minter>,

    #[account(
        mut,
        seeds = [VOTER_SEED, escrow.key().as_ref()],
        bump = voter.bump,
        has_one = authority @ VeError::Unauthorized
    )]
    pub voter: Account<'info, Voter>,
}

/// Transfer escrow, minter and voter authority to `new_authority`.
pub fn transfer_authority_handler(
    ctx: Context<TransferAuthority>,
    new_authority: Pubkey,
) -> Result<()> {
    require!(new_authority != Pubkey::default(), VeError::InvalidAccount);

    let old_authority = ctx.accounts.authority.key();
    ctx.accounts.escrow.authority = new_authority;
    ctx.accounts.minter.authority = new_authority;
    ctx.accounts.voter.authority = new_authority;

    msg!("Authority transferred");
    msg!("Old authority: {}", old_authority);
    msg!("New authority: {}", new_authority);

    Ok(())
}

/// Accounts required for minter admin operations.
#[derive(Accounts)]
pub struct MinterAdmin<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [MINTER_SEED, minter.escrow.as_ref()],
        bump = minter.bump,
        has_one = authority @ VeError::Unauthorized
    )]
    pub minter: Account<'info, Minter>,
}

/// Replace the emission parameters. Takes effect at the next period.
pub fn set_emission_params_handler(
    ctx: Context<MinterAdmin>,
    params: EmissionParams,
) -> Result<()> {
    params.validate()?;

    let minter = &mut ctx.accounts.minter;
    let old = minter.params;
    minter.params = params;

    msg!(
        "Emission params - Old: decay={}bp, tail={}bp, cap={}bp, min={}, growth={:?}",
        old.decay_bps,
        old.tail_bps,
        old.growth_cap_bps,
        old.min_weekly,
        old.growth
    );
    msg!(
        "New: decay={}bp, tail={}bp, cap={}bp, min={}, growth={:?}",
        params.decay_bps,
        params.tail_bps,
        params.growth_cap_bps,
        params.min_weekly,
        params.growth
    );

    Ok(())
}

/// Accounts required for gauge admin operations.
#[derive(Accounts)]
pub struct GaugeAdmin<'info> {
    pub authority: Signer<'info>,

    #[account(
        seeds = [VOTER_SEED, voter.escrow.as_ref()],
        bump = voter.bump,
        has_one = authority @ VeError::Unauthorized
    )]
    pub voter: Account<'info, Voter>,

    #[account(
        mut,
        seeds = [GAUGE_SEED, voter.key().as_ref(), gauge.pool.as_ref()],
        bump = gauge.bump,
        has_one = voter @ VeError::InvalidAccount
    )]
    pub gauge: Account<'info, Gauge>,
}

/// Stop a gauge from receiving votes and emission.
///
/// Stakers keep earning whatever was already notified and can always withdraw.
pub fn kill_gauge_handler(ctx: Context<GaugeAdmin>) -> Result<()> {
    let gauge = &mut ctx.accounts.gauge;
    require!(gauge.is_alive, VeError::GaugeNotAlive);
    gauge.is_alive = false;

    msg!("Gauge {} killed (pool {})", gauge.key(), gauge.pool);

    Ok(())
}
