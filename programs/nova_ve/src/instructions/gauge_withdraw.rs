//! Gauge withdraw instruction handler.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::error::VeError;
use crate::state::{Gauge, GaugeStake};
use crate::utils::transfer_tokens;

#[derive(Accounts)]
pub struct GaugeWithdraw<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [GAUGE_SEED, gauge.voter.as_ref(), gauge.pool.as_ref()],
        bump = gauge.bump,
        has_one = stake_vault @ VeError::InvalidAccount
    )]
    pub gauge: Account<'info, Gauge>,

    #[account(
        mut,
        seeds = [GAUGE_STAKE_SEED, gauge.key().as_ref(), owner.key().as_ref()],
        bump = gauge_stake.bump,
        has_one = gauge @ VeError::InvalidAccount,
        has_one = owner @ VeError::Unauthorized
    )]
    pub gauge_stake: Account<'info, GaugeStake>,

    #[account(
        mut,
        constraint = owner_lp_account.mint == gauge.pool @ VeError::InvalidAccount,
        constraint = owner_lp_account.owner == owner.key() @ VeError::Unauthorized
    )]
    pub owner_lp_account: Account<'info, TokenAccount>,

    #[account(mut)]
    pub stake_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<GaugeWithdraw>, amount: u64) -> Result<()> {
    let clock = Clock::get()?;

    ctx.accounts
        .gauge
        .withdraw(&mut ctx.accounts.gauge_stake, amount, clock.unix_timestamp)?;

    let gauge = &ctx.accounts.gauge;
    let (voter, pool) = (gauge.voter, gauge.pool);
    let seeds = &[GAUGE_SEED, voter.as_ref(), pool.as_ref(), &[gauge.bump]];
    let signer_seeds = &[&seeds[..]];

    transfer_tokens(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.stake_vault.to_account_info(),
        &ctx.accounts.owner_lp_account.to_account_info(),
        &ctx.accounts.gauge.to_account_info(),
        signer_seeds,
        amount,
    )?;

    msg!("Withdrew {} LP tokens from gauge {}", amount, ctx.accounts.gauge.key());
    msg!(
        "Balance: {}, gauge total: {}",
        ctx.accounts.gauge_stake.balance,
        ctx.accounts.gauge.total_staked
    );

    Ok(())
}
