//! Gauge deposit instruction handler.
//!
//! Stakes LP tokens into a gauge to earn its reward streams.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::error::VeError;
use crate::state::{Gauge, GaugeStake};
use crate::utils::transfer_tokens;

#[derive(Accounts)]
pub struct GaugeDeposit<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [GAUGE_SEED, gauge.voter.as_ref(), gauge.pool.as_ref()],
        bump = gauge.bump,
        has_one = stake_vault @ VeError::InvalidAccount
    )]
    pub gauge: Account<'info, Gauge>,

    /// Depositor's stake record (created on first deposit).
    #[account(
        init_if_needed,
        payer = owner,
        space = GaugeStake::LEN,
        seeds = [GAUGE_STAKE_SEED, gauge.key().as_ref(), owner.key().as_ref()],
        bump
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

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<GaugeDeposit>, amount: u64) -> Result<()> {
    let clock = Clock::get()?;

    let gauge_stake = &mut ctx.accounts.gauge_stake;
    if gauge_stake.gauge == Pubkey::default() {
        gauge_stake.gauge = ctx.accounts.gauge.key();
        gauge_stake.owner = ctx.accounts.owner.key();
        gauge_stake.balance = 0;
        gauge_stake.rewards = Vec::with_capacity(MAX_REWARD_TOKENS);
        gauge_stake.bump = ctx.bumps.gauge_stake;
    }

    ctx.accounts
        .gauge
        .deposit(&mut ctx.accounts.gauge_stake, amount, clock.unix_timestamp)?;

    transfer_tokens(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.owner_lp_account.to_account_info(),
        &ctx.accounts.stake_vault.to_account_info(),
        &ctx.accounts.owner.to_account_info(),
        &[],
        amount,
    )?;

    msg!("Staked {} LP tokens in gauge {}", amount, ctx.accounts.gauge.key());
    msg!(
        "Balance: {}, gauge total: {}",
        ctx.accounts.gauge_stake.balance,
        ctx.accounts.gauge.total_staked
    );

    Ok(())
}
