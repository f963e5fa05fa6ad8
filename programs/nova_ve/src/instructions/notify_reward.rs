//! External reward handlers: funding extra streams and the `earned` view.
//!
//! Stream 0 is fed only by emission distribution; any other registered
//! stream can be topped up by anyone.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::error::VeError;
use crate::events::GaugeRewardNotified;
use crate::state::{Gauge, GaugeStake};
use crate::utils::transfer_tokens;

#[derive(Accounts)]
pub struct NotifyReward<'info> {
    pub funder: Signer<'info>,

    #[account(
        mut,
        seeds = [GAUGE_SEED, gauge.voter.as_ref(), gauge.pool.as_ref()],
        bump = gauge.bump
    )]
    pub gauge: Account<'info, Gauge>,

    #[account(
        mut,
        constraint = funder_token_account.owner == funder.key() @ VeError::Unauthorized
    )]
    pub funder_token_account: Account<'info, TokenAccount>,

    #[account(mut)]
    pub reward_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn notify_reward_amount_handler(ctx: Context<NotifyReward>, amount: u64) -> Result<()> {
    let mint = ctx.accounts.reward_vault.mint;
    let index = ctx
        .accounts
        .gauge
        .stream_index(&mint)
        .ok_or(VeError::UnknownRewardToken)?;
    require!(index != 0, VeError::Unauthorized);
    require_keys_eq!(
        ctx.accounts.gauge.rewards[index].vault,
        ctx.accounts.reward_vault.key(),
        VeError::InvalidAccount
    );
    require_keys_eq!(
        ctx.accounts.funder_token_account.mint,
        mint,
        VeError::InvalidAccount
    );

    transfer_tokens(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.funder_token_account.to_account_info(),
        &ctx.accounts.reward_vault.to_account_info(),
        &ctx.accounts.funder.to_account_info(),
        &[],
        amount,
    )?;

    let clock = Clock::get()?;
    ctx.accounts.reward_vault.reload()?;
    let vault_balance = ctx.accounts.reward_vault.amount;
    let gauge = &mut ctx.accounts.gauge;
    gauge.notify_reward_amount(index, amount, vault_balance, clock.unix_timestamp)?;
    let stream = gauge.rewards[index];

    msg!("Notified {} of reward {} on gauge {}", amount, mint, gauge.key());
    msg!("Rate: {} (scaled), period ends {}", stream.rate, stream.period_finish);

    emit!(GaugeRewardNotified {
        gauge: gauge.key(),
        reward_mint: mint,
        amount,
        rate: stream.rate,
        period_finish: stream.period_finish,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct EarnedQuery<'info> {
    #[account(
        seeds = [GAUGE_SEED, gauge.voter.as_ref(), gauge.pool.as_ref()],
        bump = gauge.bump
    )]
    pub gauge: Account<'info, Gauge>,

    #[account(has_one = gauge @ VeError::InvalidAccount)]
    pub gauge_stake: Account<'info, GaugeStake>,
}

pub fn earned_handler(ctx: Context<EarnedQuery>, stream: u8) -> Result<u64> {
    let clock = Clock::get()?;
    let earned = ctx.accounts.gauge.earned(
        &ctx.accounts.gauge_stake,
        stream as usize,
        clock.unix_timestamp,
    )?;
    msg!("Earned on stream {}: {}", stream, earned);
    Ok(earned)
}
