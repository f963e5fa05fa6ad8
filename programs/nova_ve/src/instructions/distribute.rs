//! Distribute-to-gauge instruction handler.
//!
//! Pays one pool its vote share of a closed epoch's emission and starts a new
//! reward period on the gauge's emission stream. Permissionless; each
//! (pool, epoch) pair pays out once.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::error::VeError;
use crate::events::{EmissionDistributed, GaugeRewardNotified};
use crate::state::{EpochVotes, Gauge, PoolVotes, Voter};
use crate::utils::transfer_tokens;

#[derive(Accounts)]
#[instruction(epoch: i64)]
pub struct DistributeToGauge<'info> {
    #[account(
        mut,
        seeds = [VOTER_SEED, voter.escrow.as_ref()],
        bump = voter.bump
    )]
    pub voter: Account<'info, Voter>,

    #[account(
        mut,
        constraint = voter_vault.key() == voter.vault @ VeError::InvalidAccount
    )]
    pub voter_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [GAUGE_SEED, voter.key().as_ref(), gauge.pool.as_ref()],
        bump = gauge.bump,
        has_one = voter @ VeError::InvalidAccount
    )]
    pub gauge: Account<'info, Gauge>,

    #[account(
        mut,
        seeds = [EPOCH_VOTES_SEED, voter.key().as_ref(), &epoch.to_le_bytes()],
        bump = epoch_votes.bump
    )]
    pub epoch_votes: Account<'info, EpochVotes>,

    #[account(
        mut,
        seeds = [POOL_VOTES_SEED, gauge.key().as_ref(), &epoch.to_le_bytes()],
        bump = pool_votes.bump
    )]
    pub pool_votes: Account<'info, PoolVotes>,

    /// The gauge's emission-token reward vault (stream 0).
    #[account(
        mut,
        constraint = gauge.rewards.first().map(|r| r.vault) == Some(emission_vault.key())
            @ VeError::InvalidAccount
    )]
    pub emission_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<DistributeToGauge>, epoch: i64) -> Result<u64> {
    let clock = Clock::get()?;
    require!(
        epoch < epoch_start(clock.unix_timestamp),
        VeError::EpochNotClosed
    );
    let gauge_key = ctx.accounts.gauge.key();
    let alive = ctx.accounts.gauge.is_alive;
    let paid_before = ctx.accounts.epoch_votes.distributed;

    let amount = ctx.accounts.voter.settle_pool(
        &mut ctx.accounts.epoch_votes,
        &mut ctx.accounts.pool_votes,
        alive,
    )?;

    if !alive {
        let share = ctx.accounts.epoch_votes.distributed - paid_before;
        msg!(
            "Gauge {} is dead; its epoch {} share rolls forward ({} carried in total)",
            gauge_key,
            epoch,
            ctx.accounts.voter.carried_emission
        );
        emit!(EmissionDistributed {
            gauge: gauge_key,
            epoch,
            amount: share,
            carried: true,
        });
        return Ok(0);
    }

    let voter = &ctx.accounts.voter;
    let escrow_key = voter.escrow;
    let seeds = &[VOTER_SEED, escrow_key.as_ref(), &[voter.bump]];
    let signer_seeds = &[&seeds[..]];

    transfer_tokens(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.voter_vault.to_account_info(),
        &ctx.accounts.emission_vault.to_account_info(),
        &ctx.accounts.voter.to_account_info(),
        signer_seeds,
        amount,
    )?;

    ctx.accounts.emission_vault.reload()?;
    let vault_balance = ctx.accounts.emission_vault.amount;
    let gauge = &mut ctx.accounts.gauge;
    gauge.notify_reward_amount(0, amount, vault_balance, clock.unix_timestamp)?;
    let stream = gauge
        .rewards
        .first()
        .copied()
        .ok_or(VeError::UnknownRewardToken)?;

    msg!(
        "Distributed {} to gauge {} for epoch {}",
        amount,
        gauge_key,
        epoch
    );
    msg!(
        "Epoch {} paid {} of {}",
        epoch,
        ctx.accounts.epoch_votes.distributed,
        ctx.accounts.epoch_votes.emission
    );

    emit!(EmissionDistributed {
        gauge: gauge_key,
        epoch,
        amount,
        carried: false,
    });
    emit!(GaugeRewardNotified {
        gauge: gauge_key,
        reward_mint: stream.mint,
        amount,
        rate: stream.rate,
        period_finish: stream.period_finish,
    });

    Ok(amount)
}
