//! Gauge registration handlers.
//!
//! `create_gauge` is permissionless and registers one gauge per pool;
//! `add_reward_token` lets the voter authority attach extra reward streams.

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::VeError;
use crate::events::GaugeCreated;
use crate::state::{Gauge, Voter};

#[derive(Accounts)]
pub struct CreateGauge<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        mut,
        seeds = [VOTER_SEED, voter.escrow.as_ref()],
        bump = voter.bump,
        has_one = emission_mint
    )]
    pub voter: Account<'info, Voter>,

    /// LP mint identifying the pool.
    pub pool: Account<'info, Mint>,

    pub emission_mint: Account<'info, Mint>,

    /// Created on first use; a registered gauge is rejected with `GaugeExists`.
    #[account(
        init_if_needed,
        payer = payer,
        space = Gauge::LEN,
        seeds = [GAUGE_SEED, voter.key().as_ref(), pool.key().as_ref()],
        bump
    )]
    pub gauge: Account<'info, Gauge>,

    /// Holds staked LP tokens.
    #[account(
        init_if_needed,
        payer = payer,
        seeds = [GAUGE_STAKE_VAULT_SEED, gauge.key().as_ref()],
        bump,
        token::mint = pool,
        token::authority = gauge
    )]
    pub stake_vault: Account<'info, TokenAccount>,

    /// Reward vault for stream 0, the emission token.
    #[account(
        init_if_needed,
        payer = payer,
        seeds = [GAUGE_REWARD_VAULT_SEED, gauge.key().as_ref(), emission_mint.key().as_ref()],
        bump,
        token::mint = emission_mint,
        token::authority = gauge
    )]
    pub emission_vault: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn create_gauge_handler(ctx: Context<CreateGauge>) -> Result<()> {
    require!(!ctx.accounts.gauge.is_registered(), VeError::GaugeExists);

    let clock = Clock::get()?;
    let voter_key = ctx.accounts.voter.key();
    let gauge_key = ctx.accounts.gauge.key();
    let pool = ctx.accounts.pool.key();
    let bribe = Gauge::bribe_address(&gauge_key);

    let gauge = &mut ctx.accounts.gauge;
    gauge.voter = voter_key;
    gauge.pool = pool;
    gauge.bribe = bribe;
    gauge.stake_vault = ctx.accounts.stake_vault.key();
    gauge.total_staked = 0;
    gauge.rewards = Vec::with_capacity(MAX_REWARD_TOKENS);
    gauge.is_alive = true;
    gauge.created_at = clock.unix_timestamp;
    gauge.bump = ctx.bumps.gauge;
    gauge.stake_vault_bump = ctx.bumps.stake_vault;
    gauge.add_reward_token(
        ctx.accounts.emission_mint.key(),
        ctx.accounts.emission_vault.key(),
        clock.unix_timestamp,
    )?;

    let voter = &mut ctx.accounts.voter;
    voter.gauge_count = voter
        .gauge_count
        .checked_add(1)
        .ok_or(VeError::MathOverflow)?;

    msg!("Gauge {} created for pool {}", gauge_key, pool);
    msg!("Bribe address: {}", bribe);
    msg!("Gauges registered: {}", voter.gauge_count);

    emit!(GaugeCreated {
        voter: voter_key,
        gauge: gauge_key,
        pool,
        bribe,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct AddRewardToken<'info> {
    #[account(mut)]
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

    pub reward_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = authority,
        seeds = [GAUGE_REWARD_VAULT_SEED, gauge.key().as_ref(), reward_mint.key().as_ref()],
        bump,
        token::mint = reward_mint,
        token::authority = gauge
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn add_reward_token_handler(ctx: Context<AddRewardToken>) -> Result<()> {
    let clock = Clock::get()?;
    let mint = ctx.accounts.reward_mint.key();

    let gauge = &mut ctx.accounts.gauge;
    let index = gauge.add_reward_token(mint, ctx.accounts.reward_vault.key(), clock.unix_timestamp)?;

    msg!("Gauge {} streams {} as reward #{}", gauge.key(), mint, index);

    Ok(())
}
