//! Get reward instruction handler.
//!
//! ## Remaining accounts
//! A `(reward_vault, destination)` pair for every requested stream, in
//! request order. Destinations must be the owner's token accounts for the
//! stream's mint.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::error::VeError;
use crate::events::RewardPaid;
use crate::state::{Gauge, GaugeStake};
use crate::utils::transfer_tokens;

#[derive(Accounts)]
pub struct GetReward<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [GAUGE_SEED, gauge.voter.as_ref(), gauge.pool.as_ref()],
        bump = gauge.bump
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

    pub token_program: Program<'info, Token>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, GetReward<'info>>,
    streams: Vec<u8>,
) -> Result<()> {
    require!(
        ctx.remaining_accounts.len() == streams.len() * 2,
        VeError::InvalidAccount
    );

    let clock = Clock::get()?;
    let owner = ctx.accounts.owner.key();
    let gauge_key = ctx.accounts.gauge.key();

    let paid = ctx
        .accounts
        .gauge
        .take_rewards(&mut ctx.accounts.gauge_stake, &streams, clock.unix_timestamp)?;

    let gauge = &ctx.accounts.gauge;
    let (voter, pool) = (gauge.voter, gauge.pool);
    let seeds = &[GAUGE_SEED, voter.as_ref(), pool.as_ref(), &[gauge.bump]];
    let signer_seeds = &[&seeds[..]];
    let token_program = ctx.accounts.token_program.to_account_info();
    let gauge_info = ctx.accounts.gauge.to_account_info();

    for ((index, amount), pair) in streams
        .iter()
        .zip(paid.iter())
        .zip(ctx.remaining_accounts.chunks(2))
    {
        let stream = gauge
            .rewards
            .get(*index as usize)
            .ok_or(VeError::UnknownRewardToken)?;
        let (vault, destination) = (&pair[0], &pair[1]);
        require_keys_eq!(vault.key(), stream.vault, VeError::InvalidAccount);

        let destination_account: Account<TokenAccount> = Account::try_from(destination)?;
        require_keys_eq!(destination_account.mint, stream.mint, VeError::InvalidAccount);
        require_keys_eq!(destination_account.owner, owner, VeError::Unauthorized);

        transfer_tokens(
            &token_program,
            vault,
            destination,
            &gauge_info,
            signer_seeds,
            *amount,
        )?;

        msg!("Paid {} of reward {} from gauge {}", amount, stream.mint, gauge_key);
        emit!(RewardPaid {
            gauge: gauge_key,
            owner,
            reward_mint: stream.mint,
            amount: *amount,
        });
    }

    Ok(())
}
