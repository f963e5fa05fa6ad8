//! Vote and reset instruction handlers.
//!
//! Votes are recorded per epoch. Re-voting within an epoch first removes the
//! position's previous allocation, then records the new one.
//!
//! ## Remaining accounts
//! 1. One `PoolVotes` account per entry of the existing allocation, in order
//! 2. For `vote` only: a `(gauge, pool_votes)` pair per pool, in argument
//!    order. Missing `pool_votes` accounts are created.

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VeError;
use crate::events::Voted;
use crate::state::{allocate_votes, EpochVotes, Escrow, Gauge, PoolVotes, Position, PositionVotes, Voter};
use crate::utils::{create_pda_account, load_account, store_account};

#[derive(Accounts)]
#[instruction(epoch: i64)]
pub struct CastVote<'info> {
    /// Owner or approved delegate of the position; pays for new vote records.
    #[account(mut)]
    pub signer: Signer<'info>,

    #[account(
        seeds = [ESCROW_SEED, escrow.base_mint.as_ref()],
        bump = escrow.bump
    )]
    pub escrow: Account<'info, Escrow>,

    #[account(
        seeds = [VOTER_SEED, escrow.key().as_ref()],
        bump = voter.bump,
        has_one = escrow @ VeError::InvalidAccount
    )]
    pub voter: Account<'info, Voter>,

    #[account(
        seeds = [POSITION_SEED, escrow.key().as_ref(), &position.id.to_le_bytes()],
        bump = position.bump,
        has_one = escrow @ VeError::InvalidAccount
    )]
    pub position: Account<'info, Position>,

    #[account(
        init_if_needed,
        payer = signer,
        space = PositionVotes::LEN,
        seeds = [POSITION_VOTES_SEED, position.key().as_ref(), &epoch.to_le_bytes()],
        bump
    )]
    pub position_votes: Account<'info, PositionVotes>,

    #[account(
        init_if_needed,
        payer = signer,
        space = EpochVotes::LEN,
        seeds = [EPOCH_VOTES_SEED, voter.key().as_ref(), &epoch.to_le_bytes()],
        bump
    )]
    pub epoch_votes: Account<'info, EpochVotes>,

    pub system_program: Program<'info, System>,
}

impl<'info> CastVote<'info> {
    /// Checks the signer and the epoch, and fills in freshly created records.
    fn prepare(&mut self, epoch: i64, now: i64, bumps: &CastVoteBumps) -> Result<()> {
        self.position.require_authorized(&self.signer.key())?;
        require!(epoch == epoch_start(now), VeError::InvalidVote);

        if self.position_votes.position == Pubkey::default() {
            self.position_votes.position = self.position.key();
            self.position_votes.epoch = epoch;
            self.position_votes.bump = bumps.position_votes;
        }
        if self.epoch_votes.voter == Pubkey::default() {
            self.epoch_votes.voter = self.voter.key();
            self.epoch_votes.epoch = epoch;
            self.epoch_votes.bump = bumps.epoch_votes;
        }
        Ok(())
    }

    /// Subtracts the position's current allocation from every pool it touched.
    /// Returns how many remaining accounts were consumed.
    fn clear_previous(&mut self, remaining: &[AccountInfo<'info>]) -> Result<usize> {
        let count = self.position_votes.votes.len();
        require!(remaining.len() >= count, VeError::InvalidAccount);
        let infos = &remaining[..count];

        let epoch = self.position_votes.epoch;
        let mut pools = Vec::with_capacity(count);
        for (vote, info) in self.position_votes.votes.iter().zip(infos) {
            let (expected, _) = PoolVotes::address(&vote.gauge, epoch);
            require_keys_eq!(info.key(), expected, VeError::InvalidAccount);
            pools.push(load_account::<PoolVotes>(info)?);
        }

        self.position_votes.withdraw(&mut self.epoch_votes, &mut pools)?;
        for (pool_votes, info) in pools.iter().zip(infos) {
            store_account(info, pool_votes)?;
        }
        Ok(count)
    }
}

pub fn vote_handler<'info>(
    mut ctx: Context<'_, '_, 'info, 'info, CastVote<'info>>,
    epoch: i64,
    pools: Vec<Pubkey>,
    weights: Vec<u64>,
) -> Result<()> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    require!(pools.len() == weights.len(), VeError::LengthMismatch);
    let power = ctx.accounts.position.balance_at(now)?;
    require!(power > 0, VeError::ZeroVotingPower);
    let allocations = allocate_votes(power, &weights)?;

    let accounts = &mut ctx.accounts;
    accounts.prepare(epoch, now, &ctx.bumps)?;
    let consumed = accounts.clear_previous(ctx.remaining_accounts)?;

    let pairs = &ctx.remaining_accounts[consumed..];
    require!(pairs.len() == pools.len() * 2, VeError::InvalidAccount);

    let gauge_keys: Vec<Pubkey> = pairs.chunks(2).map(|pair| pair[0].key()).collect();
    for (i, key) in gauge_keys.iter().enumerate() {
        require!(!gauge_keys[..i].contains(key), VeError::InvalidVote);
    }

    let voter_key = accounts.voter.key();
    let payer = accounts.signer.to_account_info();
    let system_program = accounts.system_program.to_account_info();
    let mut pool_records: Vec<PoolVotes> = Vec::with_capacity(pools.len());

    for (pool, pair) in pools.iter().zip(pairs.chunks(2)) {
        let (gauge_info, pool_votes_info) = (&pair[0], &pair[1]);

        let gauge: Gauge = load_account(gauge_info)?;
        require_keys_eq!(gauge.voter, voter_key, VeError::InvalidAccount);
        require_keys_eq!(gauge.pool, *pool, VeError::InvalidAccount);
        require!(gauge.is_alive, VeError::GaugeNotAlive);

        let gauge_key = gauge_info.key();
        let epoch_bytes = epoch.to_le_bytes();
        let pool_votes = if pool_votes_info.data_is_empty() {
            let bump = create_pda_account(
                &payer,
                pool_votes_info,
                &system_program,
                PoolVotes::LEN,
                &[POOL_VOTES_SEED, gauge_key.as_ref(), &epoch_bytes],
            )?;
            PoolVotes {
                gauge: gauge_key,
                pool: *pool,
                epoch,
                weight: 0,
                distributed: false,
                bump,
            }
        } else {
            let (expected, _) = PoolVotes::address(&gauge_key, epoch);
            require_keys_eq!(pool_votes_info.key(), expected, VeError::InvalidAccount);
            load_account::<PoolVotes>(pool_votes_info)?
        };
        pool_records.push(pool_votes);
    }

    accounts
        .position_votes
        .cast(&mut accounts.epoch_votes, &mut pool_records, &allocations)?;
    for (pool_votes, pair) in pool_records.iter().zip(pairs.chunks(2)) {
        store_account(&pair[1], pool_votes)?;
    }

    let position_votes = &accounts.position_votes;
    msg!(
        "Lock #{} voted {} power across {} pools for epoch {}",
        accounts.position.id,
        position_votes.total_weight,
        pools.len(),
        epoch
    );
    msg!("Epoch total weight: {}", accounts.epoch_votes.total_weight);

    emit!(Voted {
        position: accounts.position.key(),
        epoch,
        power,
        pools,
        weights: allocations,
    });

    Ok(())
}

/// Withdraw the position's votes for the current epoch.
pub fn reset_handler<'info>(
    mut ctx: Context<'_, '_, 'info, 'info, CastVote<'info>>,
    epoch: i64,
) -> Result<()> {
    let clock = Clock::get()?;

    let accounts = &mut ctx.accounts;
    accounts.prepare(epoch, clock.unix_timestamp, &ctx.bumps)?;
    let cleared = accounts.clear_previous(ctx.remaining_accounts)?;

    msg!(
        "Lock #{} reset {} pool votes for epoch {}",
        accounts.position.id,
        cleared,
        epoch
    );
    msg!("Epoch total weight: {}", accounts.epoch_votes.total_weight);

    Ok(())
}
