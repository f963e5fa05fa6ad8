use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VeError;

/// Vote-weighted router of weekly emission to gauges.
///
/// Seeds: [b"voter", escrow.key()]
#[account]
#[derive(Default)]
pub struct Voter {
    /// May register reward tokens and kill gauges
    pub authority: Pubkey,
    pub escrow: Pubkey,
    pub emission_mint: Pubkey,
    /// Holds emission between `update_period` and the per-gauge payouts
    pub vault: Pubkey,

    pub gauge_count: u64,

    /// Emission that found no votes (or a killed gauge) and rolls into the
    /// next recorded epoch
    pub carried_emission: u64,
    pub total_distributed: u64,
    pub last_recorded_epoch: i64,

    pub vault_bump: u8,
    pub bump: u8,
}

impl Voter {
    pub const LEN: usize = 8 + (32 * 4) + (8 * 4) + 2;

    /// Records `amount` as the emission of the closed epoch tracked by
    /// `epoch_votes`, folding in any carried emission.
    ///
    /// Returns the emission now payable for that epoch. An epoch without
    /// votes pays nothing and everything carries forward.
    pub fn record_emission(&mut self, epoch_votes: &mut EpochVotes, amount: u64) -> Result<u64> {
        require!(!epoch_votes.emission_recorded, VeError::AlreadyDistributed);

        let available = amount
            .checked_add(self.carried_emission)
            .ok_or(VeError::MathOverflow)?;

        if epoch_votes.total_weight == 0 {
            epoch_votes.emission = 0;
            self.carried_emission = available;
        } else {
            epoch_votes.emission = available;
            self.carried_emission = 0;
        }
        epoch_votes.emission_recorded = true;
        self.last_recorded_epoch = epoch_votes.epoch;

        Ok(epoch_votes.emission)
    }

    /// Settles one pool's share of a recorded epoch.
    ///
    /// Returns the amount owed to the gauge. When the gauge is dead the share
    /// is carried instead and `0` is returned.
    pub fn settle_pool(
        &mut self,
        epoch_votes: &mut EpochVotes,
        pool_votes: &mut PoolVotes,
        gauge_alive: bool,
    ) -> Result<u64> {
        require!(epoch_votes.emission_recorded, VeError::EmissionNotRecorded);
        require!(!pool_votes.distributed, VeError::AlreadyDistributed);

        let share = epoch_votes.pool_share(pool_votes.weight)?;
        epoch_votes.record_payout(pool_votes.weight, share)?;
        pool_votes.distributed = true;

        if gauge_alive {
            self.total_distributed = self
                .total_distributed
                .checked_add(share)
                .ok_or(VeError::MathOverflow)?;
            Ok(share)
        } else {
            self.carried_emission = self
                .carried_emission
                .checked_add(share)
                .ok_or(VeError::MathOverflow)?;
            Ok(0)
        }
    }
}

/// Vote totals and emission bookkeeping for one epoch.
///
/// Seeds: [b"epoch_votes", voter.key(), epoch.to_le_bytes()]
#[account]
#[derive(Default)]
pub struct EpochVotes {
    pub voter: Pubkey,
    pub epoch: i64,

    pub total_weight: u64,
    /// Pools holding non-zero weight
    pub active_pools: u32,

    pub emission: u64,
    pub distributed: u64,
    pub pools_paid: u32,
    pub emission_recorded: bool,

    pub bump: u8,
}

impl EpochVotes {
    pub const LEN: usize = 8 + 32 + 8 + 8 + 4 + 8 + 8 + 4 + 1 + 1;

    /// Share of the epoch emission owed to a pool holding `pool_weight`.
    ///
    /// The last unpaid pool takes whatever is left, so payouts sum to the
    /// emission exactly.
    pub fn pool_share(&self, pool_weight: u64) -> Result<u64> {
        if pool_weight == 0 || self.total_weight == 0 {
            return Ok(0);
        }
        let remaining = self
            .emission
            .checked_sub(self.distributed)
            .ok_or(VeError::MathOverflow)?;
        if self.pools_paid.saturating_add(1) >= self.active_pools {
            return Ok(remaining);
        }

        let share = (self.emission as u128)
            .checked_mul(pool_weight as u128)
            .ok_or(VeError::MathOverflow)?
            .checked_div(self.total_weight as u128)
            .ok_or(VeError::MathOverflow)?;
        let share = u64::try_from(share).map_err(|_| VeError::MathOverflow)?;
        Ok(share.min(remaining))
    }

    pub fn record_payout(&mut self, pool_weight: u64, amount: u64) -> Result<()> {
        self.distributed = self
            .distributed
            .checked_add(amount)
            .ok_or(VeError::MathOverflow)?;
        if pool_weight > 0 {
            self.pools_paid = self.pools_paid.checked_add(1).ok_or(VeError::MathOverflow)?;
        }
        Ok(())
    }

    /// Moves a pool's weight from `old` to `new`, tracking active pools.
    pub fn reweight_pool(&mut self, old: u64, new: u64) -> Result<()> {
        self.total_weight = self
            .total_weight
            .checked_sub(old)
            .and_then(|w| w.checked_add(new))
            .ok_or(VeError::MathOverflow)?;
        match (old == 0, new == 0) {
            (true, false) => {
                self.active_pools = self.active_pools.checked_add(1).ok_or(VeError::MathOverflow)?
            }
            (false, true) => {
                self.active_pools = self.active_pools.checked_sub(1).ok_or(VeError::MathOverflow)?
            }
            _ => {}
        }
        Ok(())
    }

    /// Adds `weight` to `pool` and to the epoch total.
    pub fn add_pool_weight(&mut self, pool: &mut PoolVotes, weight: u64) -> Result<()> {
        let new_weight = pool.weight.checked_add(weight).ok_or(VeError::MathOverflow)?;
        self.reweight_pool(pool.weight, new_weight)?;
        pool.weight = new_weight;
        Ok(())
    }

    /// Takes `weight` back out of `pool` and the epoch total.
    pub fn remove_pool_weight(&mut self, pool: &mut PoolVotes, weight: u64) -> Result<()> {
        let new_weight = pool.weight.checked_sub(weight).ok_or(VeError::MathOverflow)?;
        self.reweight_pool(pool.weight, new_weight)?;
        pool.weight = new_weight;
        Ok(())
    }

    pub fn address(voter: &Pubkey, epoch: i64) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[EPOCH_VOTES_SEED, voter.as_ref(), &epoch.to_le_bytes()],
            &crate::ID,
        )
    }
}

/// Vote weight a pool received in one epoch.
///
/// Seeds: [b"pool_votes", gauge.key(), epoch.to_le_bytes()]
#[account]
#[derive(Default)]
pub struct PoolVotes {
    pub gauge: Pubkey,
    pub pool: Pubkey,
    pub epoch: i64,
    pub weight: u64,
    pub distributed: bool,
    pub bump: u8,
}

impl PoolVotes {
    pub const LEN: usize = 8 + 32 + 32 + 8 + 8 + 1 + 1;

    pub fn address(gauge: &Pubkey, epoch: i64) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[POOL_VOTES_SEED, gauge.as_ref(), &epoch.to_le_bytes()],
            &crate::ID,
        )
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolVote {
    pub pool: Pubkey,
    pub gauge: Pubkey,
    pub weight: u64,
}

impl PoolVote {
    pub const LEN: usize = 32 + 32 + 8;
}

/// A position's allocation for one epoch.
///
/// Seeds: [b"position_votes", position.key(), epoch.to_le_bytes()]
#[account]
#[derive(Default)]
pub struct PositionVotes {
    pub position: Pubkey,
    pub epoch: i64,
    pub votes: Vec<PoolVote>,
    pub total_weight: u64,
    pub bump: u8,
}

impl PositionVotes {
    pub const LEN: usize = 8 + 32 + 8 + 4 + MAX_VOTE_POOLS * PoolVote::LEN + 8 + 1;

    pub fn weight_for(&self, gauge: &Pubkey) -> u64 {
        self.votes
            .iter()
            .find(|v| v.gauge == *gauge)
            .map(|v| v.weight)
            .unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.votes.clear();
        self.total_weight = 0;
    }

    /// Removes the current allocation from the epoch. `pools` are the records
    /// of the voted gauges, in the order of `votes`.
    pub fn withdraw(&mut self, epoch_votes: &mut EpochVotes, pools: &mut [PoolVotes]) -> Result<()> {
        require!(pools.len() == self.votes.len(), VeError::InvalidAccount);
        for (vote, pool) in self.votes.iter().zip(pools.iter_mut()) {
            require_keys_eq!(pool.gauge, vote.gauge, VeError::InvalidAccount);
            epoch_votes.remove_pool_weight(pool, vote.weight)?;
        }
        self.clear();
        Ok(())
    }

    /// Records `allocations[i]` against `pools[i]`. The previous allocation
    /// must have been withdrawn first.
    pub fn cast(
        &mut self,
        epoch_votes: &mut EpochVotes,
        pools: &mut [PoolVotes],
        allocations: &[u64],
    ) -> Result<()> {
        require!(self.votes.is_empty(), VeError::InvalidVote);
        require!(pools.len() == allocations.len(), VeError::LengthMismatch);
        require!(pools.len() <= MAX_VOTE_POOLS, VeError::TooManyVotes);
        for (i, pool) in pools.iter().enumerate() {
            require!(
                pools[..i].iter().all(|p| p.gauge != pool.gauge),
                VeError::InvalidVote
            );
        }

        let mut total: u64 = 0;
        for (pool, weight) in pools.iter_mut().zip(allocations) {
            epoch_votes.add_pool_weight(pool, *weight)?;
            total = total.checked_add(*weight).ok_or(VeError::MathOverflow)?;
            self.votes.push(PoolVote {
                pool: pool.pool,
                gauge: pool.gauge,
                weight: *weight,
            });
        }
        self.total_weight = total;
        Ok(())
    }
}

/// Splits `power` across pools in proportion to `weights`.
///
/// Weights are relative and need not sum to anything in particular; each
/// allocation truncates, so the parts sum to at most `power`.
pub fn allocate_votes(power: u64, weights: &[u64]) -> Result<Vec<u64>> {
    require!(!weights.is_empty(), VeError::InvalidVote);
    require!(weights.len() <= MAX_VOTE_POOLS, VeError::TooManyVotes);

    let total: u128 = weights.iter().map(|w| *w as u128).sum();
    require!(total > 0, VeError::InvalidVote);

    weights
        .iter()
        .map(|w| {
            let part = (power as u128)
                .checked_mul(*w as u128)
                .ok_or(VeError::MathOverflow)?
                / total;
            u64::try_from(part).map_err(|_| error!(VeError::MathOverflow))
        })
        .collect()
}
