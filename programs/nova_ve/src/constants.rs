//! Program constants for the NOVA vote-escrow program.
//!
//! This module defines PDA seeds, the epoch clock, lock limits, fixed-point
//! precision and the default emission schedule.

use anchor_lang::prelude::*;

/// Seed for deriving the escrow PDA (one per base token mint)
pub const ESCROW_SEED: &[u8] = b"escrow";

/// Seed for deriving the escrow vault PDA
pub const ESCROW_VAULT_SEED: &[u8] = b"escrow_vault";

/// Seed for deriving position PDAs
pub const POSITION_SEED: &[u8] = b"position";

/// Seed for deriving the minter PDA
pub const MINTER_SEED: &[u8] = b"minter";

/// Seed for deriving the minter vault PDA
pub const MINTER_VAULT_SEED: &[u8] = b"minter_vault";

/// Seed for deriving the voter PDA
pub const VOTER_SEED: &[u8] = b"voter";

/// Seed for deriving the voter vault PDA
pub const VOTER_VAULT_SEED: &[u8] = b"voter_vault";

/// Seed for deriving the rebase distributor PDA
pub const DISTRIBUTOR_SEED: &[u8] = b"distributor";

/// Seed for deriving the rebase distributor vault PDA
pub const DISTRIBUTOR_VAULT_SEED: &[u8] = b"distributor_vault";

/// Seed for deriving gauge PDAs
pub const GAUGE_SEED: &[u8] = b"gauge";

/// Seed for deriving the vault holding a gauge's staked LP tokens
pub const GAUGE_STAKE_VAULT_SEED: &[u8] = b"gauge_stake_vault";

/// Seed for deriving a gauge's per-mint reward vault
pub const GAUGE_REWARD_VAULT_SEED: &[u8] = b"gauge_reward_vault";

/// Seed for deriving per-depositor gauge stake PDAs
pub const GAUGE_STAKE_SEED: &[u8] = b"gauge_stake";

/// Seed for deriving the bribe address paired with a gauge
pub const BRIBE_SEED: &[u8] = b"bribe";

/// Seed for deriving per-epoch vote totals
pub const EPOCH_VOTES_SEED: &[u8] = b"epoch_votes";

/// Seed for deriving per-(pool, epoch) vote totals
pub const POOL_VOTES_SEED: &[u8] = b"pool_votes";

/// Seed for deriving per-(position, epoch) vote allocations
pub const POSITION_VOTES_SEED: &[u8] = b"position_votes";

/// Seed for deriving per-epoch rebase records
pub const REBASE_EPOCH_SEED: &[u8] = b"rebase_epoch";

/// Number of seconds in a day
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Epoch width: one week
#[constant]
pub const WEEK: i64 = 7 * SECONDS_PER_DAY;

/// Maximum lock duration (4 years of 365 days)
#[constant]
pub const MAXLOCK: i64 = 4 * 365 * SECONDS_PER_DAY;

/// Fixed-point scale for voting power slopes and reward-per-token values
pub const PRECISION: u128 = 1_000_000_000_000; // 10^12

/// Basis points denominator (100% = 10000 basis points)
pub const BASIS_POINTS_DENOMINATOR: u64 = 10_000;

/// Slots in the escrow's scheduled slope-change ring, one per week.
/// Must exceed MAXLOCK / WEEK + 1.
pub const SLOPE_CHANGE_SLOTS: usize = 256;

/// Week-boundary supply points retained by the escrow
pub const BOUNDARY_HISTORY: usize = 16;

/// Post-change global points retained by the escrow for past supply queries
pub const GLOBAL_HISTORY: usize = 64;

/// Checkpoints retained per position
pub const MAX_POSITION_CHECKPOINTS: usize = 32;

/// Maximum pools a position may split its vote across in one epoch
pub const MAX_VOTE_POOLS: usize = 10;

/// Maximum reward streams per gauge (stream 0 is the emission token)
pub const MAX_REWARD_TOKENS: usize = 4;

/// Gauge reward period length
pub const REWARD_DURATION: i64 = WEEK;

/// Maximum rebase epochs walked by a single claim
pub const MAX_CLAIM_EPOCHS: usize = 52;

/// Default weekly decay (99% = 9900 basis points)
pub const DEFAULT_DECAY_BPS: u16 = 9_900;

/// Default tail emission as a share of circulating supply (0.2%)
pub const DEFAULT_TAIL_BPS: u16 = 20;

/// Default cap on the rebase growth term, as a share of weekly emission
pub const DEFAULT_GROWTH_CAP_BPS: u16 = 10_000;

/// Absolute lower bound on the weekly emission (base units)
pub const DEFAULT_MIN_WEEKLY: u64 = 0;

/// Start of the epoch containing `timestamp`.
pub fn epoch_start(timestamp: i64) -> i64 {
    timestamp.div_euclid(WEEK) * WEEK
}
