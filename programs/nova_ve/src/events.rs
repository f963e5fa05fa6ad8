//! Events emitted for off-chain indexers.
//!
//! Every state transition also logs a human-readable summary with `msg!`;
//! these structs carry the same facts in a decodable form.

use anchor_lang::prelude::*;

#[event]
pub struct LockCreated {
    pub escrow: Pubkey,
    pub position: Pubkey,
    pub id: u64,
    pub owner: Pubkey,
    pub amount: u64,
    pub unlock_time: i64,
}

#[event]
pub struct LockDeposited {
    pub position: Pubkey,
    pub id: u64,
    pub depositor: Pubkey,
    pub amount: u64,
    pub locked: u64,
}

#[event]
pub struct LockExtended {
    pub position: Pubkey,
    pub id: u64,
    pub unlock_time: i64,
}

#[event]
pub struct LockWithdrawn {
    pub position: Pubkey,
    pub id: u64,
    pub owner: Pubkey,
    pub amount: u64,
}

#[event]
pub struct Voted {
    pub position: Pubkey,
    pub epoch: i64,
    pub power: u64,
    pub pools: Vec<Pubkey>,
    pub weights: Vec<u64>,
}

#[event]
pub struct GaugeCreated {
    pub voter: Pubkey,
    pub gauge: Pubkey,
    pub pool: Pubkey,
    pub bribe: Pubkey,
}

#[event]
pub struct EmissionDistributed {
    pub gauge: Pubkey,
    pub epoch: i64,
    pub amount: u64,
    pub carried: bool,
}

#[event]
pub struct GaugeRewardNotified {
    pub gauge: Pubkey,
    pub reward_mint: Pubkey,
    pub amount: u64,
    pub rate: u128,
    pub period_finish: i64,
}

#[event]
pub struct RewardPaid {
    pub gauge: Pubkey,
    pub owner: Pubkey,
    pub reward_mint: Pubkey,
    pub amount: u64,
}

#[event]
pub struct RebaseClaimed {
    pub position: Pubkey,
    pub id: u64,
    pub amount: u64,
    pub compounded: bool,
    pub claimed_through: i64,
}

#[event]
pub struct PeriodUpdated {
    pub minter: Pubkey,
    pub period: i64,
    pub weekly: u64,
    pub growth: u64,
    pub minted: u64,
}
