//! # NOVA ve-Emission Program
//!
//! Vote-escrow emission engine for the NOVA token. Tokens are locked into
//! positions whose voting power decays linearly to zero at unlock; every week
//! the minter emits new tokens, splitting them between liquidity gauges (by
//! vote) and a pro-rata rebase to lockers.
//!
//! ## Components
//! - **Escrow**: positions and the global voting-power checkpoint
//! - **Gauge**: per-pool staking with up to four reward streams
//! - **Voter**: per-epoch vote weights and emission routing to gauges
//! - **Rebase distributor**: per-epoch rebase records claimable by position
//! - **Minter**: epoch clock and the decaying emission schedule
//!
//! ## Epochs
//! All components share one clock: an epoch starts at
//! `floor(timestamp / WEEK) * WEEK`. `update_period` is permissionless and
//! does nothing until a new epoch has started.

use anchor_lang::prelude::*;

declare_id!("CJYLmKBnJPUz99rcgB9jER3ZL1eUNsrixWNsMTSF4nh6");

pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod state;
pub mod utils;

use instructions::*;
use state::EmissionParams;

#[program]
pub mod nova_ve {
    use super::*;

    // ========== Setup ==========

    /// Creates the escrow for `base_mint` together with its minter.
    ///
    /// # Errors
    /// Returns `InvalidEmissionParams` if any basis-point parameter exceeds 100%.
    pub fn create_escrow(ctx: Context<CreateEscrow>, params: EmissionParams) -> Result<()> {
        instructions::setup::create_escrow_handler(ctx, params)
    }

    /// Creates the voter and the rebase distributor and links them to the minter.
    pub fn create_voter(ctx: Context<CreateVoter>) -> Result<()> {
        instructions::setup::create_voter_handler(ctx)
    }

    // ========== Escrow ==========

    /// Locks `amount` tokens for `duration` seconds (rounded down to the epoch
    /// boundary) into a new position owned by the signer.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The escrow is paused
    /// - Amount is zero
    /// - The duration is not positive, exceeds MAXLOCK, or rounds to the past
    /// - The token transfer fails
    pub fn create_lock(ctx: Context<CreateLock>, amount: u64, duration: i64) -> Result<u64> {
        instructions::create_lock::handler(ctx, amount, duration)
    }

    /// Adds `amount` to a live lock. Permissionless.
    pub fn deposit_for(ctx: Context<DepositFor>, amount: u64) -> Result<()> {
        instructions::deposit_for::handler(ctx, amount)
    }

    /// Extends a live lock. Owner or delegate only.
    ///
    /// # Errors
    /// Returns `InvalidDuration` if the new unlock does not extend the lock or
    /// passes `lock_start + MAXLOCK`, and `LockExpired` if the lock has ended.
    pub fn increase_unlock_time(
        ctx: Context<IncreaseUnlockTime>,
        new_unlock_time: i64,
    ) -> Result<()> {
        instructions::increase_unlock_time::handler(ctx, new_unlock_time)
    }

    /// Releases an expired lock to its owner and burns the position.
    pub fn withdraw(ctx: Context<WithdrawLock>) -> Result<()> {
        instructions::withdraw::handler(ctx)
    }

    /// Sets (or clears, with the default key) the position's delegate.
    pub fn approve(ctx: Context<PositionOwner>, delegate: Pubkey) -> Result<()> {
        instructions::ownership::approve_handler(ctx, delegate)
    }

    /// Transfers the position to `new_owner`.
    pub fn transfer_position(ctx: Context<PositionOwner>, new_owner: Pubkey) -> Result<()> {
        instructions::ownership::transfer_position_handler(ctx, new_owner)
    }

    /// Voting power of a position at `timestamp`.
    pub fn balance_of(ctx: Context<PositionQuery>, timestamp: i64) -> Result<u64> {
        instructions::escrow_queries::balance_of_handler(ctx, timestamp)
    }

    /// Total voting power at `timestamp`.
    pub fn total_supply(ctx: Context<EscrowQuery>, timestamp: i64) -> Result<u64> {
        instructions::escrow_queries::total_supply_handler(ctx, timestamp)
    }

    /// Owner of position `id`, or the default key if none.
    pub fn owner_of(ctx: Context<OwnerQuery>, id: u64) -> Result<Pubkey> {
        instructions::escrow_queries::owner_of_handler(ctx, id)
    }

    // ========== Voter ==========

    /// Registers a gauge for `pool` and derives its bribe address.
    ///
    /// # Errors
    /// Returns `GaugeExists` if the pool already has a gauge.
    pub fn create_gauge(ctx: Context<CreateGauge>) -> Result<()> {
        instructions::create_gauge::create_gauge_handler(ctx)
    }

    /// Adds a reward stream to a gauge. Voter authority only.
    pub fn add_reward_token(ctx: Context<AddRewardToken>) -> Result<()> {
        instructions::create_gauge::add_reward_token_handler(ctx)
    }

    /// Allocates the position's current voting power across `pools` in
    /// proportion to `weights`, replacing its earlier vote this epoch.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The signer is neither owner nor delegate
    /// - The position has no voting power (`ZeroVotingPower`)
    /// - `pools` and `weights` differ in length, or exceed the pool limit
    /// - A gauge is dead or listed twice
    pub fn vote<'info>(
        ctx: Context<'_, '_, 'info, 'info, CastVote<'info>>,
        epoch: i64,
        pools: Vec<Pubkey>,
        weights: Vec<u64>,
    ) -> Result<()> {
        instructions::vote::vote_handler(ctx, epoch, pools, weights)
    }

    /// Removes the position's vote for the current epoch.
    pub fn reset<'info>(
        ctx: Context<'_, '_, 'info, 'info, CastVote<'info>>,
        epoch: i64,
    ) -> Result<()> {
        instructions::vote::reset_handler(ctx, epoch)
    }

    /// Pays a gauge its share of `epoch`'s emission. Permissionless.
    ///
    /// # Errors
    /// Returns `EpochNotClosed` for the running epoch, `EmissionNotRecorded`
    /// before the epoch's emission exists and `AlreadyDistributed` on a
    /// repeat payout.
    pub fn distribute_to_gauge(ctx: Context<DistributeToGauge>, epoch: i64) -> Result<u64> {
        instructions::distribute::handler(ctx, epoch)
    }

    // ========== Gauge ==========

    /// Stakes LP tokens into a gauge.
    pub fn gauge_deposit(ctx: Context<GaugeDeposit>, amount: u64) -> Result<()> {
        instructions::gauge_deposit::handler(ctx, amount)
    }

    /// Unstakes LP tokens from a gauge.
    ///
    /// # Errors
    /// Returns `InsufficientBalance` if `amount` exceeds the staked balance.
    pub fn gauge_withdraw(ctx: Context<GaugeWithdraw>, amount: u64) -> Result<()> {
        instructions::gauge_withdraw::handler(ctx, amount)
    }

    /// Pays out accrued rewards for the listed stream indices.
    pub fn get_reward<'info>(
        ctx: Context<'_, '_, 'info, 'info, GetReward<'info>>,
        streams: Vec<u8>,
    ) -> Result<()> {
        instructions::get_reward::handler(ctx, streams)
    }

    /// Funds a non-emission reward stream for a new period.
    pub fn notify_reward_amount(ctx: Context<NotifyReward>, amount: u64) -> Result<()> {
        instructions::notify_reward::notify_reward_amount_handler(ctx, amount)
    }

    /// Rewards a depositor could collect now from `stream`.
    pub fn earned(ctx: Context<EarnedQuery>, stream: u8) -> Result<u64> {
        instructions::notify_reward::earned_handler(ctx, stream)
    }

    // ========== Rebase ==========

    /// Claims a position's rebase over the records in `remaining_accounts`.
    pub fn claim<'info>(ctx: Context<'_, '_, 'info, 'info, ClaimRebaseSingle<'info>>) -> Result<u64> {
        instructions::claim_rebase::claim_handler(ctx)
    }

    /// Claims for several positions; failing ids are skipped.
    pub fn claim_many<'info>(
        ctx: Context<'_, '_, 'info, 'info, ClaimRebase<'info>>,
        ids: Vec<u64>,
    ) -> Result<u64> {
        instructions::claim_rebase::claim_many_handler(ctx, ids)
    }

    /// Rebase a position could claim from the records in `remaining_accounts`.
    pub fn claimable<'info>(
        ctx: Context<'_, '_, 'info, 'info, ClaimableQuery<'info>>,
    ) -> Result<u64> {
        instructions::claim_rebase::claimable_handler(ctx)
    }

    // ========== Minter ==========

    /// One-time activation: mints `initial_supply` and locks `amounts` for
    /// `recipients` for the maximum duration.
    ///
    /// # Errors
    /// Returns `AlreadyInitialized` on a second call and `Unauthorized` for
    /// anyone but the minter authority.
    pub fn initialize<'info>(
        ctx: Context<'_, '_, 'info, 'info, Initialize<'info>>,
        recipients: Vec<Pubkey>,
        amounts: Vec<u64>,
        initial_supply: u64,
    ) -> Result<()> {
        instructions::initialize::handler(ctx, recipients, amounts, initial_supply)
    }

    /// Weekly tick. Returns the weekly emission in effect.
    pub fn update_period(ctx: Context<UpdatePeriod>) -> Result<u64> {
        instructions::update_period::handler(ctx)
    }

    // ========== Admin ==========

    /// Pauses or resumes new locks.
    pub fn set_paused(ctx: Context<EscrowAdmin>, paused: bool) -> Result<()> {
        instructions::admin::set_paused_handler(ctx, paused)
    }

    /// Hands escrow, minter and voter authority to `new_authority`.
    pub fn transfer_authority(
        ctx: Context<TransferAuthority>,
        new_authority: Pubkey,
    ) -> Result<()> {
        instructions::admin::transfer_authority_handler(ctx, new_authority)
    }

    /// Replaces the emission parameters from the next period on.
    pub fn set_emission_params(ctx: Context<MinterAdmin>, params: EmissionParams) -> Result<()> {
        instructions::admin::set_emission_params_handler(ctx, params)
    }

    /// Stops a gauge from receiving votes and emission.
    pub fn kill_gauge(ctx: Context<GaugeAdmin>) -> Result<()> {
        instructions::admin::kill_gauge_handler(ctx)
    }
}
