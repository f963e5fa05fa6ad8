use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VeError;

/// One reward token streamed by a gauge.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RewardStream {
    pub mint: Pubkey,
    pub vault: Pubkey,
    /// Tokens per second, scaled by `PRECISION`
    pub rate: u128,
    pub period_finish: i64,
    pub last_update: i64,
    /// Accumulated reward per staked unit, scaled by `PRECISION`
    pub reward_per_token_stored: u128,
    pub total_notified: u64,
}

impl RewardStream {
    pub const LEN: usize = 32 + 32 + 16 + 8 + 8 + 16 + 8;

    fn last_time_applicable(&self, now: i64) -> i64 {
        now.min(self.period_finish)
    }

    pub fn reward_per_token(&self, total_staked: u64, now: i64) -> Result<u128> {
        if total_staked == 0 {
            return Ok(self.reward_per_token_stored);
        }
        let elapsed = self
            .last_time_applicable(now)
            .saturating_sub(self.last_update)
            .max(0) as u128;
        let accrued = elapsed
            .checked_mul(self.rate)
            .ok_or(VeError::MathOverflow)?
            / total_staked as u128;
        self.reward_per_token_stored
            .checked_add(accrued)
            .ok_or_else(|| error!(VeError::MathOverflow))
    }

    fn update(&mut self, total_staked: u64, now: i64) -> Result<()> {
        self.reward_per_token_stored = self.reward_per_token(total_staked, now)?;
        self.last_update = self.last_update.max(self.last_time_applicable(now));
        Ok(())
    }

    /// Starts a fresh `REWARD_DURATION` period carrying `amount` plus whatever
    /// the running period had not yet streamed.
    fn notify(&mut self, amount: u64, vault_balance: u64, now: i64) -> Result<()> {
        let mut pending = (amount as u128)
            .checked_mul(PRECISION)
            .ok_or(VeError::MathOverflow)?;
        if now < self.period_finish {
            let leftover = ((self.period_finish - now) as u128)
                .checked_mul(self.rate)
                .ok_or(VeError::MathOverflow)?;
            pending = pending.checked_add(leftover).ok_or(VeError::MathOverflow)?;
        }
        let rate = pending / REWARD_DURATION as u128;

        let ceiling = (vault_balance as u128)
            .checked_mul(PRECISION)
            .ok_or(VeError::MathOverflow)?
            / REWARD_DURATION as u128;
        require!(rate <= ceiling, VeError::InsufficientBalance);

        self.rate = rate;
        self.last_update = now;
        self.period_finish = now
            .checked_add(REWARD_DURATION)
            .ok_or(VeError::MathOverflow)?;
        self.total_notified = self
            .total_notified
            .checked_add(amount)
            .ok_or(VeError::MathOverflow)?;
        Ok(())
    }
}

/// Per-pool staking gauge.
///
/// Seeds: [b"gauge", voter.key(), pool.key()]
#[account]
#[derive(Default)]
pub struct Gauge {
    pub voter: Pubkey,
    /// The pool's LP mint
    pub pool: Pubkey,
    /// Address of the paired bribe account, derived and recorded only
    pub bribe: Pubkey,
    pub stake_vault: Pubkey,

    pub total_staked: u64,

    /// Reward streams, stream 0 is the emission token
    pub rewards: Vec<RewardStream>,

    pub is_alive: bool,
    pub created_at: i64,

    pub stake_vault_bump: u8,
    pub bump: u8,
}

impl Gauge {
    pub const LEN: usize = 8
        + (32 * 4)
        + 8
        + 4 + MAX_REWARD_TOKENS * RewardStream::LEN
        + 1
        + 8
        + 2;

    pub fn is_registered(&self) -> bool {
        self.voter != Pubkey::default()
    }

    pub fn stream_index(&self, mint: &Pubkey) -> Option<usize> {
        self.rewards.iter().position(|r| r.mint == *mint)
    }

    fn stream(&self, index: usize) -> Result<&RewardStream> {
        self.rewards
            .get(index)
            .ok_or_else(|| error!(VeError::UnknownRewardToken))
    }

    pub fn add_reward_token(&mut self, mint: Pubkey, vault: Pubkey, now: i64) -> Result<usize> {
        require!(self.stream_index(&mint).is_none(), VeError::RewardTokenExists);
        require!(self.rewards.len() < MAX_REWARD_TOKENS, VeError::TooManyRewardTokens);

        self.rewards.push(RewardStream {
            mint,
            vault,
            last_update: now,
            period_finish: now,
            ..Default::default()
        });
        Ok(self.rewards.len() - 1)
    }

    pub fn update_streams(&mut self, now: i64) -> Result<()> {
        let total = self.total_staked;
        for stream in self.rewards.iter_mut() {
            stream.update(total, now)?;
        }
        Ok(())
    }

    /// Brings every stream up to `now` and moves the account's pending
    /// rewards into its unclaimed buckets. Must precede any balance change.
    pub fn checkpoint_account(&mut self, stake: &mut GaugeStake, now: i64) -> Result<()> {
        self.update_streams(now)?;

        while stake.rewards.len() < self.rewards.len() {
            stake.rewards.push(RewardCheckpoint::default());
        }
        for (stream, account) in self.rewards.iter().zip(stake.rewards.iter_mut()) {
            let pending = pending_reward(
                stake.balance,
                stream.reward_per_token_stored,
                account.reward_per_token_paid,
            )?;
            account.unclaimed = account
                .unclaimed
                .checked_add(pending)
                .ok_or(VeError::MathOverflow)?;
            account.reward_per_token_paid = stream.reward_per_token_stored;
        }
        Ok(())
    }

    /// Rewards `stake` could collect from stream `index` at `now`.
    pub fn earned(&self, stake: &GaugeStake, index: usize, now: i64) -> Result<u64> {
        let stream = self.stream(index)?;
        let rpt = stream.reward_per_token(self.total_staked, now)?;
        let account = stake.rewards.get(index).copied().unwrap_or_default();
        pending_reward(stake.balance, rpt, account.reward_per_token_paid)?
            .checked_add(account.unclaimed)
            .ok_or_else(|| error!(VeError::MathOverflow))
    }

    pub fn deposit(&mut self, stake: &mut GaugeStake, amount: u64, now: i64) -> Result<()> {
        require!(amount > 0, VeError::ZeroAmount);

        self.checkpoint_account(stake, now)?;
        stake.balance = stake.balance.checked_add(amount).ok_or(VeError::MathOverflow)?;
        self.total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(VeError::MathOverflow)?;
        Ok(())
    }

    pub fn withdraw(&mut self, stake: &mut GaugeStake, amount: u64, now: i64) -> Result<()> {
        require!(amount > 0, VeError::ZeroAmount);
        require!(amount <= stake.balance, VeError::InsufficientBalance);

        self.checkpoint_account(stake, now)?;
        stake.balance -= amount;
        self.total_staked = self
            .total_staked
            .checked_sub(amount)
            .ok_or(VeError::MathOverflow)?;
        Ok(())
    }

    /// Checkpoints `stake` and empties the requested buckets, returning the
    /// amount owed per stream in request order.
    pub fn take_rewards(
        &mut self,
        stake: &mut GaugeStake,
        streams: &[u8],
        now: i64,
    ) -> Result<Vec<u64>> {
        for index in streams {
            self.stream(*index as usize)?;
        }

        self.checkpoint_account(stake, now)?;
        let mut paid = Vec::with_capacity(streams.len());
        for index in streams {
            let bucket = stake
                .rewards
                .get_mut(*index as usize)
                .ok_or(VeError::UnknownRewardToken)?;
            paid.push(std::mem::take(&mut bucket.unclaimed));
        }
        Ok(paid)
    }

    /// Starts a new reward period on stream `index`. `vault_balance` is the
    /// stream vault's balance including `amount`.
    pub fn notify_reward_amount(
        &mut self,
        index: usize,
        amount: u64,
        vault_balance: u64,
        now: i64,
    ) -> Result<()> {
        self.stream(index)?;
        self.update_streams(now)?;
        self.rewards
            .get_mut(index)
            .ok_or(VeError::UnknownRewardToken)?
            .notify(amount, vault_balance, now)
    }

    pub fn address(voter: &Pubkey, pool: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[GAUGE_SEED, voter.as_ref(), pool.as_ref()], &crate::ID)
    }

    pub fn bribe_address(gauge: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(&[BRIBE_SEED, gauge.as_ref()], &crate::ID).0
    }
}

fn pending_reward(balance: u64, rpt: u128, paid: u128) -> Result<u64> {
    let delta = rpt.checked_sub(paid).ok_or(VeError::MathOverflow)?;
    let scaled = (balance as u128)
        .checked_mul(delta)
        .ok_or(VeError::MathOverflow)?
        / PRECISION;
    u64::try_from(scaled).map_err(|_| error!(VeError::MathOverflow))
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RewardCheckpoint {
    pub reward_per_token_paid: u128,
    pub unclaimed: u64,
}

impl RewardCheckpoint {
    pub const LEN: usize = 16 + 8;
}

/// A depositor's stake in one gauge.
///
/// Seeds: [b"gauge_stake", gauge.key(), owner.key()]
#[account]
#[derive(Default)]
pub struct GaugeStake {
    pub gauge: Pubkey,
    pub owner: Pubkey,
    pub balance: u64,
    pub rewards: Vec<RewardCheckpoint>,
    pub bump: u8,
}

impl GaugeStake {
    pub const LEN: usize = 8 + 32 + 32 + 8 + 4 + MAX_REWARD_TOKENS * RewardCheckpoint::LEN + 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;
    use proptest::prelude::*;

    const T0: i64 = 3_000 * WEEK;

    fn gauge_with_emission() -> Gauge {
        let mut gauge = Gauge {
            voter: Pubkey::new_unique(),
            pool: Pubkey::new_unique(),
            is_alive: true,
            ..Default::default()
        };
        gauge
            .add_reward_token(Pubkey::new_unique(), Pubkey::new_unique(), T0)
            .unwrap();
        gauge
    }

    #[test]
    fn single_staker_earns_whole_period() {
        let mut gauge = gauge_with_emission();
        let mut alice = GaugeStake::default();
        gauge.deposit(&mut alice, 1_000, T0).unwrap();
        gauge.notify_reward_amount(0, 604_800, 604_800, T0).unwrap();

        assert_eq!(gauge.earned(&alice, 0, T0 + WEEK / 2).unwrap(), 302_400);
        assert_eq!(gauge.earned(&alice, 0, T0 + 2 * WEEK).unwrap(), 604_800);
    }

    #[test]
    fn notify_rejects_underfunded_vault() {
        let mut gauge = gauge_with_emission();
        assert_eq!(
            gauge.notify_reward_amount(0, 1_000_000, 999_999, T0).unwrap_err(),
            Error::from(VeError::InsufficientBalance)
        );
        assert_eq!(
            gauge.notify_reward_amount(3, 1, 1, T0).unwrap_err(),
            Error::from(VeError::UnknownRewardToken)
        );
    }

    #[test]
    fn mid_period_notify_blends_leftover() {
        let mut gauge = gauge_with_emission();
        let mut alice = GaugeStake::default();
        gauge.deposit(&mut alice, 10, T0).unwrap();
        gauge.notify_reward_amount(0, 604_800, 604_800, T0).unwrap();
        gauge
            .notify_reward_amount(0, 604_800, 604_800 + 302_400, T0 + WEEK / 2)
            .unwrap();

        assert_eq!(gauge.rewards[0].period_finish, T0 + WEEK / 2 + WEEK);
        let total = gauge.earned(&alice, 0, T0 + 3 * WEEK).unwrap();
        assert!(total <= 2 * 604_800 && total >= 2 * 604_800 - 2);
    }

    #[test]
    fn withdraw_beyond_balance_leaves_state_untouched() {
        let mut gauge = gauge_with_emission();
        let mut alice = GaugeStake::default();
        gauge.deposit(&mut alice, 50, T0).unwrap();
        let before = (gauge.total_staked, alice.rewards.clone());

        assert_eq!(
            gauge.withdraw(&mut alice, 51, T0 + 10).unwrap_err(),
            Error::from(VeError::InsufficientBalance)
        );
        assert_eq!((gauge.total_staked, alice.rewards.clone()), before);

        gauge.withdraw(&mut alice, 50, T0 + 10).unwrap();
        assert_eq!(gauge.total_staked, 0);
    }

    #[test]
    fn take_rewards_pays_and_zeroes() {
        let mut gauge = gauge_with_emission();
        let mut alice = GaugeStake::default();
        gauge.deposit(&mut alice, 7, T0).unwrap();
        gauge.notify_reward_amount(0, 604_800, 604_800, T0).unwrap();

        let paid = gauge.take_rewards(&mut alice, &[0], T0 + WEEK).unwrap();
        assert_eq!(paid, vec![604_800]);
        assert_eq!(gauge.earned(&alice, 0, T0 + WEEK).unwrap(), 0);
        assert_eq!(gauge.take_rewards(&mut alice, &[0], T0 + WEEK).unwrap(), vec![0]);
        assert_eq!(
            gauge.take_rewards(&mut alice, &[1], T0 + WEEK).unwrap_err(),
            Error::from(VeError::UnknownRewardToken)
        );
    }

    #[test]
    fn reward_tokens_are_capped_and_unique() {
        let mut gauge = gauge_with_emission();
        let emission_mint = gauge.rewards[0].mint;
        assert_eq!(
            gauge
                .add_reward_token(emission_mint, Pubkey::new_unique(), T0)
                .unwrap_err(),
            Error::from(VeError::RewardTokenExists)
        );
        for _ in 1..MAX_REWARD_TOKENS {
            gauge
                .add_reward_token(Pubkey::new_unique(), Pubkey::new_unique(), T0)
                .unwrap();
        }
        assert_eq!(
            gauge
                .add_reward_token(Pubkey::new_unique(), Pubkey::new_unique(), T0)
                .unwrap_err(),
            Error::from(VeError::TooManyRewardTokens)
        );
    }

    #[test]
    fn late_stream_starts_from_zero_for_existing_stakers() {
        let mut gauge = gauge_with_emission();
        let mut alice = GaugeStake::default();
        gauge.deposit(&mut alice, 100, T0).unwrap();

        let index = gauge
            .add_reward_token(Pubkey::new_unique(), Pubkey::new_unique(), T0 + WEEK)
            .unwrap();
        gauge
            .notify_reward_amount(index, 604_800, 604_800, T0 + WEEK)
            .unwrap();
        assert_eq!(gauge.earned(&alice, index, T0 + 2 * WEEK).unwrap(), 604_800);
    }

    proptest! {
        #[test]
        fn later_deposit_does_not_dilute_accrued_rewards(
            a in 1u64..1_000_000_000_000,
            b in 1u64..1_000_000_000_000,
            reward in 1u64..10_000_000_000_000,
            t1 in 1i64..WEEK,
            dt in 1i64..WEEK,
        ) {
            let mut gauge = gauge_with_emission();
            let mut alice = GaugeStake::default();
            let mut bob = GaugeStake::default();
            gauge.deposit(&mut alice, a, T0).unwrap();
            gauge.notify_reward_amount(0, reward, reward, T0).unwrap();

            let before = gauge.earned(&alice, 0, T0 + t1).unwrap();
            gauge.deposit(&mut bob, b, T0 + t1).unwrap();
            prop_assert_eq!(gauge.earned(&alice, 0, T0 + t1).unwrap(), before);
            prop_assert!(gauge.earned(&alice, 0, T0 + t1 + dt).unwrap() >= before);
        }

        #[test]
        fn payouts_never_exceed_notified(
            stakes in proptest::collection::vec(1u64..1_000_000_000, 1..5),
            reward in 1u64..1_000_000_000_000,
        ) {
            let mut gauge = gauge_with_emission();
            let mut accounts: Vec<GaugeStake> = stakes.iter().map(|_| GaugeStake::default()).collect();
            for (i, (account, amount)) in accounts.iter_mut().zip(stakes.iter()).enumerate() {
                gauge.deposit(account, *amount, T0 + i as i64).unwrap();
            }
            gauge.notify_reward_amount(0, reward, reward, T0 + 10).unwrap();
            let total: u64 = accounts
                .iter()
                .map(|s| gauge.earned(s, 0, T0 + 2 * WEEK).unwrap())
                .sum();
            prop_assert!(total <= reward);
        }
    }
}
