use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VeError;
use crate::state::position::{Point, Position};

/// The locked-position ledger and its global voting-power checkpoint.
///
/// Seeds: [b"escrow", base_mint.key()]
#[account]
#[derive(Default)]
pub struct Escrow {
    pub authority: Pubkey,
    pub base_mint: Pubkey,
    pub vault: Pubkey,

    /// Identifier assigned to the next position
    pub next_position_id: u64,
    /// Sum of all locked amounts (live and expired but not withdrawn)
    pub total_locked: u64,

    pub paused: bool,

    /// Aggregate of every position's point as of `global.ts`
    pub global: Point,
    /// Scheduled slope decreases keyed by week, `SLOPE_CHANGE_SLOTS` long
    pub slope_changes: Vec<i128>,
    /// Most recent week-boundary points, oldest first
    pub boundaries: Vec<Point>,
    /// Global point after each of the most recent lock changes, oldest first
    pub history: Vec<Point>,

    pub created_at: i64,
    pub last_updated: i64,

    pub vault_bump: u8,
    pub bump: u8,
}

impl Escrow {
    pub const LEN: usize = 8
        + (32 * 3)
        + (8 * 2)
        + 1
        + Point::LEN
        + 4 + SLOPE_CHANGE_SLOTS * 16
        + 4 + BOUNDARY_HISTORY * Point::LEN
        + 4 + GLOBAL_HISTORY * Point::LEN
        + (8 * 2)
        + 2;

    pub fn init(
        &mut self,
        authority: Pubkey,
        base_mint: Pubkey,
        vault: Pubkey,
        now: i64,
        bump: u8,
        vault_bump: u8,
    ) {
        self.authority = authority;
        self.base_mint = base_mint;
        self.vault = vault;
        self.next_position_id = 1;
        self.total_locked = 0;
        self.paused = false;
        self.global = Point {
            bias: 0,
            slope: 0,
            ts: now,
        };
        self.slope_changes = vec![0; SLOPE_CHANGE_SLOTS];
        self.boundaries = Vec::with_capacity(BOUNDARY_HISTORY);
        self.history = Vec::with_capacity(GLOBAL_HISTORY);
        self.history.push(self.global);
        self.created_at = now;
        self.last_updated = now;
        self.bump = bump;
        self.vault_bump = vault_bump;
    }

    fn slot(week: i64) -> usize {
        (week / WEEK).rem_euclid(SLOPE_CHANGE_SLOTS as i64) as usize
    }

    fn slope_change(&self, week: i64) -> i128 {
        self.slope_changes.get(Self::slot(week)).copied().unwrap_or(0)
    }

    fn add_slope_change(&mut self, week: i64, delta: i128) -> Result<()> {
        let slot = Self::slot(week);
        let entry = self
            .slope_changes
            .get_mut(slot)
            .ok_or(VeError::MathOverflow)?;
        *entry = entry.checked_add(delta).ok_or(VeError::MathOverflow)?;
        Ok(())
    }

    /// Projects `from` forward to `to`, applying scheduled slope changes at each
    /// week boundary crossed. `on_boundary` sees the point at every boundary.
    fn project(&self, from: Point, to: i64, mut on_boundary: impl FnMut(Point)) -> Point {
        let mut point = from;
        if to <= point.ts {
            return point;
        }

        let mut t_i = epoch_start(point.ts);
        loop {
            if point.slope == 0 {
                // Nothing live means nothing scheduled either.
                point.bias = 0;
                let last_boundary = epoch_start(to);
                if last_boundary > point.ts {
                    on_boundary(Point {
                        bias: 0,
                        slope: 0,
                        ts: last_boundary,
                    });
                }
                point.ts = to;
                return point;
            }

            t_i += WEEK;
            let at_boundary = t_i <= to;
            let d_slope = if at_boundary {
                self.slope_change(t_i)
            } else {
                t_i = to;
                0
            };

            let elapsed = (t_i - point.ts) as i128;
            point.bias = point
                .bias
                .saturating_sub(point.slope.saturating_mul(elapsed))
                .max(0);
            point.slope = point.slope.saturating_add(d_slope).max(0);
            point.ts = t_i;

            if at_boundary {
                on_boundary(point);
            }
            if t_i == to {
                return point;
            }
        }
    }

    fn record_boundary(&mut self, point: Point) {
        if let Some(last) = self.boundaries.last_mut() {
            if last.ts == point.ts {
                *last = point;
                return;
            }
        }
        if self.boundaries.len() >= BOUNDARY_HISTORY {
            self.boundaries.remove(0);
        }
        self.boundaries.push(point);
    }

    fn record_history(&mut self) {
        let point = self.global;
        if let Some(last) = self.history.last_mut() {
            if last.ts == point.ts {
                *last = point;
                return;
            }
        }
        if self.history.len() >= GLOBAL_HISTORY {
            self.history.remove(0);
        }
        self.history.push(point);
    }

    /// Brings the global point forward to `now`, consuming scheduled slope
    /// changes and recording every week boundary crossed.
    pub fn checkpoint(&mut self, now: i64) -> Result<()> {
        if now <= self.global.ts {
            return Ok(());
        }

        let mut crossed = Vec::new();
        let point = self.project(self.global, now, |p| crossed.push(p));
        for boundary in crossed {
            let slot = Self::slot(boundary.ts);
            if let Some(entry) = self.slope_changes.get_mut(slot) {
                *entry = 0;
            }
            self.record_boundary(boundary);
        }
        self.global = point;
        self.last_updated = now;
        Ok(())
    }

    /// Total voting power at `t`.
    ///
    /// Times at or after the last global checkpoint are projected forward.
    /// Earlier times start from the latest retained point at or before `t`
    /// (a post-change point or a week boundary) and are answered only when no
    /// week boundary lies between that point and `t`, since consumed slope
    /// changes are no longer scheduled.
    pub fn total_supply_at(&self, t: i64) -> Result<u64> {
        if t >= self.global.ts {
            return Ok(self.project(self.global, t, |_| {}).power_at(t));
        }
        if t < self.created_at {
            return Ok(0);
        }
        let pruned = self.history.len() >= GLOBAL_HISTORY
            && self.history.first().map_or(true, |p| t < p.ts);
        require!(!pruned, VeError::CheckpointHistoryPruned);

        let changed = self.history.iter().rev().find(|p| p.ts <= t);
        let boundary = self.boundaries.iter().rev().find(|p| p.ts <= t);
        let start = match (changed, boundary) {
            (Some(c), Some(b)) if b.ts > c.ts => *b,
            (Some(c), _) => *c,
            (None, Some(b)) => *b,
            (None, None) => return err!(VeError::CheckpointHistoryPruned),
        };

        require!(
            start.slope == 0 || epoch_start(t) <= start.ts,
            VeError::CheckpointHistoryPruned
        );
        Ok(self.project(start, t, |_| {}).power_at(t))
    }

    /// Total voting power going into the epoch starting at `epoch`.
    ///
    /// A recorded boundary wins over the live point, since the boundary was
    /// captured before any lock change made at that same instant.
    pub fn supply_at_epoch(&self, epoch: i64) -> Result<u64> {
        match self.boundaries.iter().find(|p| p.ts == epoch) {
            Some(p) => Ok(p.power_at(epoch)),
            None => self.total_supply_at(epoch),
        }
    }

    /// Moves `position` to `(new_locked, new_unlock)` at `now`, keeping the
    /// global aggregate and the slope schedule in step with the position.
    fn apply_lock_change(
        &mut self,
        position: &mut Position,
        new_locked: u64,
        new_unlock: i64,
        now: i64,
    ) -> Result<()> {
        // A withdrawal burns the position, so its history no longer matters.
        if new_locked > 0 {
            position.require_checkpoint_room(now)?;
        }
        self.checkpoint(now)?;

        let old_unlock = position.unlock_time;
        let old_live = old_unlock > now && position.locked > 0;
        let old_slope = if old_live { position.last_point().slope } else { 0 };
        let old_bias = if old_live {
            position.last_point().scaled_power_at(now)
        } else {
            0
        };

        let new_point = Point::for_lock(new_locked, new_unlock, now)?;

        self.global.bias = self
            .global
            .bias
            .checked_add(new_point.bias)
            .and_then(|b| b.checked_sub(old_bias))
            .ok_or(VeError::MathOverflow)?
            .max(0);
        self.global.slope = self
            .global
            .slope
            .checked_add(new_point.slope)
            .and_then(|s| s.checked_sub(old_slope))
            .ok_or(VeError::MathOverflow)?
            .max(0);

        if old_live {
            self.add_slope_change(old_unlock, old_slope)?;
        }
        if new_point.slope > 0 {
            self.add_slope_change(new_unlock, -new_point.slope)?;
        }

        if new_locked >= position.locked {
            self.total_locked = self
                .total_locked
                .checked_add(new_locked - position.locked)
                .ok_or(VeError::MathOverflow)?;
        } else {
            self.total_locked = self
                .total_locked
                .checked_sub(position.locked - new_locked)
                .ok_or(VeError::MathOverflow)?;
        }

        position.locked = new_locked;
        position.unlock_time = new_unlock;
        position.push_checkpoint(new_point);
        self.record_history();
        self.last_updated = now;
        Ok(())
    }

    /// Opens a new position for `owner` and returns its id.
    ///
    /// The unlock time is rounded down to the epoch boundary.
    pub fn create_lock(
        &mut self,
        position: &mut Position,
        escrow_key: Pubkey,
        owner: Pubkey,
        amount: u64,
        duration: i64,
        now: i64,
        bump: u8,
    ) -> Result<u64> {
        require!(!self.paused, VeError::EscrowPaused);
        require!(amount > 0, VeError::ZeroAmount);
        require!(duration > 0 && duration <= MAXLOCK, VeError::InvalidDuration);

        let unlock_time = epoch_start(now.checked_add(duration).ok_or(VeError::MathOverflow)?);
        require!(unlock_time > now, VeError::InvalidDuration);

        let id = self.next_position_id;
        self.next_position_id = id.checked_add(1).ok_or(VeError::MathOverflow)?;

        *position = Position {
            escrow: escrow_key,
            id,
            owner,
            delegate: Pubkey::default(),
            locked: 0,
            lock_start: now,
            unlock_time: 0,
            checkpoint_count: 0,
            checkpoints: Vec::with_capacity(MAX_POSITION_CHECKPOINTS),
            rebase_claimed_epoch: epoch_start(now),
            bump,
        };

        self.apply_lock_change(position, amount, unlock_time, now)?;
        Ok(id)
    }

    /// Adds `amount` to a live lock without moving its unlock time.
    pub fn deposit_for(&mut self, position: &mut Position, amount: u64, now: i64) -> Result<()> {
        require!(amount > 0, VeError::ZeroAmount);
        require!(!position.is_burned(), VeError::PositionBurned);
        require!(!position.is_expired(now), VeError::LockExpired);

        let new_locked = position
            .locked
            .checked_add(amount)
            .ok_or(VeError::MathOverflow)?;
        let unlock_time = position.unlock_time;
        self.apply_lock_change(position, new_locked, unlock_time, now)
    }

    /// Extends a live lock to `new_unlock` (rounded down to the epoch boundary).
    pub fn increase_unlock_time(
        &mut self,
        position: &mut Position,
        caller: &Pubkey,
        new_unlock: i64,
        now: i64,
    ) -> Result<()> {
        position.require_authorized(caller)?;
        require!(!position.is_expired(now), VeError::LockExpired);

        let unlock_time = epoch_start(new_unlock);
        require!(unlock_time > position.unlock_time, VeError::InvalidDuration);
        let ceiling = position
            .lock_start
            .checked_add(MAXLOCK)
            .ok_or(VeError::MathOverflow)?;
        require!(unlock_time <= ceiling, VeError::InvalidDuration);

        let locked = position.locked;
        self.apply_lock_change(position, locked, unlock_time, now)
    }

    /// Releases an expired lock and burns the position. Returns the amount released.
    pub fn withdraw(&mut self, position: &mut Position, caller: &Pubkey, now: i64) -> Result<u64> {
        position.require_authorized(caller)?;
        require!(position.is_expired(now), VeError::LockNotExpired);

        let amount = position.locked;
        let unlock_time = position.unlock_time;
        self.apply_lock_change(position, 0, unlock_time, now)?;

        position.owner = Pubkey::default();
        position.delegate = Pubkey::default();
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;
    use proptest::prelude::*;

    const T0: i64 = 2_800 * WEEK;

    fn escrow_at(now: i64) -> Escrow {
        let mut escrow = Escrow::default();
        escrow.init(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            now,
            255,
            254,
        );
        escrow
    }

    fn lock(escrow: &mut Escrow, owner: Pubkey, amount: u64, duration: i64, now: i64) -> Position {
        let mut position = Position::default();
        escrow
            .create_lock(&mut position, Pubkey::new_unique(), owner, amount, duration, now, 1)
            .unwrap();
        position
    }

    #[test]
    fn create_lock_assigns_sequential_ids_and_rounds_unlock() {
        let mut escrow = escrow_at(T0);
        let owner = Pubkey::new_unique();
        let a = lock(&mut escrow, owner, 1_000, WEEK + 100, T0 + 10);
        let b = lock(&mut escrow, owner, 2_000, 2 * WEEK, T0 + 10);

        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(a.unlock_time, T0 + WEEK);
        assert_eq!(b.unlock_time, T0 + 2 * WEEK);
        assert_eq!(escrow.total_locked, 3_000);
        assert_eq!(escrow.next_position_id, 3);
    }

    #[test]
    fn create_lock_rejects_bad_input() {
        let mut escrow = escrow_at(T0);
        let owner = Pubkey::new_unique();
        let mut position = Position::default();
        let key = Pubkey::new_unique();

        assert_eq!(
            escrow
                .create_lock(&mut position, key, owner, 0, WEEK, T0, 1)
                .unwrap_err(),
            Error::from(VeError::ZeroAmount)
        );
        assert_eq!(
            escrow
                .create_lock(&mut position, key, owner, 10, MAXLOCK + 1, T0, 1)
                .unwrap_err(),
            Error::from(VeError::InvalidDuration)
        );
        // Rounds down to the current epoch start.
        assert_eq!(
            escrow
                .create_lock(&mut position, key, owner, 10, WEEK / 2, T0 + 1, 1)
                .unwrap_err(),
            Error::from(VeError::InvalidDuration)
        );

        escrow.paused = true;
        assert_eq!(
            escrow
                .create_lock(&mut position, key, owner, 10, WEEK, T0, 1)
                .unwrap_err(),
            Error::from(VeError::EscrowPaused)
        );
    }

    #[test]
    fn total_supply_matches_sum_of_balances() {
        let mut escrow = escrow_at(T0);
        let owner = Pubkey::new_unique();
        let a = lock(&mut escrow, owner, 1_000_000_000, 10 * WEEK, T0 + 5);
        let b = lock(&mut escrow, owner, 3_000_000_000, 30 * WEEK, T0 + 900);

        for t in [T0 + 900, T0 + 3 * WEEK, T0 + 10 * WEEK, T0 + 20 * WEEK + 7] {
            let sum = a.balance_at(t).unwrap() + b.balance_at(t).unwrap();
            let total = escrow.total_supply_at(t).unwrap();
            assert!(total.abs_diff(sum) <= 1, "t={t} total={total} sum={sum}");
        }
        assert_eq!(escrow.total_supply_at(T0 + 31 * WEEK).unwrap(), 0);
    }

    #[test]
    fn supply_reaches_zero_once_every_lock_expires() {
        let mut escrow = escrow_at(T0);
        let owner = Pubkey::new_unique();
        lock(&mut escrow, owner, 7_777, 3 * WEEK, T0 + 11);
        lock(&mut escrow, owner, 1_234_567, 5 * WEEK, T0 + 13);

        escrow.checkpoint(T0 + 6 * WEEK + 1).unwrap();
        assert_eq!(escrow.global.bias, 0);
        assert_eq!(escrow.global.slope, 0);
        assert!(escrow.slope_changes.iter().all(|s| *s == 0));
    }

    #[test]
    fn deposit_for_adds_without_moving_unlock() {
        let mut escrow = escrow_at(T0);
        let owner = Pubkey::new_unique();
        let mut position = lock(&mut escrow, owner, 1_000_000_000, 8 * WEEK, T0);
        let unlock = position.unlock_time;
        let before = position.balance_at(T0 + WEEK).unwrap();

        escrow.deposit_for(&mut position, 1_000_000_000, T0 + WEEK).unwrap();
        assert_eq!(position.unlock_time, unlock);
        assert_eq!(position.locked, 2_000_000_000);
        assert!(position.balance_at(T0 + WEEK).unwrap() > before);
        assert_eq!(escrow.total_locked, 2_000_000_000);

        assert_eq!(
            escrow
                .deposit_for(&mut position, 1, unlock)
                .unwrap_err(),
            Error::from(VeError::LockExpired)
        );
    }

    #[test]
    fn increase_unlock_time_reschedules_slope() {
        let mut escrow = escrow_at(T0);
        let owner = Pubkey::new_unique();
        let mut position = lock(&mut escrow, owner, 1_000_000_000, 2 * WEEK, T0);

        escrow
            .increase_unlock_time(&mut position, &owner, T0 + 6 * WEEK, T0 + WEEK)
            .unwrap();
        assert_eq!(position.unlock_time, T0 + 6 * WEEK);
        assert!(escrow.total_supply_at(T0 + 3 * WEEK).unwrap() > 0);
        assert_eq!(escrow.total_supply_at(T0 + 6 * WEEK).unwrap(), 0);

        assert_eq!(
            escrow
                .increase_unlock_time(&mut position, &owner, T0 + 5 * WEEK, T0 + WEEK)
                .unwrap_err(),
            Error::from(VeError::InvalidDuration)
        );
        assert_eq!(
            escrow
                .increase_unlock_time(&mut position, &Pubkey::new_unique(), T0 + 7 * WEEK, T0 + WEEK)
                .unwrap_err(),
            Error::from(VeError::Unauthorized)
        );
        assert_eq!(
            escrow
                .increase_unlock_time(&mut position, &owner, T0 + MAXLOCK + WEEK, T0 + WEEK)
                .unwrap_err(),
            Error::from(VeError::InvalidDuration)
        );
    }

    #[test]
    fn withdraw_requires_expiry_and_burns() {
        let mut escrow = escrow_at(T0);
        let owner = Pubkey::new_unique();
        let mut position = lock(&mut escrow, owner, 5_000, 2 * WEEK, T0);

        assert_eq!(
            escrow.withdraw(&mut position, &owner, T0 + WEEK).unwrap_err(),
            Error::from(VeError::LockNotExpired)
        );

        let released = escrow.withdraw(&mut position, &owner, T0 + 2 * WEEK).unwrap();
        assert_eq!(released, 5_000);
        assert_eq!(escrow.total_locked, 0);
        assert!(position.is_burned());
        assert_eq!(position.locked, 0);
        assert_eq!(
            escrow.withdraw(&mut position, &owner, T0 + 3 * WEEK).unwrap_err(),
            Error::from(VeError::PositionBurned)
        );
    }

    #[test]
    fn boundary_snapshot_precedes_changes_at_the_boundary() {
        let mut escrow = escrow_at(T0);
        let owner = Pubkey::new_unique();
        lock(&mut escrow, owner, 1_000_000_000, 10 * WEEK, T0 + 1);
        let before = escrow.total_supply_at(T0 + WEEK).unwrap();

        lock(&mut escrow, owner, 9_000_000_000, 10 * WEEK, T0 + WEEK);
        assert_eq!(escrow.supply_at_epoch(T0 + WEEK).unwrap(), before);
        assert!(escrow.total_supply_at(T0 + WEEK).unwrap() > before);
    }

    #[test]
    fn old_boundaries_are_pruned() {
        let mut escrow = escrow_at(T0);
        lock(&mut escrow, Pubkey::new_unique(), 1_000_000_000, 100 * WEEK, T0);
        for week in 1..=(BOUNDARY_HISTORY as i64 + 4) {
            escrow.checkpoint(T0 + week * WEEK).unwrap();
        }
        assert_eq!(escrow.boundaries.len(), BOUNDARY_HISTORY);
        assert_eq!(
            escrow.total_supply_at(T0 + WEEK).unwrap_err(),
            Error::from(VeError::CheckpointHistoryPruned)
        );
        assert!(escrow.supply_at_epoch(T0 + 10 * WEEK).is_ok());
    }

    #[test]
    fn past_supply_between_lock_changes() {
        let mut escrow = escrow_at(T0);
        let first = lock(&mut escrow, Pubkey::new_unique(), 1_000_000_000, 10 * WEEK, T0 + 100);
        let second = lock(&mut escrow, Pubkey::new_unique(), 2_000_000_000, 20 * WEEK, T0 + 200);

        assert_eq!(
            escrow.total_supply_at(T0 + 150).unwrap(),
            first.balance_at(T0 + 150).unwrap()
        );
        assert_eq!(escrow.total_supply_at(T0 + 50).unwrap(), 0);
        assert_eq!(escrow.total_supply_at(T0 - 1).unwrap(), 0);

        let both = first.balance_at(T0 + 300).unwrap() + second.balance_at(T0 + 300).unwrap();
        assert!(escrow.total_supply_at(T0 + 300).unwrap().abs_diff(both) <= 1);
    }

    #[test]
    fn past_supply_across_a_boundary_uses_the_boundary() {
        let mut escrow = escrow_at(T0);
        let a = lock(&mut escrow, Pubkey::new_unique(), 1_000_000_000, 10 * WEEK, T0 + 100);
        let b = lock(&mut escrow, Pubkey::new_unique(), 5_000_000_000, 10 * WEEK, T0 + WEEK + 500);

        // T0 + WEEK + 200 lies after the recorded boundary and before the second lock.
        let t = T0 + WEEK + 200;
        assert!(escrow.total_supply_at(t).unwrap().abs_diff(a.balance_at(t).unwrap()) <= 1);
        assert_eq!(b.balance_at(t).unwrap(), 0);

        // Crossing a boundary with no point recorded at it cannot be answered.
        let mut sparse = escrow_at(T0);
        lock(&mut sparse, Pubkey::new_unique(), 1_000_000_000, 10 * WEEK, T0 + 100);
        let mut direct = sparse.clone();
        direct.global.ts = T0 + 3 * WEEK + 1;
        direct.boundaries.clear();
        assert_eq!(
            direct.total_supply_at(T0 + 2 * WEEK).unwrap_err(),
            Error::from(VeError::CheckpointHistoryPruned)
        );
    }

    #[test]
    fn retained_history_is_bounded() {
        let mut escrow = escrow_at(T0);
        let mut position = lock(&mut escrow, Pubkey::new_unique(), 1_000_000_000, 100 * WEEK, T0 + 1);
        for i in 0..(GLOBAL_HISTORY as i64) {
            escrow.deposit_for(&mut position, 1, T0 + 10 + i).unwrap();
        }
        assert_eq!(escrow.history.len(), GLOBAL_HISTORY);
        assert_eq!(
            escrow.total_supply_at(T0 + 2).unwrap_err(),
            Error::from(VeError::CheckpointHistoryPruned)
        );
        assert!(escrow.total_supply_at(T0 + 60).is_ok());
    }

    proptest! {
        #[test]
        fn balances_never_increase_without_a_change(
            amount in 1u64..1_000_000_000_000_000,
            weeks in 1i64..208,
            offset in 0i64..WEEK,
            times in proptest::collection::vec(0i64..(210 * WEEK), 1..8),
        ) {
            let mut escrow = escrow_at(T0);
            let position = lock(&mut escrow, Pubkey::new_unique(), amount, weeks * WEEK, T0 + offset);
            let mut times = times;
            times.sort_unstable();
            let mut last = u64::MAX;
            for p in times {
                let balance = position.balance_at(T0 + offset + p).unwrap();
                prop_assert!(balance <= last);
                prop_assert!(balance <= amount);
                last = balance;
            }
        }

        #[test]
        fn supply_equals_sum_of_positions(
            locks in proptest::collection::vec((1u64..1_000_000_000_000, 1i64..100, 0i64..(3 * WEEK)), 1..6),
            offset_t in 0i64..(110 * WEEK),
        ) {
            let mut escrow = escrow_at(T0);
            let mut positions = Vec::new();
            let mut locks = locks;
            locks.sort_by_key(|l| l.2);
            for (amount, weeks, at) in locks {
                positions.push(lock(&mut escrow, Pubkey::new_unique(), amount, weeks * WEEK, T0 + at));
            }
            let t = T0 + 3 * WEEK + offset_t;
            let sum: u64 = positions.iter().map(|p| p.balance_at(t).unwrap()).sum();
            let total = escrow.total_supply_at(t).unwrap();
            prop_assert!(total.abs_diff(sum) <= positions.len() as u64);
        }
    }
}
