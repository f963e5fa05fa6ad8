use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VeError;

/// A `(bias, slope)` pair taken at `ts`, scaled by `PRECISION`.
///
/// Voting power at `t >= ts` is `max(0, bias - slope * (t - ts)) / PRECISION`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub bias: i128,
    pub slope: i128,
    pub ts: i64,
}

impl Point {
    pub const LEN: usize = 16 + 16 + 8;

    /// Scaled power at `t`, clamped at zero. `t` before `ts` is treated as `ts`.
    pub fn scaled_power_at(&self, t: i64) -> i128 {
        let elapsed = t.saturating_sub(self.ts).max(0) as i128;
        self.bias
            .saturating_sub(self.slope.saturating_mul(elapsed))
            .max(0)
    }

    /// Unscaled power at `t` in base token units.
    pub fn power_at(&self, t: i64) -> u64 {
        let scaled = self.scaled_power_at(t) / PRECISION as i128;
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }

    /// The point a lock of `amount` ending at `unlock_time` has at `now`.
    pub fn for_lock(amount: u64, unlock_time: i64, now: i64) -> Result<Self> {
        if amount == 0 || unlock_time <= now {
            return Ok(Point {
                bias: 0,
                slope: 0,
                ts: now,
            });
        }

        let slope = (amount as i128)
            .checked_mul(PRECISION as i128)
            .ok_or(VeError::MathOverflow)?
            .checked_div(MAXLOCK as i128)
            .ok_or(VeError::MathOverflow)?;
        let bias = slope
            .checked_mul((unlock_time - now) as i128)
            .ok_or(VeError::MathOverflow)?;

        Ok(Point {
            bias,
            slope,
            ts: now,
        })
    }
}

/// A locked position ("veNFT").
///
/// Seeds: [b"position", escrow.key(), id.to_le_bytes()]
#[account]
#[derive(Default)]
pub struct Position {
    /// Escrow this position belongs to
    pub escrow: Pubkey,
    /// Monotonically assigned identifier, starting at 1
    pub id: u64,
    /// Current owner, `Pubkey::default()` once withdrawn
    pub owner: Pubkey,
    /// Approved delegate, `Pubkey::default()` when none
    pub delegate: Pubkey,

    pub locked: u64,
    pub lock_start: i64,
    pub unlock_time: i64,

    /// Number of checkpoints ever written (the vec keeps only the newest)
    pub checkpoint_count: u64,
    pub checkpoints: Vec<Point>,

    /// Last epoch whose rebase has been claimed
    pub rebase_claimed_epoch: i64,

    pub bump: u8,
}

impl Position {
    pub const LEN: usize = 8 // discriminator
        + 32 + 8 + 32 + 32
        + 8 + 8 + 8
        + 8
        + 4 + MAX_POSITION_CHECKPOINTS * Point::LEN
        + 8
        + 1;

    pub fn is_burned(&self) -> bool {
        self.owner == Pubkey::default()
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.unlock_time
    }

    /// Owner or approved delegate.
    pub fn is_authorized(&self, caller: &Pubkey) -> bool {
        !self.is_burned()
            && (self.owner == *caller
                || (self.delegate != Pubkey::default() && self.delegate == *caller))
    }

    pub fn require_authorized(&self, caller: &Pubkey) -> Result<()> {
        require!(!self.is_burned(), VeError::PositionBurned);
        require!(self.is_authorized(caller), VeError::Unauthorized);
        Ok(())
    }

    pub fn last_point(&self) -> Point {
        self.checkpoints.last().copied().unwrap_or_default()
    }

    fn history_complete(&self) -> bool {
        self.checkpoint_count as usize == self.checkpoints.len()
    }

    /// Appends a checkpoint, dropping the oldest when the history is full.
    pub fn push_checkpoint(&mut self, point: Point) {
        if let Some(last) = self.checkpoints.last_mut() {
            if last.ts == point.ts {
                *last = point;
                return;
            }
        }
        if self.checkpoints.len() >= MAX_POSITION_CHECKPOINTS {
            self.checkpoints.remove(0);
        }
        self.checkpoints.push(point);
        self.checkpoint_count = self.checkpoint_count.saturating_add(1);
    }

    /// Whether a checkpoint at `now` can be written without losing the one
    /// that answers the first unclaimed rebase epoch.
    ///
    /// When the history is full the oldest entry is dropped, which is only
    /// safe if the next entry already precedes that epoch.
    pub fn has_checkpoint_room(&self, now: i64) -> bool {
        if self.checkpoints.len() < MAX_POSITION_CHECKPOINTS {
            return true;
        }
        if self.checkpoints.last().map_or(false, |cp| cp.ts == now) {
            return true;
        }
        let first_unclaimed = self.rebase_claimed_epoch.saturating_add(WEEK);
        self.checkpoints
            .get(1)
            .map_or(false, |cp| cp.ts < first_unclaimed)
    }

    pub fn require_checkpoint_room(&self, now: i64) -> Result<()> {
        require!(self.has_checkpoint_room(now), VeError::CheckpointHistoryFull);
        Ok(())
    }

    /// Voting power at `t`, using the latest checkpoint at or before `t`.
    pub fn balance_at(&self, t: i64) -> Result<u64> {
        match self.checkpoints.iter().rev().find(|cp| cp.ts <= t) {
            Some(cp) => Ok(cp.power_at(t)),
            None if self.history_complete() => Ok(0),
            None => err!(VeError::CheckpointHistoryPruned),
        }
    }

    /// Power held going into the epoch that starts at `epoch`.
    ///
    /// Only checkpoints strictly before the boundary count, matching the
    /// escrow's boundary snapshot which is taken before any mutation at `epoch`.
    pub fn balance_at_epoch_start(&self, epoch: i64) -> Result<u64> {
        match self.checkpoints.iter().rev().find(|cp| cp.ts < epoch) {
            Some(cp) => Ok(cp.power_at(epoch)),
            None if self.history_complete() => Ok(0),
            None => err!(VeError::CheckpointHistoryPruned),
        }
    }

    /// Derives the position PDA for `escrow` and `id`.
    pub fn address(escrow: &Pubkey, id: u64) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[POSITION_SEED, escrow.as_ref(), &id.to_le_bytes()],
            &crate::ID,
        )
    }
}
