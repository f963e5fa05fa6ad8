use anchor_lang::prelude::borsh;
use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VeError;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MinterState {
    #[default]
    Uninitialized,
    Active,
}

/// How the rebase ("growth") share of each period is derived from the
/// weekly emission.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GrowthPolicy {
    /// `weekly * ve_supply / token_supply`
    #[default]
    LockedShare,
    /// `weekly * (ve_supply / token_supply)^2`
    LockedShareSquared,
    Disabled,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmissionParams {
    /// Multiplier applied to the weekly emission each period
    pub decay_bps: u16,
    /// Floor on the weekly emission as a share of circulating supply
    pub tail_bps: u16,
    /// Cap on growth as a share of the weekly emission
    pub growth_cap_bps: u16,
    /// Absolute floor on the weekly emission
    pub min_weekly: u64,
    pub growth: GrowthPolicy,
}

impl Default for EmissionParams {
    fn default() -> Self {
        EmissionParams {
            decay_bps: DEFAULT_DECAY_BPS,
            tail_bps: DEFAULT_TAIL_BPS,
            growth_cap_bps: DEFAULT_GROWTH_CAP_BPS,
            min_weekly: DEFAULT_MIN_WEEKLY,
            growth: GrowthPolicy::default(),
        }
    }
}

impl EmissionParams {
    pub const LEN: usize = 2 + 2 + 2 + 8 + 1;

    pub fn validate(&self) -> Result<()> {
        let max = BASIS_POINTS_DENOMINATOR as u16;
        require!(
            self.decay_bps <= max && self.tail_bps <= max && self.growth_cap_bps <= max,
            VeError::InvalidEmissionParams
        );
        Ok(())
    }
}

/// What one call to `advance_period` produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodEmission {
    /// Start of the epoch that just opened
    pub period: i64,
    /// The period that was active until now; the weekly emission follows
    /// its votes even when ticks were skipped in between
    pub closed_epoch: i64,
    pub weekly: u64,
    pub growth: u64,
}

impl PeriodEmission {
    pub fn total(&self) -> Result<u64> {
        self.weekly
            .checked_add(self.growth)
            .ok_or_else(|| error!(VeError::MathOverflow))
    }
}

/// Epoch clock and emission schedule.
///
/// Seeds: [b"minter", escrow.key()]
#[account]
#[derive(Default)]
pub struct Minter {
    /// Runs `initialize` and may change emission parameters
    pub authority: Pubkey,
    pub escrow: Pubkey,
    pub base_mint: Pubkey,
    pub vault: Pubkey,
    pub voter: Pubkey,
    pub distributor: Pubkey,

    pub state: MinterState,

    pub weekly: u64,
    /// Start of the epoch emission was last computed for
    pub active_period: i64,
    pub epoch_count: u64,
    pub total_emitted: u64,

    pub params: EmissionParams,

    pub created_at: i64,

    pub vault_bump: u8,
    pub bump: u8,
}

impl Minter {
    pub const LEN: usize = 8
        + (32 * 6)
        + 1
        + 8 + 8 + 8 + 8
        + EmissionParams::LEN
        + 8
        + 2;

    pub fn is_active(&self) -> bool {
        self.state == MinterState::Active
    }

    /// One-time switch to `Active` with `initial_supply` as the first weekly amount.
    pub fn activate(&mut self, initial_supply: u64, now: i64) -> Result<()> {
        require!(!self.is_active(), VeError::AlreadyInitialized);

        self.state = MinterState::Active;
        self.weekly = initial_supply;
        self.active_period = epoch_start(now);
        Ok(())
    }

    /// Decays `weekly`, bounded below by the tail on `circulating` and `min_weekly`.
    pub fn next_weekly(&self, circulating: u64) -> Result<u64> {
        let tail = bps_of(circulating, self.params.tail_bps)?;
        let floor = tail.max(self.params.min_weekly);
        let decayed = bps_of(self.weekly, self.params.decay_bps)?;
        Ok(decayed.max(floor))
    }

    pub fn calculate_growth(&self, weekly: u64, ve_supply: u64, token_supply: u64) -> Result<u64> {
        if token_supply == 0 {
            return Ok(0);
        }
        let ve = ve_supply.min(token_supply) as u128;
        let total = token_supply as u128;
        let weekly = weekly as u128;

        let growth = match self.params.growth {
            GrowthPolicy::Disabled => 0,
            GrowthPolicy::LockedShare => weekly.checked_mul(ve).ok_or(VeError::MathOverflow)? / total,
            GrowthPolicy::LockedShareSquared => {
                let once = weekly.checked_mul(ve).ok_or(VeError::MathOverflow)? / total;
                once.checked_mul(ve).ok_or(VeError::MathOverflow)? / total
            }
        };
        let growth = u64::try_from(growth).map_err(|_| error!(VeError::MathOverflow))?;

        let cap = bps_of(weekly as u64, self.params.growth_cap_bps)?;
        Ok(growth.min(cap))
    }

    /// Rolls the schedule into the epoch containing `now`.
    ///
    /// Returns `None` while the active period is still current, so repeated
    /// calls within an epoch change nothing.
    pub fn advance_period(
        &mut self,
        now: i64,
        token_supply: u64,
        ve_supply: u64,
    ) -> Result<Option<PeriodEmission>> {
        let period = epoch_start(now);
        if !self.is_active() || period <= self.active_period {
            return Ok(None);
        }

        let circulating = token_supply.saturating_sub(ve_supply);
        let weekly = self.next_weekly(circulating)?;
        let growth = self.calculate_growth(weekly, ve_supply, token_supply)?;

        let emission = PeriodEmission {
            period,
            closed_epoch: self.active_period,
            weekly,
            growth,
        };

        self.weekly = weekly;
        self.active_period = period;
        self.epoch_count = self.epoch_count.checked_add(1).ok_or(VeError::MathOverflow)?;
        self.total_emitted = self
            .total_emitted
            .checked_add(emission.total()?)
            .ok_or(VeError::MathOverflow)?;

        Ok(Some(emission))
    }
}

/// Amount the minter must mint so its vault covers `needed`.
pub fn mint_shortfall(needed: u64, vault_balance: u64) -> u64 {
    needed.saturating_sub(vault_balance)
}

fn bps_of(amount: u64, bps: u16) -> Result<u64> {
    let scaled = (amount as u128)
        .checked_mul(bps as u128)
        .ok_or(VeError::MathOverflow)?
        / BASIS_POINTS_DENOMINATOR as u128;
    u64::try_from(scaled).map_err(|_| error!(VeError::MathOverflow))
}
