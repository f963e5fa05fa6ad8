use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VeError;
use crate::state::escrow::Escrow;
use crate::state::position::Position;

/// Outcome of one position's claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RebaseClaim {
    pub amount: u64,
    /// Epoch the position has now claimed through
    pub cursor: i64,
    /// Added to the lock rather than paid out
    pub compounded: bool,
}

/// Pro-rata rebase paid to lockers each epoch.
///
/// Seeds: [b"distributor", escrow.key()]
#[account]
#[derive(Default)]
pub struct RebaseDistributor {
    pub escrow: Pubkey,
    pub vault: Pubkey,

    /// Epoch of the newest record, head of the record chain
    pub latest_epoch: i64,
    pub total_allocated: u64,
    pub total_claimed: u64,

    pub vault_bump: u8,
    pub bump: u8,
}

impl RebaseDistributor {
    pub const LEN: usize = 8 + (32 * 2) + (8 * 3) + 2;

    /// Writes the record for `epoch` and links it to the previous head.
    pub fn checkpoint(
        &mut self,
        record: &mut RebaseEpoch,
        distributor: Pubkey,
        epoch: i64,
        tokens: u64,
        ve_supply: u64,
        bump: u8,
    ) -> Result<()> {
        require!(epoch > self.latest_epoch, VeError::BrokenEpochChain);

        *record = RebaseEpoch {
            distributor,
            epoch,
            prev_epoch: self.latest_epoch,
            tokens,
            ve_supply,
            bump,
        };
        self.latest_epoch = epoch;
        self.total_allocated = self
            .total_allocated
            .checked_add(tokens)
            .ok_or(VeError::MathOverflow)?;
        Ok(())
    }

    /// Sums the rebase owed to `position` over `records`, which must continue
    /// the chain from the position's cursor in ascending order.
    ///
    /// Returns the amount and the cursor to store once it is paid.
    pub fn claimable(&self, position: &Position, records: &[RebaseEpoch]) -> Result<(u64, i64)> {
        require!(records.len() <= MAX_CLAIM_EPOCHS, VeError::BrokenEpochChain);

        let mut cursor = position.rebase_claimed_epoch;
        let mut total: u64 = 0;
        for record in records {
            require!(
                record.prev_epoch <= cursor && cursor < record.epoch,
                VeError::BrokenEpochChain
            );
            total = total
                .checked_add(record.share_of(position.balance_at_epoch_start(record.epoch)?)?)
                .ok_or(VeError::MathOverflow)?;
            cursor = record.epoch;
        }
        Ok((total, cursor))
    }

    /// Records past the position's cursor, in order, capped at `MAX_CLAIM_EPOCHS`.
    pub fn pending(position: &Position, records: &[RebaseEpoch]) -> Vec<RebaseEpoch> {
        records
            .iter()
            .filter(|r| r.epoch > position.rebase_claimed_epoch)
            .take(MAX_CLAIM_EPOCHS)
            .cloned()
            .collect()
    }

    /// Claims the rebase owed to `position` on behalf of `claimant`.
    ///
    /// The cursor moves before the rebase is compounded, so a full checkpoint
    /// history never blocks a claim: when the new checkpoint would not fit, or
    /// the lock has expired, the rebase is left to be paid out instead. On
    /// error nothing is changed.
    pub fn claim_for(
        &mut self,
        escrow: &mut Escrow,
        position: &mut Position,
        claimant: &Pubkey,
        records: &[RebaseEpoch],
        now: i64,
    ) -> Result<RebaseClaim> {
        position.require_authorized(claimant)?;

        let pending = Self::pending(position, records);
        let (amount, cursor) = self.claimable(position, &pending)?;
        let total_claimed = self
            .total_claimed
            .checked_add(amount)
            .ok_or(VeError::MathOverflow)?;

        let previous = position.rebase_claimed_epoch;
        position.rebase_claimed_epoch = cursor;
        let compounded =
            amount > 0 && !position.is_expired(now) && position.has_checkpoint_room(now);
        if compounded {
            if let Err(e) = escrow.deposit_for(position, amount, now) {
                position.rebase_claimed_epoch = previous;
                return Err(e);
            }
        }
        self.total_claimed = total_claimed;

        Ok(RebaseClaim {
            amount,
            cursor,
            compounded,
        })
    }
}

/// Rebase allocated in one epoch.
///
/// Seeds: [b"rebase_epoch", distributor.key(), epoch.to_le_bytes()]
#[account]
#[derive(Default)]
pub struct RebaseEpoch {
    pub distributor: Pubkey,
    pub epoch: i64,
    /// Epoch of the record written before this one
    pub prev_epoch: i64,
    pub tokens: u64,
    /// Total voting power going into `epoch`
    pub ve_supply: u64,
    pub bump: u8,
}

impl RebaseEpoch {
    pub const LEN: usize = 8 + 32 + (8 * 4) + 1;

    /// `tokens * balance / ve_supply`, truncating.
    pub fn share_of(&self, balance: u64) -> Result<u64> {
        if self.ve_supply == 0 || balance == 0 {
            return Ok(0);
        }
        let share = (self.tokens as u128)
            .checked_mul(balance as u128)
            .ok_or(VeError::MathOverflow)?
            / self.ve_supply as u128;
        u64::try_from(share).map_err(|_| error!(VeError::MathOverflow))
    }

    pub fn address(distributor: &Pubkey, epoch: i64) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[REBASE_EPOCH_SEED, distributor.as_ref(), &epoch.to_le_bytes()],
            &crate::ID,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    const T0: i64 = 2_900 * WEEK;

    struct Fixture {
        escrow: Escrow,
        distributor: RebaseDistributor,
        records: Vec<RebaseEpoch>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut escrow = Escrow::default();
            escrow.init(
                Pubkey::new_unique(),
                Pubkey::new_unique(),
                Pubkey::new_unique(),
                T0,
                1,
                1,
            );
            Fixture {
                escrow,
                distributor: RebaseDistributor::default(),
                records: Vec::new(),
            }
        }

        fn lock(&mut self, amount: u64, now: i64) -> Position {
            let mut position = Position::default();
            self.escrow
                .create_lock(
                    &mut position,
                    Pubkey::new_unique(),
                    Pubkey::new_unique(),
                    amount,
                    50 * WEEK,
                    now,
                    1,
                )
                .unwrap();
            position
        }

        fn rebase(&mut self, epoch: i64, tokens: u64) {
            self.escrow.checkpoint(epoch).unwrap();
            let supply = self.escrow.supply_at_epoch(epoch).unwrap();
            let mut record = RebaseEpoch::default();
            self.distributor
                .checkpoint(&mut record, Pubkey::default(), epoch, tokens, supply, 1)
                .unwrap();
            self.records.push(record);
        }
    }

    #[test]
    fn rebase_is_pro_rata_to_power_at_epoch_start() {
        let mut f = Fixture::new();
        let a = f.lock(1_000_000_000_000, T0 + 10);
        let b = f.lock(3_000_000_000_000, T0 + 10);
        f.rebase(T0 + WEEK, 1_000_000);

        let (owed_a, cursor) = f.distributor.claimable(&a, &f.records).unwrap();
        let (owed_b, _) = f.distributor.claimable(&b, &f.records).unwrap();
        assert_eq!(cursor, T0 + WEEK);
        assert!(owed_a.abs_diff(250_000) <= 1);
        assert!(owed_b.abs_diff(750_000) <= 1);
        assert!(owed_a + owed_b <= 1_000_000);
    }

    #[test]
    fn claim_twice_in_an_epoch_yields_zero() {
        let mut f = Fixture::new();
        let mut a = f.lock(1_000_000_000, T0 + 10);
        f.rebase(T0 + WEEK, 500);

        let owner = a.owner;
        let (owed, cursor) = f.distributor.claimable(&a, &f.records).unwrap();
        assert_eq!(owed, 500);
        f.distributor
            .claim_for(&mut f.escrow, &mut a, &owner, &f.records, T0 + WEEK + 30)
            .unwrap();

        assert_eq!(f.distributor.claimable(&a, &[]).unwrap(), (0, cursor));
        assert_eq!(
            f.distributor.claimable(&a, &f.records).unwrap_err(),
            Error::from(VeError::BrokenEpochChain)
        );
    }

    #[test]
    fn position_created_mid_epoch_starts_at_next_record() {
        let mut f = Fixture::new();
        let _early = f.lock(1_000_000_000, T0 + 10);
        f.rebase(T0 + WEEK, 100);
        let late = f.lock(1_000_000_000, T0 + WEEK + 5);
        f.rebase(T0 + 2 * WEEK, 100);

        assert_eq!(late.rebase_claimed_epoch, T0 + WEEK);
        let (owed, _) = f.distributor.claimable(&late, &f.records[1..]).unwrap();
        assert!(owed > 0 && owed < 100);
        assert_eq!(
            f.distributor.claimable(&late, &f.records).unwrap_err(),
            Error::from(VeError::BrokenEpochChain)
        );
    }

    #[test]
    fn records_cannot_be_skipped() {
        let mut f = Fixture::new();
        let a = f.lock(1_000_000_000, T0 + 10);
        f.rebase(T0 + WEEK, 100);
        f.rebase(T0 + 2 * WEEK, 100);
        f.rebase(T0 + 3 * WEEK, 100);

        let gapped = [f.records[0].clone(), f.records[2].clone()];
        assert_eq!(
            f.distributor.claimable(&a, &gapped).unwrap_err(),
            Error::from(VeError::BrokenEpochChain)
        );
        let (owed, cursor) = f.distributor.claimable(&a, &f.records).unwrap();
        assert_eq!((owed, cursor), (300, T0 + 3 * WEEK));
    }

    #[test]
    fn claim_compounds_live_locks_and_pays_expired_ones() {
        let mut f = Fixture::new();
        let mut live = f.lock(1_000_000_000, T0 + 10);
        let owner = live.owner;
        f.rebase(T0 + WEEK, 1_000);

        let claim = f
            .distributor
            .claim_for(&mut f.escrow, &mut live, &owner, &f.records, T0 + WEEK + 60)
            .unwrap();
        assert_eq!(
            claim,
            RebaseClaim {
                amount: 1_000,
                cursor: T0 + WEEK,
                compounded: true
            }
        );
        assert_eq!(live.locked, 1_000_001_000);
        assert_eq!(live.rebase_claimed_epoch, T0 + WEEK);
        assert_eq!(f.distributor.total_claimed, 1_000);

        // Already-claimed records are filtered out.
        let again = f
            .distributor
            .claim_for(&mut f.escrow, &mut live, &owner, &f.records, T0 + WEEK + 120)
            .unwrap();
        assert_eq!((again.amount, again.compounded), (0, false));

        let stranger = Pubkey::new_unique();
        assert_eq!(
            f.distributor
                .claim_for(&mut f.escrow, &mut live, &stranger, &f.records, T0 + WEEK + 120)
                .unwrap_err(),
            Error::from(VeError::Unauthorized)
        );

        let mut g = Fixture::new();
        let short_owner = Pubkey::new_unique();
        let mut short = Position::default();
        g.escrow
            .create_lock(
                &mut short,
                Pubkey::new_unique(),
                short_owner,
                1_000_000_000,
                2 * WEEK,
                T0 + 10,
                1,
            )
            .unwrap();
        g.rebase(T0 + WEEK, 700);
        let paid = g
            .distributor
            .claim_for(&mut g.escrow, &mut short, &short_owner, &g.records, T0 + 3 * WEEK)
            .unwrap();
        assert_eq!((paid.amount, paid.compounded), (700, false));
        assert_eq!(short.locked, 1_000_000_000);
        assert_eq!(short.rebase_claimed_epoch, T0 + WEEK);
    }

    #[test]
    fn topups_cannot_lock_out_an_unclaimed_rebase() {
        let mut f = Fixture::new();
        let mut position = f.lock(1_000_000_000, T0 + 10);
        let owner = position.owner;
        f.rebase(T0 + WEEK, 1_000);

        // Anyone may top up a lock; each top-up writes a checkpoint.
        let mut accepted = 0;
        for i in 0..(MAX_POSITION_CHECKPOINTS as i64 + 8) {
            match f.escrow.deposit_for(&mut position, 1, T0 + WEEK + 100 + i) {
                Ok(()) => accepted += 1,
                Err(e) => assert_eq!(e, Error::from(VeError::CheckpointHistoryFull)),
            }
        }
        assert_eq!(accepted, MAX_POSITION_CHECKPOINTS - 1);
        assert_eq!(position.checkpoints.len(), MAX_POSITION_CHECKPOINTS);

        // The power held going into the recorded epoch is still known.
        let (owed, cursor) = f.distributor.claimable(&position, &f.records).unwrap();
        assert_eq!((owed, cursor), (1_000, T0 + WEEK));

        let now = T0 + WEEK + 500;
        let claim = f
            .distributor
            .claim_for(&mut f.escrow, &mut position, &owner, &f.records, now)
            .unwrap();
        assert_eq!((claim.amount, claim.compounded), (1_000, true));

        // With the epoch claimed the oldest checkpoint may go.
        f.escrow.deposit_for(&mut position, 1, now + 60).unwrap();
        assert_eq!(position.checkpoints.len(), MAX_POSITION_CHECKPOINTS);
    }

    #[test]
    fn checkpoint_requires_a_newer_epoch() {
        let mut distributor = RebaseDistributor::default();
        let mut record = RebaseEpoch::default();
        distributor
            .checkpoint(&mut record, Pubkey::default(), T0, 1, 1, 1)
            .unwrap();
        assert_eq!(record.prev_epoch, 0);
        assert_eq!(
            distributor
                .checkpoint(&mut record, Pubkey::default(), T0, 1, 1, 1)
                .unwrap_err(),
            Error::from(VeError::BrokenEpochChain)
        );
        assert_eq!(distributor.total_allocated, 1);
    }
}
