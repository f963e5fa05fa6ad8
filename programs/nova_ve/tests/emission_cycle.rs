//! End-to-end emission cycle driven through the account state machines:
//! initial locks, a vote, the weekly tick, gauge payout and streaming, and a
//! rebase claim.

use anchor_lang::error::Error;
use anchor_lang::prelude::Pubkey;

use nova_ve::constants::*;
use nova_ve::error::VeError;
use nova_ve::state::*;

const T0: i64 = 2_800 * WEEK;

const INITIAL_SUPPLY: u64 = 20_000_000_000_000_000;
const RECIPIENT_LOCK: u64 = 1_000_000_000_000_000;

struct World {
    escrow_key: Pubkey,
    escrow: Escrow,
    minter: Minter,
    voter: Voter,
    distributor_key: Pubkey,
    distributor: RebaseDistributor,
    gauge: Gauge,
    gauge_key: Pubkey,
    recipient: Pubkey,
    position: Position,
    minter_vault: u64,
    token_supply: u64,
}

/// Escrow, minter, voter, distributor and one gauge, with the minter
/// initialized and the recipient's allocation locked at `now`.
fn bootstrap(now: i64) -> World {
    let authority = Pubkey::new_unique();
    let base_mint = Pubkey::new_unique();
    let escrow_key = Pubkey::new_unique();
    let voter_key = Pubkey::new_unique();
    let distributor_key = Pubkey::new_unique();

    let mut escrow = Escrow::default();
    escrow.init(authority, base_mint, Pubkey::new_unique(), now, 255, 254);

    let mut minter = Minter {
        authority,
        escrow: escrow_key,
        base_mint,
        voter: voter_key,
        distributor: distributor_key,
        params: EmissionParams::default(),
        ..Default::default()
    };
    minter.activate(INITIAL_SUPPLY, now).unwrap();

    let recipient = Pubkey::new_unique();
    let mut position = Position::default();
    escrow
        .create_lock(
            &mut position,
            escrow_key,
            recipient,
            RECIPIENT_LOCK,
            MAXLOCK,
            now,
            253,
        )
        .unwrap();

    let voter = Voter {
        authority,
        escrow: escrow_key,
        emission_mint: base_mint,
        ..Default::default()
    };
    let distributor = RebaseDistributor {
        escrow: escrow_key,
        ..Default::default()
    };

    let pool = Pubkey::new_unique();
    let mut gauge = Gauge {
        voter: voter_key,
        pool,
        is_alive: true,
        created_at: now,
        ..Default::default()
    };
    gauge
        .add_reward_token(base_mint, Pubkey::new_unique(), now)
        .unwrap();

    World {
        escrow_key,
        escrow,
        minter,
        voter,
        distributor_key,
        distributor,
        gauge,
        gauge_key: Pubkey::new_unique(),
        recipient,
        position,
        minter_vault: INITIAL_SUPPLY - RECIPIENT_LOCK,
        token_supply: INITIAL_SUPPLY,
    }
}

#[test]
fn initialize_locks_allocation_and_keeps_remainder() {
    let mut world = bootstrap(T0 + 3_600);

    assert_eq!(world.minter_vault, 19_000_000_000_000_000);
    assert_eq!(world.escrow.total_locked, RECIPIENT_LOCK);
    assert_eq!(world.position.owner, world.recipient);
    assert_eq!(world.position.escrow, world.escrow_key);
    assert_eq!(world.minter.active_period, T0);
    assert_eq!(world.minter.weekly, INITIAL_SUPPLY);

    assert_eq!(
        world.minter.activate(INITIAL_SUPPLY, T0 + 7_200).unwrap_err(),
        Error::from(VeError::AlreadyInitialized)
    );
}

#[test]
fn fresh_max_lock_carries_near_full_power() {
    let mut escrow = Escrow::default();
    escrow.init(
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        T0,
        255,
        254,
    );

    let mut position = Position::default();
    escrow
        .create_lock(
            &mut position,
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            1_000_000_000_000_000_000,
            MAXLOCK,
            T0,
            1,
        )
        .unwrap();

    let power = position.balance_at(T0).unwrap();
    assert!(power > 995_063_075_414_519_385);
    assert_eq!(escrow.total_supply_at(T0).unwrap(), power);
}

#[test]
fn weekly_cycle_routes_emission_to_gauge_and_rebase() {
    let start = T0 + 3_600;
    let mut world = bootstrap(start);
    let gauge = &mut world.gauge;

    // A staker is in the gauge before any emission arrives.
    let mut stake_a = GaugeStake {
        gauge: world.gauge_key,
        owner: Pubkey::new_unique(),
        ..Default::default()
    };
    gauge.deposit(&mut stake_a, 1_000_000, start).unwrap();

    // The recipient votes everything to the one pool.
    let power = world.position.balance_at(start).unwrap();
    let parts = allocate_votes(power, &[5_000]).unwrap();
    assert_eq!(parts, vec![power]);

    let mut epoch_votes = EpochVotes {
        epoch: epoch_start(start),
        ..Default::default()
    };
    epoch_votes.reweight_pool(0, parts[0]).unwrap();
    let mut pool_votes = PoolVotes {
        gauge: world.gauge_key,
        pool: gauge.pool,
        epoch: epoch_start(start),
        weight: parts[0],
        ..Default::default()
    };

    // Weekly tick in the next epoch.
    let tick = T0 + WEEK + 60;
    world.escrow.checkpoint(tick).unwrap();
    let ve_supply = world.escrow.total_supply_at(tick).unwrap();
    let emission = world
        .minter
        .advance_period(tick, world.token_supply, ve_supply)
        .unwrap()
        .unwrap();

    assert_eq!(emission.period, T0 + WEEK);
    assert_eq!(emission.closed_epoch, T0);
    assert_eq!(emission.weekly, 19_800_000_000_000_000);
    assert!(emission.growth > 0 && emission.growth < emission.weekly);

    // A second tick in the same epoch changes nothing.
    assert!(world
        .minter
        .advance_period(tick + 600, world.token_supply, ve_supply)
        .unwrap()
        .is_none());
    assert_eq!(world.minter.weekly, emission.weekly);
    assert_eq!(world.minter.epoch_count, 1);

    let minted = mint_shortfall(emission.total().unwrap(), world.minter_vault);
    world.minter_vault += minted;
    world.token_supply += minted;

    let mut record = RebaseEpoch::default();
    let epoch_supply = world.escrow.supply_at_epoch(emission.period).unwrap();
    world
        .distributor
        .checkpoint(
            &mut record,
            world.distributor_key,
            emission.period,
            emission.growth,
            epoch_supply,
            1,
        )
        .unwrap();
    world.minter_vault -= emission.growth;

    let payable = world
        .voter
        .record_emission(&mut epoch_votes, emission.weekly)
        .unwrap();
    world.minter_vault -= emission.weekly;
    assert_eq!(payable, emission.weekly);
    assert_eq!(world.minter_vault, 0);

    // The only voted pool receives the whole emission.
    let paid = world
        .voter
        .settle_pool(&mut epoch_votes, &mut pool_votes, gauge.is_alive)
        .unwrap();
    assert_eq!(paid, emission.weekly);
    assert_eq!(epoch_votes.distributed, epoch_votes.emission);
    assert_eq!(
        world
            .voter
            .settle_pool(&mut epoch_votes, &mut pool_votes, true)
            .unwrap_err(),
        Error::from(VeError::AlreadyDistributed)
    );

    // Stream it, with a second staker arriving halfway.
    gauge.notify_reward_amount(0, paid, paid, tick).unwrap();
    let mid = tick + REWARD_DURATION / 2;
    let earned_a_mid = gauge.earned(&stake_a, 0, mid).unwrap();
    let mut stake_b = GaugeStake {
        gauge: world.gauge_key,
        owner: Pubkey::new_unique(),
        ..Default::default()
    };
    gauge.deposit(&mut stake_b, 4_000_000, mid).unwrap();
    assert_eq!(gauge.earned(&stake_a, 0, mid).unwrap(), earned_a_mid);

    let finish = tick + REWARD_DURATION;
    let earned_a = gauge.earned(&stake_a, 0, finish).unwrap();
    let earned_b = gauge.earned(&stake_b, 0, finish).unwrap();
    assert!(earned_a > earned_a_mid);
    assert!(earned_a + earned_b <= paid);
    assert!(paid - (earned_a + earned_b) <= 10);

    assert_eq!(
        gauge.take_rewards(&mut stake_a, &[0], finish).unwrap(),
        vec![earned_a]
    );
    assert_eq!(
        gauge.take_rewards(&mut stake_a, &[0], finish + 60).unwrap(),
        vec![0]
    );

    // The recipient is the only locker, so the whole rebase is theirs.
    let claim_at = tick + 120;
    let records = vec![record];
    let (amount, cursor) = world
        .distributor
        .claimable(&world.position, &records)
        .unwrap();
    assert_eq!(amount, emission.growth);
    assert_eq!(cursor, emission.period);

    let claim = world
        .distributor
        .claim_for(
            &mut world.escrow,
            &mut world.position,
            &world.recipient,
            &records,
            claim_at,
        )
        .unwrap();
    assert_eq!((claim.amount, claim.cursor), (amount, cursor));
    assert!(claim.compounded);
    assert_eq!(world.position.locked, RECIPIENT_LOCK + amount);
    assert_eq!(world.distributor.total_claimed, world.distributor.total_allocated);

    // Nothing left: no newer records, and replaying the old one breaks the chain.
    let pending: Vec<RebaseEpoch> = records
        .iter()
        .filter(|r| r.epoch > world.position.rebase_claimed_epoch)
        .cloned()
        .collect();
    assert_eq!(
        world.distributor.claimable(&world.position, &pending).unwrap(),
        (0, cursor)
    );
    assert_eq!(
        world
            .distributor
            .claimable(&world.position, &records)
            .unwrap_err(),
        Error::from(VeError::BrokenEpochChain)
    );
}

#[test]
fn emission_without_votes_carries_into_next_epoch() {
    let start = T0 + 3_600;
    let mut world = bootstrap(start);

    let tick = T0 + WEEK + 60;
    world.escrow.checkpoint(tick).unwrap();
    let ve_supply = world.escrow.total_supply_at(tick).unwrap();
    let first = world
        .minter
        .advance_period(tick, world.token_supply, ve_supply)
        .unwrap()
        .unwrap();

    let mut silent = EpochVotes {
        epoch: first.closed_epoch,
        ..Default::default()
    };
    assert_eq!(
        world.voter.record_emission(&mut silent, first.weekly).unwrap(),
        0
    );
    assert_eq!(world.voter.carried_emission, first.weekly);

    let tick = T0 + 2 * WEEK + 60;
    world.escrow.checkpoint(tick).unwrap();
    let ve_supply = world.escrow.total_supply_at(tick).unwrap();
    let second = world
        .minter
        .advance_period(tick, world.token_supply, ve_supply)
        .unwrap()
        .unwrap();
    assert!(second.weekly < first.weekly);

    let mut voted = EpochVotes {
        epoch: second.closed_epoch,
        ..Default::default()
    };
    voted.reweight_pool(0, 10).unwrap();
    assert_eq!(
        world.voter.record_emission(&mut voted, second.weekly).unwrap(),
        first.weekly + second.weekly
    );
    assert_eq!(world.voter.carried_emission, 0);
}

#[test]
fn missed_week_pays_the_votes_of_the_last_active_period() {
    let start = T0 + 3_600;
    let mut world = bootstrap(start);

    let power = world.position.balance_at(start).unwrap();
    let mut voted = EpochVotes {
        epoch: epoch_start(start),
        ..Default::default()
    };
    voted.reweight_pool(0, power).unwrap();

    // Nobody ticks during epoch T0 + WEEK; the next tick lands fourteen days in.
    let tick = start + 14 * 86_400;
    world.escrow.checkpoint(tick).unwrap();
    let ve_supply = world.escrow.total_supply_at(tick).unwrap();
    let emission = world
        .minter
        .advance_period(tick, world.token_supply, ve_supply)
        .unwrap()
        .unwrap();

    assert_eq!(emission.period, T0 + 2 * WEEK);
    assert_eq!(emission.closed_epoch, T0);
    assert_eq!(emission.weekly, 19_800_000_000_000_000);
    assert_eq!(world.minter.active_period, T0 + 2 * WEEK);

    assert_eq!(
        world
            .voter
            .record_emission(&mut voted, emission.weekly)
            .unwrap(),
        emission.weekly
    );
    assert_eq!(world.voter.carried_emission, 0);
}
