//! Rebase claim handlers.
//!
//! A claim walks the `RebaseEpoch` records passed in `remaining_accounts`
//! (ascending, starting right after the position's cursor). While the lock is
//! live the rebase is compounded into it; once expired it is paid to the owner.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::error::VeError;
use crate::events::RebaseClaimed;
use crate::state::{Escrow, Position, RebaseClaim, RebaseDistributor, RebaseEpoch};
use crate::utils::{load_account, store_account, transfer_tokens};

#[derive(Accounts)]
pub struct ClaimRebase<'info> {
    /// Owner or approved delegate of the position(s).
    pub signer: Signer<'info>,

    #[account(
        mut,
        seeds = [ESCROW_SEED, escrow.base_mint.as_ref()],
        bump = escrow.bump
    )]
    pub escrow: Account<'info, Escrow>,

    #[account(
        mut,
        seeds = [DISTRIBUTOR_SEED, escrow.key().as_ref()],
        bump = distributor.bump,
        has_one = escrow @ VeError::InvalidAccount
    )]
    pub distributor: Account<'info, RebaseDistributor>,

    #[account(
        mut,
        constraint = escrow_vault.key() == escrow.vault @ VeError::InvalidAccount
    )]
    pub escrow_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = distributor_vault.key() == distributor.vault @ VeError::InvalidAccount
    )]
    pub distributor_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct ClaimRebaseSingle<'info> {
    pub claim: ClaimRebase<'info>,

    #[account(
        mut,
        seeds = [POSITION_SEED, claim.escrow.key().as_ref(), &position.id.to_le_bytes()],
        bump = position.bump,
        constraint = position.escrow == claim.escrow.key() @ VeError::InvalidAccount
    )]
    pub position: Account<'info, Position>,

    /// Paid directly once the lock has expired.
    #[account(mut)]
    pub owner_token_account: Account<'info, TokenAccount>,
}

#[derive(Accounts)]
pub struct ClaimableQuery<'info> {
    #[account(
        seeds = [DISTRIBUTOR_SEED, distributor.escrow.as_ref()],
        bump = distributor.bump
    )]
    pub distributor: Account<'info, RebaseDistributor>,

    #[account(constraint = position.escrow == distributor.escrow @ VeError::InvalidAccount)]
    pub position: Account<'info, Position>,
}

/// Loads the rebase records passed in `remaining_accounts`, checking each
/// belongs to `distributor`.
fn load_records(distributor: &Pubkey, infos: &[AccountInfo]) -> Result<Vec<RebaseEpoch>> {
    infos
        .iter()
        .map(|info| {
            let record: RebaseEpoch = load_account(info)?;
            require_keys_eq!(record.distributor, *distributor, VeError::InvalidAccount);
            Ok(record)
        })
        .collect()
}

/// The account an expired lock's rebase is paid to must be the owner's and
/// hold the base mint.
fn check_payout_account(
    escrow: &Escrow,
    position: &Position,
    owner_token_account: &TokenAccount,
) -> Result<()> {
    require_keys_eq!(owner_token_account.owner, position.owner, VeError::Unauthorized);
    require_keys_eq!(owner_token_account.mint, escrow.base_mint, VeError::InvalidAccount);
    Ok(())
}

/// Moves a settled claim's tokens out of the distributor vault: into the
/// escrow vault when compounded, to the owner otherwise.
fn pay_out<'info>(
    claim: &ClaimRebase<'info>,
    owner_token_account: &AccountInfo<'info>,
    outcome: &RebaseClaim,
) -> Result<()> {
    let escrow_key = claim.distributor.escrow;
    let seeds = &[DISTRIBUTOR_SEED, escrow_key.as_ref(), &[claim.distributor.bump]];
    let signer_seeds = &[&seeds[..]];
    let destination = if outcome.compounded {
        claim.escrow_vault.to_account_info()
    } else {
        owner_token_account.clone()
    };

    transfer_tokens(
        &claim.token_program.to_account_info(),
        &claim.distributor_vault.to_account_info(),
        &destination,
        &claim.distributor.to_account_info(),
        signer_seeds,
        outcome.amount,
    )
}

/// Runs `claim_one(index, id)` for every id. Failures are logged and
/// skipped; the successes are returned with their ids.
pub(crate) fn claim_each<T>(
    ids: &[u64],
    mut claim_one: impl FnMut(usize, u64) -> Result<T>,
) -> Vec<(u64, T)> {
    let mut claimed = Vec::with_capacity(ids.len());
    for (index, id) in ids.iter().enumerate() {
        match claim_one(index, *id) {
            Ok(out) => claimed.push((*id, out)),
            Err(e) => msg!("Skipping lock #{}: {:?}", id, e),
        }
    }
    claimed
}

pub fn claim_handler<'info>(
    mut ctx: Context<'_, '_, 'info, 'info, ClaimRebaseSingle<'info>>,
) -> Result<u64> {
    let clock = Clock::get()?;
    let accounts = &mut ctx.accounts;

    check_payout_account(
        &accounts.claim.escrow,
        &accounts.position,
        &accounts.owner_token_account,
    )?;
    let records = load_records(&accounts.claim.distributor.key(), ctx.remaining_accounts)?;
    let signer = accounts.claim.signer.key();

    let claim = &mut accounts.claim;
    let outcome = claim.distributor.claim_for(
        &mut claim.escrow,
        &mut accounts.position,
        &signer,
        &records,
        clock.unix_timestamp,
    )?;

    let owner_info = accounts.owner_token_account.to_account_info();
    pay_out(&accounts.claim, &owner_info, &outcome)?;

    let position = &accounts.position;
    msg!(
        "Lock #{} claimed {} rebase through epoch {}{}",
        position.id,
        outcome.amount,
        outcome.cursor,
        if outcome.compounded { " (compounded)" } else { "" }
    );
    msg!(
        "Distributor claimed {} of {}",
        accounts.claim.distributor.total_claimed,
        accounts.claim.distributor.total_allocated
    );

    emit!(RebaseClaimed {
        position: position.key(),
        id: position.id,
        amount: outcome.amount,
        compounded: outcome.compounded,
        claimed_through: outcome.cursor,
    });

    Ok(outcome.amount)
}

/// Claim for several positions at once.
///
/// ## Remaining accounts
/// A `(position, owner_token_account)` pair per id, followed by the rebase
/// records shared by all of them. Ids failing their checks are logged and
/// skipped; the rest are paid.
pub fn claim_many_handler<'info>(
    mut ctx: Context<'_, '_, 'info, 'info, ClaimRebase<'info>>,
    ids: Vec<u64>,
) -> Result<u64> {
    let pair_len = ids.len().checked_mul(2).ok_or(VeError::MathOverflow)?;
    require!(ctx.remaining_accounts.len() >= pair_len, VeError::InvalidAccount);
    let (pairs, record_infos) = ctx.remaining_accounts.split_at(pair_len);

    let clock = Clock::get()?;
    let now = clock.unix_timestamp;
    let accounts = &mut ctx.accounts;
    let escrow_key = accounts.escrow.key();
    let signer = accounts.signer.key();
    let records = load_records(&accounts.distributor.key(), record_infos)?;

    let claimed = claim_each(&ids, |index, id| {
        require!(!ids[..index].contains(&id), VeError::InvalidAccount);
        let (position_info, owner_info) = (&pairs[2 * index], &pairs[2 * index + 1]);
        require_keys_eq!(
            position_info.key(),
            Position::address(&escrow_key, id).0,
            VeError::InvalidAccount
        );
        let mut position: Position = load_account(position_info)?;
        let owner_token_account: Account<TokenAccount> = Account::try_from(owner_info)?;
        check_payout_account(&accounts.escrow, &position, &owner_token_account)?;

        let outcome = accounts.distributor.claim_for(
            &mut accounts.escrow,
            &mut position,
            &signer,
            &records,
            now,
        )?;
        Ok((index, position, outcome))
    });

    let mut total: u64 = 0;
    for (id, (index, position, outcome)) in claimed {
        let (position_info, owner_info) = (&pairs[2 * index], &pairs[2 * index + 1]);
        pay_out(accounts, owner_info, &outcome)?;
        store_account(position_info, &position)?;
        total = total.checked_add(outcome.amount).ok_or(VeError::MathOverflow)?;

        msg!(
            "Lock #{} claimed {} rebase through epoch {}",
            id,
            outcome.amount,
            outcome.cursor
        );
        emit!(RebaseClaimed {
            position: position_info.key(),
            id,
            amount: outcome.amount,
            compounded: outcome.compounded,
            claimed_through: outcome.cursor,
        });
    }

    msg!("Claimed {} rebase across {} locks", total, ids.len());

    Ok(total)
}

/// Rebase `position` could claim from the records passed in
/// `remaining_accounts`.
pub fn claimable_handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, ClaimableQuery<'info>>,
) -> Result<u64> {
    let position = &ctx.accounts.position;
    let records = load_records(&ctx.accounts.distributor.key(), ctx.remaining_accounts)?;
    let pending = RebaseDistributor::pending(position, &records);
    let (amount, _) = ctx.accounts.distributor.claimable(position, &pending)?;
    msg!("Lock #{} claimable rebase: {}", position.id, amount);
    Ok(amount)
}
