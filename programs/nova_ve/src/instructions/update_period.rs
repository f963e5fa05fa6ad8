//! Update period instruction handler.
//!
//! Permissionless weekly tick. Inside an epoch that has already been
//! processed it only returns the current weekly amount. Otherwise it:
//! 1. checkpoints the escrow
//! 2. computes the new weekly emission and the rebase growth
//! 3. mints whatever the minter vault is short
//! 4. records the rebase for the new epoch with the distributor
//! 5. hands the weekly emission to the voter for the epoch just closed
//!
//! `epoch_votes` (closed epoch) and `rebase_epoch` (new epoch) are created
//! here when missing, so callers pass their derived addresses.

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::VeError;
use crate::events::PeriodUpdated;
use crate::state::{mint_shortfall, EpochVotes, Escrow, Minter, RebaseDistributor, RebaseEpoch, Voter};
use crate::utils::{create_pda_account, load_account, mint_tokens, store_account, transfer_tokens};

#[derive(Accounts)]
pub struct UpdatePeriod<'info> {
    /// Pays rent for the records created by this tick.
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        mut,
        seeds = [MINTER_SEED, escrow.key().as_ref()],
        bump = minter.bump,
        has_one = escrow @ VeError::InvalidAccount,
        has_one = base_mint @ VeError::InvalidAccount,
        has_one = voter @ VeError::InvalidAccount,
        has_one = distributor @ VeError::InvalidAccount
    )]
    pub minter: Box<Account<'info, Minter>>,

    #[account(
        mut,
        seeds = [ESCROW_SEED, escrow.base_mint.as_ref()],
        bump = escrow.bump
    )]
    pub escrow: Box<Account<'info, Escrow>>,

    #[account(mut)]
    pub base_mint: Box<Account<'info, Mint>>,

    #[account(
        mut,
        constraint = minter_vault.key() == minter.vault @ VeError::InvalidAccount
    )]
    pub minter_vault: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub voter: Box<Account<'info, Voter>>,

    #[account(
        mut,
        constraint = voter_vault.key() == voter.vault @ VeError::InvalidAccount
    )]
    pub voter_vault: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub distributor: Box<Account<'info, RebaseDistributor>>,

    #[account(
        mut,
        constraint = distributor_vault.key() == distributor.vault @ VeError::InvalidAccount
    )]
    pub distributor_vault: Box<Account<'info, TokenAccount>>,

    /// CHECK: vote totals of the closed epoch; address verified in the handler
    #[account(mut)]
    pub epoch_votes: UncheckedAccount<'info>,

    /// CHECK: rebase record of the new epoch; address verified in the handler
    #[account(mut)]
    pub rebase_epoch: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

/// Advance the emission schedule if a new epoch has started.
///
/// # Returns
/// The weekly emission in effect after the call
pub fn handler(ctx: Context<UpdatePeriod>) -> Result<u64> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    ctx.accounts.escrow.checkpoint(now)?;
    let ve_supply = ctx.accounts.escrow.total_supply_at(now)?;
    let token_supply = ctx.accounts.base_mint.supply;

    let emission = match ctx.accounts.minter.advance_period(now, token_supply, ve_supply)? {
        Some(emission) => emission,
        None => {
            msg!(
                "Period {} still active, weekly {}",
                ctx.accounts.minter.active_period,
                ctx.accounts.minter.weekly
            );
            return Ok(ctx.accounts.minter.weekly);
        }
    };

    let minter = &ctx.accounts.minter;
    let escrow_key = minter.escrow;
    let minter_seeds = &[MINTER_SEED, escrow_key.as_ref(), &[minter.bump]];
    let minter_signer = &[&minter_seeds[..]];
    let token_program = ctx.accounts.token_program.to_account_info();
    let minter_info = ctx.accounts.minter.to_account_info();

    let minted = mint_shortfall(emission.total()?, ctx.accounts.minter_vault.amount);
    mint_tokens(
        &token_program,
        &ctx.accounts.base_mint.to_account_info(),
        &ctx.accounts.minter_vault.to_account_info(),
        &minter_info,
        minter_signer,
        minted,
    )?;

    // Rebase for the epoch that just opened.
    transfer_tokens(
        &token_program,
        &ctx.accounts.minter_vault.to_account_info(),
        &ctx.accounts.distributor_vault.to_account_info(),
        &minter_info,
        minter_signer,
        emission.growth,
    )?;

    let payer = ctx.accounts.payer.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();
    let distributor_key = ctx.accounts.distributor.key();
    let period_bytes = emission.period.to_le_bytes();
    let rebase_info = ctx.accounts.rebase_epoch.to_account_info();
    let record_bump = create_pda_account(
        &payer,
        &rebase_info,
        &system_program,
        RebaseEpoch::LEN,
        &[REBASE_EPOCH_SEED, distributor_key.as_ref(), &period_bytes],
    )?;
    let mut record = RebaseEpoch::default();
    let epoch_supply = ctx.accounts.escrow.supply_at_epoch(emission.period)?;
    ctx.accounts.distributor.checkpoint(
        &mut record,
        distributor_key,
        emission.period,
        emission.growth,
        epoch_supply,
        record_bump,
    )?;
    store_account(&rebase_info, &record)?;

    // Weekly emission follows the votes of the closed epoch.
    transfer_tokens(
        &token_program,
        &ctx.accounts.minter_vault.to_account_info(),
        &ctx.accounts.voter_vault.to_account_info(),
        &minter_info,
        minter_signer,
        emission.weekly,
    )?;

    let voter_key = ctx.accounts.voter.key();
    let closed_bytes = emission.closed_epoch.to_le_bytes();
    let votes_info = ctx.accounts.epoch_votes.to_account_info();
    let mut epoch_votes = if votes_info.data_is_empty() {
        let bump = create_pda_account(
            &payer,
            &votes_info,
            &system_program,
            EpochVotes::LEN,
            &[EPOCH_VOTES_SEED, voter_key.as_ref(), &closed_bytes],
        )?;
        EpochVotes {
            voter: voter_key,
            epoch: emission.closed_epoch,
            bump,
            ..Default::default()
        }
    } else {
        let (expected, _) = EpochVotes::address(&voter_key, emission.closed_epoch);
        require_keys_eq!(votes_info.key(), expected, VeError::InvalidAccount);
        load_account::<EpochVotes>(&votes_info)?
    };
    let payable = ctx
        .accounts
        .voter
        .record_emission(&mut epoch_votes, emission.weekly)?;
    store_account(&votes_info, &epoch_votes)?;

    msg!(
        "Period {} opened: weekly {}, growth {}, minted {}",
        emission.period,
        emission.weekly,
        emission.growth,
        minted
    );
    msg!(
        "Epoch {} payable to gauges: {} (carried: {})",
        emission.closed_epoch,
        payable,
        ctx.accounts.voter.carried_emission
    );
    msg!("Rebase record: {} over ve supply {}", emission.growth, epoch_supply);

    emit!(PeriodUpdated {
        minter: ctx.accounts.minter.key(),
        period: emission.period,
        weekly: emission.weekly,
        growth: emission.growth,
        minted,
    });

    Ok(emission.weekly)
}
