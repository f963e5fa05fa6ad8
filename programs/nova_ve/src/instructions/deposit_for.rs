//! Deposit-for instruction handler.
//!
//! Anyone may top up a live lock; the unlock time does not move.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::error::VeError;
use crate::events::LockDeposited;
use crate::state::{Escrow, Position};
use crate::utils::transfer_tokens;

#[derive(Accounts)]
pub struct DepositFor<'info> {
    pub depositor: Signer<'info>,

    #[account(
        mut,
        seeds = [ESCROW_SEED, escrow.base_mint.as_ref()],
        bump = escrow.bump,
        has_one = vault @ VeError::InvalidAccount
    )]
    pub escrow: Account<'info, Escrow>,

    #[account(
        mut,
        seeds = [POSITION_SEED, escrow.key().as_ref(), &position.id.to_le_bytes()],
        bump = position.bump,
        has_one = escrow @ VeError::InvalidAccount
    )]
    pub position: Account<'info, Position>,

    #[account(
        mut,
        constraint = depositor_token_account.mint == escrow.base_mint @ VeError::InvalidAccount,
        constraint = depositor_token_account.owner == depositor.key() @ VeError::Unauthorized
    )]
    pub depositor_token_account: Account<'info, TokenAccount>,

    #[account(mut)]
    pub vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<DepositFor>, amount: u64) -> Result<()> {
    let clock = Clock::get()?;

    ctx.accounts
        .escrow
        .deposit_for(&mut ctx.accounts.position, amount, clock.unix_timestamp)?;

    transfer_tokens(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.depositor_token_account.to_account_info(),
        &ctx.accounts.vault.to_account_info(),
        &ctx.accounts.depositor.to_account_info(),
        &[],
        amount,
    )?;

    let position = &ctx.accounts.position;
    msg!("Deposited {} tokens into lock #{}", amount, position.id);
    msg!("Lock #{} now holds {}", position.id, position.locked);

    emit!(LockDeposited {
        position: position.key(),
        id: position.id,
        depositor: ctx.accounts.depositor.key(),
        amount,
        locked: position.locked,
    });

    Ok(())
}
