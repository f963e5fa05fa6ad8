//! Withdraw instruction handler.
//!
//! Releases an expired lock to its owner and burns the position.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::error::VeError;
use crate::events::LockWithdrawn;
use crate::state::{Escrow, Position};
use crate::utils::transfer_tokens;

#[derive(Accounts)]
pub struct WithdrawLock<'info> {
    /// Owner or approved delegate of the position.
    pub signer: Signer<'info>,

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

    /// Receives the released tokens; must belong to the position owner.
    #[account(
        mut,
        constraint = owner_token_account.mint == escrow.base_mint @ VeError::InvalidAccount,
        constraint = owner_token_account.owner == position.owner @ VeError::Unauthorized
    )]
    pub owner_token_account: Account<'info, TokenAccount>,

    #[account(mut)]
    pub vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<WithdrawLock>) -> Result<()> {
    let clock = Clock::get()?;
    let signer = ctx.accounts.signer.key();
    let owner = ctx.accounts.position.owner;

    let amount = ctx
        .accounts
        .escrow
        .withdraw(&mut ctx.accounts.position, &signer, clock.unix_timestamp)?;

    let escrow = &ctx.accounts.escrow;
    let base_mint = escrow.base_mint;
    let seeds = &[ESCROW_SEED, base_mint.as_ref(), &[escrow.bump]];
    let signer_seeds = &[&seeds[..]];

    transfer_tokens(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.vault.to_account_info(),
        &ctx.accounts.owner_token_account.to_account_info(),
        &ctx.accounts.escrow.to_account_info(),
        signer_seeds,
        amount,
    )?;

    let position = &ctx.accounts.position;
    msg!("Withdrew {} tokens from lock #{}", amount, position.id);
    msg!("Total locked in escrow: {}", ctx.accounts.escrow.total_locked);

    emit!(LockWithdrawn {
        position: position.key(),
        id: position.id,
        owner,
        amount,
    });

    Ok(())
}
