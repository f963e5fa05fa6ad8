//! Create lock instruction handler.
//!
//! Locks base tokens into a new position.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::error::VeError;
use crate::events::LockCreated;
use crate::state::{Escrow, Position};
use crate::utils::transfer_tokens;

/// Accounts required for creating a lock.
#[derive(Accounts)]
pub struct CreateLock<'info> {
    /// Pays for the position and becomes its owner.
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [ESCROW_SEED, escrow.base_mint.as_ref()],
        bump = escrow.bump,
        has_one = vault @ VeError::InvalidAccount
    )]
    pub escrow: Account<'info, Escrow>,

    /// The new position, keyed by the escrow's next id.
    #[account(
        init,
        payer = owner,
        space = Position::LEN,
        seeds = [POSITION_SEED, escrow.key().as_ref(), &escrow.next_position_id.to_le_bytes()],
        bump
    )]
    pub position: Account<'info, Position>,

    #[account(
        mut,
        constraint = owner_token_account.mint == escrow.base_mint @ VeError::InvalidAccount,
        constraint = owner_token_account.owner == owner.key() @ VeError::Unauthorized
    )]
    pub owner_token_account: Account<'info, TokenAccount>,

    /// Escrow vault receiving the locked tokens.
    #[account(mut)]
    pub vault: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

/// Lock `amount` for `duration` seconds, rounded down to the epoch boundary.
///
/// # Returns
/// The new position id
pub fn handler(ctx: Context<CreateLock>, amount: u64, duration: i64) -> Result<u64> {
    let clock = Clock::get()?;
    let escrow_key = ctx.accounts.escrow.key();
    let position_key = ctx.accounts.position.key();
    let owner = ctx.accounts.owner.key();

    let id = ctx.accounts.escrow.create_lock(
        &mut ctx.accounts.position,
        escrow_key,
        owner,
        amount,
        duration,
        clock.unix_timestamp,
        ctx.bumps.position,
    )?;

    transfer_tokens(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.owner_token_account.to_account_info(),
        &ctx.accounts.vault.to_account_info(),
        &ctx.accounts.owner.to_account_info(),
        &[],
        amount,
    )?;

    let position = &ctx.accounts.position;
    msg!(
        "Created lock #{}: {} tokens until {}",
        id,
        amount,
        position.unlock_time
    );
    msg!("Total locked in escrow: {}", ctx.accounts.escrow.total_locked);

    emit!(LockCreated {
        escrow: escrow_key,
        position: position_key,
        id,
        owner,
        amount,
        unlock_time: position.unlock_time,
    });

    Ok(id)
}
