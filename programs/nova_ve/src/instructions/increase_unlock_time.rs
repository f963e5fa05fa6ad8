//! Increase unlock time instruction handler.

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VeError;
use crate::events::LockExtended;
use crate::state::{Escrow, Position};

#[derive(Accounts)]
pub struct IncreaseUnlockTime<'info> {
    /// Owner or approved delegate of the position.
    pub signer: Signer<'info>,

    #[account(
        mut,
        seeds = [ESCROW_SEED, escrow.base_mint.as_ref()],
        bump = escrow.bump
    )]
    pub escrow: Account<'info, Escrow>,

    #[account(
        mut,
        seeds = [POSITION_SEED, escrow.key().as_ref(), &position.id.to_le_bytes()],
        bump = position.bump,
        has_one = escrow @ VeError::InvalidAccount
    )]
    pub position: Account<'info, Position>,
}

pub fn handler(ctx: Context<IncreaseUnlockTime>, new_unlock_time: i64) -> Result<()> {
    let clock = Clock::get()?;
    let signer = ctx.accounts.signer.key();
    let previous = ctx.accounts.position.unlock_time;

    ctx.accounts.escrow.increase_unlock_time(
        &mut ctx.accounts.position,
        &signer,
        new_unlock_time,
        clock.unix_timestamp,
    )?;

    let position = &ctx.accounts.position;
    msg!(
        "Lock #{} extended from {} to {}",
        position.id,
        previous,
        position.unlock_time
    );

    emit!(LockExtended {
        position: position.key(),
        id: position.id,
        unlock_time: position.unlock_time,
    });

    Ok(())
}
