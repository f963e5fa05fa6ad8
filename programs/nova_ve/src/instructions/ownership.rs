//! Position ownership handlers: delegate approval and owner transfer.
//!
//! Both require the current owner's signature; a delegate cannot re-delegate
//! or move the position.

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::VeError;
use crate::state::Position;

#[derive(Accounts)]
pub struct PositionOwner<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [POSITION_SEED, position.escrow.as_ref(), &position.id.to_le_bytes()],
        bump = position.bump,
        constraint = !position.is_burned() @ VeError::PositionBurned,
        constraint = position.owner == owner.key() @ VeError::Unauthorized
    )]
    pub position: Account<'info, Position>,
}

/// Approve `delegate` to act on the position. `Pubkey::default()` clears it.
pub fn approve_handler(ctx: Context<PositionOwner>, delegate: Pubkey) -> Result<()> {
    let position = &mut ctx.accounts.position;
    position.delegate = delegate;

    msg!("Lock #{} delegate set to {}", position.id, delegate);

    Ok(())
}

/// Hand the position to `new_owner`, clearing any delegate.
pub fn transfer_position_handler(ctx: Context<PositionOwner>, new_owner: Pubkey) -> Result<()> {
    require!(new_owner != Pubkey::default(), VeError::InvalidAccount);

    let position = &mut ctx.accounts.position;
    let previous = position.owner;
    position.owner = new_owner;
    position.delegate = Pubkey::default();

    msg!(
        "Lock #{} transferred from {} to {}",
        position.id,
        previous,
        new_owner
    );

    Ok(())
}
