//! Read-only escrow queries, returned to the caller as instruction data.

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::state::{Escrow, Position};
use crate::utils::load_account;

#[derive(Accounts)]
pub struct EscrowQuery<'info> {
    #[account(
        seeds = [ESCROW_SEED, escrow.base_mint.as_ref()],
        bump = escrow.bump
    )]
    pub escrow: Account<'info, Escrow>,
}

#[derive(Accounts)]
pub struct PositionQuery<'info> {
    #[account(
        seeds = [POSITION_SEED, position.escrow.as_ref(), &position.id.to_le_bytes()],
        bump = position.bump
    )]
    pub position: Account<'info, Position>,
}

/// Accounts for `owner_of`, which accepts ids that were never minted.
#[derive(Accounts)]
#[instruction(id: u64)]
pub struct OwnerQuery<'info> {
    #[account(
        seeds = [ESCROW_SEED, escrow.base_mint.as_ref()],
        bump = escrow.bump
    )]
    pub escrow: Account<'info, Escrow>,

    /// CHECK: address is pinned to the position PDA for `id`; it may be empty
    #[account(
        seeds = [POSITION_SEED, escrow.key().as_ref(), &id.to_le_bytes()],
        bump
    )]
    pub position: UncheckedAccount<'info>,
}

pub fn balance_of_handler(ctx: Context<PositionQuery>, timestamp: i64) -> Result<u64> {
    let balance = ctx.accounts.position.balance_at(timestamp)?;
    msg!("Lock #{} power at {}: {}", ctx.accounts.position.id, timestamp, balance);
    Ok(balance)
}

pub fn total_supply_handler(ctx: Context<EscrowQuery>, timestamp: i64) -> Result<u64> {
    let supply = ctx.accounts.escrow.total_supply_at(timestamp)?;
    msg!("Total voting power at {}: {}", timestamp, supply);
    Ok(supply)
}

/// Owner of position `id`, or the default key if it was never created or
/// has been withdrawn.
pub fn owner_of_handler(ctx: Context<OwnerQuery>, id: u64) -> Result<Pubkey> {
    let info = ctx.accounts.position.to_account_info();
    if info.data_is_empty() {
        return Ok(Pubkey::default());
    }
    let position: Position = load_account(&info)?;
    msg!("Lock #{} owner: {}", id, position.owner);
    Ok(position.owner)
}
