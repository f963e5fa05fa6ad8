//! Initialize instruction handler.
//!
//! One-time minter activation: mints the initial supply, locks each
//! recipient's allocation for the maximum duration and starts the epoch clock.
//!
//! ## Security Guarantees
//! - Only the minter authority can call this, and only once
//! - The base mint's authority must already be the minter PDA
//! - Position accounts in `remaining_accounts` are checked against their PDAs
//!   before being created

use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_option::COption;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::VeError;
use crate::events::LockCreated;
use crate::state::{Escrow, Minter, Position};
use crate::utils::{create_pda_account, mint_tokens, store_account, transfer_tokens};

/// Accounts required for minter initialization.
///
/// ## Remaining accounts
/// One empty, writable position PDA per recipient, for ids
/// `escrow.next_position_id`, `+1`, ... in recipient order.
#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [MINTER_SEED, escrow.key().as_ref()],
        bump = minter.bump,
        has_one = authority @ VeError::Unauthorized,
        has_one = escrow @ VeError::InvalidAccount,
        has_one = base_mint @ VeError::InvalidAccount
    )]
    pub minter: Box<Account<'info, Minter>>,

    #[account(
        mut,
        seeds = [ESCROW_SEED, escrow.base_mint.as_ref()],
        bump = escrow.bump
    )]
    pub escrow: Box<Account<'info, Escrow>>,

    /// SECURITY: mint authority must be the minter PDA.
    #[account(
        mut,
        constraint = base_mint.mint_authority == COption::Some(minter.key()) @ VeError::InvalidAccount
    )]
    pub base_mint: Box<Account<'info, Mint>>,

    #[account(
        mut,
        constraint = minter_vault.key() == minter.vault @ VeError::InvalidAccount
    )]
    pub minter_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = escrow_vault.key() == escrow.vault @ VeError::InvalidAccount
    )]
    pub escrow_vault: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

/// Activate the minter.
///
/// # Arguments
/// * `recipients` - Owners of the initial locks
/// * `amounts` - Amount locked for each recipient, for `MAXLOCK`
/// * `initial_supply` - Tokens minted to the minter vault, also the first weekly amount
pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Initialize<'info>>,
    recipients: Vec<Pubkey>,
    amounts: Vec<u64>,
    initial_supply: u64,
) -> Result<()> {
    require!(!ctx.accounts.minter.is_active(), VeError::AlreadyInitialized);
    require!(recipients.len() == amounts.len(), VeError::LengthMismatch);
    require!(
        ctx.remaining_accounts.len() == recipients.len(),
        VeError::InvalidAccount
    );

    let locked_total = amounts
        .iter()
        .try_fold(0u64, |sum, amount| sum.checked_add(*amount))
        .ok_or(VeError::MathOverflow)?;
    require!(locked_total <= initial_supply, VeError::InsufficientBalance);

    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    let minter = &ctx.accounts.minter;
    let escrow_key = minter.escrow;
    let minter_seeds = &[MINTER_SEED, escrow_key.as_ref(), &[minter.bump]];
    let minter_signer = &[&minter_seeds[..]];
    let token_program = ctx.accounts.token_program.to_account_info();
    let minter_info = ctx.accounts.minter.to_account_info();

    mint_tokens(
        &token_program,
        &ctx.accounts.base_mint.to_account_info(),
        &ctx.accounts.minter_vault.to_account_info(),
        &minter_info,
        minter_signer,
        initial_supply,
    )?;

    let payer = ctx.accounts.authority.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();

    for ((recipient, amount), position_info) in recipients
        .iter()
        .zip(amounts.iter())
        .zip(ctx.remaining_accounts.iter())
    {
        let id = ctx.accounts.escrow.next_position_id;
        let id_bytes = id.to_le_bytes();
        let bump = create_pda_account(
            &payer,
            position_info,
            &system_program,
            Position::LEN,
            &[POSITION_SEED, escrow_key.as_ref(), &id_bytes],
        )?;

        let mut position = Position::default();
        ctx.accounts.escrow.create_lock(
            &mut position,
            escrow_key,
            *recipient,
            *amount,
            MAXLOCK,
            now,
            bump,
        )?;
        store_account(position_info, &position)?;

        msg!("Initial lock #{}: {} for {}", id, amount, recipient);
        emit!(LockCreated {
            escrow: escrow_key,
            position: position_info.key(),
            id,
            owner: *recipient,
            amount: *amount,
            unlock_time: position.unlock_time,
        });
    }

    transfer_tokens(
        &token_program,
        &ctx.accounts.minter_vault.to_account_info(),
        &ctx.accounts.escrow_vault.to_account_info(),
        &minter_info,
        minter_signer,
        locked_total,
    )?;

    ctx.accounts.minter.activate(initial_supply, now)?;

    msg!("Minter initialized with supply {}", initial_supply);
    msg!(
        "Locked {} across {} positions, {} left in the minter vault",
        locked_total,
        recipients.len(),
        initial_supply - locked_total
    );
    msg!("Active period: {}", ctx.accounts.minter.active_period);

    Ok(())
}
