//! Setup instruction handlers.
//!
//! `create_escrow` opens the ledger and the minter for a base token;
//! `create_voter` adds the voter and the rebase distributor and wires both
//! into the minter.

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::VeError;
use crate::state::{Escrow, EmissionParams, Minter, MinterState, RebaseDistributor, Voter};

/// Accounts required to create the escrow and its minter.
///
/// ## Security Notes
/// - Every vault is a PDA whose token authority is its owning program account
/// - The escrow PDA is unique per base mint
#[derive(Accounts)]
pub struct CreateEscrow<'info> {
    /// Becomes the escrow and minter authority.
    #[account(mut)]
    pub authority: Signer<'info>,

    /// The token being locked and emitted.
    pub base_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = authority,
        space = Escrow::LEN,
        seeds = [ESCROW_SEED, base_mint.key().as_ref()],
        bump
    )]
    pub escrow: Account<'info, Escrow>,

    /// Holds every locked amount.
    #[account(
        init,
        payer = authority,
        seeds = [ESCROW_VAULT_SEED, escrow.key().as_ref()],
        bump,
        token::mint = base_mint,
        token::authority = escrow
    )]
    pub escrow_vault: Account<'info, TokenAccount>,

    #[account(
        init,
        payer = authority,
        space = Minter::LEN,
        seeds = [MINTER_SEED, escrow.key().as_ref()],
        bump
    )]
    pub minter: Account<'info, Minter>,

    /// Holds minted supply until it is routed onwards.
    #[account(
        init,
        payer = authority,
        seeds = [MINTER_VAULT_SEED, minter.key().as_ref()],
        bump,
        token::mint = base_mint,
        token::authority = minter
    )]
    pub minter_vault: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn create_escrow_handler(ctx: Context<CreateEscrow>, params: EmissionParams) -> Result<()> {
    params.validate()?;

    let clock = Clock::get()?;
    let escrow_key = ctx.accounts.escrow.key();
    let authority = ctx.accounts.authority.key();
    let base_mint = ctx.accounts.base_mint.key();

    ctx.accounts.escrow.init(
        authority,
        base_mint,
        ctx.accounts.escrow_vault.key(),
        clock.unix_timestamp,
        ctx.bumps.escrow,
        ctx.bumps.escrow_vault,
    );

    let minter = &mut ctx.accounts.minter;
    minter.authority = authority;
    minter.escrow = escrow_key;
    minter.base_mint = base_mint;
    minter.vault = ctx.accounts.minter_vault.key();
    minter.voter = Pubkey::default();
    minter.distributor = Pubkey::default();
    minter.state = MinterState::Uninitialized;
    minter.weekly = 0;
    minter.active_period = 0;
    minter.epoch_count = 0;
    minter.total_emitted = 0;
    minter.params = params;
    minter.created_at = clock.unix_timestamp;
    minter.bump = ctx.bumps.minter;
    minter.vault_bump = ctx.bumps.minter_vault;

    msg!("Escrow created for mint {}", base_mint);
    msg!("Authority: {}", authority);
    msg!(
        "Emission params - decay: {}bp, tail: {}bp, growth cap: {}bp, min weekly: {}",
        params.decay_bps,
        params.tail_bps,
        params.growth_cap_bps,
        params.min_weekly
    );

    Ok(())
}

/// Accounts required to create the voter and the rebase distributor.
#[derive(Accounts)]
pub struct CreateVoter<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        seeds = [ESCROW_SEED, escrow.base_mint.as_ref()],
        bump = escrow.bump,
        has_one = authority @ VeError::Unauthorized,
        has_one = base_mint
    )]
    pub escrow: Account<'info, Escrow>,

    #[account(
        mut,
        seeds = [MINTER_SEED, escrow.key().as_ref()],
        bump = minter.bump,
        has_one = escrow
    )]
    pub minter: Account<'info, Minter>,

    pub base_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = authority,
        space = Voter::LEN,
        seeds = [VOTER_SEED, escrow.key().as_ref()],
        bump
    )]
    pub voter: Account<'info, Voter>,

    #[account(
        init,
        payer = authority,
        seeds = [VOTER_VAULT_SEED, voter.key().as_ref()],
        bump,
        token::mint = base_mint,
        token::authority = voter
    )]
    pub voter_vault: Account<'info, TokenAccount>,

    #[account(
        init,
        payer = authority,
        space = RebaseDistributor::LEN,
        seeds = [DISTRIBUTOR_SEED, escrow.key().as_ref()],
        bump
    )]
    pub distributor: Account<'info, RebaseDistributor>,

    #[account(
        init,
        payer = authority,
        seeds = [DISTRIBUTOR_VAULT_SEED, distributor.key().as_ref()],
        bump,
        token::mint = base_mint,
        token::authority = distributor
    )]
    pub distributor_vault: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn create_voter_handler(ctx: Context<CreateVoter>) -> Result<()> {
    let escrow_key = ctx.accounts.escrow.key();
    let voter_key = ctx.accounts.voter.key();
    let distributor_key = ctx.accounts.distributor.key();

    let voter = &mut ctx.accounts.voter;
    voter.authority = ctx.accounts.authority.key();
    voter.escrow = escrow_key;
    voter.emission_mint = ctx.accounts.base_mint.key();
    voter.vault = ctx.accounts.voter_vault.key();
    voter.gauge_count = 0;
    voter.carried_emission = 0;
    voter.total_distributed = 0;
    voter.last_recorded_epoch = 0;
    voter.bump = ctx.bumps.voter;
    voter.vault_bump = ctx.bumps.voter_vault;

    let distributor = &mut ctx.accounts.distributor;
    distributor.escrow = escrow_key;
    distributor.vault = ctx.accounts.distributor_vault.key();
    distributor.latest_epoch = 0;
    distributor.total_allocated = 0;
    distributor.total_claimed = 0;
    distributor.bump = ctx.bumps.distributor;
    distributor.vault_bump = ctx.bumps.distributor_vault;

    let minter = &mut ctx.accounts.minter;
    minter.voter = voter_key;
    minter.distributor = distributor_key;

    msg!("Voter created: {}", voter_key);
    msg!("Rebase distributor created: {}", distributor_key);

    Ok(())
}
