//! Error types for the NOVA vote-escrow program.
//!
//! This module defines all custom error codes that can be returned by the program.
//! Each error has a unique code and descriptive message.
//!
//! ## Error Code Ranges
//! - 6000-6005: Lock errors
//! - 6006-6009: Authorization and lifecycle errors
//! - 6010-6015: Voting errors
//! - 6016-6020: Gauge and balance errors
//! - 6021-6024: Epoch and rebase errors
//! - 6025-6026: Math and account validation errors
//! - 6027: Checkpoint retention errors

use anchor_lang::prelude::*;

/// Custom error codes for the NOVA vote-escrow program.
///
/// Error codes start at 6000 (Anchor's custom error offset).
#[error_code]
pub enum VeError {
    // ========== Lock Errors (6000-6005) ==========

    /// [6000] Lock duration is zero, negative, beyond MAXLOCK, or does not extend the lock.
    #[msg("Invalid lock duration")]
    InvalidDuration,

    /// [6001] The position's unlock time has already passed.
    #[msg("Lock has expired")]
    LockExpired,

    /// [6002] Withdrawal attempted before the unlock time.
    #[msg("Lock has not expired yet")]
    LockNotExpired,

    /// [6003] Cannot lock, deposit or stake a zero amount.
    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    /// [6004] The position was withdrawn and no longer has an owner.
    #[msg("Position has been withdrawn")]
    PositionBurned,

    /// [6005] A point-in-time query predates the retained checkpoint history.
    #[msg("Requested time predates retained checkpoint history")]
    CheckpointHistoryPruned,

    // ========== Authorization and Lifecycle Errors (6006-6009) ==========

    /// [6006] Signer is neither the owner nor the approved delegate.
    #[msg("Unauthorized: signer is not the owner or approved delegate")]
    Unauthorized,

    /// [6007] The minter has already run its one-time initialization.
    #[msg("Minter is already initialized")]
    AlreadyInitialized,

    /// [6008] The escrow is paused by its authority.
    #[msg("Escrow is paused")]
    EscrowPaused,

    /// [6009] Emission parameters are out of range.
    #[msg("Invalid emission parameters")]
    InvalidEmissionParams,

    // ========== Voting Errors (6010-6015) ==========

    /// [6010] The position has no voting power at the current time.
    #[msg("Position has no voting power")]
    ZeroVotingPower,

    /// [6011] Vote weights are empty, all zero, or reference a pool twice.
    #[msg("Invalid vote allocation")]
    InvalidVote,

    /// [6012] A vote references more pools than allowed.
    #[msg("Too many pools in one vote")]
    TooManyVotes,

    /// [6013] Pools and weights have different lengths.
    #[msg("Pools and weights length mismatch")]
    LengthMismatch,

    /// [6014] A gauge for this pool is already registered.
    #[msg("Gauge already exists for this pool")]
    GaugeExists,

    /// [6015] The gauge has been killed and no longer accepts votes.
    #[msg("Gauge is not alive")]
    GaugeNotAlive,

    // ========== Gauge and Balance Errors (6016-6020) ==========

    /// [6016] Withdraw, transfer or reward notification exceeds the available balance.
    #[msg("Insufficient balance for this operation")]
    InsufficientBalance,

    /// [6017] The token program rejected a transfer or mint.
    #[msg("Token transfer failed")]
    TransferFailed,

    /// [6018] The gauge already has the maximum number of reward streams.
    #[msg("Too many reward tokens for this gauge")]
    TooManyRewardTokens,

    /// [6019] The reward mint is already streamed by this gauge.
    #[msg("Reward token already registered")]
    RewardTokenExists,

    /// [6020] The reward stream index or mint is not registered on this gauge.
    #[msg("Unknown reward token")]
    UnknownRewardToken,

    // ========== Epoch and Rebase Errors (6021-6024) ==========

    /// [6021] The pool has already been paid for this epoch.
    #[msg("Emission already distributed to this pool for the epoch")]
    AlreadyDistributed,

    /// [6022] No emission has been recorded for this epoch yet.
    #[msg("No emission recorded for this epoch")]
    EmissionNotRecorded,

    /// [6023] The epoch is still open.
    #[msg("Epoch has not closed yet")]
    EpochNotClosed,

    /// [6024] Rebase records were supplied out of chain order or with a gap.
    #[msg("Rebase epoch records do not form a contiguous chain")]
    BrokenEpochChain,

    // ========== Math and Account Validation Errors (6025-6026) ==========

    /// [6025] Arithmetic overflow occurred during calculation.
    #[msg("Arithmetic overflow occurred during calculation")]
    MathOverflow,

    /// [6026] An account does not match its expected PDA, owner or mint.
    #[msg("Account does not match expected address")]
    InvalidAccount,

    // ========== Checkpoint Retention Errors (6027) ==========

    /// [6027] The position's checkpoint history is full and its oldest entry
    /// is still needed by an unclaimed rebase epoch.
    #[msg("Position checkpoint history is full until its rebase is claimed")]
    CheckpointHistoryFull,
}
