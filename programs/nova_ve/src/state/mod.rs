//! Account structures for the NOVA vote-escrow program.
//!
//! Each account keeps its state transitions in an `impl` block that takes
//! `now` explicitly, so instruction handlers stay thin and the logic can be
//! exercised without a validator.

pub mod distributor;
pub mod escrow;
pub mod gauge;
pub mod minter;
pub mod position;
pub mod voter;

pub use distributor::*;
pub use escrow::*;
pub use gauge::*;
pub use minter::*;
pub use position::*;
pub use voter::*;
