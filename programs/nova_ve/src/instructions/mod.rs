//! Instruction handlers for the NOVA ve-emission program.
//!
//! Grouped by component: escrow (locks and positions), voter and gauges,
//! rebase claims, minter, and admin.

pub mod admin;
pub mod claim_rebase;
pub mod create_gauge;
pub mod create_lock;
pub mod deposit_for;
pub mod distribute;
pub mod escrow_queries;
pub mod gauge_deposit;
pub mod gauge_withdraw;
pub mod get_reward;
pub mod increase_unlock_time;
pub mod initialize;
pub mod notify_reward;
pub mod ownership;
pub mod setup;
pub mod update_period;
pub mod vote;
pub mod withdraw;

pub use admin::*;
pub use claim_rebase::*;
pub use create_gauge::*;
pub use create_lock::*;
pub use deposit_for::*;
pub use distribute::*;
pub use escrow_queries::*;
pub use gauge_deposit::*;
pub use gauge_withdraw::*;
pub use get_reward::*;
pub use increase_unlock_time::*;
pub use initialize::*;
pub use notify_reward::*;
pub use ownership::*;
pub use setup::*;
pub use update_period::*;
pub use vote::*;
pub use withdraw::*;
