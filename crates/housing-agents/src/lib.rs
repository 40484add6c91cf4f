//! Utility model, decision engine, and market clearing for the housing
//! market simulation.
//!
//! This crate is the logic layer between `housing-types` (data) and
//! `housing-core` (tick orchestration). It reads the market to score and
//! choose intentions, and drives the market's mutations only through the
//! clearing phase.
//!
//! # Modules
//!
//! - [`clearing`] -- Bid grouping, winner selection, and move application
//! - [`config`] -- Tunable market parameters ([`MarketConfig`])
//! - [`decision`] -- Per-participant Stay / Upgrade / Buy selection
//! - [`error`] -- Error types ([`AgentError`])
//! - [`utility`] -- Normalization, capacity, and satisfaction scoring

pub mod clearing;
pub mod config;
pub mod decision;
pub mod error;
pub mod utility;

// Re-export primary types at crate root for convenience.
pub use clearing::{
    Award, Bid, ClearingError, ClearingOutcome, ClearingReport, Sale, clear_market, collect_bids,
    resolve_bids,
};
pub use config::MarketConfig;
pub use decision::{BuyOption, Evaluation, best_purchase, decide_all, evaluate, select_intention};
pub use error::AgentError;
pub use utility::{
    ProjectedCosts, financial_capacity, mortgage_capacity, normalize, satisfaction,
};
