//! Market state, ownership mutations, and population seeding for the
//! housing market simulation.
//!
//! # Modules
//!
//! - [`error`] -- Error types for market operations.
//! - [`market`] -- [`Market`]: asset and participant tables, the vacancy
//!   pool, the move and upgrade mutations, and invariant checks.
//! - [`population`] -- Seeded generation of the initial market.

pub mod error;
pub mod market;
pub mod population;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use market::{Market, Relocation, UpgradeOutcome, UpgradeTerms, debit};
pub use population::{PopulationSpec, Span, generate_market};
