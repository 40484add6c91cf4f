//! Shared type definitions for the housing market simulation.
//!
//! Every crate in the workspace speaks in these types.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for assets and participants
//! - [`enums`] -- [`Intention`] and [`BalancePolicy`]
//! - [`structs`] -- [`Asset`] and [`Participant`] entities

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{BalancePolicy, Intention};
pub use ids::{AssetId, ParticipantId};
pub use structs::{Asset, MAX_ENERGY_RATING, Participant};
