//! Tick cycle, simulation driver, configuration, and metrics for the
//! housing market simulation.
//!
//! This crate owns the per-tick sequence Decision, Clearing, Renovation,
//! Reset, and Verify, and the loop that repeats it.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `housing-config.yaml` into
//!   strongly-typed structs.
//! - [`metrics`] -- Aggregate market figures and the per-tick
//!   [`MetricsCollector`](metrics::MetricsCollector).
//! - [`runner`] -- Bounded tick loop with a [`TickCallback`] hook.
//! - [`tick`] -- A single tick of the engine loop.
//!
//! [`TickCallback`]: runner::TickCallback

pub mod config;
pub mod metrics;
pub mod runner;
pub mod tick;
