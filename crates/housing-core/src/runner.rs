//! Simulation loop runner.
//!
//! This module provides [`run_simulation`], which drives [`run_tick`] a
//! fixed number of times and hands every completed tick to a
//! [`TickCallback`]. A tick error stops the run immediately.
//!
//! [`run_tick`]: crate::tick::run_tick

use tracing::{info, warn};

use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
///
/// The callback gets read-only access to the state; observers cannot
/// influence the next tick.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Run `max_ticks` ticks.
///
/// With `max_ticks == 0` the state is left untouched.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick fails.
pub fn run_simulation(
    state: &mut SimulationState,
    max_ticks: u64,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut final_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks,
        participants = state.market.participant_count(),
        assets = state.market.asset_count(),
        "Simulation starting"
    );

    while total_ticks < max_ticks {
        let summary = tick::run_tick(state)?;
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary, state);
        final_summary = Some(summary);
    }

    Ok(SimulationResult {
        final_summary,
        total_ticks,
    })
}

/// Log the simulation end sequence.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            stay = summary.stay,
            upgrade = summary.upgrade,
            buy = summary.buy,
            sales = summary.sales.len(),
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}
