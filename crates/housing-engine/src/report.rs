//! End-of-run reporting.
//!
//! Everything goes through `tracing`: one line per participant with their
//! home and balance, the metrics time series, and a JSON snapshot of the
//! final market at debug level.

use housing_core::metrics::MetricsCollector;
use housing_world::Market;
use tracing::{debug, info};

use crate::error::EngineError;

/// Log one line per participant describing where they ended up.
pub fn log_participants(market: &Market) {
    for participant in market.participants() {
        let home = market.home_of(participant.id);
        info!(
            participant = %participant.id,
            asset = %participant.asset,
            energy_rating = home.map(|a| a.energy_rating),
            market_value = home.map(|a| a.market_value.to_string()),
            savings = %participant.savings,
            in_debt = participant.is_in_debt(),
            "Participant final state"
        );
    }
}

/// Log the recorded metrics, one line per row.
pub fn log_metrics(collector: &MetricsCollector) {
    for row in collector.rows() {
        info!(
            tick = row.tick,
            average_rating = %row.metrics.average_rating,
            vacant = row.metrics.vacant,
            owned = row.metrics.owned,
            mean_savings = %row.metrics.mean_savings,
            in_debt = row.metrics.in_debt,
            sales = row.sales,
            upgrades = row.upgrades,
            "Metrics"
        );
    }
    if let Some(latest) = collector.latest() {
        info!(
            average_rating = %latest.metrics.average_rating,
            "Final average energy rating"
        );
    }
}

/// Dump the final market as JSON at debug level.
///
/// # Errors
///
/// Returns [`EngineError::Snapshot`] if serialization fails.
pub fn log_snapshot(market: &Market) -> Result<(), EngineError> {
    let snapshot = serde_json::to_string(market)?;
    debug!(snapshot = %snapshot, "Final market snapshot");
    Ok(())
}
