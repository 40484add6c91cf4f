//! Market metrics and a per-tick time-series collector.
//!
//! [`MarketMetrics::collect`] reads a market and reduces it to a handful of
//! aggregate figures. [`MetricsCollector`] is a [`TickCallback`] that stores
//! one [`MetricsRow`] per tick so a run can be inspected afterwards.

use housing_world::Market;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::runner::TickCallback;
use crate::tick::{SimulationState, TickSummary};

/// Aggregate figures for one market state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MarketMetrics {
    /// Mean energy rating over owned assets (0 when nothing is owned).
    pub average_rating: Decimal,
    /// Number of vacant assets.
    pub vacant: usize,
    /// Number of owned assets.
    pub owned: usize,
    /// Mean participant savings (0 with no participants).
    pub mean_savings: Decimal,
    /// Participants whose savings are below zero.
    pub in_debt: usize,
}

impl MarketMetrics {
    /// Reduce a market to its aggregate figures.
    pub fn collect(market: &Market) -> Self {
        let mut rating_sum = Decimal::ZERO;
        let mut owned: usize = 0;
        for asset in market.assets().filter(|a| a.is_owned()) {
            rating_sum = rating_sum.saturating_add(Decimal::from(asset.energy_rating));
            owned = owned.saturating_add(1);
        }

        let mut savings_sum = Decimal::ZERO;
        let mut in_debt: usize = 0;
        for participant in market.participants() {
            savings_sum = savings_sum.saturating_add(participant.savings);
            if participant.is_in_debt() {
                in_debt = in_debt.saturating_add(1);
            }
        }

        Self {
            average_rating: mean(rating_sum, owned),
            vacant: market.vacant_count(),
            owned,
            mean_savings: mean(savings_sum, market.participant_count()),
            in_debt,
        }
    }
}

fn mean(sum: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    sum.checked_div(Decimal::from(count))
        .unwrap_or(Decimal::ZERO)
}

/// One entry of the metrics time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsRow {
    /// Tick the row was taken after (0 for the initial market).
    pub tick: u64,
    /// Sales completed during the tick.
    pub sales: usize,
    /// Renovations applied during the tick.
    pub upgrades: usize,
    /// Market figures at the end of the tick.
    pub metrics: MarketMetrics,
}

/// Records a [`MetricsRow`] after every tick.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    rows: Vec<MetricsRow>,
}

impl MetricsCollector {
    /// Create an empty collector.
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Record the state before the first tick as row 0.
    pub fn record_initial(&mut self, state: &SimulationState) {
        self.rows.push(MetricsRow {
            tick: state.tick,
            sales: 0,
            upgrades: 0,
            metrics: MarketMetrics::collect(&state.market),
        });
    }

    /// All rows in recording order.
    pub fn rows(&self) -> &[MetricsRow] {
        &self.rows
    }

    /// The most recent row.
    pub fn latest(&self) -> Option<&MetricsRow> {
        self.rows.last()
    }

    /// Average owned-asset rating per recorded row.
    pub fn average_rating_series(&self) -> Vec<Decimal> {
        self.rows.iter().map(|r| r.metrics.average_rating).collect()
    }
}

impl TickCallback for MetricsCollector {
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState) {
        self.rows.push(MetricsRow {
            tick: summary.tick,
            sales: summary.sales.len(),
            upgrades: summary.upgrades.len(),
            metrics: MarketMetrics::collect(&state.market),
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use housing_agents::MarketConfig;
    use housing_types::{Asset, AssetId, Participant, ParticipantId};
    use rust_decimal_macros::dec;

    use super::*;

    fn market() -> Market {
        let mut market = Market::new();
        let a = Asset::new(AssetId::new(), 2, 100, dec!(0.5), dec!(100000));
        let b = Asset::new(AssetId::new(), 5, 100, dec!(0.5), dec!(100000));
        let c = Asset::new(AssetId::new(), 7, 100, dec!(0.5), dec!(100000));
        let (a_id, b_id) = (a.id, b.id);
        for asset in [a, b, c] {
            market.add_asset(asset).unwrap();
        }
        market
            .add_participant(Participant::new(ParticipantId::new(), dec!(1), dec!(3000), a_id))
            .unwrap();
        market
            .add_participant(Participant::new(ParticipantId::new(), dec!(1), dec!(-1000), b_id))
            .unwrap();
        market
    }

    #[test]
    fn collect_averages_owned_assets_only() {
        let m = MarketMetrics::collect(&market());
        assert_eq!(m.average_rating, dec!(3.5));
        assert_eq!(m.owned, 2);
        assert_eq!(m.vacant, 1);
        assert_eq!(m.mean_savings, dec!(1000));
        assert_eq!(m.in_debt, 1);
    }

    #[test]
    fn empty_market_is_all_zero() {
        assert_eq!(MarketMetrics::collect(&Market::new()), MarketMetrics::default());
    }

    #[test]
    fn collector_records_one_row_per_call() {
        let state = SimulationState::new(market(), MarketConfig::default());
        let mut collector = MetricsCollector::new();
        collector.record_initial(&state);
        let summary = TickSummary {
            tick: 1,
            ..TickSummary::default()
        };
        collector.on_tick(&summary, &state);

        assert_eq!(collector.rows().len(), 2);
        assert_eq!(collector.latest().map(|r| r.tick), Some(1));
        assert_eq!(collector.average_rating_series(), vec![dec!(3.5), dec!(3.5)]);
    }
}
