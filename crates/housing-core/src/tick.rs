//! Tick cycle: the engine loop that drives the housing market.
//!
//! Each tick runs through these phases:
//!
//! 1. **Decision** -- every participant scores Stay, Upgrade, and Buy
//!    against the same pre-tick market and the chosen intentions are
//!    written back.
//! 2. **Clearing** -- all Buy intentions are resolved at once and the
//!    winners move.
//! 3. **Renovation** -- every participant still intending to Upgrade
//!    renovates their home.
//! 4. **Reset** -- leftover Buy intentions (winners and outbid bidders)
//!    return to Stay.
//! 5. **Verify** -- ownership invariants are checked before the state is
//!    handed to observers.
//!
//! The tick cycle is deterministic given the same initial market.

use housing_agents::{AgentError, ClearingError, MarketConfig, Sale, clearing, decision};
use housing_types::{Intention, ParticipantId};
use housing_world::{Market, UpgradeOutcome, WorldError};
use tracing::{debug, info};

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The decision phase failed.
    #[error("decision error: {source}")]
    Decision {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// The clearing phase failed.
    #[error("clearing error: {source}")]
    Clearing {
        /// The underlying clearing error.
        #[from]
        source: ClearingError,
    },

    /// A renovation or invariant check failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Participants who chose to stay.
    pub stay: u32,
    /// Participants who chose to renovate.
    pub upgrade: u32,
    /// Participants who bid on a vacant asset.
    pub buy: u32,
    /// Completed sales in the order applied.
    pub sales: Vec<Sale>,
    /// Bidders who lost their contest and stayed.
    pub outbid: Vec<ParticipantId>,
    /// Renovations applied.
    pub upgrades: Vec<UpgradeOutcome>,
}

/// Intention tally for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntentionCounts {
    /// Stay intentions.
    pub stay: u32,
    /// Upgrade intentions.
    pub upgrade: u32,
    /// Buy intentions.
    pub buy: u32,
}

impl IntentionCounts {
    fn record(&mut self, intention: Intention) {
        let slot = match intention {
            Intention::Stay => &mut self.stay,
            Intention::Upgrade => &mut self.upgrade,
            Intention::Buy { .. } => &mut self.buy,
        };
        *slot = slot.saturating_add(1);
    }
}

/// The mutable simulation state passed through the tick cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationState {
    /// Number of ticks completed so far.
    pub tick: u64,
    /// Assets, participants, and the vacancy pool.
    pub market: Market,
    /// Parameters read by every phase.
    pub market_config: MarketConfig,
}

impl SimulationState {
    /// Wrap a freshly initialized market at tick 0.
    pub const fn new(market: Market, market_config: MarketConfig) -> Self {
        Self {
            tick: 0,
            market,
            market_config,
        }
    }
}

/// Execute one complete tick of the simulation.
///
/// # Errors
///
/// Returns [`TickError`] if any phase hits an unresolvable reference,
/// an arithmetic overflow, or an ownership invariant violation. The
/// market may be partially updated when that happens.
pub fn run_tick(state: &mut SimulationState) -> Result<TickSummary, TickError> {
    let tick = state.tick.saturating_add(1);
    info!(
        tick,
        participants = state.market.participant_count(),
        vacant = state.market.vacant_count(),
        "Tick started"
    );

    // --- Phase 1: Decision ---
    let evaluations = decision::decide_all(&state.market_config, &state.market)?;
    let mut counts = IntentionCounts::default();
    for (id, evaluation) in &evaluations {
        counts.record(evaluation.intention);
        state.market.set_intention(*id, evaluation.intention)?;
    }
    debug!(
        tick,
        stay = counts.stay,
        upgrade = counts.upgrade,
        buy = counts.buy,
        "Intentions recorded"
    );

    // --- Phase 2: Clearing ---
    let report = clearing::clear_market(&state.market_config, &mut state.market)?;

    // --- Phase 3: Renovation ---
    let renovators: Vec<ParticipantId> = state
        .market
        .participants()
        .filter(|p| p.intention == Intention::Upgrade)
        .map(|p| p.id)
        .collect();
    let terms = state.market_config.upgrade_terms();
    let mut upgrades = Vec::with_capacity(renovators.len());
    for id in renovators {
        upgrades.push(
            state
                .market
                .upgrade(id, &terms, state.market_config.balance_policy)?,
        );
    }

    // --- Phase 4: Reset ---
    state.market.reset_intentions();

    // --- Phase 5: Verify ---
    state.market.check_invariants()?;
    state.tick = tick;

    info!(
        tick,
        sales = report.sales.len(),
        outbid = report.outbid.len(),
        upgrades = upgrades.len(),
        "Tick completed"
    );

    Ok(TickSummary {
        tick,
        stay: counts.stay,
        upgrade: counts.upgrade,
        buy: counts.buy,
        sales: report.sales,
        outbid: report.outbid,
        upgrades,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use housing_types::{Asset, AssetId, Participant};
    use rust_decimal_macros::dec;

    use super::*;

    /// One renovator with a mediocre home and nothing for sale.
    fn upgrade_state() -> (SimulationState, ParticipantId, AssetId) {
        let mut market = Market::new();
        let home = Asset::new(AssetId::new(), 3, 90, dec!(0.5), dec!(120000));
        let home_id = home.id;
        market.add_asset(home).unwrap();
        let p = Participant::new(ParticipantId::new(), dec!(40000), dec!(10000), home_id);
        let id = p.id;
        market.add_participant(p).unwrap();
        (SimulationState::new(market, MarketConfig::default()), id, home_id)
    }

    #[test]
    fn tick_advances_counter() {
        let (mut state, _, _) = upgrade_state();
        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(state.tick, 1);
        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.tick, 2);
    }

    #[test]
    fn upgrade_applies_terms() {
        let (mut state, id, home) = upgrade_state();
        let summary = run_tick(&mut state).unwrap();

        assert_eq!(summary.upgrade, 1);
        assert_eq!(summary.upgrades.len(), 1);
        let p = state.market.participant(id).unwrap();
        let a = state.market.asset(home).unwrap();
        assert_eq!(p.savings, dec!(5000));
        assert_eq!(a.energy_rating, 4);
        assert_eq!(a.market_value, dec!(122000));
        assert_eq!(p.intention, Intention::Stay);
    }

    #[test]
    fn no_buy_intention_survives_a_tick() {
        let (mut state, _, _) = upgrade_state();
        let spare = Asset::new(AssetId::new(), 7, 100, dec!(0.95), dec!(100000));
        state.market.add_asset(spare).unwrap();

        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.buy, 1);
        assert_eq!(summary.sales.len(), 1);
        assert!(
            state
                .market
                .participants()
                .all(|p| p.intention == Intention::Stay)
        );
    }

    #[test]
    fn counts_cover_every_participant() {
        let (mut state, _, _) = upgrade_state();
        let summary = run_tick(&mut state).unwrap();
        let total = summary.stay + summary.upgrade + summary.buy;
        assert_eq!(usize::try_from(total).unwrap(), state.market.participant_count());
    }

    #[test]
    fn broken_market_aborts_tick() {
        let (mut state, _, home) = upgrade_state();

        // Flag the owned home vacant through serde, bypassing the mutators.
        let mut json = serde_json::to_value(&state.market).unwrap();
        let asset = json
            .get_mut("assets")
            .and_then(|a| a.get_mut(home.to_string()))
            .unwrap();
        *asset.get_mut("vacant").unwrap() = serde_json::Value::Bool(true);
        state.market = serde_json::from_value(json).unwrap();

        let result = run_tick(&mut state);
        assert!(matches!(result, Err(TickError::World { .. })));
        assert_eq!(state.tick, 0);
    }
}
