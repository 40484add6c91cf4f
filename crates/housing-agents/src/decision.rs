//! Decision engine: each participant picks Stay, Upgrade, or Buy.
//!
//! Every participant scores three options against the same read-only view
//! of the market:
//!
//! 1. **Stay** -- satisfaction with the current home, no extra costs.
//! 2. **Upgrade** -- satisfaction with the current home one rating step
//!    higher, minus the renovation cost. Only reachable when savings exceed
//!    the renovation cost and the home is below the top rating.
//! 3. **Buy** -- the best-scoring affordable vacant asset, minus the moving
//!    cost. An asset is affordable when its market value does not exceed
//!    savings plus mortgage capacity.
//!
//! Unreachable options are `None` and lose to any score.
//!
//! # Tie-breaks
//!
//! - Buy wins only when strictly better than both Upgrade and Stay, and
//!   Upgrade only when strictly better than Stay. Equal scores resolve to
//!   the less disruptive option: Stay, then Upgrade, then Buy.
//! - Among equally scored purchase candidates the lowest [`AssetId`] wins.
//!
//! Nothing in this module mutates the market; [`decide_all`] takes a shared
//! borrow, so all participants see the same pre-tick state.

use std::collections::BTreeMap;

use housing_types::{AssetId, Intention, Participant, ParticipantId};
use housing_world::Market;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::MarketConfig;
use crate::error::AgentError;
use crate::utility::{self, ProjectedCosts};

/// The best purchase a participant found this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuyOption {
    /// The vacant asset to bid on.
    pub asset: AssetId,
    /// Satisfaction after moving in.
    pub score: Decimal,
}

/// The scored options and chosen intention for one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// The participant evaluated.
    pub participant: ParticipantId,
    /// Satisfaction with staying put.
    pub stay: Decimal,
    /// Satisfaction after renovating, if renovation is possible.
    pub upgrade: Option<Decimal>,
    /// Best affordable purchase, if any.
    pub buy: Option<BuyOption>,
    /// The selected intention.
    pub intention: Intention,
}

/// Score all three options for one participant and select an intention.
///
/// # Errors
///
/// Returns [`AgentError::HomeNotFound`] if the participant's home is not in
/// the market, or [`AgentError::ArithmeticOverflow`] from scoring.
pub fn evaluate(
    config: &MarketConfig,
    market: &Market,
    participant: &Participant,
) -> Result<Evaluation, AgentError> {
    let home = market
        .asset(participant.asset)
        .ok_or(AgentError::HomeNotFound {
            participant: participant.id,
            asset: participant.asset,
        })?;

    let stay = utility::satisfaction(config, participant, home, ProjectedCosts::default())?;

    let upgrade = if participant.savings > config.upgrade_cost && !home.has_max_rating() {
        let costs = ProjectedCosts {
            upgrade_cost: config.upgrade_cost,
            moving_cost: Decimal::ZERO,
            bonus_rating: config.rating_step,
        };
        Some(utility::satisfaction(config, participant, home, costs)?)
    } else {
        None
    };

    let buy = best_purchase(config, market, participant)?;
    let intention = select_intention(stay, upgrade, buy);

    debug!(
        participant = %participant.id,
        stay = %stay,
        upgrade = ?upgrade,
        buy = ?buy.map(|b| b.score),
        intention = intention.label(),
        "Participant evaluated"
    );

    Ok(Evaluation {
        participant: participant.id,
        stay,
        upgrade,
        buy,
        intention,
    })
}

/// Find the highest-scoring vacant asset the participant can afford.
///
/// Candidates are scanned in ascending ID order and only a strictly better
/// score replaces the current best, so ties keep the lowest ID.
///
/// # Errors
///
/// Returns [`AgentError::ArithmeticOverflow`] from capacity or scoring.
pub fn best_purchase(
    config: &MarketConfig,
    market: &Market,
    participant: &Participant,
) -> Result<Option<BuyOption>, AgentError> {
    let capacity = utility::financial_capacity(config, participant)?;
    let mut best: Option<BuyOption> = None;

    for candidate in market.vacant_assets() {
        if candidate.market_value > capacity {
            continue;
        }
        let costs = ProjectedCosts {
            upgrade_cost: Decimal::ZERO,
            moving_cost: config.moving_cost(candidate.market_value)?,
            bonus_rating: 0,
        };
        let score = utility::satisfaction(config, participant, candidate, costs)?;
        if best.is_none_or(|b| score > b.score) {
            best = Some(BuyOption {
                asset: candidate.id,
                score,
            });
        }
    }

    Ok(best)
}

/// Pick the intention from the three scores.
pub fn select_intention(
    stay: Decimal,
    upgrade: Option<Decimal>,
    buy: Option<BuyOption>,
) -> Intention {
    if let Some(option) = buy {
        let beats_upgrade = upgrade.is_none_or(|u| option.score > u);
        if beats_upgrade && option.score > stay {
            return Intention::Buy {
                target: option.asset,
            };
        }
    }
    match upgrade {
        Some(score) if score > stay => Intention::Upgrade,
        _ => Intention::Stay,
    }
}

/// Evaluate every participant against the same market state.
///
/// Results are keyed by participant ID. The caller writes the intentions
/// back once all evaluations are done.
///
/// # Errors
///
/// Returns the first [`AgentError`] raised by [`evaluate`].
pub fn decide_all(
    config: &MarketConfig,
    market: &Market,
) -> Result<BTreeMap<ParticipantId, Evaluation>, AgentError> {
    market
        .participants()
        .map(|p| evaluate(config, market, p).map(|e| (p.id, e)))
        .collect()
}
