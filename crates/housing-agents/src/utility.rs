//! Utility model: how satisfied a participant would be with an asset.
//!
//! Satisfaction is a weighted sum of three normalized terms:
//!
//! ```text
//! S = w_financial   * norm(savings - upgrade_cost - moving_cost, min_wealth, max_wealth)
//!   + w_environment * norm(min(rating + bonus_rating, 7), 0, 7)
//!   + w_comfort     * norm(quality, 0, max_quality)
//! ```
//!
//! Everything here is pure: no function reads or writes anything beyond its
//! arguments, so the decision engine can call it any number of times.

use housing_types::{Asset, MAX_ENERGY_RATING, Participant};
use rust_decimal::Decimal;

use crate::config::MarketConfig;
use crate::error::{AgentError, overflow};

/// Hypothetical changes to apply before scoring an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProjectedCosts {
    /// Renovation cost subtracted from savings.
    pub upgrade_cost: Decimal,
    /// Moving cost subtracted from savings.
    pub moving_cost: Decimal,
    /// Rating levels added to the asset (capped at the top of the scale).
    pub bonus_rating: u8,
}

/// Map `value` onto `[0, 1]` relative to `[lo, hi]`, clamping outside values.
///
/// Returns 0 for an empty or inverted range.
pub fn normalize(value: Decimal, lo: Decimal, hi: Decimal) -> Result<Decimal, AgentError> {
    if hi <= lo {
        return Ok(Decimal::ZERO);
    }
    let clamped = value.clamp(lo, hi);
    let offset = clamped
        .checked_sub(lo)
        .ok_or_else(|| overflow("normalize offset"))?;
    let width = hi.checked_sub(lo).ok_or_else(|| overflow("normalize width"))?;
    offset
        .checked_div(width)
        .ok_or_else(|| overflow("normalize division"))
}

/// Maximum mortgage a participant can raise: `income * mortgage_multiplier`.
pub fn mortgage_capacity(config: &MarketConfig, income: Decimal) -> Result<Decimal, AgentError> {
    income
        .checked_mul(config.mortgage_multiplier)
        .ok_or_else(|| overflow("mortgage capacity"))
}

/// Savings plus mortgage capacity. Used both for affordability and for
/// ranking competing bidders.
pub fn financial_capacity(
    config: &MarketConfig,
    participant: &Participant,
) -> Result<Decimal, AgentError> {
    mortgage_capacity(config, participant.income)?
        .checked_add(participant.savings)
        .ok_or_else(|| overflow("financial capacity"))
}

/// Score how satisfied `participant` would be with `asset` after `costs`.
pub fn satisfaction(
    config: &MarketConfig,
    participant: &Participant,
    asset: &Asset,
    costs: ProjectedCosts,
) -> Result<Decimal, AgentError> {
    let liquidity = participant
        .savings
        .checked_sub(costs.upgrade_cost)
        .and_then(|s| s.checked_sub(costs.moving_cost))
        .ok_or_else(|| overflow("projected liquidity"))?;
    let financial = normalize(liquidity, config.min_wealth, config.max_wealth)?;

    let rating = asset
        .energy_rating
        .saturating_add(costs.bonus_rating)
        .min(MAX_ENERGY_RATING);
    let environment = normalize(
        Decimal::from(rating),
        Decimal::ZERO,
        Decimal::from(MAX_ENERGY_RATING),
    )?;

    let comfort = normalize(asset.quality, Decimal::ZERO, config.max_quality)?;

    let financial_term = weighted(config.weight_financial, financial)?;
    let environment_term = weighted(config.weight_environment, environment)?;
    let comfort_term = weighted(config.weight_comfort, comfort)?;

    financial_term
        .checked_add(environment_term)
        .and_then(|s| s.checked_add(comfort_term))
        .ok_or_else(|| overflow("satisfaction sum"))
}

fn weighted(weight: Decimal, term: Decimal) -> Result<Decimal, AgentError> {
    weight
        .checked_mul(term)
        .ok_or_else(|| overflow("weighted term"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use housing_types::{AssetId, ParticipantId};
    use rust_decimal_macros::dec;

    use super::*;

    fn participant(savings: Decimal) -> Participant {
        Participant::new(ParticipantId::new(), dec!(50000), savings, AssetId::new())
    }

    fn asset(rating: u8, quality: Decimal) -> Asset {
        Asset::new(AssetId::new(), rating, 100, quality, dec!(150000))
    }

    #[test]
    fn normalize_bounds() {
        assert_eq!(normalize(dec!(-5), dec!(0), dec!(10)).unwrap(), dec!(0));
        assert_eq!(normalize(dec!(0), dec!(0), dec!(10)).unwrap(), dec!(0));
        assert_eq!(normalize(dec!(5), dec!(0), dec!(10)).unwrap(), dec!(0.5));
        assert_eq!(normalize(dec!(10), dec!(0), dec!(10)).unwrap(), dec!(1));
        assert_eq!(normalize(dec!(99), dec!(0), dec!(10)).unwrap(), dec!(1));
    }

    #[test]
    fn normalize_empty_range_is_zero() {
        assert_eq!(normalize(dec!(3), dec!(3), dec!(3)).unwrap(), dec!(0));
    }

    #[test]
    fn normalize_is_monotonic() {
        let mut previous = Decimal::MIN;
        for step in -20_i64..=120 {
            let v = Decimal::from(step).checked_mul(dec!(5000)).unwrap();
            let n = normalize(v, dec!(0), dec!(500000)).unwrap();
            assert!(n >= previous, "normalize decreased at {v}");
            previous = n;
        }
    }

    #[test]
    fn satisfaction_matches_hand_computation() {
        let config = MarketConfig::default();
        // liquidity 250000 -> 0.5, rating 7 -> 1, quality 0.5 -> 0.5
        let s = satisfaction(
            &config,
            &participant(dec!(250000)),
            &asset(7, dec!(0.5)),
            ProjectedCosts::default(),
        )
        .unwrap();
        // 0.4*0.5 + 0.3*1 + 0.3*0.5
        assert_eq!(s, dec!(0.65));
    }

    #[test]
    fn comfort_weight_multiplies_quality() {
        let config = MarketConfig {
            weight_financial: dec!(0),
            weight_comfort: dec!(1),
            weight_environment: dec!(0),
            ..MarketConfig::default()
        };
        let s = satisfaction(
            &config,
            &participant(dec!(0)),
            &asset(7, dec!(0.25)),
            ProjectedCosts::default(),
        )
        .unwrap();
        assert_eq!(s, dec!(0.25));
    }

    #[test]
    fn bonus_rating_caps_at_scale_top() {
        let config = MarketConfig::default();
        let p = participant(dec!(10000));
        let a = asset(6, dec!(0.5));
        let plus_one = ProjectedCosts {
            bonus_rating: 1,
            ..ProjectedCosts::default()
        };
        let plus_five = ProjectedCosts {
            bonus_rating: 5,
            ..ProjectedCosts::default()
        };
        assert_eq!(
            satisfaction(&config, &p, &a, plus_one).unwrap(),
            satisfaction(&config, &p, &a, plus_five).unwrap()
        );
    }

    #[test]
    fn costs_lower_the_financial_term() {
        let config = MarketConfig::default();
        let p = participant(dec!(40000));
        let a = asset(3, dec!(0.5));
        let base = satisfaction(&config, &p, &a, ProjectedCosts::default()).unwrap();
        let moving = ProjectedCosts {
            moving_cost: dec!(2000),
            ..ProjectedCosts::default()
        };
        assert!(satisfaction(&config, &p, &a, moving).unwrap() < base);
    }

    #[test]
    fn satisfaction_is_deterministic() {
        let config = MarketConfig::default();
        let p = participant(dec!(31234));
        let a = asset(2, dec!(0.6172));
        let costs = ProjectedCosts {
            upgrade_cost: dec!(5000),
            moving_cost: dec!(0),
            bonus_rating: 1,
        };
        let first = satisfaction(&config, &p, &a, costs).unwrap();
        let second = satisfaction(&config, &p, &a, costs).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn capacity_is_savings_plus_five_incomes() {
        let config = MarketConfig::default();
        let p = participant(dec!(10000));
        assert_eq!(mortgage_capacity(&config, dec!(50000)).unwrap(), dec!(250000));
        assert_eq!(financial_capacity(&config, &p).unwrap(), dec!(260000));
    }
}
