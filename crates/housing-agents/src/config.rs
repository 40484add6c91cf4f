//! Market parameters: utility weights, wealth bounds, costs, and policies.
//!
//! [`MarketConfig`] bundles every tunable the utility model, decision
//! engine, and state mutations read. It is passed explicitly into each of
//! them so that several configurations can run side by side (tests, batch
//! runs) without interfering. The engine builds it from the `market`
//! section of `housing-config.yaml`.

use housing_types::BalancePolicy;
use housing_world::UpgradeTerms;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AgentError, overflow};

/// Allowed distance of the weight sum from 1.
fn weight_tolerance() -> Decimal {
    Decimal::new(1, 4)
}

/// Tunable parameters of the housing market.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Weight of normalized liquidity in satisfaction (default: 0.4).
    pub weight_financial: Decimal,
    /// Weight of normalized quality in satisfaction (default: 0.3).
    pub weight_comfort: Decimal,
    /// Weight of normalized energy rating in satisfaction (default: 0.3).
    pub weight_environment: Decimal,

    /// Liquidity at or below which the financial term is 0 (default: 0).
    pub min_wealth: Decimal,
    /// Liquidity at or above which the financial term is 1 (default: 500000).
    pub max_wealth: Decimal,
    /// Quality at which the comfort term is 1 (default: 1).
    pub max_quality: Decimal,

    /// Cost of one renovation (default: 5000).
    pub upgrade_cost: Decimal,
    /// Rating levels gained per renovation (default: 1).
    pub rating_step: u8,
    /// Market value added per rating level gained (default: 2000).
    pub value_per_step: Decimal,

    /// Fixed cost of relocating (default: 2000).
    pub moving_cost_fixed: Decimal,
    /// Additional moving cost as a fraction of the target's value (default: 0).
    pub moving_cost_rate: Decimal,

    /// Mortgage capacity as a multiple of income (default: 5).
    pub mortgage_multiplier: Decimal,

    /// Treatment of debits that exceed savings (default: allow debt).
    pub balance_policy: BalancePolicy,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            weight_financial: Decimal::new(4, 1),
            weight_comfort: Decimal::new(3, 1),
            weight_environment: Decimal::new(3, 1),
            min_wealth: Decimal::ZERO,
            max_wealth: Decimal::from(500_000_u32),
            max_quality: Decimal::ONE,
            upgrade_cost: Decimal::from(5_000_u32),
            rating_step: 1,
            value_per_step: Decimal::from(2_000_u32),
            moving_cost_fixed: Decimal::from(2_000_u32),
            moving_cost_rate: Decimal::ZERO,
            mortgage_multiplier: Decimal::from(5_u32),
            balance_policy: BalancePolicy::AllowDebt,
        }
    }
}

impl MarketConfig {
    /// Check the configuration for values the model cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] if a weight or cost is
    /// negative, the weights do not sum to 1, or a normalization range is
    /// empty.
    pub fn validate(&self) -> Result<(), AgentError> {
        let non_negative = [
            ("weight_financial", self.weight_financial),
            ("weight_comfort", self.weight_comfort),
            ("weight_environment", self.weight_environment),
            ("max_quality", self.max_quality),
            ("upgrade_cost", self.upgrade_cost),
            ("value_per_step", self.value_per_step),
            ("moving_cost_fixed", self.moving_cost_fixed),
            ("moving_cost_rate", self.moving_cost_rate),
            ("mortgage_multiplier", self.mortgage_multiplier),
        ];
        if let Some((name, value)) = non_negative.iter().find(|(_, v)| *v < Decimal::ZERO) {
            return Err(invalid(format!("{name} must not be negative (got {value})")));
        }

        let sum = self
            .weight_financial
            .checked_add(self.weight_comfort)
            .and_then(|s| s.checked_add(self.weight_environment))
            .ok_or_else(|| overflow("weight sum"))?;
        let distance = sum
            .checked_sub(Decimal::ONE)
            .map(|d| d.abs())
            .ok_or_else(|| overflow("weight sum distance"))?;
        if distance > weight_tolerance() {
            return Err(invalid(format!("weights must sum to 1 (got {sum})")));
        }

        if self.max_wealth <= self.min_wealth {
            return Err(invalid(format!(
                "max_wealth {} must exceed min_wealth {}",
                self.max_wealth, self.min_wealth
            )));
        }
        if self.max_quality.is_zero() {
            return Err(invalid(String::from("max_quality must be positive")));
        }
        Ok(())
    }

    /// Terms the state mutator applies for one renovation.
    pub const fn upgrade_terms(&self) -> UpgradeTerms {
        UpgradeTerms {
            rating_step: self.rating_step,
            value_per_step: self.value_per_step,
            cost: self.upgrade_cost,
        }
    }

    /// Cost of moving into an asset worth `market_value`.
    ///
    /// `moving_cost_fixed + moving_cost_rate * market_value`.
    pub fn moving_cost(&self, market_value: Decimal) -> Result<Decimal, AgentError> {
        self.moving_cost_rate
            .checked_mul(market_value)
            .and_then(|variable| self.moving_cost_fixed.checked_add(variable))
            .ok_or_else(|| overflow("moving cost"))
    }
}

const fn invalid(reason: String) -> AgentError {
    AgentError::InvalidConfig { reason }
}
