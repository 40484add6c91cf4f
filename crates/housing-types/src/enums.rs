//! Enumeration types shared across the housing market crates.

use serde::{Deserialize, Serialize};

use crate::ids::AssetId;

/// What a participant intends to do this tick.
///
/// Recomputed from scratch every tick by the decision engine. The purchase
/// target only exists inside [`Intention::Buy`], so it cannot outlive the
/// intention it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intention {
    /// Keep the current home unchanged.
    #[default]
    Stay,
    /// Renovate the current home by the configured rating step.
    Upgrade,
    /// Bid on a vacant asset.
    Buy {
        /// The asset being bid on.
        target: AssetId,
    },
}

impl Intention {
    /// The bid target, if this is a purchase intention.
    pub const fn target(self) -> Option<AssetId> {
        match self {
            Self::Buy { target } => Some(target),
            Self::Stay | Self::Upgrade => None,
        }
    }

    /// Short label for logs and metrics.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stay => "stay",
            Self::Upgrade => "upgrade",
            Self::Buy { .. } => "buy",
        }
    }
}

/// How a debit that exceeds a participant's savings is treated.
///
/// Neither moves nor upgrades re-check affordability at execution time, so
/// a moving cost can push savings below zero. This policy makes the outcome
/// an explicit rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancePolicy {
    /// Savings may go negative (the participant carries debt).
    #[default]
    AllowDebt,
    /// Savings floor at zero; the shortfall is absorbed.
    ClampToZero,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_intention_is_stay() {
        assert_eq!(Intention::default(), Intention::Stay);
    }

    #[test]
    fn only_buy_has_a_target() {
        let target = AssetId::new();
        assert_eq!(Intention::Buy { target }.target(), Some(target));
        assert_eq!(Intention::Stay.target(), None);
        assert_eq!(Intention::Upgrade.target(), None);
    }

    #[test]
    fn intention_serializes_tagged() {
        let json = serde_json::to_string(&Intention::Upgrade).unwrap();
        assert_eq!(json, r#"{"kind":"upgrade"}"#);
    }

    #[test]
    fn balance_policy_parses_snake_case() {
        let policy: BalancePolicy = serde_json::from_str(r#""clamp_to_zero""#).unwrap();
        assert_eq!(policy, BalancePolicy::ClampToZero);
        assert_eq!(BalancePolicy::default(), BalancePolicy::AllowDebt);
    }
}
