//! Seeded population generation.
//!
//! Builds the initial market: `assets` houses with random attributes, and
//! `participants` home owners where participant *i* owns asset *i*. Every
//! remaining asset starts vacant. All randomness, including entity IDs,
//! comes from the caller's RNG, so a seeded RNG reproduces the same market.

use housing_types::{Asset, AssetId, Participant, ParticipantId};
use rand::Rng;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use crate::error::WorldError;
use crate::market::Market;

/// An inclusive `min..=max` range read from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Span<T> {
    /// Lower bound (inclusive).
    pub min: T,
    /// Upper bound (inclusive).
    pub max: T,
}

impl<T: PartialOrd> Span<T> {
    /// Build a span.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

/// Size and attribute ranges of the initial population.
///
/// Deserialized from the `population` section of `housing-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PopulationSpec {
    /// Number of home owners.
    pub participants: u32,
    /// Number of houses. Must be at least `participants`.
    pub assets: u32,
    /// Initial energy rating range.
    pub energy_rating: Span<u8>,
    /// Floor area range in square meters.
    pub floor_area: Span<u32>,
    /// Initial market value range.
    pub price: Span<u64>,
    /// Yearly income range.
    pub income: Span<u64>,
    /// Starting savings range.
    pub savings: Span<u64>,
}

impl Default for PopulationSpec {
    fn default() -> Self {
        Self {
            participants: 10,
            assets: 15,
            energy_rating: Span::new(0, 5),
            floor_area: Span::new(50, 150),
            price: Span::new(100_000, 300_000),
            income: Span::new(30_000, 80_000),
            savings: Span::new(5_000, 50_000),
        }
    }
}

impl PopulationSpec {
    /// Check that these parameters can produce a valid market.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidPopulation`] if there are more
    /// participants than assets, a range is inverted, or a rating bound
    /// exceeds the rating scale.
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.participants > self.assets {
            return Err(invalid(format!(
                "{} participants cannot each own one of {} assets",
                self.participants, self.assets
            )));
        }
        if self.energy_rating.max > housing_types::MAX_ENERGY_RATING {
            return Err(invalid(format!(
                "energy_rating.max {} is above the rating scale",
                self.energy_rating.max
            )));
        }
        let ordered = [
            ("energy_rating", self.energy_rating.is_ordered()),
            ("floor_area", self.floor_area.is_ordered()),
            ("price", self.price.is_ordered()),
            ("income", self.income.is_ordered()),
            ("savings", self.savings.is_ordered()),
        ];
        if let Some((name, _)) = ordered.iter().find(|(_, ok)| !ok) {
            return Err(invalid(format!("{name} range has min above max")));
        }
        Ok(())
    }
}

/// Generate the initial market.
///
/// # Errors
///
/// Returns [`WorldError::InvalidPopulation`] if `spec` is invalid, or a
/// construction error from [`Market`] (only possible on an ID collision).
pub fn generate_market<R: Rng>(spec: &PopulationSpec, rng: &mut R) -> Result<Market, WorldError> {
    spec.validate()?;

    let mut market = Market::new();
    let mut asset_ids = Vec::new();

    for _ in 0..spec.assets {
        let asset = Asset::new(
            AssetId::from_random_bytes(random_bytes(rng)),
            rng.random_range(spec.energy_rating.min..=spec.energy_rating.max),
            rng.random_range(spec.floor_area.min..=spec.floor_area.max),
            // Four decimal places in [0, 1).
            Decimal::new(rng.random_range(0..10_000), 4),
            Decimal::from(rng.random_range(spec.price.min..=spec.price.max)),
        );
        asset_ids.push(asset.id);
        market.add_asset(asset)?;
    }

    let owners = usize::try_from(spec.participants).unwrap_or(usize::MAX);
    for &home in asset_ids.iter().take(owners) {
        let participant = Participant::new(
            ParticipantId::from_random_bytes(random_bytes(rng)),
            Decimal::from(rng.random_range(spec.income.min..=spec.income.max)),
            Decimal::from(rng.random_range(spec.savings.min..=spec.savings.max)),
            home,
        );
        market.add_participant(participant)?;
    }

    info!(
        participants = market.participant_count(),
        assets = market.asset_count(),
        vacant = market.vacant_count(),
        "Market initialized"
    );

    Ok(market)
}

fn random_bytes<R: Rng>(rng: &mut R) -> [u8; 16] {
    let mut bytes = [0_u8; 16];
    rng.fill(&mut bytes);
    bytes
}

const fn invalid(reason: String) -> WorldError {
    WorldError::InvalidPopulation { reason }
}
