//! Core entity structs: assets (houses) and participants (home owners).
//!
//! Ownership is a 1:1 relation held on both sides: [`Participant::asset`]
//! names the home a participant owns and [`Asset::owner`] points back. The
//! structs only carry the data; keeping the two sides consistent is the job
//! of the world crate's `Market`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::Intention;
use crate::ids::{AssetId, ParticipantId};

/// Highest energy rating on the scale (A+++). Ratings run `0..=7`.
pub const MAX_ENERGY_RATING: u8 = 7;

/// A house on the market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique identifier.
    pub id: AssetId,
    /// Energy efficiency rating, `0..=7`. Never decreases.
    pub energy_rating: u8,
    /// Floor area in square meters. Fixed at creation.
    pub floor_area: u32,
    /// Build quality in `[0, 1]`. Fixed at creation.
    pub quality: Decimal,
    /// Current market value. Only grows, through upgrades.
    pub market_value: Decimal,
    /// Whether the asset is unowned.
    pub vacant: bool,
    /// Back-reference to the owning participant, if any.
    pub owner: Option<ParticipantId>,
}

impl Asset {
    /// Create a vacant asset. The rating is clamped to [`MAX_ENERGY_RATING`].
    pub fn new(
        id: AssetId,
        energy_rating: u8,
        floor_area: u32,
        quality: Decimal,
        market_value: Decimal,
    ) -> Self {
        Self {
            id,
            energy_rating: energy_rating.min(MAX_ENERGY_RATING),
            floor_area,
            quality,
            market_value,
            vacant: true,
            owner: None,
        }
    }

    /// Whether the rating is already at the top of the scale.
    pub const fn has_max_rating(&self) -> bool {
        self.energy_rating >= MAX_ENERGY_RATING
    }

    /// Whether the asset has an owner.
    pub const fn is_owned(&self) -> bool {
        self.owner.is_some()
    }
}

/// A home owner taking part in the market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique identifier.
    pub id: ParticipantId,
    /// Yearly income. Fixed at creation; drives mortgage capacity.
    pub income: Decimal,
    /// Liquid savings. Reduced by moves and upgrades.
    pub savings: Decimal,
    /// The asset this participant owns.
    pub asset: AssetId,
    /// This tick's intention.
    pub intention: Intention,
}

impl Participant {
    /// Create a participant holding `asset`, with a `Stay` intention.
    pub const fn new(id: ParticipantId, income: Decimal, savings: Decimal, asset: AssetId) -> Self {
        Self {
            id,
            income,
            savings,
            asset,
            intention: Intention::Stay,
        }
    }

    /// Whether savings are below zero.
    pub fn is_in_debt(&self) -> bool {
        self.savings < Decimal::ZERO
    }
}
