//! Error types for the `housing-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias.

use housing_types::{AssetId, ParticipantId};

/// Errors that can occur while building or mutating the market.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// An asset was not found in the asset table.
    #[error("asset not found: {0}")]
    AssetNotFound(AssetId),

    /// A participant was not found in the participant table.
    #[error("participant not found: {0}")]
    ParticipantNotFound(ParticipantId),

    /// An asset with the same ID was already added.
    #[error("duplicate asset id: {0}")]
    DuplicateAsset(AssetId),

    /// A participant with the same ID was already added.
    #[error("duplicate participant id: {0}")]
    DuplicateParticipant(ParticipantId),

    /// The asset cannot be bound because it is not vacant.
    #[error("asset {asset} is not vacant (owner: {owner:?})")]
    AssetOccupied {
        /// The occupied asset.
        asset: AssetId,
        /// Its current owner, if the vacancy flag and owner disagree.
        owner: Option<ParticipantId>,
    },

    /// Ownership state is inconsistent.
    #[error("invariant violation on asset {asset}: {reason}")]
    InvariantViolation {
        /// The asset whose state is inconsistent.
        asset: AssetId,
        /// What is wrong.
        reason: String,
    },

    /// Arithmetic overflow during a checked balance or value update.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// Population parameters cannot produce a valid market.
    #[error("invalid population: {reason}")]
    InvalidPopulation {
        /// Why the parameters were rejected.
        reason: String,
    },
}
