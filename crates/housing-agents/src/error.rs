//! Error types for the housing-agents crate.
//!
//! Utility and decision computations use checked arithmetic and return
//! typed errors rather than panicking.

use housing_types::{AssetId, ParticipantId};

/// Errors that can occur while scoring or deciding.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// An arithmetic overflow occurred in a checked computation.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// A participant's home asset is missing from the market.
    #[error("home {asset} of participant {participant} not found")]
    HomeNotFound {
        /// The participant being evaluated.
        participant: ParticipantId,
        /// The asset they claim to own.
        asset: AssetId,
    },

    /// Market configuration failed validation.
    #[error("invalid market config: {reason}")]
    InvalidConfig {
        /// Why the configuration was rejected.
        reason: String,
    },
}

/// Build an [`AgentError::ArithmeticOverflow`] for `context`.
pub(crate) fn overflow(context: &str) -> AgentError {
    AgentError::ArithmeticOverflow {
        context: context.to_owned(),
    }
}
