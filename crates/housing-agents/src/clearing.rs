//! Market clearing: one winner per contested asset.
//!
//! After every participant has decided, all `Buy` intentions are grouped by
//! target asset. Within each group bidders are ranked by financial capacity
//! (savings plus mortgage capacity), highest first; equal capacity goes to
//! the lowest [`ParticipantId`]. The top bidder wins and everyone else in the
//! group keeps their current home.
//!
//! Resolution ([`resolve_bids`]) is pure and finishes before the first move
//! is applied, so the outcome reflects the full bid set. [`clear_market`]
//! then applies the winners' moves in ascending asset order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use housing_types::{AssetId, ParticipantId};
use housing_world::{Market, Relocation, WorldError};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::MarketConfig;
use crate::error::AgentError;
use crate::utility;

/// Errors that can occur while clearing the market.
#[derive(Debug, thiserror::Error)]
pub enum ClearingError {
    /// A bid names an asset the market does not know.
    #[error("participant {participant} bid on unknown asset {asset}")]
    UnknownAsset {
        /// The bidder.
        participant: ParticipantId,
        /// The unresolvable target.
        asset: AssetId,
    },

    /// Computing a bidder's capacity or moving cost failed.
    #[error("agent error for {participant}: {source}")]
    Agent {
        /// The participant being processed.
        participant: ParticipantId,
        /// The underlying agent error.
        source: AgentError,
    },

    /// Applying a move failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// One participant's bid on a vacant asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bid {
    /// The bidder.
    pub participant: ParticipantId,
    /// The asset bid on.
    pub target: AssetId,
    /// Savings plus mortgage capacity at bid time.
    pub capacity: Decimal,
}

/// The winning bid on one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Award {
    /// The contested asset.
    pub asset: AssetId,
    /// The winning bidder.
    pub winner: ParticipantId,
    /// The winner's financial capacity.
    pub capacity: Decimal,
    /// How many participants bid on the asset.
    pub bidders: usize,
}

/// Winners and losers of a clearing round, before any move is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearingOutcome {
    /// One award per contested asset, in ascending asset order.
    pub awards: Vec<Award>,
    /// Bidders who lost, in ascending participant order.
    pub outbid: Vec<ParticipantId>,
}

/// A completed sale: the award and the move that carried it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sale {
    /// The winning bid.
    pub award: Award,
    /// The resulting ownership change.
    pub relocation: Relocation,
}

/// Everything the clearing phase did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearingReport {
    /// Completed sales in the order applied.
    pub sales: Vec<Sale>,
    /// Bidders who lost and stay where they are.
    pub outbid: Vec<ParticipantId>,
}

/// Group every `Buy` intention in the market by target asset.
///
/// # Errors
///
/// Returns [`ClearingError::UnknownAsset`] if a target does not resolve, or
/// [`ClearingError::Agent`] if a capacity computation overflows.
pub fn collect_bids(
    config: &MarketConfig,
    market: &Market,
) -> Result<BTreeMap<AssetId, Vec<Bid>>, ClearingError> {
    let mut bids: BTreeMap<AssetId, Vec<Bid>> = BTreeMap::new();

    for participant in market.participants() {
        let Some(target) = participant.intention.target() else {
            continue;
        };
        if market.asset(target).is_none() {
            return Err(ClearingError::UnknownAsset {
                participant: participant.id,
                asset: target,
            });
        }
        let capacity = utility::financial_capacity(config, participant).map_err(|source| {
            ClearingError::Agent {
                participant: participant.id,
                source,
            }
        })?;
        bids.entry(target).or_default().push(Bid {
            participant: participant.id,
            target,
            capacity,
        });
    }

    Ok(bids)
}

/// Order two bids: higher capacity first, then lower participant ID.
fn rank(a: &Bid, b: &Bid) -> Ordering {
    b.capacity
        .cmp(&a.capacity)
        .then_with(|| a.participant.cmp(&b.participant))
}

/// Pick the winner of every contested asset.
pub fn resolve_bids(bids: &BTreeMap<AssetId, Vec<Bid>>) -> ClearingOutcome {
    let mut outcome = ClearingOutcome::default();

    for (&asset, group) in bids {
        let mut ranked: Vec<&Bid> = group.iter().collect();
        ranked.sort_by(|a, b| rank(a, b));

        let mut ranked = ranked.into_iter();
        let Some(winner) = ranked.next() else {
            continue;
        };
        outcome.awards.push(Award {
            asset,
            winner: winner.participant,
            capacity: winner.capacity,
            bidders: group.len(),
        });
        outcome.outbid.extend(ranked.map(|b| b.participant));
    }

    outcome.outbid.sort_unstable();
    outcome
}

/// Resolve all bids in the market and apply the winners' moves.
///
/// # Errors
///
/// Returns [`ClearingError`] if a bid is unresolvable or a move fails.
/// Both indicate corrupted state and abort the tick.
pub fn clear_market(
    config: &MarketConfig,
    market: &mut Market,
) -> Result<ClearingReport, ClearingError> {
    let bids = collect_bids(config, market)?;
    if bids.is_empty() {
        return Ok(ClearingReport::default());
    }
    info!(contested = bids.len(), "Assets have bids");

    let outcome = resolve_bids(&bids);
    let mut sales = Vec::with_capacity(outcome.awards.len());

    for award in outcome.awards {
        let value = market
            .asset(award.asset)
            .map(|a| a.market_value)
            .ok_or(ClearingError::UnknownAsset {
                participant: award.winner,
                asset: award.asset,
            })?;
        let moving_cost = config
            .moving_cost(value)
            .map_err(|source| ClearingError::Agent {
                participant: award.winner,
                source,
            })?;
        let relocation =
            market.move_to(award.winner, award.asset, moving_cost, config.balance_policy)?;

        info!(
            asset = %award.asset,
            buyer = %award.winner,
            bidders = award.bidders,
            "Asset sold"
        );
        sales.push(Sale { award, relocation });
    }

    for loser in &outcome.outbid {
        debug!(participant = %loser, "Bid lost");
    }

    Ok(ClearingReport {
        sales,
        outbid: outcome.outbid,
    })
}
