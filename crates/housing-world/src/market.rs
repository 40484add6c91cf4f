//! The market: asset table, participant table, and vacancy pool.
//!
//! [`Market`] is the only place ownership changes. It keeps three views in
//! step with each other:
//!
//! - `Asset::vacant` / `Asset::owner` (exactly one of "vacant" or "owned"),
//! - `Participant::asset` (each participant owns exactly one asset),
//! - the vacancy pool (the set of vacant asset IDs).
//!
//! The pool is maintained incrementally by [`Market::move_to`]; it is never
//! rebuilt from the asset table. [`Market::check_invariants`] verifies all
//! three views agree.

use std::collections::{BTreeMap, BTreeSet};

use housing_types::{
    Asset, AssetId, BalancePolicy, Intention, MAX_ENERGY_RATING, Participant, ParticipantId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::WorldError;

/// Parameters of a single renovation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeTerms {
    /// Rating levels gained per upgrade.
    pub rating_step: u8,
    /// Market value added per rating level gained.
    pub value_per_step: Decimal,
    /// Cost deducted from the participant's savings.
    pub cost: Decimal,
}

/// Record of a completed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relocation {
    /// The participant that moved.
    pub participant: ParticipantId,
    /// The asset they left (now vacant).
    pub from: AssetId,
    /// The asset they now own.
    pub to: AssetId,
    /// Savings after the moving cost.
    pub savings_after: Decimal,
}

/// Record of a completed renovation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeOutcome {
    /// The participant that renovated.
    pub participant: ParticipantId,
    /// The renovated asset.
    pub asset: AssetId,
    /// Rating before the renovation.
    pub rating_before: u8,
    /// Rating after the renovation.
    pub rating_after: u8,
    /// Market value after the renovation.
    pub value_after: Decimal,
    /// Savings after the renovation cost.
    pub savings_after: Decimal,
}

/// All assets, all participants, and the vacancy pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    /// Every asset, indexed by ID.
    assets: BTreeMap<AssetId, Asset>,
    /// Every participant, indexed by ID.
    participants: BTreeMap<ParticipantId, Participant>,
    /// IDs of the assets that are currently vacant.
    vacancy_pool: BTreeSet<AssetId>,
}

impl Market {
    /// Create an empty market.
    pub const fn new() -> Self {
        Self {
            assets: BTreeMap::new(),
            participants: BTreeMap::new(),
            vacancy_pool: BTreeSet::new(),
        }
    }

    // -------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------

    /// Add a vacant asset and put it in the vacancy pool.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateAsset`] if the ID is taken, or
    /// [`WorldError::InvariantViolation`] if the asset arrives already owned.
    pub fn add_asset(&mut self, asset: Asset) -> Result<(), WorldError> {
        let id = asset.id;
        if self.assets.contains_key(&id) {
            return Err(WorldError::DuplicateAsset(id));
        }
        if !asset.vacant || asset.owner.is_some() {
            return Err(WorldError::InvariantViolation {
                asset: id,
                reason: String::from("assets must enter the market vacant"),
            });
        }
        self.assets.insert(id, asset);
        self.vacancy_pool.insert(id);
        Ok(())
    }

    /// Add a participant and bind them to the vacant asset they name.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateParticipant`] if the ID is taken,
    /// [`WorldError::AssetNotFound`] if the asset is unknown, or
    /// [`WorldError::AssetOccupied`] if someone already owns it.
    pub fn add_participant(&mut self, participant: Participant) -> Result<(), WorldError> {
        let id = participant.id;
        if self.participants.contains_key(&id) {
            return Err(WorldError::DuplicateParticipant(id));
        }
        let asset = self
            .assets
            .get_mut(&participant.asset)
            .ok_or(WorldError::AssetNotFound(participant.asset))?;
        if !asset.vacant || asset.owner.is_some() {
            return Err(WorldError::AssetOccupied {
                asset: asset.id,
                owner: asset.owner,
            });
        }
        asset.vacant = false;
        asset.owner = Some(id);
        self.vacancy_pool.remove(&participant.asset);
        self.participants.insert(id, participant);
        Ok(())
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Look up an asset.
    pub fn asset(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(&id)
    }

    /// Look up a participant.
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    /// Iterate over all assets in ID order.
    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    /// Iterate over all participants in ID order.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    /// The set of vacant asset IDs.
    pub const fn vacancy_pool(&self) -> &BTreeSet<AssetId> {
        &self.vacancy_pool
    }

    /// Iterate over the vacant assets in ID order.
    pub fn vacant_assets(&self) -> impl Iterator<Item = &Asset> {
        self.vacancy_pool
            .iter()
            .filter_map(|id| self.assets.get(id))
    }

    /// The asset owned by a participant.
    pub fn home_of(&self, id: ParticipantId) -> Option<&Asset> {
        self.participants
            .get(&id)
            .and_then(|p| self.assets.get(&p.asset))
    }

    /// Number of assets.
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// Number of participants.
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Number of vacant assets.
    pub fn vacant_count(&self) -> usize {
        self.vacancy_pool.len()
    }

    // -------------------------------------------------------------------
    // Intentions
    // -------------------------------------------------------------------

    /// Record a participant's intention for this tick.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ParticipantNotFound`] if the ID is unknown.
    pub fn set_intention(
        &mut self,
        id: ParticipantId,
        intention: Intention,
    ) -> Result<(), WorldError> {
        let participant = self
            .participants
            .get_mut(&id)
            .ok_or(WorldError::ParticipantNotFound(id))?;
        participant.intention = intention;
        Ok(())
    }

    /// Reset every intention to [`Intention::Stay`].
    pub fn reset_intentions(&mut self) {
        for participant in self.participants.values_mut() {
            participant.intention = Intention::Stay;
        }
    }

    // -------------------------------------------------------------------
    // State mutations
    // -------------------------------------------------------------------

    /// Move a buyer into a vacant asset.
    ///
    /// The buyer's current asset is released into the vacancy pool before
    /// the target is bound, so no asset ever holds two owners. The moving
    /// cost is deducted under `policy`; affordability is not re-checked.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ParticipantNotFound`] or
    /// [`WorldError::AssetNotFound`] for unknown IDs,
    /// [`WorldError::AssetOccupied`] if the target is not vacant, and
    /// [`WorldError::InvariantViolation`] if the buyer's current asset does
    /// not point back at them. The market is unchanged on error.
    pub fn move_to(
        &mut self,
        buyer: ParticipantId,
        target: AssetId,
        moving_cost: Decimal,
        policy: BalancePolicy,
    ) -> Result<Relocation, WorldError> {
        let participant = self
            .participants
            .get(&buyer)
            .ok_or(WorldError::ParticipantNotFound(buyer))?;
        let from = participant.asset;

        let target_asset = self
            .assets
            .get(&target)
            .ok_or(WorldError::AssetNotFound(target))?;
        if !target_asset.vacant || target_asset.owner.is_some() {
            return Err(WorldError::AssetOccupied {
                asset: target,
                owner: target_asset.owner,
            });
        }

        let current = self
            .assets
            .get(&from)
            .ok_or(WorldError::AssetNotFound(from))?;
        if current.owner != Some(buyer) {
            return Err(WorldError::InvariantViolation {
                asset: from,
                reason: format!("participant {buyer} holds an asset owned by {:?}", current.owner),
            });
        }

        let savings_after = debit(participant.savings, moving_cost, policy)?;

        // 1. Release the current home.
        if let Some(old) = self.assets.get_mut(&from) {
            old.owner = None;
            old.vacant = true;
        }
        self.vacancy_pool.insert(from);

        // 2. Bind the target.
        if let Some(new) = self.assets.get_mut(&target) {
            new.vacant = false;
            new.owner = Some(buyer);
        }
        self.vacancy_pool.remove(&target);

        // 3. Update the buyer.
        if let Some(p) = self.participants.get_mut(&buyer) {
            p.asset = target;
            p.savings = savings_after;
        }

        if savings_after < Decimal::ZERO {
            warn!(participant = %buyer, savings = %savings_after, "Participant moved into debt");
        }

        Ok(Relocation {
            participant: buyer,
            from,
            to: target,
            savings_after,
        })
    }

    /// Renovate the participant's home.
    ///
    /// Raises the rating by `terms.rating_step` (never past
    /// [`MAX_ENERGY_RATING`]), adds `terms.value_per_step` per level gained
    /// to the market value, deducts `terms.cost` under `policy`, and resets
    /// the participant's intention to [`Intention::Stay`].
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ParticipantNotFound`] or
    /// [`WorldError::AssetNotFound`] for unknown IDs, or
    /// [`WorldError::ArithmeticOverflow`] if a value update overflows.
    pub fn upgrade(
        &mut self,
        id: ParticipantId,
        terms: &UpgradeTerms,
        policy: BalancePolicy,
    ) -> Result<UpgradeOutcome, WorldError> {
        let participant = self
            .participants
            .get_mut(&id)
            .ok_or(WorldError::ParticipantNotFound(id))?;
        let asset = self
            .assets
            .get_mut(&participant.asset)
            .ok_or(WorldError::AssetNotFound(participant.asset))?;

        let savings_after = debit(participant.savings, terms.cost, policy)?;

        let rating_before = asset.energy_rating;
        let rating_after = rating_before
            .saturating_add(terms.rating_step)
            .min(MAX_ENERGY_RATING);
        let levels = rating_after.saturating_sub(rating_before);
        let value_gain = terms
            .value_per_step
            .checked_mul(Decimal::from(levels))
            .ok_or_else(|| WorldError::ArithmeticOverflow {
                context: String::from("upgrade value gain"),
            })?;
        let value_after = asset.market_value.checked_add(value_gain).ok_or_else(|| {
            WorldError::ArithmeticOverflow {
                context: String::from("upgrade market value"),
            }
        })?;

        asset.energy_rating = rating_after;
        asset.market_value = value_after;
        participant.savings = savings_after;
        participant.intention = Intention::Stay;

        debug!(
            participant = %id,
            asset = %asset.id,
            rating_before,
            rating_after,
            "Asset upgraded"
        );

        Ok(UpgradeOutcome {
            participant: id,
            asset: asset.id,
            rating_before,
            rating_after,
            value_after,
            savings_after,
        })
    }

    // -------------------------------------------------------------------
    // Invariants
    // -------------------------------------------------------------------

    /// Verify ownership consistency across assets, participants, and pool.
    ///
    /// Checks that every asset is vacant XOR owned, that the pool equals
    /// the set of vacant assets, and that owner and home links point at
    /// each other (which also rules out two participants sharing an asset).
    ///
    /// # Errors
    ///
    /// Returns the first [`WorldError::InvariantViolation`] found.
    pub fn check_invariants(&self) -> Result<(), WorldError> {
        for asset in self.assets.values() {
            match (asset.vacant, asset.owner) {
                (true, Some(owner)) => {
                    return Err(violation(asset.id, format!("vacant but owned by {owner}")));
                }
                (false, None) => {
                    return Err(violation(asset.id, String::from("neither vacant nor owned")));
                }
                (false, Some(owner)) => {
                    let home = self.participants.get(&owner).map(|p| p.asset);
                    if home != Some(asset.id) {
                        return Err(violation(
                            asset.id,
                            format!("owner {owner} does not hold this asset (holds {home:?})"),
                        ));
                    }
                }
                (true, None) => {}
            }

            if asset.vacant != self.vacancy_pool.contains(&asset.id) {
                return Err(violation(
                    asset.id,
                    format!("vacancy flag {} disagrees with vacancy pool", asset.vacant),
                ));
            }
        }

        if let Some(stray) = self
            .vacancy_pool
            .iter()
            .find(|id| !self.assets.contains_key(id))
        {
            return Err(violation(*stray, String::from("vacancy pool names an unknown asset")));
        }

        for participant in self.participants.values() {
            let owner = self.assets.get(&participant.asset).and_then(|a| a.owner);
            if owner != Some(participant.id) {
                return Err(violation(
                    participant.asset,
                    format!("held by {} but owner is {owner:?}", participant.id),
                ));
            }
        }

        Ok(())
    }
}

/// Deduct `amount` from `savings` under the balance policy.
///
/// # Errors
///
/// Returns [`WorldError::ArithmeticOverflow`] if the subtraction overflows.
pub fn debit(
    savings: Decimal,
    amount: Decimal,
    policy: BalancePolicy,
) -> Result<Decimal, WorldError> {
    let remaining = savings
        .checked_sub(amount)
        .ok_or_else(|| WorldError::ArithmeticOverflow {
            context: String::from("savings debit"),
        })?;
    Ok(match policy {
        BalancePolicy::AllowDebt => remaining,
        BalancePolicy::ClampToZero => remaining.max(Decimal::ZERO),
    })
}

const fn violation(asset: AssetId, reason: String) -> WorldError {
    WorldError::InvariantViolation { asset, reason }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn asset(rating: u8, value: Decimal) -> Asset {
        Asset::new(AssetId::new(), rating, 100, dec!(0.5), value)
    }

    fn terms() -> UpgradeTerms {
        UpgradeTerms {
            rating_step: 1,
            value_per_step: dec!(2000),
            cost: dec!(5000),
        }
    }

    /// Two owners and one vacant asset.
    fn small_market() -> (Market, [ParticipantId; 2], [AssetId; 3]) {
        let mut market = Market::new();
        let a = [
            asset(2, dec!(120000)),
            asset(3, dec!(150000)),
            asset(5, dec!(200000)),
        ];
        let ids = [a[0].id, a[1].id, a[2].id];
        for x in a {
            market.add_asset(x).unwrap();
        }
        let p1 = Participant::new(ParticipantId::new(), dec!(50000), dec!(20000), ids[0]);
        let p2 = Participant::new(ParticipantId::new(), dec!(40000), dec!(10000), ids[1]);
        let pids = [p1.id, p2.id];
        market.add_participant(p1).unwrap();
        market.add_participant(p2).unwrap();
        (market, pids, ids)
    }

    #[test]
    fn added_assets_start_in_pool() {
        let mut market = Market::new();
        let a = asset(1, dec!(100000));
        let id = a.id;
        market.add_asset(a).unwrap();
        assert!(market.vacancy_pool().contains(&id));
        assert!(market.check_invariants().is_ok());
    }

    #[test]
    fn duplicate_asset_rejected() {
        let mut market = Market::new();
        let a = asset(1, dec!(100000));
        market.add_asset(a.clone()).unwrap();
        assert!(matches!(market.add_asset(a), Err(WorldError::DuplicateAsset(_))));
    }

    #[test]
    fn participant_claims_asset() {
        let (market, [p1, _], [a0, _, a2]) = small_market();
        assert_eq!(market.asset(a0).unwrap().owner, Some(p1));
        assert!(!market.vacancy_pool().contains(&a0));
        assert_eq!(market.vacant_count(), 1);
        assert!(market.vacancy_pool().contains(&a2));
        assert!(market.check_invariants().is_ok());
    }

    #[test]
    fn cannot_claim_owned_asset() {
        let (mut market, _, [a0, _, _]) = small_market();
        let intruder = Participant::new(ParticipantId::new(), dec!(1), dec!(1), a0);
        assert!(matches!(
            market.add_participant(intruder),
            Err(WorldError::AssetOccupied { .. })
        ));
    }

    #[test]
    fn move_swaps_ownership_and_pool() {
        let (mut market, [p1, _], [a0, _, a2]) = small_market();
        let moved = market
            .move_to(p1, a2, dec!(2000), BalancePolicy::AllowDebt)
            .unwrap();

        assert_eq!(moved.from, a0);
        assert_eq!(moved.to, a2);
        assert_eq!(market.participant(p1).unwrap().asset, a2);
        assert_eq!(market.participant(p1).unwrap().savings, dec!(18000));
        assert_eq!(market.asset(a2).unwrap().owner, Some(p1));
        assert!(market.asset(a0).unwrap().vacant);
        assert!(market.vacancy_pool().contains(&a0));
        assert!(!market.vacancy_pool().contains(&a2));
        assert!(market.check_invariants().is_ok());
    }

    #[test]
    fn move_into_owned_asset_fails_without_change() {
        let (mut market, [p1, _], [_, a1, _]) = small_market();
        let before = market.clone();
        let result = market.move_to(p1, a1, dec!(2000), BalancePolicy::AllowDebt);
        assert!(matches!(result, Err(WorldError::AssetOccupied { .. })));
        assert_eq!(market, before);
    }

    #[test]
    fn move_to_unknown_asset_fails() {
        let (mut market, [p1, _], _) = small_market();
        let result = market.move_to(p1, AssetId::new(), dec!(0), BalancePolicy::AllowDebt);
        assert!(matches!(result, Err(WorldError::AssetNotFound(_))));
    }

    #[test]
    fn move_cost_can_create_debt() {
        let (mut market, [_, p2], [_, _, a2]) = small_market();
        let moved = market
            .move_to(p2, a2, dec!(12000), BalancePolicy::AllowDebt)
            .unwrap();
        assert_eq!(moved.savings_after, dec!(-2000));
        assert!(market.participant(p2).unwrap().is_in_debt());
    }

    #[test]
    fn clamp_policy_floors_savings() {
        let (mut market, [_, p2], [_, _, a2]) = small_market();
        let moved = market
            .move_to(p2, a2, dec!(12000), BalancePolicy::ClampToZero)
            .unwrap();
        assert_eq!(moved.savings_after, Decimal::ZERO);
    }

    #[test]
    fn upgrade_raises_rating_and_value() {
        let (mut market, [_, p2], [_, a1, _]) = small_market();
        market.set_intention(p2, Intention::Upgrade).unwrap();
        let outcome = market.upgrade(p2, &terms(), BalancePolicy::AllowDebt).unwrap();

        assert_eq!(outcome.rating_before, 3);
        assert_eq!(outcome.rating_after, 4);
        let home = market.asset(a1).unwrap();
        assert_eq!(home.energy_rating, 4);
        assert_eq!(home.market_value, dec!(152000));
        let p = market.participant(p2).unwrap();
        assert_eq!(p.savings, dec!(5000));
        assert_eq!(p.intention, Intention::Stay);
    }

    #[test]
    fn upgrade_never_exceeds_max_rating() {
        let mut market = Market::new();
        let a = asset(MAX_ENERGY_RATING, dec!(100000));
        let aid = a.id;
        market.add_asset(a).unwrap();
        let p = Participant::new(ParticipantId::new(), dec!(1), dec!(9000), aid);
        let pid = p.id;
        market.add_participant(p).unwrap();

        let outcome = market.upgrade(pid, &terms(), BalancePolicy::AllowDebt).unwrap();
        assert_eq!(outcome.rating_after, MAX_ENERGY_RATING);
        assert_eq!(outcome.value_after, dec!(100000));
    }

    #[test]
    fn invariant_check_catches_vacant_and_owned() {
        let (mut market, _, [a0, _, _]) = small_market();
        if let Some(a) = market.assets.get_mut(&a0) {
            a.vacant = true;
        }
        let err = market.check_invariants().unwrap_err();
        assert!(matches!(err, WorldError::InvariantViolation { asset, .. } if asset == a0));
    }

    #[test]
    fn invariant_check_catches_stale_pool() {
        let (mut market, _, [a0, _, _]) = small_market();
        market.vacancy_pool.insert(a0);
        assert!(market.check_invariants().is_err());
    }

    #[test]
    fn reset_clears_buy_intentions() {
        let (mut market, [p1, _], [_, _, a2]) = small_market();
        market.set_intention(p1, Intention::Buy { target: a2 }).unwrap();
        market.reset_intentions();
        assert_eq!(market.participant(p1).unwrap().intention, Intention::Stay);
    }

    #[test]
    fn debit_policies() {
        assert_eq!(debit(dec!(100), dec!(30), BalancePolicy::AllowDebt).unwrap(), dec!(70));
        assert_eq!(debit(dec!(10), dec!(30), BalancePolicy::AllowDebt).unwrap(), dec!(-20));
        assert_eq!(debit(dec!(10), dec!(30), BalancePolicy::ClampToZero).unwrap(), dec!(0));
    }
}
