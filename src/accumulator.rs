//! Per-group running totals.
//!
//! The accumulator is single-writer: every update is a lookup keyed by a
//! value computed from mutable code book state, so updates are applied in
//! stream order on one thread. Price totals use exact decimal addition and
//! are independent of arrival order; volume totals use `f64` addition and may
//! differ in the last bits when the same records arrive in another order.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use rust_decimal::Decimal;

use crate::config::StorageStrategy;
use crate::data::GroupAttributes;
use crate::errors::RollupError;
use crate::key::GroupKey;

/// Running totals for one group.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Totals {
    /// Sum of sold volume.
    pub volume: f64,
    /// Exact sum of sale prices.
    pub price: Decimal,
}

impl Totals {
    /// Totals after folding in one sale, or `None` when the price sum leaves
    /// the `Decimal` range.
    pub fn checked_add(self, volume: f64, price: Decimal) -> Option<Self> {
        Some(Self {
            volume: self.volume + volume,
            price: self.price.checked_add(price)?,
        })
    }

    /// Fold one sale into the totals in place. Left untouched on overflow.
    pub fn add(&mut self, key: GroupKey, volume: f64, price: Decimal) -> Result<(), RollupError> {
        *self = self
            .checked_add(volume, price)
            .ok_or(RollupError::TotalOverflow { key: key.raw() })?;
        Ok(())
    }
}

/// Totals plus the attribute values they were grouped under.
#[derive(Clone, Debug, PartialEq)]
pub struct RetainedGroup {
    /// Attribute values of the first sale seen for the group.
    pub attributes: GroupAttributes,
    /// Running totals.
    pub totals: Totals,
}

#[derive(Clone, Debug)]
enum Groups {
    Retained(HashMap<GroupKey, RetainedGroup>),
    TotalsOnly(HashMap<GroupKey, Totals>),
}

/// Mapping from grouping key to running totals.
#[derive(Clone, Debug)]
pub struct Accumulator {
    groups: Groups,
}

impl Accumulator {
    /// Empty accumulator using `storage`.
    pub fn new(storage: StorageStrategy) -> Self {
        let groups = match storage {
            StorageStrategy::RetainAttributes => Groups::Retained(HashMap::new()),
            StorageStrategy::TotalsOnly => Groups::TotalsOnly(HashMap::new()),
        };
        Self { groups }
    }

    /// Storage strategy this accumulator was built with.
    pub fn storage(&self) -> StorageStrategy {
        match self.groups {
            Groups::Retained(_) => StorageStrategy::RetainAttributes,
            Groups::TotalsOnly(_) => StorageStrategy::TotalsOnly,
        }
    }

    /// Add one sale to the group at `key`, creating a zeroed group first if needed.
    ///
    /// `attributes` is only called when a retaining accumulator sees `key`
    /// for the first time. A sale that would push the group's price total out
    /// of range fails with `TotalOverflow` and leaves the group unchanged.
    pub fn apply<F>(
        &mut self,
        key: GroupKey,
        volume: f64,
        price: Decimal,
        attributes: F,
    ) -> Result<(), RollupError>
    where
        F: FnOnce() -> GroupAttributes,
    {
        match &mut self.groups {
            Groups::Retained(map) => match map.entry(key) {
                Entry::Occupied(mut slot) => slot.get_mut().totals.add(key, volume, price),
                Entry::Vacant(slot) => {
                    let mut totals = Totals::default();
                    totals.add(key, volume, price)?;
                    slot.insert(RetainedGroup {
                        attributes: attributes(),
                        totals,
                    });
                    Ok(())
                }
            },
            Groups::TotalsOnly(map) => map.entry(key).or_default().add(key, volume, price),
        }
    }

    /// Number of distinct groups.
    pub fn len(&self) -> usize {
        match &self.groups {
            Groups::Retained(map) => map.len(),
            Groups::TotalsOnly(map) => map.len(),
        }
    }

    /// True before the first sale is applied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current totals for `key`.
    pub fn totals(&self, key: GroupKey) -> Option<Totals> {
        match &self.groups {
            Groups::Retained(map) => map.get(&key).map(|group| group.totals),
            Groups::TotalsOnly(map) => map.get(&key).copied(),
        }
    }

    /// Every group as `(key, retained attributes, totals)` in arbitrary order.
    ///
    /// Attributes are `None` for a totals-only accumulator.
    pub fn iter(&self) -> Box<dyn Iterator<Item = (GroupKey, Option<&GroupAttributes>, Totals)> + '_> {
        match &self.groups {
            Groups::Retained(map) => Box::new(
                map.iter()
                    .map(|(key, group)| (*key, Some(&group.attributes), group.totals)),
            ),
            Groups::TotalsOnly(map) => {
                Box::new(map.iter().map(|(key, totals)| (*key, None, *totals)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TimeBucket;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;

    fn attributes(brand: &str) -> GroupAttributes {
        GroupAttributes {
            bucket: TimeBucket::new(2020, 1),
            brand_id: brand.into(),
            company_id: 0,
            store_id: "S1".into(),
            product_id: 5,
        }
    }

    #[test]
    fn creates_then_updates_groups() {
        for storage in [StorageStrategy::RetainAttributes, StorageStrategy::TotalsOnly] {
            let mut acc = Accumulator::new(storage);
            assert!(acc.is_empty());
            let key = GroupKey::from_raw(1_000_105);
            acc.apply(key, 10.0, Decimal::new(10000, 2), || attributes("B1"))
                .unwrap();
            acc.apply(key, 5.0, Decimal::new(5000, 2), || attributes("B1"))
                .unwrap();
            assert_eq!(acc.len(), 1);
            assert_eq!(acc.storage(), storage);
            let totals = acc.totals(key).unwrap();
            assert_eq!(totals.volume, 15.0);
            assert_eq!(totals.price, Decimal::new(150, 0));
            assert_eq!(acc.totals(GroupKey::from_raw(1)), None);
        }
    }

    #[test]
    fn attributes_are_built_once_per_group() {
        let mut acc = Accumulator::new(StorageStrategy::RetainAttributes);
        let key = GroupKey::from_raw(7);
        let mut calls = 0;
        for _ in 0..3 {
            acc.apply(key, 1.0, Decimal::ONE, || {
                calls += 1;
                attributes("B1")
            })
            .unwrap();
        }
        assert_eq!(calls, 1);
        let (_, retained, totals) = acc.iter().next().unwrap();
        assert_eq!(retained, Some(&attributes("B1")));
        assert_eq!(totals.price, Decimal::new(3, 0));
    }

    #[test]
    fn totals_only_never_builds_attributes() {
        let mut acc = Accumulator::new(StorageStrategy::TotalsOnly);
        acc.apply(GroupKey::from_raw(7), 1.0, Decimal::ONE, || {
            panic!("attributes requested by totals-only accumulator")
        })
        .unwrap();
        let (key, retained, _) = acc.iter().next().unwrap();
        assert_eq!(key.raw(), 7);
        assert!(retained.is_none());
    }

    #[test]
    fn price_totals_are_order_invariant() {
        let mut sales: Vec<(f64, Decimal)> = (1..=500)
            .map(|i| (0.1 * f64::from(i) + 1e-7, Decimal::new(i64::from(i) * 7 + 3, 2)))
            .collect();
        let key = GroupKey::from_raw(42);
        let mut baseline = Accumulator::new(StorageStrategy::TotalsOnly);
        for (volume, price) in &sales {
            baseline
                .apply(key, *volume, *price, || attributes("B1"))
                .unwrap();
        }
        let expected = baseline.totals(key).unwrap();

        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..10 {
            sales.shuffle(&mut rng);
            let mut acc = Accumulator::new(StorageStrategy::TotalsOnly);
            for (volume, price) in &sales {
                acc.apply(key, *volume, *price, || attributes("B1"))
                    .unwrap();
            }
            let totals = acc.totals(key).unwrap();
            assert_eq!(totals.price, expected.price);
            // f64 sums may drift in the last bits under reordering.
            assert!((totals.volume - expected.volume).abs() < 1e-9 * expected.volume);
        }
    }

    #[test]
    fn price_overflow_is_reported_and_leaves_totals_intact() {
        for storage in [StorageStrategy::RetainAttributes, StorageStrategy::TotalsOnly] {
            let mut acc = Accumulator::new(storage);
            let key = GroupKey::from_raw(3);
            acc.apply(key, 1.0, Decimal::MAX, || attributes("B1")).unwrap();
            let err = acc
                .apply(key, 2.0, Decimal::MAX, || attributes("B1"))
                .unwrap_err();
            assert!(matches!(err, RollupError::TotalOverflow { key: 3 }));
            let totals = acc.totals(key).unwrap();
            assert_eq!(totals.price, Decimal::MAX);
            assert_eq!(totals.volume, 1.0);
        }
    }
}
