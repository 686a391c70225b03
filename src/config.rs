use std::borrow::Cow;

use crate::calendar::WeekRule;
use crate::constants::calendar::DEFAULT_DATE_FORMAT;
use crate::constants::key::DEFAULT_EPOCH_YEAR;
use crate::errors::RollupError;
use crate::key::{KeyField, KeyLayout};

/// Where per-group attribute values live between ingestion and materialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StorageStrategy {
    /// Keep the original attribute values next to the running totals.
    #[default]
    RetainAttributes,
    /// Keep only totals and recover attributes by decoding the grouping key.
    TotalsOnly,
}

/// What the engine does when a single record cannot be folded in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RecordErrorPolicy {
    /// Stop the run at the first bad record.
    #[default]
    Abort,
    /// Log the bad record, count it, and continue.
    Skip,
}

/// Top-level engine configuration.
#[derive(Clone, Debug)]
pub struct RollupConfig {
    /// Year subtracted from each bucket year to form the key's year offset.
    pub epoch_year: i32,
    /// Decimal digit budget per key field.
    pub layout: KeyLayout,
    /// Week numbering convention for time buckets.
    pub week_rule: WeekRule,
    /// chrono format string for `SalesRecord::sales_date`.
    pub date_format: Cow<'static, str>,
    /// Attribute storage trade-off for the accumulator.
    pub storage: StorageStrategy,
    /// Handling of per-record failures.
    pub on_record_error: RecordErrorPolicy,
    /// Brand code book capacity (defaults to the brand digit budget).
    pub brand_capacity: Option<usize>,
    /// Store code book capacity (defaults to the store digit budget).
    pub store_capacity: Option<usize>,
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self {
            epoch_year: DEFAULT_EPOCH_YEAR,
            layout: KeyLayout::default(),
            week_rule: WeekRule::default(),
            date_format: Cow::Borrowed(DEFAULT_DATE_FORMAT),
            storage: StorageStrategy::default(),
            on_record_error: RecordErrorPolicy::default(),
            brand_capacity: None,
            store_capacity: None,
        }
    }
}

impl RollupConfig {
    /// Check the layout and any explicit code book capacities.
    pub fn validate(&self) -> Result<(), RollupError> {
        self.layout.validate()?;
        if self.date_format.trim().is_empty() {
            return Err(RollupError::Configuration(
                "date_format must not be empty".into(),
            ));
        }
        for (field, capacity) in [
            (KeyField::Brand, self.brand_capacity),
            (KeyField::Store, self.store_capacity),
        ] {
            let Some(capacity) = capacity else {
                continue;
            };
            let budget = self.layout.capacity(field);
            if capacity == 0 || capacity as u64 > budget {
                return Err(RollupError::Configuration(format!(
                    "{field} capacity must be in 1..={budget}, got {capacity}"
                )));
            }
        }
        Ok(())
    }

    /// Effective brand code book capacity.
    pub fn effective_brand_capacity(&self) -> usize {
        self.effective_capacity(KeyField::Brand, self.brand_capacity)
    }

    /// Effective store code book capacity.
    pub fn effective_store_capacity(&self) -> usize {
        self.effective_capacity(KeyField::Store, self.store_capacity)
    }

    fn effective_capacity(&self, field: KeyField, explicit: Option<usize>) -> usize {
        let budget = usize::try_from(self.layout.capacity(field)).unwrap_or(usize::MAX);
        explicit.map_or(budget, |capacity| capacity.min(budget))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = RollupConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.epoch_year, 2020);
        assert_eq!(config.effective_brand_capacity(), 10);
        assert_eq!(config.effective_store_capacity(), 100);
        assert_eq!(config.storage, StorageStrategy::RetainAttributes);
        assert_eq!(config.on_record_error, RecordErrorPolicy::Abort);
    }

    #[test]
    fn explicit_capacities_must_fit_the_layout() {
        let config = RollupConfig {
            brand_capacity: Some(4),
            ..RollupConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_brand_capacity(), 4);

        let too_big = RollupConfig {
            store_capacity: Some(101),
            ..RollupConfig::default()
        };
        assert!(matches!(
            too_big.validate(),
            Err(RollupError::Configuration(_))
        ));

        let zero = RollupConfig {
            brand_capacity: Some(0),
            ..RollupConfig::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn rejects_empty_date_format() {
        let config = RollupConfig {
            date_format: "  ".into(),
            ..RollupConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
