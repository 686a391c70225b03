use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accumulator::Totals;
use crate::constants::calendar::WEEK_NUMBER_YEAR_FACTOR;
pub use crate::types::{BrandId, CompanyId, ProductId, StoreId};

/// Raw sales transaction produced by a record source.
///
/// The engine reads each record once, folds it into the accumulator, and
/// keeps nothing but the per-group totals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Source-assigned sequence number.
    #[serde(default)]
    pub id: u64,
    /// Calendar date of the sale, parsed with `RollupConfig::date_format`.
    pub sales_date: String,
    /// Free-form brand code.
    pub brand_id: BrandId,
    /// Small dense company id.
    pub company_id: CompanyId,
    /// Free-form store code.
    pub store_id: StoreId,
    /// Small dense product id.
    pub product_id: ProductId,
    /// Sold volume. Must be finite and non-negative; the engine rejects
    /// anything else with `RollupError::InvalidVolume`.
    pub volume: f64,
    /// Sale price at currency precision.
    pub price: Decimal,
}

/// Week-granular time bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeBucket {
    /// Bucket year (ISO week-year under `WeekRule::Iso`, calendar year otherwise).
    pub year: i32,
    /// Week of `year`, starting at 1.
    pub week: u32,
}

impl TimeBucket {
    /// Bucket for `week` of `year`.
    pub fn new(year: i32, week: u32) -> Self {
        Self { year, week }
    }

    /// Combined `year * 100 + week` form (`202101`).
    pub fn week_number(&self) -> i32 {
        self.year * WEEK_NUMBER_YEAR_FACTOR + self.week as i32
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// Original attribute values identifying one aggregation group.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupAttributes {
    /// Week bucket.
    pub bucket: TimeBucket,
    /// Brand code.
    pub brand_id: BrandId,
    /// Company id.
    pub company_id: CompanyId,
    /// Store code.
    pub store_id: StoreId,
    /// Product id.
    pub product_id: ProductId,
}

/// One aggregated output row per distinct grouping key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Week bucket.
    pub bucket: TimeBucket,
    /// `bucket.week_number()`, carried for consumers keyed on the combined form.
    pub week_number: i32,
    /// Brand code.
    pub brand_id: BrandId,
    /// Company id.
    pub company_id: CompanyId,
    /// Store code.
    pub store_id: StoreId,
    /// Product id.
    pub product_id: ProductId,
    /// Summed volume.
    pub total_volume: f64,
    /// Exact summed price.
    pub total_price: Decimal,
}

impl SummaryRecord {
    /// Build a summary row from group attributes and final totals.
    pub fn new(attributes: GroupAttributes, totals: Totals) -> Self {
        Self {
            bucket: attributes.bucket,
            week_number: attributes.bucket.week_number(),
            brand_id: attributes.brand_id,
            company_id: attributes.company_id,
            store_id: attributes.store_id,
            product_id: attributes.product_id,
            total_volume: totals.volume,
            total_price: totals.price,
        }
    }

    /// Attribute tuple this row was aggregated under.
    pub fn attributes(&self) -> GroupAttributes {
        GroupAttributes {
            bucket: self.bucket,
            brand_id: self.brand_id.clone(),
            company_id: self.company_id,
            store_id: self.store_id.clone(),
            product_id: self.product_id,
        }
    }
}
