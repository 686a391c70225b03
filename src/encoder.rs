use chrono::NaiveDate;

use crate::calendar::{WeekRule, parse_sales_date};
use crate::code_book::CodeBooks;
use crate::config::RollupConfig;
use crate::data::{SalesRecord, TimeBucket};
use crate::errors::RollupError;
use crate::key::{GroupKey, KeyField, KeyFields, KeyLayout};
use crate::types::{CompanyId, ProductId};

/// Grouping key plus the bucket it was derived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodedKey {
    /// Packed grouping key.
    pub key: GroupKey,
    /// Week bucket the key's time fields came from.
    pub bucket: TimeBucket,
}

/// Derives grouping keys from sale attributes.
///
/// The encoder holds only configuration; the code books it resolves
/// identifiers against are passed in by the caller.
#[derive(Clone, Debug)]
pub struct KeyEncoder {
    layout: KeyLayout,
    epoch_year: i32,
    week_rule: WeekRule,
    date_format: String,
}

impl KeyEncoder {
    /// Encoder for `config`'s layout, epoch, week rule, and date format.
    pub fn new(config: &RollupConfig) -> Self {
        Self {
            layout: config.layout,
            epoch_year: config.epoch_year,
            week_rule: config.week_rule,
            date_format: config.date_format.to_string(),
        }
    }

    /// Digit layout keys are packed with.
    pub fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    /// Time bucket for `date` under the configured week rule.
    pub fn time_bucket(&self, date: NaiveDate) -> TimeBucket {
        self.week_rule.bucket(date)
    }

    /// Parse the record's sale date and encode its attributes.
    pub fn encode_record(
        &self,
        books: &mut CodeBooks,
        record: &SalesRecord,
    ) -> Result<EncodedKey, RollupError> {
        let date = parse_sales_date(&record.sales_date, &self.date_format)?;
        self.encode(
            books,
            date,
            &record.brand_id,
            record.company_id,
            &record.store_id,
            record.product_id,
        )
    }

    /// Encode one attribute tuple.
    ///
    /// Numeric fields are checked before either code book is touched, and
    /// both books are checked for room before either assigns an index, so a
    /// rejected tuple never leaves a half-registered identifier behind.
    pub fn encode(
        &self,
        books: &mut CodeBooks,
        date: NaiveDate,
        brand_id: &str,
        company_id: CompanyId,
        store_id: &str,
        product_id: ProductId,
    ) -> Result<EncodedKey, RollupError> {
        let bucket = self.time_bucket(date);
        let layout = &self.layout;
        let year_offset = layout.check(
            KeyField::YearOffset,
            i64::from(bucket.year) - i64::from(self.epoch_year),
        )?;
        let week = layout.check(KeyField::Week, i64::from(bucket.week))?;
        let company = layout.check(KeyField::Company, i64::from(company_id))?;
        let product = layout.check(KeyField::Product, i64::from(product_id))?;

        books.brands.check_capacity(brand_id)?;
        books.stores.check_capacity(store_id)?;
        let brand = books.brands.index_of(brand_id)?;
        let store = books.stores.index_of(store_id)?;

        let fields = KeyFields {
            year_offset,
            week,
            brand: layout.check(KeyField::Brand, brand as i64)?,
            company,
            store: layout.check(KeyField::Store, store as i64)?,
            product,
        };
        Ok(EncodedKey {
            key: GroupKey::pack(&fields, layout)?,
            bucket,
        })
    }
}
