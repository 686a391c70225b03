/// Constants used by grouping-key layout and validation.
pub mod key {
    /// Reference year subtracted from the bucket year to form the year offset.
    pub const DEFAULT_EPOCH_YEAR: i32 = 2020;
    /// Default decimal digits for the year offset field.
    pub const YEAR_OFFSET_DIGITS: u32 = 1;
    /// Default decimal digits for the week-of-year field.
    pub const WEEK_DIGITS: u32 = 2;
    /// Default decimal digits for the brand index field.
    pub const BRAND_DIGITS: u32 = 1;
    /// Default decimal digits for the company id field.
    pub const COMPANY_DIGITS: u32 = 1;
    /// Default decimal digits for the store index field.
    pub const STORE_DIGITS: u32 = 2;
    /// Default decimal digits for the product id field.
    pub const PRODUCT_DIGITS: u32 = 2;
    /// Widest single field; keeps every field value inside a `u32`.
    pub const MAX_FIELD_DIGITS: u32 = 9;
    /// Widest packed key; `10^19 - 1` is the largest all-nines value below `u64::MAX`.
    pub const MAX_KEY_DIGITS: u32 = 19;
}

/// Constants used by date parsing and week bucketing.
pub mod calendar {
    /// Format of `SalesRecord::sales_date` values.
    pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
    /// Multiplier combining year and week into a single week number (`202101`).
    pub const WEEK_NUMBER_YEAR_FACTOR: i32 = 100;
}

/// Constants used by the synthetic record generator.
pub mod synthetic {
    /// Source id reported by `SyntheticSource`.
    pub const SOURCE_ID: &str = "synthetic";
    /// Distinct brands in the generated catalogue.
    pub const BRAND_COUNT: usize = 10;
    /// Distinct companies in the generated catalogue.
    pub const COMPANY_COUNT: u32 = 5;
    /// Distinct stores in the generated catalogue.
    pub const STORE_COUNT: usize = 100;
    /// Distinct products in the generated catalogue.
    pub const PRODUCT_COUNT: u32 = 50;
    /// Length of generated brand/store codes.
    pub const CODE_LEN: usize = 5;
    /// Alphabet used for generated brand/store codes.
    pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    /// Oldest sale date, in days before the anchor date (exclusive).
    pub const MAX_DAYS_BACK: i64 = 60;
    /// Upper bound for generated prices, in cents (exclusive).
    pub const MAX_PRICE_CENTS: i64 = 100_000;
    /// Upper bound for generated volumes (exclusive).
    pub const MAX_VOLUME: f64 = 1000.0;
}

/// Constants used by the demo runner.
pub mod demo {
    /// Default number of synthetic records generated by the demo.
    pub const DEFAULT_RECORDS: u64 = 100_000;
    /// Default seed for the synthetic generator.
    pub const DEFAULT_SEED: u64 = 99;
}
