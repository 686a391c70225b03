#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Per-group running totals.
pub mod accumulator;
/// Sale-date parsing and week bucketing.
pub mod calendar;
/// Append-only identifier dictionaries.
pub mod code_book;
/// Engine configuration types.
pub mod config;
/// Centralized constants used across key layout, calendar, and sources.
pub mod constants;
/// Sales input and summary output records.
pub mod data;
/// Grouping-key decoding back to attribute values.
pub mod decoder;
/// Grouping-key derivation from sale attributes.
pub mod encoder;
/// Single-pass ingestion and materialization driver.
pub mod engine;
/// Reusable demo runners shared by the `demos/` binaries.
pub mod example_apps;
/// Fixed-width grouping-key packing.
pub mod key;
/// Summary materialization.
pub mod materialize;
/// Grand-total helpers.
pub mod metrics;
/// Summary sinks.
pub mod sink;
/// Record source traits and built-in sources.
pub mod source;
/// Shared type aliases.
pub mod types;

mod errors;

pub use accumulator::{Accumulator, Totals};
pub use calendar::{CalendarWeekRule, WeekRule};
pub use code_book::{CodeBook, CodeBooks};
pub use config::{RecordErrorPolicy, RollupConfig, StorageStrategy};
pub use data::{GroupAttributes, SalesRecord, SummaryRecord, TimeBucket};
pub use decoder::KeyDecoder;
pub use encoder::{EncodedKey, KeyEncoder};
pub use engine::{RollupEngine, RunStats};
pub use errors::RollupError;
pub use key::{GroupKey, KeyField, KeyFields, KeyLayout};
pub use materialize::materialize;
pub use metrics::RollupTotals;
pub use sink::{JsonLinesSink, SummarySink, TallySink};
pub use source::{InMemorySource, JsonLinesSource, SalesSource, SyntheticSource};
pub use types::{BrandId, CodeIndex, CompanyId, ProductId, SourceId, StoreId};
