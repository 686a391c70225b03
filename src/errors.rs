use std::io;

use thiserror::Error;

use crate::key::KeyField;
use crate::types::SourceId;

/// Error type for record decoding, key packing, and sink failures.
#[derive(Debug, Error)]
pub enum RollupError {
    /// Sale date did not parse under the configured format.
    #[error("sales date '{value}' does not match format '{format}'")]
    DateParse {
        /// Raw date text.
        value: String,
        /// chrono format string it was parsed with.
        format: String,
    },
    /// A key field value does not fit its digit budget.
    #[error("key field '{field}' value {value} exceeds its capacity (max {max})")]
    KeyEncodingOverflow {
        /// Offending field.
        field: KeyField,
        /// Value that was rejected.
        value: i64,
        /// Largest value the field can hold.
        max: u64,
    },
    /// A group's price total would leave the `Decimal` range.
    #[error("price total for group key {key} exceeds the decimal range")]
    TotalOverflow {
        /// Raw grouping key of the affected group.
        key: u64,
    },
    /// Volume was negative, NaN, or infinite.
    #[error("record {record_id} has invalid volume {volume}: must be finite and non-negative")]
    InvalidVolume {
        /// Source-assigned record id.
        record_id: u64,
        /// Rejected volume.
        volume: f64,
    },
    /// A decoded index has no code book entry.
    #[error("group key {key} is inconsistent with the code books: {details}")]
    KeyDecoding {
        /// Raw grouping key being decoded.
        key: u64,
        /// Which field failed.
        details: String,
    },
    /// A source could not turn an input element into a record.
    #[error("record source '{source_id}' produced a malformed record at line {line}: {reason}")]
    MalformedRecord {
        /// Source that produced the element.
        source_id: SourceId,
        /// 1-based line number.
        line: usize,
        /// Parser message.
        reason: String,
    },
    /// Summary sink rejected a write.
    #[error("summary sink failure: {0}")]
    Sink(String),
    /// Invalid `RollupConfig`.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// JSON encoding failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl RollupError {
    /// True for failures scoped to a single input record.
    ///
    /// Only these may be tolerated by `RecordErrorPolicy::Skip`; everything
    /// else (I/O, sink, configuration, decode inconsistencies) aborts the run.
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            Self::DateParse { .. }
                | Self::KeyEncodingOverflow { .. }
                | Self::TotalOverflow { .. }
                | Self::InvalidVolume { .. }
                | Self::MalformedRecord { .. }
        )
    }
}
