//! Record source interfaces and built-in sources.
//!
//! Ownership model:
//! - A `SalesSource` is pulled strictly in order, one record at a time.
//! - The engine owns each record only long enough to fold it into the
//!   accumulator; nothing is buffered.
//! - Stopping early is just dropping the source; the run ends with whatever
//!   has been accumulated so far.

use std::collections::VecDeque;

use crate::data::SalesRecord;
use crate::errors::RollupError;
use crate::types::SourceId;

/// Source implementation modules.
pub mod sources;

pub use sources::file_source::JsonLinesSource;
pub use sources::synthetic::{SyntheticCatalogue, SyntheticSource};

/// Pull-based producer of sales records.
///
/// Items are `Err` when a single element could not be produced (for example
/// a malformed line); whether the run continues is decided by the engine's
/// `RecordErrorPolicy`.
pub trait SalesSource: Iterator<Item = Result<SalesRecord, RollupError>> {
    /// Stable source identifier used in logs and errors.
    fn id(&self) -> &str;
}

/// Source backed by records already held in memory.
#[derive(Clone, Debug)]
pub struct InMemorySource {
    id: SourceId,
    records: VecDeque<SalesRecord>,
}

impl InMemorySource {
    /// Create an in-memory source from prebuilt records.
    pub fn new(id: impl Into<SourceId>, records: Vec<SalesRecord>) -> Self {
        Self {
            id: id.into(),
            records: records.into(),
        }
    }

    /// Records not yet pulled.
    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

impl Iterator for InMemorySource {
    type Item = Result<SalesRecord, RollupError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.pop_front().map(Ok)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.records.len(), Some(self.records.len()))
    }
}

impl SalesSource for InMemorySource {
    fn id(&self) -> &str {
        &self.id
    }
}
