//! Summary sinks.

use std::io::Write;

use tracing::info;

use crate::data::SummaryRecord;
use crate::errors::RollupError;
use crate::metrics::RollupTotals;

/// Consumer of materialized summary records.
pub trait SummarySink {
    /// Accept one summary record.
    fn write(&mut self, record: &SummaryRecord) -> Result<(), RollupError>;

    /// Called once after the last record of a run.
    fn flush(&mut self) -> Result<(), RollupError> {
        Ok(())
    }
}

impl SummarySink for Vec<SummaryRecord> {
    fn write(&mut self, record: &SummaryRecord) -> Result<(), RollupError> {
        self.push(record.clone());
        Ok(())
    }
}

/// Sink that only counts records and sums their totals, logging them on flush.
#[derive(Clone, Debug, Default)]
pub struct TallySink {
    totals: RollupTotals,
}

impl TallySink {
    /// Sink with zeroed totals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Totals over everything written so far.
    pub fn totals(&self) -> RollupTotals {
        self.totals
    }
}

impl SummarySink for TallySink {
    fn write(&mut self, record: &SummaryRecord) -> Result<(), RollupError> {
        self.totals.observe(record);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RollupError> {
        info!(
            records = self.totals.records,
            total_volume = self.totals.total_volume,
            total_price = %self.totals.total_price,
            "summary records tallied"
        );
        Ok(())
    }
}

/// Writes one JSON summary record per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> JsonLinesSink<W> {
    /// Sink writing one JSON object per line to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Unwrap the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SummarySink for JsonLinesSink<W> {
    fn write(&mut self, record: &SummaryRecord) -> Result<(), RollupError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RollupError> {
        self.writer.flush()?;
        Ok(())
    }
}
