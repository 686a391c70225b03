//! Single-pass rollup engine.
//!
//! Data flow per record: parse date -> code book lookup/insert -> key
//! encoding -> accumulator update. At end of stream the accumulator is
//! materialized (decoding keys when only totals were kept) and handed to a
//! sink. All state is owned by one `RollupEngine` and mutated from one thread.

use std::time::Instant;

use tracing::{info, warn};

use crate::accumulator::Accumulator;
use crate::code_book::CodeBooks;
use crate::config::{RecordErrorPolicy, RollupConfig};
use crate::data::{GroupAttributes, SalesRecord, SummaryRecord};
use crate::decoder::KeyDecoder;
use crate::encoder::KeyEncoder;
use crate::errors::RollupError;
use crate::key::GroupKey;
use crate::materialize::materialize;
use crate::sink::SummarySink;
use crate::source::SalesSource;

/// Per-run record counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Records pulled from the source (including failed ones).
    pub records_seen: u64,
    /// Records folded into the accumulator.
    pub records_applied: u64,
    /// Records dropped under `RecordErrorPolicy::Skip`.
    pub records_skipped: u64,
}

/// Owns the code books and accumulator for one aggregation run.
pub struct RollupEngine {
    config: RollupConfig,
    encoder: KeyEncoder,
    decoder: KeyDecoder,
    books: CodeBooks,
    accumulator: Accumulator,
    stats: RunStats,
}

impl RollupEngine {
    /// Validate `config` and create an empty engine.
    pub fn new(config: RollupConfig) -> Result<Self, RollupError> {
        config.validate()?;
        let books = CodeBooks::with_capacities(
            config.effective_brand_capacity(),
            config.effective_store_capacity(),
        );
        Ok(Self {
            encoder: KeyEncoder::new(&config),
            decoder: KeyDecoder::new(&config),
            accumulator: Accumulator::new(config.storage),
            books,
            stats: RunStats::default(),
            config,
        })
    }

    /// Configuration the engine was built with.
    pub fn config(&self) -> &RollupConfig {
        &self.config
    }

    /// Code books populated so far.
    pub fn code_books(&self) -> &CodeBooks {
        &self.books
    }

    /// Current per-group totals.
    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    /// Counters from `ingest` and `ingest_source` calls.
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Fold one record into the accumulator, ignoring the error policy.
    ///
    /// Does not touch `RunStats`; use `ingest` or `ingest_source` for counted,
    /// policy-aware ingestion.
    pub fn apply(&mut self, record: &SalesRecord) -> Result<GroupKey, RollupError> {
        if !(record.volume.is_finite() && record.volume >= 0.0) {
            return Err(RollupError::InvalidVolume {
                record_id: record.id,
                volume: record.volume,
            });
        }
        let encoded = self.encoder.encode_record(&mut self.books, record)?;
        self.accumulator
            .apply(encoded.key, record.volume, record.price, || GroupAttributes {
                bucket: encoded.bucket,
                brand_id: record.brand_id.clone(),
                company_id: record.company_id,
                store_id: record.store_id.clone(),
                product_id: record.product_id,
            })?;
        Ok(encoded.key)
    }

    /// Ingest infallibly produced records under the configured error policy.
    pub fn ingest<I>(&mut self, records: I) -> Result<RunStats, RollupError>
    where
        I: IntoIterator<Item = SalesRecord>,
    {
        for record in records {
            self.ingest_one(Ok(record), "iterator")?;
        }
        Ok(self.stats)
    }

    /// Pull `source` to exhaustion under the configured error policy.
    pub fn ingest_source<S>(&mut self, source: &mut S) -> Result<RunStats, RollupError>
    where
        S: SalesSource + ?Sized,
    {
        let started = Instant::now();
        let source_id = source.id().to_string();
        info!(source_id = %source_id, "rollup ingestion started");
        while let Some(item) = source.next() {
            self.ingest_one(item, &source_id)?;
        }
        info!(
            source_id = %source_id,
            records_seen = self.stats.records_seen,
            records_applied = self.stats.records_applied,
            records_skipped = self.stats.records_skipped,
            groups = self.accumulator.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "rollup ingestion finished"
        );
        Ok(self.stats)
    }

    fn ingest_one(
        &mut self,
        item: Result<SalesRecord, RollupError>,
        source_id: &str,
    ) -> Result<(), RollupError> {
        self.stats.records_seen += 1;
        let outcome = item.and_then(|record| self.apply(&record).map(|_| ()));
        match outcome {
            Ok(()) => {
                self.stats.records_applied += 1;
                Ok(())
            }
            Err(err)
                if err.is_record_error() && self.config.on_record_error == RecordErrorPolicy::Skip =>
            {
                self.stats.records_skipped += 1;
                warn!(
                    source_id,
                    record = self.stats.records_seen,
                    error = %err,
                    "skipping record"
                );
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Materialize one summary record per group seen so far.
    pub fn summaries(&self) -> Result<Vec<SummaryRecord>, RollupError> {
        materialize(&self.accumulator, &self.books, &self.decoder)
    }

    /// Write every summary record to `sink`, then flush it.
    pub fn drain_into<K>(&self, sink: &mut K) -> Result<usize, RollupError>
    where
        K: SummarySink + ?Sized,
    {
        let summaries = self.summaries()?;
        for summary in &summaries {
            sink.write(summary)?;
        }
        sink.flush()?;
        Ok(summaries.len())
    }

    /// Full pass: ingest `source`, then deliver the summaries to `sink`.
    pub fn run<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<RunStats, RollupError>
    where
        S: SalesSource + ?Sized,
        K: SummarySink + ?Sized,
    {
        let stats = self.ingest_source(source)?;
        let written = self.drain_into(sink)?;
        info!(summaries = written, "rollup summaries delivered");
        Ok(stats)
    }
}
