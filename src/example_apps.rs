use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use clap::{Parser, ValueEnum, error::ErrorKind};

use crate::calendar::WeekRule;
use crate::config::{RecordErrorPolicy, RollupConfig, StorageStrategy};
use crate::constants::calendar::DEFAULT_DATE_FORMAT;
use crate::constants::demo::{DEFAULT_RECORDS, DEFAULT_SEED};
use crate::engine::RollupEngine;
use crate::sink::{JsonLinesSink, TallySink};
use crate::source::{JsonLinesSource, SalesSource, SyntheticSource};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StorageArg {
    Retained,
    TotalsOnly,
}

impl From<StorageArg> for StorageStrategy {
    fn from(value: StorageArg) -> Self {
        match value {
            StorageArg::Retained => StorageStrategy::RetainAttributes,
            StorageArg::TotalsOnly => StorageStrategy::TotalsOnly,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WeekRuleArg {
    Iso,
    EnGb,
}

impl From<WeekRuleArg> for WeekRule {
    fn from(value: WeekRuleArg) -> Self {
        match value {
            WeekRuleArg::Iso => WeekRule::Iso,
            WeekRuleArg::EnGb => WeekRule::calendar_en_gb(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "rollup_demo",
    disable_help_subcommand = true,
    about = "Roll sales transactions up into weekly summaries",
    long_about = "Aggregate sales records into one summary per (week, brand, company, store, product) and report grand totals.",
    after_help = "Without --input, records are generated from a seeded synthetic catalogue anchored at --anchor-date (default: today)."
)]
struct RollupDemoCli {
    #[arg(
        long,
        default_value_t = DEFAULT_RECORDS,
        help = "Number of synthetic records to generate"
    )]
    records: u64,
    #[arg(long, default_value_t = DEFAULT_SEED, help = "Seed for the synthetic generator")]
    seed: u64,
    #[arg(
        long = "anchor-date",
        value_name = "YYYY-MM-DD",
        value_parser = parse_anchor_date,
        help = "Synthetic sale dates fall up to 60 days before this date"
    )]
    anchor_date: Option<NaiveDate>,
    #[arg(long, value_enum, default_value = "retained", help = "Accumulator storage strategy")]
    storage: StorageArg,
    #[arg(long = "week-rule", value_enum, default_value = "iso", help = "Week numbering convention")]
    week_rule: WeekRuleArg,
    #[arg(
        long,
        value_name = "PATH",
        help = "Read JSON-lines sales records instead of generating them"
    )]
    input: Option<PathBuf>,
    #[arg(long, value_name = "PATH", help = "Also write JSON-lines summaries to this file")]
    output: Option<PathBuf>,
    #[arg(long = "skip-bad-records", help = "Skip malformed or out-of-capacity records")]
    skip_bad_records: bool,
}

/// Run the rollup demo with command-line style arguments (program name excluded).
pub fn run_rollup_demo<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let Some(cli) =
        parse_cli::<RollupDemoCli, _>(std::iter::once("rollup_demo".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let config = RollupConfig {
        storage: cli.storage.into(),
        week_rule: cli.week_rule.into(),
        on_record_error: if cli.skip_bad_records {
            RecordErrorPolicy::Skip
        } else {
            RecordErrorPolicy::Abort
        },
        ..RollupConfig::default()
    };

    let mut source: Box<dyn SalesSource> = match &cli.input {
        Some(path) => Box::new(JsonLinesSource::open(path)?),
        None => {
            let anchor = cli.anchor_date.unwrap_or_else(|| Utc::now().date_naive());
            Box::new(SyntheticSource::new(cli.seed, anchor, cli.records))
        }
    };

    println!("=== sales rollup ===");
    println!("source: {}", source.id());
    println!("storage: {:?}", config.storage);
    println!("week rule: {:?}", config.week_rule);
    println!();

    let started = Instant::now();
    let mut engine = RollupEngine::new(config)?;
    let stats = engine.ingest_source(source.as_mut())?;

    let mut tally = TallySink::new();
    engine.drain_into(&mut tally)?;
    if let Some(path) = &cli.output {
        let mut sink = JsonLinesSink::new(BufWriter::new(File::create(path)?));
        engine.drain_into(&mut sink)?;
        println!("summaries written to {}", path.display());
    }
    let elapsed = started.elapsed();

    let totals = tally.totals();
    println!("[INGESTION]");
    println!("  records seen: {}", stats.records_seen);
    println!("  records applied: {}", stats.records_applied);
    println!("  records skipped: {}", stats.records_skipped);
    println!("  distinct brands: {}", engine.code_books().brands.len());
    println!("  distinct stores: {}", engine.code_books().stores.len());
    println!();
    println!("[SUMMARY]");
    println!("  summary records: {}", totals.records);
    println!("  total volume: {:.2}", totals.total_volume);
    println!("  total price: {}", totals.total_price);
    println!();
    println!("completed in {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn parse_anchor_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, DEFAULT_DATE_FORMAT)
        .map_err(|_| format!("Could not parse --anchor-date value '{raw}' as YYYY-MM-DD"))
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<RollupDemoCli, clap::Error> {
        RollupDemoCli::try_parse_from(std::iter::once("rollup_demo").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_parse() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.records, DEFAULT_RECORDS);
        assert_eq!(cli.seed, DEFAULT_SEED);
        assert!(matches!(cli.storage, StorageArg::Retained));
        assert!(matches!(cli.week_rule, WeekRuleArg::Iso));
        assert!(cli.input.is_none());
        assert!(!cli.skip_bad_records);
    }

    #[test]
    fn parses_options() {
        let cli = parse(&[
            "--records",
            "10",
            "--storage",
            "totals-only",
            "--week-rule",
            "en-gb",
            "--anchor-date",
            "2021-03-01",
            "--skip-bad-records",
        ])
        .unwrap();
        assert_eq!(cli.records, 10);
        assert_eq!(StorageStrategy::from(cli.storage), StorageStrategy::TotalsOnly);
        assert_eq!(WeekRule::from(cli.week_rule), WeekRule::calendar_en_gb());
        assert_eq!(cli.anchor_date, NaiveDate::from_ymd_opt(2021, 3, 1));
        assert!(cli.skip_bad_records);
    }

    #[test]
    fn rejects_bad_anchor_date() {
        assert!(parse(&["--anchor-date", "03/01/2021"]).is_err());
    }

    #[test]
    fn demo_runs_end_to_end_with_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("summaries.jsonl");
        let args = [
            "--records",
            "200",
            "--anchor-date",
            "2021-03-01",
            "--output",
            output.to_str().unwrap(),
        ];
        run_rollup_demo(args.iter().map(|arg| arg.to_string())).unwrap();
        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.lines().count() > 0);
    }
}
