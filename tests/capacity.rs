use chrono::NaiveDate;
use rust_decimal::Decimal;

use sales_rollup::{
    CodeBooks, KeyDecoder, KeyEncoder, KeyField, KeyLayout, RecordErrorPolicy, RollupConfig,
    RollupEngine, RollupError, SalesRecord, StorageStrategy, WeekRule,
};

fn sale(date: &str, brand: &str, store: &str) -> SalesRecord {
    SalesRecord {
        id: 0,
        sales_date: date.to_string(),
        brand_id: brand.to_string(),
        company_id: 1,
        store_id: store.to_string(),
        product_id: 2,
        volume: 1.0,
        price: Decimal::ONE,
    }
}

#[test]
fn eleventh_brand_fails_instead_of_aliasing_brand_zero() {
    let mut engine = RollupEngine::new(RollupConfig::default()).unwrap();
    for i in 0..10 {
        engine
            .apply(&sale("2020-05-05", &format!("BRAND{i}"), "S"))
            .unwrap();
    }
    let err = engine
        .apply(&sale("2020-05-05", "BRAND10", "S"))
        .unwrap_err();
    assert!(matches!(
        err,
        RollupError::KeyEncodingOverflow {
            field: KeyField::Brand,
            value: 10,
            max: 9
        }
    ));

    let summaries = engine.summaries().unwrap();
    assert_eq!(summaries.len(), 10);
    let brand_zero = summaries
        .iter()
        .find(|row| row.brand_id == "BRAND0")
        .unwrap();
    assert_eq!(brand_zero.total_price, Decimal::ONE);
}

#[test]
fn hundred_and_first_store_fails() {
    let mut engine = RollupEngine::new(RollupConfig::default()).unwrap();
    for i in 0..100 {
        engine
            .apply(&sale("2020-05-05", "B", &format!("STORE{i}")))
            .unwrap();
    }
    assert!(matches!(
        engine.apply(&sale("2020-05-05", "B", "STORE100")),
        Err(RollupError::KeyEncodingOverflow {
            field: KeyField::Store,
            ..
        })
    ));
    assert_eq!(engine.code_books().stores.len(), 100);
}

#[test]
fn skip_policy_drops_overflowing_records_without_merging() {
    let config = RollupConfig {
        on_record_error: RecordErrorPolicy::Skip,
        storage: StorageStrategy::TotalsOnly,
        ..RollupConfig::default()
    };
    let mut engine = RollupEngine::new(config).unwrap();
    let records: Vec<SalesRecord> = (0..12)
        .map(|i| sale("2020-05-05", &format!("BRAND{i}"), "S"))
        .collect();
    let stats = engine.ingest(records).unwrap();
    assert_eq!(stats.records_applied, 10);
    assert_eq!(stats.records_skipped, 2);

    let summaries = engine.summaries().unwrap();
    assert_eq!(summaries.len(), 10);
    assert!(summaries.iter().all(|row| row.total_price == Decimal::ONE));
}

#[test]
fn year_window_is_ten_years_from_epoch() {
    let mut engine = RollupEngine::new(RollupConfig::default()).unwrap();
    assert!(engine.apply(&sale("2020-01-06", "B", "S")).is_ok());
    assert!(engine.apply(&sale("2029-06-06", "B", "S")).is_ok());
    assert!(matches!(
        engine.apply(&sale("2030-06-06", "B", "S")),
        Err(RollupError::KeyEncodingOverflow {
            field: KeyField::YearOffset,
            ..
        })
    ));
    assert!(matches!(
        engine.apply(&sale("2019-06-06", "B", "S")),
        Err(RollupError::KeyEncodingOverflow {
            field: KeyField::YearOffset,
            value: -1,
            ..
        })
    ));
}

#[test]
fn epoch_is_tunable() {
    let config = RollupConfig {
        epoch_year: 2015,
        ..RollupConfig::default()
    };
    let mut engine = RollupEngine::new(config).unwrap();
    let key = engine.apply(&sale("2019-06-06", "B", "S")).unwrap();
    // year offset 4 leads the nine digits
    assert_eq!(key.raw() / 100_000_000, 4);
    let rows = engine.summaries().unwrap();
    assert_eq!(rows[0].bucket.year, 2019);
}

#[test]
fn wider_layout_lifts_the_brand_limit() {
    let config = RollupConfig {
        layout: KeyLayout {
            brand_digits: 3,
            ..KeyLayout::default()
        },
        storage: StorageStrategy::TotalsOnly,
        ..RollupConfig::default()
    };
    let mut engine = RollupEngine::new(config).unwrap();
    for i in 0..500 {
        engine
            .apply(&sale("2020-05-05", &format!("BRAND{i}"), "S"))
            .unwrap();
    }
    let rows = engine.summaries().unwrap();
    assert_eq!(rows.len(), 500);
    assert!(rows.iter().any(|row| row.brand_id == "BRAND499"));
}

#[test]
fn year_boundary_buckets_are_pinned_per_week_rule() {
    let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
    let iso = RollupConfig::default();
    let en_gb = RollupConfig {
        week_rule: WeekRule::calendar_en_gb(),
        ..RollupConfig::default()
    };

    for (config, expected_year, expected_week) in [(iso, 2020, 53), (en_gb, 2021, 53)] {
        let encoder = KeyEncoder::new(&config);
        let decoder = KeyDecoder::new(&config);
        let mut books = CodeBooks::for_layout(&config.layout);
        let encoded = encoder
            .encode(&mut books, day(2021, 1, 2), "B", 0, "S", 0)
            .unwrap();
        let decoded = decoder.decode(&books, encoded.key).unwrap();
        assert_eq!(decoded.bucket.year, expected_year);
        assert_eq!(decoded.bucket.week, expected_week);
    }
}
