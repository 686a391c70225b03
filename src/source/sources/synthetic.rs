use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::collections::HashSet;

use crate::constants::calendar::DEFAULT_DATE_FORMAT;
use crate::constants::synthetic::{
    BRAND_COUNT, CODE_ALPHABET, CODE_LEN, COMPANY_COUNT, MAX_DAYS_BACK, MAX_PRICE_CENTS,
    MAX_VOLUME, PRODUCT_COUNT, SOURCE_ID, STORE_COUNT,
};
use crate::data::SalesRecord;
use crate::errors::RollupError;
use crate::source::SalesSource;
use crate::types::{BrandId, CompanyId, ProductId, StoreId};

/// Fixed identifier catalogue the generator draws from.
#[derive(Clone, Debug)]
pub struct SyntheticCatalogue {
    /// Brand codes to draw from.
    pub brands: Vec<BrandId>,
    /// Store codes to draw from.
    pub stores: Vec<StoreId>,
    /// Company ids are drawn from `0..companies`.
    pub companies: CompanyId,
    /// Product ids are drawn from `0..products`.
    pub products: ProductId,
}

impl SyntheticCatalogue {
    /// Default-sized catalogue with unique random codes.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::with_sizes(rng, BRAND_COUNT, STORE_COUNT, COMPANY_COUNT, PRODUCT_COUNT)
    }

    /// Catalogue with explicit sizes.
    pub fn with_sizes<R: Rng + ?Sized>(
        rng: &mut R,
        brands: usize,
        stores: usize,
        companies: CompanyId,
        products: ProductId,
    ) -> Self {
        Self {
            brands: unique_codes(rng, brands),
            stores: unique_codes(rng, stores),
            companies,
            products,
        }
    }
}

fn unique_codes<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<String> {
    let mut seen = HashSet::with_capacity(count);
    let mut codes = Vec::with_capacity(count);
    while codes.len() < count {
        let code: String = (0..CODE_LEN)
            .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
            .collect();
        if seen.insert(code.clone()) {
            codes.push(code);
        }
    }
    codes
}

/// Seeded random sales stream over a `SyntheticCatalogue`.
///
/// Sale dates fall 1..60 days before `anchor`, prices are whole cents below
/// 1000.00, and volumes are rounded to two decimals below 1000. The same seed
/// and anchor always produce the same stream.
pub struct SyntheticSource {
    rng: StdRng,
    catalogue: SyntheticCatalogue,
    anchor: NaiveDate,
    emitted: u64,
    limit: u64,
}

impl SyntheticSource {
    /// Generator yielding `limit` records.
    pub fn new(seed: u64, anchor: NaiveDate, limit: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let catalogue = SyntheticCatalogue::generate(&mut rng);
        Self::with_catalogue(rng, catalogue, anchor, limit)
    }

    /// Generator over an explicit catalogue.
    pub fn with_catalogue(
        rng: StdRng,
        catalogue: SyntheticCatalogue,
        anchor: NaiveDate,
        limit: u64,
    ) -> Self {
        Self {
            rng,
            catalogue,
            anchor,
            emitted: 0,
            limit,
        }
    }

    /// Catalogue records are drawn from.
    pub fn catalogue(&self) -> &SyntheticCatalogue {
        &self.catalogue
    }

    fn generate(&mut self) -> Option<SalesRecord> {
        let brand_id = self.catalogue.brands.choose(&mut self.rng)?.clone();
        let store_id = self.catalogue.stores.choose(&mut self.rng)?.clone();
        let company_id = self.rng.random_range(0..self.catalogue.companies.max(1));
        let product_id = self.rng.random_range(0..self.catalogue.products.max(1));
        let days_back = self.rng.random_range(1..MAX_DAYS_BACK) as u64;
        let date = self.anchor.checked_sub_days(Days::new(days_back))?;
        let price = Decimal::new(self.rng.random_range(0..MAX_PRICE_CENTS), 2);
        let volume = (self.rng.random::<f64>() * MAX_VOLUME * 100.0).round() / 100.0;
        Some(SalesRecord {
            id: self.emitted,
            sales_date: date.format(DEFAULT_DATE_FORMAT).to_string(),
            brand_id,
            company_id,
            store_id,
            product_id,
            volume,
            price,
        })
    }
}

impl Iterator for SyntheticSource {
    type Item = Result<SalesRecord, RollupError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted >= self.limit {
            return None;
        }
        let record = self.generate();
        self.emitted += 1;
        record.map(Ok)
    }
}

impl SalesSource for SyntheticSource {
    fn id(&self) -> &str {
        SOURCE_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::parse_sales_date;

    fn anchor() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, 1).unwrap()
    }

    #[test]
    fn catalogue_codes_are_unique_and_sized() {
        let mut rng = StdRng::seed_from_u64(1);
        let catalogue = SyntheticCatalogue::generate(&mut rng);
        assert_eq!(catalogue.brands.len(), BRAND_COUNT);
        assert_eq!(catalogue.stores.len(), STORE_COUNT);
        let unique: HashSet<_> = catalogue.stores.iter().collect();
        assert_eq!(unique.len(), STORE_COUNT);
        assert!(
            catalogue
                .brands
                .iter()
                .all(|code| code.len() == CODE_LEN && code.bytes().all(|b| CODE_ALPHABET.contains(&b)))
        );
    }

    #[test]
    fn yields_exactly_limit_records_within_bounds() {
        let source = SyntheticSource::new(5, anchor(), 500);
        let catalogue = source.catalogue().clone();
        let records: Vec<SalesRecord> = source.collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 500);
        for (idx, record) in records.iter().enumerate() {
            assert_eq!(record.id, idx as u64);
            assert!(catalogue.brands.contains(&record.brand_id));
            assert!(catalogue.stores.contains(&record.store_id));
            assert!(record.company_id < COMPANY_COUNT);
            assert!(record.product_id < PRODUCT_COUNT);
            assert!(record.volume >= 0.0 && record.volume < MAX_VOLUME + 0.01);
            assert!(record.price >= Decimal::ZERO && record.price < Decimal::new(1000, 0));
            let date = parse_sales_date(&record.sales_date, DEFAULT_DATE_FORMAT).unwrap();
            let days_back = (anchor() - date).num_days();
            assert!((1..MAX_DAYS_BACK).contains(&days_back), "{days_back}");
        }
    }

    #[test]
    fn same_seed_same_stream() {
        let a: Vec<_> = SyntheticSource::new(9, anchor(), 50).map(Result::unwrap).collect();
        let b: Vec<_> = SyntheticSource::new(9, anchor(), 50).map(Result::unwrap).collect();
        let c: Vec<_> = SyntheticSource::new(10, anchor(), 50).map(Result::unwrap).collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn zero_limit_is_empty() {
        let mut source = SyntheticSource::new(1, anchor(), 0);
        assert!(source.next().is_none());
        assert_eq!(source.id(), SOURCE_ID);
    }
}
