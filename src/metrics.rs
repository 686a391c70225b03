use rust_decimal::Decimal;

use crate::data::SummaryRecord;

/// Grand totals over a set of summary records.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RollupTotals {
    /// Number of summary records folded in.
    pub records: usize,
    /// Sum of their volume totals.
    pub total_volume: f64,
    /// Sum of their price totals.
    pub total_price: Decimal,
}

impl RollupTotals {
    /// Fold one summary record into the totals.
    pub fn observe(&mut self, record: &SummaryRecord) {
        self.records += 1;
        self.total_volume += record.total_volume;
        self.total_price += record.total_price;
    }

    /// Totals over `summaries`.
    pub fn from_summaries<'a, I>(summaries: I) -> Self
    where
        I: IntoIterator<Item = &'a SummaryRecord>,
    {
        let mut totals = Self::default();
        for record in summaries {
            totals.observe(record);
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TimeBucket;

    fn summary(volume: f64, cents: i64) -> SummaryRecord {
        SummaryRecord {
            bucket: TimeBucket::new(2020, 1),
            week_number: 202001,
            brand_id: "B".into(),
            company_id: 0,
            store_id: "S".into(),
            product_id: 0,
            total_volume: volume,
            total_price: Decimal::new(cents, 2),
        }
    }

    #[test]
    fn totals_over_summaries() {
        let rows = vec![summary(15.0, 15000), summary(1.0, 100)];
        let totals = RollupTotals::from_summaries(&rows);
        assert_eq!(totals.records, 2);
        assert_eq!(totals.total_volume, 16.0);
        assert_eq!(totals.total_price, Decimal::new(151, 0));
    }

    #[test]
    fn empty_totals_are_zero() {
        let totals = RollupTotals::from_summaries(&[]);
        assert_eq!(totals, RollupTotals::default());
    }
}
