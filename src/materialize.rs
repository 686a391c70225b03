use crate::accumulator::Accumulator;
use crate::code_book::CodeBooks;
use crate::data::SummaryRecord;
use crate::decoder::KeyDecoder;
use crate::errors::RollupError;

/// Build one summary record per accumulated group, in arbitrary order.
///
/// Retained attributes are used as-is; for a totals-only accumulator the
/// attributes are decoded from each key against `books`. Nothing is mutated.
pub fn materialize(
    accumulator: &Accumulator,
    books: &CodeBooks,
    decoder: &KeyDecoder,
) -> Result<Vec<SummaryRecord>, RollupError> {
    let mut summaries = Vec::with_capacity(accumulator.len());
    for (key, retained, totals) in accumulator.iter() {
        let attributes = match retained {
            Some(attributes) => attributes.clone(),
            None => decoder.decode(books, key)?,
        };
        summaries.push(SummaryRecord::new(attributes, totals));
    }
    Ok(summaries)
}
