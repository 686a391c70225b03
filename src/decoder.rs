use crate::code_book::{CodeBook, CodeBooks};
use crate::config::RollupConfig;
use crate::data::{GroupAttributes, TimeBucket};
use crate::errors::RollupError;
use crate::key::{GroupKey, KeyLayout};
use crate::types::CodeIndex;

/// Recovers group attributes from a grouping key and the run's code books.
///
/// Must be built from the same layout and epoch as the `KeyEncoder` that
/// produced the keys.
#[derive(Clone, Debug)]
pub struct KeyDecoder {
    layout: KeyLayout,
    epoch_year: i32,
}

impl KeyDecoder {
    /// Decoder matching an encoder built from the same `config`.
    pub fn new(config: &RollupConfig) -> Self {
        Self {
            layout: config.layout,
            epoch_year: config.epoch_year,
        }
    }

    /// Decode `key` into the attribute tuple it was packed from.
    ///
    /// A brand or store index with no code book entry means the books are not
    /// the ones the key was encoded against, and is reported as `KeyDecoding`.
    pub fn decode(&self, books: &CodeBooks, key: GroupKey) -> Result<GroupAttributes, RollupError> {
        let fields = key.unpack(&self.layout)?;
        let brand_id = resolve(&books.brands, key, fields.brand as CodeIndex)?;
        let store_id = resolve(&books.stores, key, fields.store as CodeIndex)?;
        Ok(GroupAttributes {
            bucket: TimeBucket::new(self.epoch_year + fields.year_offset as i32, fields.week),
            brand_id: brand_id.to_string(),
            company_id: fields.company,
            store_id: store_id.to_string(),
            product_id: fields.product,
        })
    }
}

fn resolve(book: &CodeBook, key: GroupKey, index: CodeIndex) -> Result<&str, RollupError> {
    book.identifier(index)
        .ok_or_else(|| RollupError::KeyDecoding {
            key: key.raw(),
            details: format!(
                "{} index {index} has no code book entry ({} known)",
                book.field(),
                book.len()
            ),
        })
}
