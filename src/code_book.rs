//! Append-only identifier dictionaries.
//!
//! A `CodeBook` hands out dense indices (`0, 1, 2, ...`) to string identifiers
//! in first-seen order. The forward lookup is hashed and the reverse lookup
//! is positional, both served by one `IndexSet`. Entries are never removed or
//! renumbered, so an index stays valid for the lifetime of the book.

use indexmap::IndexSet;
use tracing::debug;

use crate::errors::RollupError;
use crate::key::{KeyField, KeyLayout};
use crate::types::CodeIndex;

/// Dense index assignment for one identifier domain.
#[derive(Clone, Debug)]
pub struct CodeBook {
    field: KeyField,
    entries: IndexSet<String>,
    capacity: usize,
}

impl CodeBook {
    /// Create an empty book that accepts at most `capacity` identifiers.
    pub fn new(field: KeyField, capacity: usize) -> Self {
        Self {
            field,
            entries: IndexSet::new(),
            capacity,
        }
    }

    /// Create an empty book sized to the digit budget of `field` in `layout`.
    pub fn for_layout(field: KeyField, layout: &KeyLayout) -> Self {
        let capacity = usize::try_from(layout.capacity(field)).unwrap_or(usize::MAX);
        Self::new(field, capacity)
    }

    /// Key field this book feeds.
    pub fn field(&self) -> KeyField {
        self.field
    }

    /// Maximum number of identifiers the book will accept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of identifiers assigned so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True until the first identifier is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index for `identifier`, assigning the next one if it is new.
    ///
    /// Fails with `KeyEncodingOverflow` instead of assigning an index past
    /// `capacity`; the book is left unchanged in that case.
    pub fn index_of(&mut self, identifier: &str) -> Result<CodeIndex, RollupError> {
        if let Some(index) = self.entries.get_index_of(identifier) {
            return Ok(index);
        }
        self.check_capacity(identifier)?;
        let (index, _) = self.entries.insert_full(identifier.to_string());
        debug!(
            field = %self.field,
            index,
            identifier,
            "code book assigned new index"
        );
        Ok(index)
    }

    /// Ok when `identifier` is already known or there is room to add it.
    pub fn check_capacity(&self, identifier: &str) -> Result<(), RollupError> {
        if self.entries.len() < self.capacity || self.entries.contains(identifier) {
            return Ok(());
        }
        Err(RollupError::KeyEncodingOverflow {
            field: self.field,
            value: self.entries.len() as i64,
            max: self.capacity.saturating_sub(1) as u64,
        })
    }

    /// Index for `identifier` without assigning one.
    pub fn lookup(&self, identifier: &str) -> Option<CodeIndex> {
        self.entries.get_index_of(identifier)
    }

    /// Identifier assigned to `index`.
    pub fn identifier(&self, index: CodeIndex) -> Option<&str> {
        self.entries.get_index(index).map(String::as_str)
    }

    /// Identifiers in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(String::as_str)
    }
}

/// The two code books a run shares between encoder and decoder.
#[derive(Clone, Debug)]
pub struct CodeBooks {
    /// Brand identifier dictionary.
    pub brands: CodeBook,
    /// Store identifier dictionary.
    pub stores: CodeBook,
}

impl CodeBooks {
    /// Books sized to the brand and store budgets of `layout`.
    pub fn for_layout(layout: &KeyLayout) -> Self {
        Self {
            brands: CodeBook::for_layout(KeyField::Brand, layout),
            stores: CodeBook::for_layout(KeyField::Store, layout),
        }
    }

    /// Books with explicit capacities.
    pub fn with_capacities(brands: usize, stores: usize) -> Self {
        Self {
            brands: CodeBook::new(KeyField::Brand, brands),
            stores: CodeBook::new(KeyField::Store, stores),
        }
    }
}
