//! Fixed-width decimal packing of grouping-key fields.
//!
//! A `GroupKey` is the positional concatenation of six decimal fields, most
//! significant first:
//!
//! ```text
//! year-offset | week | brand | company | store | product
//!      1         2      1        1        2        2      (default digits)
//! ```
//!
//! Packing multiplies by powers of ten and unpacking divides them back out, so
//! a key with leading zero fields (year offset 0, week 03) decodes correctly
//! without ever being rendered as a digit string.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::key::{
    BRAND_DIGITS, COMPANY_DIGITS, MAX_FIELD_DIGITS, MAX_KEY_DIGITS, PRODUCT_DIGITS, STORE_DIGITS,
    WEEK_DIGITS, YEAR_OFFSET_DIGITS,
};
use crate::errors::RollupError;

/// One positional field of the grouping key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyField {
    /// Years since the configured epoch.
    YearOffset,
    /// Week of the bucket year.
    Week,
    /// Brand code book index.
    Brand,
    /// Company id.
    Company,
    /// Store code book index.
    Store,
    /// Product id.
    Product,
}

impl KeyField {
    /// All fields in packing order (most significant first).
    pub const ALL: [KeyField; 6] = [
        KeyField::YearOffset,
        KeyField::Week,
        KeyField::Brand,
        KeyField::Company,
        KeyField::Store,
        KeyField::Product,
    ];

    /// Stable lowercase name used in errors and logs.
    pub fn name(self) -> &'static str {
        match self {
            KeyField::YearOffset => "year_offset",
            KeyField::Week => "week",
            KeyField::Brand => "brand",
            KeyField::Company => "company",
            KeyField::Store => "store",
            KeyField::Product => "product",
        }
    }
}

impl fmt::Display for KeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decimal digit budget per key field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyLayout {
    /// Digits for the year offset (default 1).
    pub year_offset_digits: u32,
    /// Digits for the week (default 2).
    pub week_digits: u32,
    /// Digits for the brand index (default 1).
    pub brand_digits: u32,
    /// Digits for the company id (default 1).
    pub company_digits: u32,
    /// Digits for the store index (default 2).
    pub store_digits: u32,
    /// Digits for the product id (default 2).
    pub product_digits: u32,
}

impl Default for KeyLayout {
    fn default() -> Self {
        Self {
            year_offset_digits: YEAR_OFFSET_DIGITS,
            week_digits: WEEK_DIGITS,
            brand_digits: BRAND_DIGITS,
            company_digits: COMPANY_DIGITS,
            store_digits: STORE_DIGITS,
            product_digits: PRODUCT_DIGITS,
        }
    }
}

impl KeyLayout {
    /// Digits assigned to `field`.
    pub fn digits(&self, field: KeyField) -> u32 {
        match field {
            KeyField::YearOffset => self.year_offset_digits,
            KeyField::Week => self.week_digits,
            KeyField::Brand => self.brand_digits,
            KeyField::Company => self.company_digits,
            KeyField::Store => self.store_digits,
            KeyField::Product => self.product_digits,
        }
    }

    /// Number of distinct values `field` can hold (`10^digits`).
    pub fn capacity(&self, field: KeyField) -> u64 {
        10u64.saturating_pow(self.digits(field))
    }

    /// Largest value `field` can hold.
    pub fn max_value(&self, field: KeyField) -> u64 {
        self.capacity(field) - 1
    }

    /// Total width of a packed key in decimal digits.
    pub fn total_digits(&self) -> u32 {
        KeyField::ALL.iter().map(|field| self.digits(*field)).sum()
    }

    /// Reject layouts whose fields are empty, wider than a `u32`, or whose
    /// packed width would not fit a `u64`.
    pub fn validate(&self) -> Result<(), RollupError> {
        for field in KeyField::ALL {
            let digits = self.digits(field);
            if digits == 0 || digits > MAX_FIELD_DIGITS {
                return Err(RollupError::Configuration(format!(
                    "key field '{field}' must use 1..={MAX_FIELD_DIGITS} digits, got {digits}"
                )));
            }
        }
        let total = self.total_digits();
        if total > MAX_KEY_DIGITS {
            return Err(RollupError::Configuration(format!(
                "key layout uses {total} digits; at most {MAX_KEY_DIGITS} fit a u64"
            )));
        }
        Ok(())
    }

    /// Check a single field value against its budget.
    pub fn check(&self, field: KeyField, value: i64) -> Result<u32, RollupError> {
        let max = self.max_value(field);
        if value < 0 || value as u64 > max {
            return Err(RollupError::KeyEncodingOverflow { field, value, max });
        }
        Ok(value as u32)
    }
}

/// Unpacked grouping-key fields, all as dense non-negative integers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyFields {
    /// Years since the epoch.
    pub year_offset: u32,
    /// Week of the bucket year.
    pub week: u32,
    /// Brand index.
    pub brand: u32,
    /// Company id.
    pub company: u32,
    /// Store index.
    pub store: u32,
    /// Product id.
    pub product: u32,
}

impl KeyFields {
    /// Value stored in `field`.
    pub fn get(&self, field: KeyField) -> u32 {
        match field {
            KeyField::YearOffset => self.year_offset,
            KeyField::Week => self.week,
            KeyField::Brand => self.brand,
            KeyField::Company => self.company,
            KeyField::Store => self.store,
            KeyField::Product => self.product,
        }
    }

    fn set(&mut self, field: KeyField, value: u32) {
        let slot = match field {
            KeyField::YearOffset => &mut self.year_offset,
            KeyField::Week => &mut self.week,
            KeyField::Brand => &mut self.brand,
            KeyField::Company => &mut self.company,
            KeyField::Store => &mut self.store,
            KeyField::Product => &mut self.product,
        };
        *slot = value;
    }
}

/// Packed grouping key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(u64);

impl GroupKey {
    /// Wrap a raw packed value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw packed value.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Pack `fields` under `layout`, failing if any field exceeds its budget.
    pub fn pack(fields: &KeyFields, layout: &KeyLayout) -> Result<Self, RollupError> {
        let mut packed = 0u64;
        for field in KeyField::ALL {
            let value = u64::from(fields.get(field));
            let max = layout.max_value(field);
            if value > max {
                return Err(RollupError::KeyEncodingOverflow {
                    field,
                    value: value as i64,
                    max,
                });
            }
            packed = packed
                .checked_mul(layout.capacity(field))
                .and_then(|shifted| shifted.checked_add(value))
                .ok_or_else(|| {
                    RollupError::Configuration(format!(
                        "key layout of {} digits does not fit a u64",
                        layout.total_digits()
                    ))
                })?;
        }
        Ok(Self(packed))
    }

    /// Split the key back into fields under `layout`.
    ///
    /// Fails when the key carries more digits than the layout accounts for,
    /// which means it was packed under a different layout.
    pub fn unpack(self, layout: &KeyLayout) -> Result<KeyFields, RollupError> {
        let mut rest = self.0;
        let mut fields = KeyFields::default();
        for field in KeyField::ALL.iter().rev() {
            let capacity = layout.capacity(*field);
            fields.set(*field, (rest % capacity) as u32);
            rest /= capacity;
        }
        if rest != 0 {
            return Err(RollupError::KeyDecoding {
                key: self.0,
                details: format!(
                    "key is wider than the {}-digit layout",
                    layout.total_digits()
                ),
            });
        }
        Ok(fields)
    }

    /// Zero-padded rendering at the layout's full width (`001050005`).
    pub fn to_padded_string(self, layout: &KeyLayout) -> String {
        format!("{:0width$}", self.0, width = layout.total_digits() as usize)
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
