use chrono::Month;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SalesError};

/// Column name given to the first identifying column.
pub const CUSTOMER_GROUP: &str = "customer_group";
/// Column name given to the second identifying column.
pub const CUSTOMER: &str = "customer";
/// Column name given to the third identifying column.
pub const PRODUCT: &str = "product";

/// Separator between the year and month halves of a measure key.
pub const KEY_SEPARATOR: char = '_';

/// Calendar months in report order.
pub const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Build the measure key for one month of one year, e.g. `"2024_January"`.
pub fn measure_key(year: i32, month: Month) -> String {
    format!("{}{}{}", year, KEY_SEPARATOR, month.name())
}

/// Split a measure key into its `(year, month)` halves.
///
/// Returns `None` when the key has no separator or either half is empty.
pub fn split_measure_key(key: &str) -> Option<(&str, &str)> {
    let (year, month) = key.split_once(KEY_SEPARATOR)?;
    if year.is_empty() || month.is_empty() {
        return None;
    }
    Some((year, month))
}

/// The three measure keys of calendar quarter `quarter` (1–4) in `year`.
///
/// Quarters outside 1–4 yield an empty list.
pub fn quarter_keys(year: i32, quarter: u8) -> Vec<String> {
    if !(1..=4).contains(&quarter) {
        return Vec::new();
    }
    let start = usize::from(quarter - 1) * 3;
    MONTHS[start..start + 3]
        .iter()
        .map(|m| measure_key(year, *m))
        .collect()
}

/// One (customer group, customer, product) line of the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRow {
    pub customer_group: String,
    pub customer: String,
    /// Raw product label, including SKU and packaging annotations.
    pub product: String,
    /// Units sold, one value per measure column of the owning table.
    pub units: Vec<u64>,
}

impl SalesRow {
    /// Units sold across every measure column.
    pub fn total_units(&self) -> u64 {
        self.units.iter().sum()
    }
}

/// The normalized, rectangular sales table.
///
/// Built once per report run and never mutated afterwards; every query takes
/// it by shared reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesTable {
    columns: Vec<String>,
    rows: Vec<SalesRow>,
}

impl SalesTable {
    /// Create a table, checking that every row has one value per column.
    pub fn new(columns: Vec<String>, rows: Vec<SalesRow>) -> Result<Self> {
        for (idx, row) in rows.iter().enumerate() {
            if row.units.len() != columns.len() {
                return Err(SalesError::RaggedRow {
                    row: idx,
                    expected: columns.len(),
                    found: row.units.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Measure column keys in table order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[SalesRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of measure column `key`, if present.
    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == key)
    }

    /// Position of measure column `key`, or [`SalesError::UnknownColumn`].
    pub fn require_column(&self, key: &str) -> Result<usize> {
        self.column_index(key)
            .ok_or_else(|| SalesError::UnknownColumn(key.to_string()))
    }

    /// `true` when every key in `keys` names a measure column.
    pub fn has_columns<S: AsRef<str>>(&self, keys: &[S]) -> bool {
        keys.iter().all(|k| self.column_index(k.as_ref()).is_some())
    }

    /// Indices of the measure columns whose key satisfies `pred`.
    pub fn column_indices_where(&self, pred: impl Fn(&str) -> bool) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| pred(c))
            .map(|(i, _)| i)
            .collect()
    }

    /// Sum of every cell in column `idx`.
    pub fn column_total(&self, idx: usize) -> u64 {
        self.rows.iter().map(|r| r.units[idx]).sum()
    }

    /// Sum of every measure cell in the table.
    pub fn grand_total(&self) -> u64 {
        self.rows.iter().map(SalesRow::total_units).sum()
    }

    /// Customer groups in order of first appearance.
    pub fn customer_groups(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.customer_group.as_str()) {
                seen.push(&row.customer_group);
            }
        }
        seen
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
