//! Loader for the distributor's "Sales and Credits by Store" export.
//!
//! The export is a UTF-16, tab-separated file with two stacked header rows
//! (year over month), three identifying columns, one column per month, a
//! trailing grand-total column and a trailing grand-total row. [`load`] turns
//! it into a rectangular [`SalesTable`] with the totals stripped.

use std::borrow::Cow;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use encoding_rs::{Encoding, UTF_16LE, UTF_8};
use sales_core::models::{split_measure_key, SalesRow, SalesTable, KEY_SEPARATOR};
use sales_core::{Result, SalesError};
use tracing::{debug, info, warn};

/// Collapsed key of the aggregate total column.
pub const TOTAL_COLUMN_KEY: &str = "Grand Total_Total";

/// Number of leading identifying columns (group, customer, product).
pub const IDENTIFYING_COLUMNS: usize = 3;

/// Prefix pandas-style tools write into blank multi-level header cells.
const PLACEHOLDER_PREFIX: &str = "Unnamed:";

// ── Public API ────────────────────────────────────────────────────────────────

/// Read, decode and normalize the export at `path`.
pub fn load(path: &Path) -> Result<SalesTable> {
    let bytes = read_export(path)?;
    let text = decode_export(&bytes);
    let table = load_from_str(&text)?;
    info!(
        "Loaded {} rows x {} months from {}",
        table.rows().len(),
        table.columns().len(),
        path.display()
    );
    Ok(table)
}

/// Decode raw export bytes to text.
///
/// A byte-order mark selects UTF-8, UTF-16LE or UTF-16BE. Without one the
/// bytes are sniffed: a NUL in the second byte means UTF-16LE (the
/// distributor's default), anything else is read as UTF-8.
pub fn decode_export(bytes: &[u8]) -> Cow<'_, str> {
    let (encoding, body): (&'static Encoding, &[u8]) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None if bytes.len() >= 2 && bytes[1] == 0 => (UTF_16LE, bytes),
        None => (UTF_8, bytes),
    };

    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        warn!(
            "Export contained invalid {} sequences; replaced with U+FFFD",
            encoding.name()
        );
    }
    text
}

/// Normalize already-decoded, tab-separated export text.
pub fn load_from_str(text: &str) -> Result<SalesTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        // Both header rows are handled here, not by the csv reader.
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let outer = match records.next() {
        Some(record) => record?,
        None => return Err(SalesError::EmptyInput),
    };
    let inner = match records.next() {
        Some(record) => record?,
        None => return Err(SalesError::MalformedHeader { column: 0 }),
    };

    let keys = collapse_headers(&outer, &inner)?;
    if keys.len() < IDENTIFYING_COLUMNS {
        return Err(SalesError::MalformedHeader { column: keys.len() });
    }

    let total_idx = keys
        .iter()
        .position(|k| k == TOTAL_COLUMN_KEY)
        .ok_or_else(|| SalesError::MissingTotalColumn(TOTAL_COLUMN_KEY.to_string()))?;
    debug!("Dropping total column {} at index {}", TOTAL_COLUMN_KEY, total_idx);

    let measure_indices: Vec<usize> = (IDENTIFYING_COLUMNS..keys.len())
        .filter(|&i| i != total_idx)
        .collect();
    for &idx in &measure_indices {
        if !is_measure_key(&keys[idx]) {
            return Err(SalesError::MalformedHeader { column: idx });
        }
    }
    let columns: Vec<String> = measure_indices.iter().map(|&i| keys[i].clone()).collect();

    let mut body: Vec<StringRecord> = Vec::new();
    for record in records {
        body.push(record?);
    }
    // The export always ends with one grand-total row.
    if body.pop().is_none() {
        warn!("Export has no data rows");
    } else {
        debug!("Dropped trailing total row");
    }

    let rows = body
        .iter()
        .map(|record| SalesRow {
            customer_group: field(record, 0).to_string(),
            customer: field(record, 1).to_string(),
            product: field(record, 2).to_string(),
            units: measure_indices
                .iter()
                .map(|&i| coerce_units(field(record, i)))
                .collect(),
        })
        .collect();

    SalesTable::new(columns, rows)
}

/// Coerce one measure cell to whole units.
///
/// Thousands separators are ignored and fractions truncate toward zero.
/// Blank, non-numeric and non-finite cells become `0`, as do negative values
/// (credits), which keeps every cell non-negative.
pub fn coerce_units(cell: &str) -> u64 {
    let cleaned = cell.trim().replace(',', "");
    if cleaned.is_empty() {
        return 0;
    }
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value.trunc() as u64,
        Ok(value) if value.is_finite() => {
            warn!("Dropping credit: negative cell {:?} clamped to 0", cell);
            0
        }
        _ => {
            debug!("Non-numeric cell {:?} coerced to 0", cell);
            0
        }
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Read the whole export; the file handle is released before parsing starts.
fn read_export(path: &Path) -> Result<Vec<u8>> {
    let file_read = |source| SalesError::FileRead {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(file_read)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(file_read)?;
    Ok(bytes)
}

/// Collapse the two header rows into one key per column.
///
/// `"{outer}_{inner}"` when both levels are present, otherwise whichever one
/// is. The first three keys are then renamed to the identifying column names.
fn collapse_headers(outer: &StringRecord, inner: &StringRecord) -> Result<Vec<String>> {
    let width = outer.len().max(inner.len());
    let mut keys = Vec::with_capacity(width);

    for column in 0..width {
        let top = header_label(outer.get(column));
        let bottom = header_label(inner.get(column));
        let key = match (top.is_empty(), bottom.is_empty()) {
            (false, false) => format!("{}{}{}", top, KEY_SEPARATOR, bottom),
            (true, false) => bottom.to_string(),
            (false, true) => top.to_string(),
            (true, true) => return Err(SalesError::MalformedHeader { column }),
        };
        keys.push(key);
    }

    for (key, name) in keys.iter_mut().zip([
        sales_core::models::CUSTOMER_GROUP,
        sales_core::models::CUSTOMER,
        sales_core::models::PRODUCT,
    ]) {
        *key = name.to_string();
    }

    Ok(keys)
}

fn header_label(cell: Option<&str>) -> &str {
    let label = cell.unwrap_or("").trim();
    if label.starts_with(PLACEHOLDER_PREFIX) {
        ""
    } else {
        label
    }
}

/// Measure keys must lead with a year, either `"2024"` or `"2024_January"`,
/// so year filtering by substring stays equivalent to filtering by prefix.
fn is_measure_key(key: &str) -> bool {
    let year = split_measure_key(key).map_or(key, |(year, _)| year);
    !year.is_empty() && year.chars().all(|c| c.is_ascii_digit())
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
