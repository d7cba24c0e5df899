//! Sales metrics over a normalized [`SalesTable`].
//!
//! Every query borrows the table immutably and builds its result from
//! scratch; nothing is cached between calls.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use sales_core::formatting::round_to;
use sales_core::labels::normalize_product_label;
use sales_core::models::{SalesRow, SalesTable, KEY_SEPARATOR};
use sales_core::{Result, SalesError};
use serde::Serialize;

// ── Result types ──────────────────────────────────────────────────────────────

/// One customer's units within its customer group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerRank {
    pub customer_group: String,
    pub customer: String,
    pub total: u64,
}

/// Units sold for one (normalized) product label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRank {
    pub product: String,
    pub total: u64,
}

/// Units sold for one customer group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRank {
    pub customer_group: String,
    pub total: u64,
}

// ── SalesMetrics ──────────────────────────────────────────────────────────────

/// Stateless collection of sales queries.
pub struct SalesMetrics;

impl SalesMetrics {
    /// Sum of every cell in the measure columns whose key contains `year`.
    ///
    /// Measure keys always lead with their year (the loader rejects anything
    /// else), so containment here behaves as a year-prefix match. Returns `0`
    /// when no column matches.
    pub fn total_year_sales(table: &SalesTable, year: i32) -> u64 {
        Self::sum_columns(table, &Self::year_columns(table, year))
    }

    /// Like [`total_year_sales`](Self::total_year_sales), but `None` when the
    /// table has no column for `year` at all.
    pub fn year_sales(table: &SalesTable, year: i32) -> Option<u64> {
        let columns = Self::year_columns(table, year);
        if columns.is_empty() {
            None
        } else {
            Some(Self::sum_columns(table, &columns))
        }
    }

    /// Percentage change between two periods, rounded to two places.
    ///
    /// Computed as `(current - previous) / current * 100`: the denominator is
    /// the *current* period, not the base period. Fails with
    /// [`SalesError::ZeroCurrentPeriod`] when `current == 0`.
    pub fn growth(current: u64, previous: u64) -> Result<f64> {
        if current == 0 {
            return Err(SalesError::ZeroCurrentPeriod);
        }
        let current = current as f64;
        let change = (current - previous as f64) / current * 100.0;
        Ok(round_to(change, 2))
    }

    /// Lifetime units per customer group, keyed by group name.
    pub fn lifetime_sales_by_customer_group(table: &SalesTable) -> BTreeMap<String, u64> {
        let mut totals: BTreeMap<String, u64> = BTreeMap::new();
        for row in table.rows() {
            *totals.entry(row.customer_group.clone()).or_default() += row.total_units();
        }
        totals
    }

    /// Lifetime units for one customer group.
    pub fn lifetime_sales_for_group(table: &SalesTable, group: &str) -> Result<u64> {
        Self::lifetime_sales_by_customer_group(table)
            .remove(group)
            .ok_or_else(|| SalesError::UnknownGroup(group.to_string()))
    }

    /// Units per month of `year`, keyed by the full measure key in column
    /// order, e.g. `{"2024_January": 10, "2024_February": 5}`.
    pub fn sales_by_month(table: &SalesTable, year: i32) -> IndexMap<String, u64> {
        let prefix = format!("{}{}", year, KEY_SEPARATOR);
        table
            .column_indices_where(|key| key.starts_with(&prefix))
            .into_iter()
            .map(|idx| (table.columns()[idx].clone(), table.column_total(idx)))
            .collect()
    }

    /// Top `n` customers of every customer group by lifetime units.
    ///
    /// Groups appear in ascending name order; within a group customers are
    /// ranked by descending total, ties kept in customer-name order.
    pub fn top_customers(table: &SalesTable, n: usize) -> Vec<CustomerRank> {
        Self::rank_customers(table, n, SalesRow::total_units)
    }

    /// Like [`top_customers`](Self::top_customers) but ranked on one month.
    pub fn top_customers_by_month(
        table: &SalesTable,
        month_key: &str,
        n: usize,
    ) -> Result<Vec<CustomerRank>> {
        let idx = table.require_column(month_key)?;
        Ok(Self::rank_customers(table, n, |row| row.units[idx]))
    }

    /// Every product ranked by lifetime units, labels cleaned of packaging
    /// and SKU noise.
    ///
    /// Units are summed per *raw* label before cleanup, so two raw labels that
    /// clean to the same name stay separate entries.
    pub fn top_products(table: &SalesTable) -> Vec<ProductRank> {
        let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
        for row in table.rows() {
            *totals.entry(row.product.as_str()).or_default() += row.total_units();
        }

        let mut ranked: Vec<(&str, u64)> = totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        ranked
            .into_iter()
            .map(|(product, total)| ProductRank {
                product: normalize_product_label(product),
                total,
            })
            .collect()
    }

    /// Every customer group ranked by lifetime units.
    pub fn top_customer_groups(table: &SalesTable) -> Vec<GroupRank> {
        let mut ranked: Vec<GroupRank> = Self::lifetime_sales_by_customer_group(table)
            .into_iter()
            .map(|(customer_group, total)| GroupRank {
                customer_group,
                total,
            })
            .collect();
        ranked.sort_by(|a, b| b.total.cmp(&a.total));
        ranked
    }

    /// Units in one measure column.
    pub fn total_sales_by_month(table: &SalesTable, month_key: &str) -> Result<u64> {
        let idx = table.require_column(month_key)?;
        Ok(table.column_total(idx))
    }

    /// Units across a set of measure columns, e.g. a quarter.
    ///
    /// Fails with [`SalesError::UnknownColumn`] naming the first missing key.
    pub fn total_sales_by_period<S: AsRef<str>>(table: &SalesTable, keys: &[S]) -> Result<u64> {
        let indices = keys
            .iter()
            .map(|k| table.require_column(k.as_ref()))
            .collect::<Result<Vec<usize>>>()?;
        Ok(Self::sum_columns(table, &indices))
    }

    /// Like [`total_sales_by_period`](Self::total_sales_by_period), but
    /// `None` when any key is missing, i.e. no data for that period.
    pub fn period_sales<S: AsRef<str>>(table: &SalesTable, keys: &[S]) -> Option<u64> {
        if table.has_columns(keys) {
            Self::total_sales_by_period(table, keys).ok()
        } else {
            None
        }
    }

    // ── Private ───────────────────────────────────────────────────────────────

    pub(crate) fn year_columns(table: &SalesTable, year: i32) -> Vec<usize> {
        let needle = year.to_string();
        table.column_indices_where(|key| key.contains(&needle))
    }

    fn sum_columns(table: &SalesTable, indices: &[usize]) -> u64 {
        indices.iter().map(|&idx| table.column_total(idx)).sum()
    }

    /// Sum `value` per (group, customer), then keep the best `n` per group.
    fn rank_customers(
        table: &SalesTable,
        n: usize,
        value: impl Fn(&SalesRow) -> u64,
    ) -> Vec<CustomerRank> {
        let mut totals: BTreeMap<(&str, &str), u64> = BTreeMap::new();
        for row in table.rows() {
            *totals
                .entry((row.customer_group.as_str(), row.customer.as_str()))
                .or_default() += value(row);
        }

        // BTreeMap iteration is already (group, customer) ascending; a stable
        // sort on (group asc, total desc) keeps customer order among ties.
        let mut ranked: Vec<((&str, &str), u64)> = totals.into_iter().collect();
        ranked.sort_by(|a, b| a.0 .0.cmp(b.0 .0).then(b.1.cmp(&a.1)));

        let mut taken: HashMap<&str, usize> = HashMap::new();
        ranked
            .into_iter()
            .filter(|((group, _), _)| {
                let count = taken.entry(*group).or_default();
                *count += 1;
                *count <= n
            })
            .map(|((group, customer), total)| CustomerRank {
                customer_group: group.to_string(),
                customer: customer.to_string(),
                total,
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
