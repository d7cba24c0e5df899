//! Chart-ready data series.
//!
//! Each function prepares the numbers behind one chart of the report; the
//! drawing itself belongs to whatever renders the output.

use std::collections::BTreeMap;

use sales_core::formatting::percentage;
use sales_core::labels::normalize_product_label;
use sales_core::models::{measure_key, SalesTable, KEY_SEPARATOR, MONTHS};
use serde::Serialize;
use tracing::debug;

use crate::metrics::{GroupRank, SalesMetrics};

/// One point of the monthly sales line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthPoint {
    /// Month name, e.g. `"March"`.
    pub month: String,
    /// Units sold, `None` when the export has no column for the month.
    pub units: Option<u64>,
}

/// One slice of the customer-group share chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupShare {
    pub customer_group: String,
    pub total: u64,
    /// Share of the charted total, rounded to one decimal place.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearTotal {
    pub year: i32,
    pub total: u64,
}

/// Units of one cleaned product label, broken down by customer group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductGroupSales {
    pub product: String,
    pub by_group: BTreeMap<String, u64>,
}

/// One non-zero (store, product, month) cell of a customer group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreProductSale {
    pub customer: String,
    pub product: String,
    pub month_key: String,
    pub units: u64,
}

/// Store-level detail for one customer group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupDetail {
    pub customer_group: String,
    pub sales: Vec<StoreProductSale>,
}

/// Every series the report's charts need for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub monthly: Vec<MonthPoint>,
    pub group_shares: Vec<GroupShare>,
    pub yearly: Vec<YearTotal>,
    pub group_sales: Vec<GroupRank>,
    pub product_by_group: Vec<ProductGroupSales>,
    pub group_details: Vec<GroupDetail>,
}

impl ChartSeries {
    /// Build all chart series for `year`.
    ///
    /// The yearly comparison covers `year` and the year before it.
    pub fn build(
        table: &SalesTable,
        year: i32,
        share_threshold: u64,
        detail_groups: &[String],
    ) -> Self {
        Self {
            monthly: SalesCharts::monthly_series(table, year),
            group_shares: SalesCharts::customer_group_shares(table, share_threshold),
            yearly: SalesCharts::yearly_totals(table, &[year - 1, year]),
            group_sales: SalesCharts::customer_group_sales_for_year(table, year),
            product_by_group: SalesCharts::product_sales_by_customer_group(table, year),
            group_details: detail_groups
                .iter()
                .map(|group| GroupDetail {
                    customer_group: group.clone(),
                    sales: SalesCharts::customer_group_detail(table, year, group),
                })
                .collect(),
        }
    }
}

/// Stateless builders for individual chart series.
pub struct SalesCharts;

impl SalesCharts {
    /// Units for each calendar month of `year`, January first.
    pub fn monthly_series(table: &SalesTable, year: i32) -> Vec<MonthPoint> {
        MONTHS
            .iter()
            .map(|month| MonthPoint {
                month: month.name().to_string(),
                units: SalesMetrics::total_sales_by_month(table, &measure_key(year, *month)).ok(),
            })
            .collect()
    }

    /// Lifetime units per customer group for groups with at least
    /// `threshold` units, in order of first appearance.
    pub fn customer_group_shares(table: &SalesTable, threshold: u64) -> Vec<GroupShare> {
        let totals = SalesMetrics::lifetime_sales_by_customer_group(table);
        let kept: Vec<(&str, u64)> = table
            .customer_groups()
            .into_iter()
            .filter_map(|group| totals.get(group).map(|&total| (group, total)))
            .filter(|&(_, total)| total >= threshold)
            .collect();

        let charted: u64 = kept.iter().map(|&(_, total)| total).sum();
        kept.into_iter()
            .map(|(group, total)| GroupShare {
                customer_group: group.to_string(),
                total,
                percent: percentage(total as f64, charted as f64, 1),
            })
            .collect()
    }

    /// Units sold in each of `years`.
    pub fn yearly_totals(table: &SalesTable, years: &[i32]) -> Vec<YearTotal> {
        years
            .iter()
            .map(|&year| YearTotal {
                year,
                total: SalesMetrics::total_year_sales(table, year),
            })
            .collect()
    }

    /// Units per customer group within `year`, groups in name order.
    pub fn customer_group_sales_for_year(table: &SalesTable, year: i32) -> Vec<GroupRank> {
        let prefix = format!("{}{}", year, KEY_SEPARATOR);
        let columns = table.column_indices_where(|key| key.starts_with(&prefix));

        let mut totals: BTreeMap<String, u64> = BTreeMap::new();
        for row in table.rows() {
            let units: u64 = columns.iter().map(|&idx| row.units[idx]).sum();
            *totals.entry(row.customer_group.clone()).or_default() += units;
        }

        totals
            .into_iter()
            .map(|(customer_group, total)| GroupRank {
                customer_group,
                total,
            })
            .collect()
    }

    /// Pivot of cleaned product label by customer group for `year`.
    ///
    /// Raw labels that clean to the same name are summed together.
    pub fn product_sales_by_customer_group(
        table: &SalesTable,
        year: i32,
    ) -> Vec<ProductGroupSales> {
        let columns = SalesMetrics::year_columns(table, year);

        let mut pivot: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
        for row in table.rows() {
            let units: u64 = columns.iter().map(|&idx| row.units[idx]).sum();
            *pivot
                .entry(normalize_product_label(&row.product))
                .or_default()
                .entry(row.customer_group.clone())
                .or_default() += units;
        }

        pivot
            .into_iter()
            .map(|(product, by_group)| ProductGroupSales { product, by_group })
            .collect()
    }

    /// Non-zero store/product/month cells of `group` within `year`.
    ///
    /// Cells are listed month by month, and by table row within a month.
    pub fn customer_group_detail(
        table: &SalesTable,
        year: i32,
        group: &str,
    ) -> Vec<StoreProductSale> {
        let columns = SalesMetrics::year_columns(table, year);
        let rows: Vec<_> = table
            .rows()
            .iter()
            .filter(|row| row.customer_group == group)
            .collect();
        if rows.is_empty() {
            debug!("No rows for customer group {}", group);
        }

        columns
            .iter()
            .flat_map(|&idx| {
                rows.iter().filter(move |row| row.units[idx] > 0).map(move |row| {
                    StoreProductSale {
                        customer: row.customer.clone(),
                        product: row.product.clone(),
                        month_key: table.columns()[idx].clone(),
                        units: row.units[idx],
                    }
                })
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sales_core::models::SalesRow;

    fn row(group: &str, customer: &str, product: &str, units: Vec<u64>) -> SalesRow {
        SalesRow {
            customer_group: group.to_string(),
            customer: customer.to_string(),
            product: product.to_string(),
            units,
        }
    }

    fn table() -> SalesTable {
        SalesTable::new(
            ["2023_December", "2024_January", "2024_February"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            vec![
                row("Safeway CO", "Safeway 1", "COV 12oz Blend (WB) - 1", vec![600, 700, 0]),
                row("Sprouts", "Sprouts 4", "Blend (G) - 2", vec![10, 20, 30]),
                row("Safeway CO", "Safeway 2", "Decaf - 3", vec![0, 300, 400]),
                row("King Soopers", "King 7", "Blend - 1", vec![500, 400, 300]),
            ],
        )
        .unwrap()
    }

    // ── monthly_series ────────────────────────────────────────────────────────

    #[test]
    fn test_monthly_series_covers_calendar() {
        let series = SalesCharts::monthly_series(&table(), 2024);
        assert_eq!(series.len(), 12);
        assert_eq!(series[0].month, "January");
        assert_eq!(series[0].units, Some(1420));
        assert_eq!(series[1].units, Some(730));
        assert_eq!(series[2].month, "March");
        assert_eq!(series[2].units, None);
        assert_eq!(series[11].month, "December");
    }

    // ── customer_group_shares ─────────────────────────────────────────────────

    #[test]
    fn test_group_shares_threshold_and_order() {
        let shares = SalesCharts::customer_group_shares(&table(), 1000);
        let names: Vec<&str> = shares.iter().map(|s| s.customer_group.as_str()).collect();
        assert_eq!(names, vec!["Safeway CO", "King Soopers"]);
        assert_eq!(shares[0].total, 2000);
        assert_eq!(shares[1].total, 1200);
        assert!((shares[0].percent - 62.5).abs() < 1e-9);
        assert!((shares[1].percent - 37.5).abs() < 1e-9);
    }

    #[test]
    fn test_group_shares_zero_threshold_keeps_all() {
        assert_eq!(SalesCharts::customer_group_shares(&table(), 0).len(), 3);
    }

    // ── yearly_totals ─────────────────────────────────────────────────────────

    #[test]
    fn test_yearly_totals() {
        let years = SalesCharts::yearly_totals(&table(), &[2023, 2024]);
        assert_eq!(
            years,
            vec![
                YearTotal {
                    year: 2023,
                    total: 1110
                },
                YearTotal {
                    year: 2024,
                    total: 2150
                },
            ]
        );
    }

    // ── customer_group_sales_for_year ─────────────────────────────────────────

    #[test]
    fn test_group_sales_for_year_sorted_by_name() {
        let sales = SalesCharts::customer_group_sales_for_year(&table(), 2024);
        let flat: Vec<(&str, u64)> = sales
            .iter()
            .map(|g| (g.customer_group.as_str(), g.total))
            .collect();
        assert_eq!(
            flat,
            vec![("King Soopers", 700), ("Safeway CO", 1400), ("Sprouts", 50)]
        );
    }

    // ── product_sales_by_customer_group ───────────────────────────────────────

    #[test]
    fn test_product_pivot_merges_cleaned_labels() {
        let pivot = SalesCharts::product_sales_by_customer_group(&table(), 2024);
        let products: Vec<&str> = pivot.iter().map(|p| p.product.as_str()).collect();
        assert_eq!(products, vec![" Blend", "Blend", "Decaf"]);

        let blend = &pivot[1];
        assert_eq!(blend.by_group["King Soopers"], 700);
        assert_eq!(blend.by_group["Sprouts"], 50);
        assert_eq!(pivot[0].by_group["Safeway CO"], 700);
        assert_eq!(pivot[2].by_group["Safeway CO"], 700);
    }

    // ── customer_group_detail ─────────────────────────────────────────────────

    #[test]
    fn test_group_detail_skips_zero_cells() {
        let detail = SalesCharts::customer_group_detail(&table(), 2024, "Safeway CO");
        let flat: Vec<(&str, &str, u64)> = detail
            .iter()
            .map(|s| (s.customer.as_str(), s.month_key.as_str(), s.units))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("Safeway 1", "2024_January", 700),
                ("Safeway 2", "2024_January", 300),
                ("Safeway 2", "2024_February", 400),
            ]
        );
    }

    #[test]
    fn test_group_detail_unknown_group_is_empty() {
        assert!(SalesCharts::customer_group_detail(&table(), 2024, "Target").is_empty());
    }

    // ── ChartSeries ───────────────────────────────────────────────────────────

    #[test]
    fn test_chart_series_build() {
        let series = ChartSeries::build(&table(), 2024, 1000, &["Sprouts".to_string()]);
        assert_eq!(series.monthly.len(), 12);
        assert_eq!(series.group_shares.len(), 2);
        assert_eq!(series.yearly.len(), 2);
        assert_eq!(series.yearly[0].year, 2023);
        assert_eq!(series.group_details.len(), 1);
        assert_eq!(series.group_details[0].sales.len(), 2);
    }
}
