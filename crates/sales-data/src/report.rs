//! Narrative sales report.
//!
//! Assembles the figures for the report's summary page: year-over-year and
//! quarter-over-quarter comparisons, monthly totals and rankings. Missing
//! prior periods are reported as "no data" instead of failing the run.

use sales_core::formatting::{format_growth, format_units, letters_only};
use sales_core::models::{quarter_keys, SalesTable};
use serde::Serialize;
use tracing::info;

use crate::charts::ChartSeries;
use crate::metrics::{CustomerRank, GroupRank, ProductRank, SalesMetrics};

/// Line printed when the year before the report year has no columns.
pub const NO_PREVIOUS_YEAR: &str =
    "No previous year's data was given - no comparison could be made";

/// Tunables for [`SalesReport::build`].
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Customers listed per customer group.
    pub top_customers: usize,
    /// Minimum lifetime units for a group to appear in the share chart.
    pub share_threshold: u64,
    /// Customer groups broken down by store and product.
    pub detail_groups: Vec<String>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_customers: 5,
            share_threshold: 1000,
            detail_groups: Vec::new(),
        }
    }
}

// ── Report sections ───────────────────────────────────────────────────────────

/// Units of the year before the report year, with growth against it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviousYear {
    pub year: i32,
    pub total: u64,
    /// `None` when the report year sold nothing.
    pub growth: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearComparison {
    pub year: i32,
    pub total: u64,
    /// `None` when the export has no columns for the previous year.
    pub previous: Option<PreviousYear>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthLine {
    /// Month name with the year stripped, e.g. `"January"`.
    pub month: String,
    pub units: u64,
}

/// One calendar quarter against the same quarter a year earlier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarterComparison {
    pub quarter: u8,
    pub year: i32,
    /// `None` when any month of the quarter is missing from the export.
    pub current: Option<u64>,
    pub previous: Option<u64>,
    pub growth: Option<f64>,
}

/// Everything the summary page and charts of one report need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesReport {
    pub title: String,
    pub year_comparison: YearComparison,
    pub months: Vec<MonthLine>,
    pub quarters: Vec<QuarterComparison>,
    pub top_customer_groups: Vec<GroupRank>,
    pub top_products: Vec<ProductRank>,
    pub top_customers: Vec<CustomerRank>,
    pub charts: ChartSeries,
}

impl SalesReport {
    /// Compute every section of the report for `year`.
    pub fn build(table: &SalesTable, year: i32, options: &ReportOptions) -> Self {
        Self {
            title: format!("Sales Report for {}", year),
            year_comparison: Self::year_comparison(table, year),
            months: SalesMetrics::sales_by_month(table, year)
                .into_iter()
                .map(|(key, units)| MonthLine {
                    month: letters_only(&key),
                    units,
                })
                .collect(),
            quarters: (1..=4)
                .map(|quarter| Self::quarter_comparison(table, year, quarter))
                .collect(),
            top_customer_groups: SalesMetrics::top_customer_groups(table),
            top_products: SalesMetrics::top_products(table),
            top_customers: SalesMetrics::top_customers(table, options.top_customers),
            charts: ChartSeries::build(
                table,
                year,
                options.share_threshold,
                &options.detail_groups,
            ),
        }
    }

    /// Render the summary page as plain text, one paragraph per line.
    pub fn render_text(&self) -> String {
        let mut lines: Vec<String> = vec![self.title.clone(), String::new()];

        let yc = &self.year_comparison;
        lines.push("Year Comparison".to_string());
        lines.push(format!(
            "In {} there was a total of {} units sold across all grocery groups.",
            yc.year, yc.total
        ));
        match &yc.previous {
            Some(prev) => {
                lines.push(format!(
                    "In {} there was a total of {} units sold across all grocery groups.",
                    prev.year, prev.total
                ));
                lines.push(format!(
                    "From {} to {} the growth was {}",
                    prev.year,
                    yc.year,
                    growth_text(prev.growth)
                ));
            }
            None => lines.push(NO_PREVIOUS_YEAR.to_string()),
        }
        lines.push(String::new());

        lines.push("Sales by Month".to_string());
        for line in &self.months {
            lines.push(format!("[{}] : {} units", line.month, line.units));
        }
        lines.push(String::new());

        lines.push("Quarter over Quarter".to_string());
        for q in &self.quarters {
            lines.push(match q.current {
                Some(units) => format!("Q{} {}: {} units", q.quarter, q.year, units),
                None => format!("Q{} {}: No Data", q.quarter, q.year),
            });
            lines.push(match q.previous {
                Some(units) => format!("Q{} {}: {} units", q.quarter, q.year - 1, units),
                None => format!("Q{} {}: No Previous Data", q.quarter, q.year - 1),
            });
            lines.push(format!("Growth: {}", growth_text(q.growth)));
            lines.push(String::new());
        }

        lines.push("Top Customer Groups".to_string());
        for (rank, group) in self.top_customer_groups.iter().enumerate() {
            lines.push(format!(
                "{}. {}: {} units",
                rank + 1,
                group.customer_group,
                format_units(group.total)
            ));
        }
        lines.push(String::new());

        lines.push("Best Selling Products".to_string());
        for (rank, product) in self.top_products.iter().enumerate() {
            lines.push(format!(
                "{}. {}: {} units",
                rank + 1,
                product.product.trim(),
                format_units(product.total)
            ));
        }
        lines.push(String::new());

        lines.push("Top Customers".to_string());
        for customer in &self.top_customers {
            lines.push(format!(
                "{} / {}: {} units",
                customer.customer_group,
                customer.customer,
                format_units(customer.total)
            ));
        }

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn year_comparison(table: &SalesTable, year: i32) -> YearComparison {
        let total = SalesMetrics::total_year_sales(table, year);
        let previous_year = year - 1;

        let previous = match SalesMetrics::year_sales(table, previous_year) {
            Some(previous_total) => Some(PreviousYear {
                year: previous_year,
                total: previous_total,
                growth: SalesMetrics::growth(total, previous_total).ok(),
            }),
            None => {
                info!("No data for {}; skipping year comparison", previous_year);
                None
            }
        };

        YearComparison {
            year,
            total,
            previous,
        }
    }

    fn quarter_comparison(table: &SalesTable, year: i32, quarter: u8) -> QuarterComparison {
        let current = SalesMetrics::period_sales(table, &quarter_keys(year, quarter));
        let previous = SalesMetrics::period_sales(table, &quarter_keys(year - 1, quarter));
        if previous.is_none() {
            info!("No data for Q{} {}; growth unavailable", quarter, year - 1);
        }

        let growth = match (current, previous) {
            (Some(c), Some(p)) => SalesMetrics::growth(c, p).ok(),
            _ => None,
        };

        QuarterComparison {
            quarter,
            year,
            current,
            previous,
            growth,
        }
    }
}

fn growth_text(growth: Option<f64>) -> String {
    match growth {
        Some(g) => format!("{}%", format_growth(g)),
        None => "N/A".to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sales_core::models::{measure_key, SalesRow, MONTHS};

    fn row(group: &str, customer: &str, product: &str, units: Vec<u64>) -> SalesRow {
        SalesRow {
            customer_group: group.to_string(),
            customer: customer.to_string(),
            product: product.to_string(),
            units,
        }
    }

    /// Full calendar for `years`, every cell set to `per_month`.
    fn calendar_table(years: &[i32], per_month: &[u64]) -> SalesTable {
        let columns: Vec<String> = years
            .iter()
            .flat_map(|&y| MONTHS.iter().map(move |m| measure_key(y, *m)))
            .collect();
        let units: Vec<u64> = per_month
            .iter()
            .flat_map(|&u| std::iter::repeat(u).take(12))
            .collect();
        SalesTable::new(
            columns,
            vec![row("Safeway CO", "Safeway 1", "Blend (WB) - 1", units)],
        )
        .unwrap()
    }

    // ── year comparison ───────────────────────────────────────────────────────

    #[test]
    fn test_year_comparison_with_previous_year() {
        let table = calendar_table(&[2023, 2024], &[5, 10]);
        let report = SalesReport::build(&table, 2024, &ReportOptions::default());

        let yc = &report.year_comparison;
        assert_eq!(yc.total, 120);
        let prev = yc.previous.as_ref().unwrap();
        assert_eq!(prev.year, 2023);
        assert_eq!(prev.total, 60);
        assert_eq!(prev.growth, Some(50.0));

        let text = report.render_text();
        assert!(text.contains("From 2023 to 2024 the growth was 50.0%"));
    }

    #[test]
    fn test_year_comparison_without_previous_year() {
        let table = calendar_table(&[2024], &[10]);
        let report = SalesReport::build(&table, 2024, &ReportOptions::default());

        assert!(report.year_comparison.previous.is_none());
        assert!(report.render_text().contains(NO_PREVIOUS_YEAR));
    }

    #[test]
    fn test_year_comparison_zero_current_year() {
        let table = calendar_table(&[2023, 2024], &[5, 0]);
        let report = SalesReport::build(&table, 2024, &ReportOptions::default());

        let prev = report.year_comparison.previous.as_ref().unwrap();
        assert_eq!(prev.growth, None);
        assert!(report.render_text().contains("the growth was N/A"));
    }

    // ── months ────────────────────────────────────────────────────────────────

    #[test]
    fn test_month_lines_strip_year() {
        let table = calendar_table(&[2023, 2024], &[5, 10]);
        let report = SalesReport::build(&table, 2024, &ReportOptions::default());

        assert_eq!(report.months.len(), 12);
        assert_eq!(
            report.months[0],
            MonthLine {
                month: "January".to_string(),
                units: 10
            }
        );
        assert!(report.render_text().contains("[December] : 10 units"));
    }

    // ── quarters ──────────────────────────────────────────────────────────────

    #[test]
    fn test_quarters_with_previous_year() {
        let table = calendar_table(&[2023, 2024], &[5, 10]);
        let report = SalesReport::build(&table, 2024, &ReportOptions::default());

        assert_eq!(report.quarters.len(), 4);
        let q1 = &report.quarters[0];
        assert_eq!(q1.current, Some(30));
        assert_eq!(q1.previous, Some(15));
        assert_eq!(q1.growth, Some(50.0));

        let text = report.render_text();
        assert!(text.contains("Q3 2024: 30 units"));
        assert!(text.contains("Q3 2023: 15 units"));
    }

    #[test]
    fn test_quarters_without_previous_year() {
        let table = calendar_table(&[2024], &[10]);
        let report = SalesReport::build(&table, 2024, &ReportOptions::default());

        for q in &report.quarters {
            assert_eq!(q.current, Some(30));
            assert_eq!(q.previous, None);
            assert_eq!(q.growth, None);
        }
        let text = report.render_text();
        assert!(text.contains("Q4 2023: No Previous Data"));
        assert!(text.contains("Growth: N/A"));
    }

    #[test]
    fn test_partial_quarter_is_unavailable() {
        let table = SalesTable::new(
            vec!["2024_January".to_string(), "2024_February".to_string()],
            vec![row("G", "C", "P", vec![1, 2])],
        )
        .unwrap();
        let report = SalesReport::build(&table, 2024, &ReportOptions::default());
        assert_eq!(report.quarters[0].current, None);
        assert!(report.render_text().contains("Q1 2024: No Data"));
    }

    // ── rankings ──────────────────────────────────────────────────────────────

    #[test]
    fn test_rankings_rendered() {
        let table = calendar_table(&[2024], &[100]);
        let report = SalesReport::build(&table, 2024, &ReportOptions::default());
        let text = report.render_text();

        assert!(text.contains("1. Safeway CO: 1,200 units"));
        assert!(text.contains("1. Blend: 1,200 units"));
        assert!(text.contains("Safeway CO / Safeway 1: 1,200 units"));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let table = calendar_table(&[2024], &[1]);
        let report = SalesReport::build(&table, 2024, &ReportOptions::default());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["title"], "Sales Report for 2024");
        assert!(json["year_comparison"]["previous"].is_null());
        assert_eq!(json["charts"]["monthly"].as_array().unwrap().len(), 12);
    }
}
