mod bootstrap;

use anyhow::{Context, Result};
use sales_core::settings::Settings;
use sales_data::loader;
use sales_data::report::{ReportOptions, SalesReport};

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;
    settings.validate()?;

    tracing::info!("Sales Report v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Input: {}, Year: {}, Format: {}",
        settings.input.display(),
        settings.year,
        settings.format
    );

    // Format errors abort the run; there is no partial report.
    let table = loader::load(&settings.input)
        .with_context(|| format!("could not load {}", settings.input.display()))?;

    let options = ReportOptions {
        top_customers: settings.top,
        share_threshold: settings.pie_threshold,
        detail_groups: settings.facet_groups.clone(),
    };
    let report = SalesReport::build(&table, settings.year, &options);

    match settings.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print!("{}", report.render_text()),
    }

    Ok(())
}
