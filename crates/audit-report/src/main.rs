mod bootstrap;

use anyhow::Result;
use audit_core::config::ReportConfig;
use audit_core::settings::Settings;
use audit_data::analysis::{available_dates, generate_report, ReportRequest};
use audit_data::reader::load_rows;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Audit Report v{} starting", env!("CARGO_PKG_VERSION"));

    let config = ReportConfig::load(settings.config.as_deref())?;
    let rows = load_rows(&settings.inputs, settings.max_rows)?;
    tracing::info!("Loaded {} rows", rows.len());

    if settings.list_dates {
        let dates = available_dates(&rows, &config);
        let mut listing = dates.join("\n");
        if dates.is_empty() {
            tracing::warn!("No recognisable dates in the input");
        } else {
            listing.push('\n');
        }
        bootstrap::write_output(&listing, settings.output.as_deref())?;
        return Ok(());
    }

    let request = ReportRequest {
        rows: &rows,
        partition: settings.partition()?,
        config: &config,
    };

    let Some(report) = generate_report(&request) else {
        eprintln!(
            "No report generated: no rows matched {:?}. Use --list-dates to see the dates present.",
            request.partition
        );
        return Ok(());
    };

    let text = if settings.wants_json() {
        serde_json::to_string_pretty(&report)?
    } else {
        report.markdown
    };
    bootstrap::write_output(&text, settings.output.as_deref())?;

    Ok(())
}
