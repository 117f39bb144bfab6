use crate::cli::SortArgs;
use crate::config::builder::build_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use auxsort::{engine::progress::ProgressReporter, workflows};
use tracing::{info, warn};

pub fn run(args: SortArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app_config = build_config(&args)?;
    info!(
        "Sorting with strategy '{}', modules by '{}', strips by '{}'.",
        app_config.core_config.strategy,
        app_config.core_config.module_order,
        app_config.core_config.sensitive_order
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Sorting CRT geometry...");
    let outcome = workflows::sort::run_files(
        &app_config.modules_path,
        app_config.sensitive_path.as_deref(),
        &app_config.output_dir,
        &app_config.core_config,
        &reporter,
    )?;

    let report = &outcome.report;
    if report.non_finite > 0 {
        warn!(
            "{} descriptor(s) have non-finite centers and were placed last.",
            report.non_finite
        );
    }
    println!(
        "✓ {} module(s) and {} strip(s) numbered ({} module order, {} module(s) with reordered strips).",
        report.modules,
        report.sensitive,
        if report.module_order_changed {
            "changed"
        } else {
            "unchanged"
        },
        report.modules_with_reordered_strips
    );
    println!("  Modules written to: {}", outcome.modules_output.display());
    println!("  Strips written to:  {}", outcome.sensitive_output.display());

    Ok(())
}
