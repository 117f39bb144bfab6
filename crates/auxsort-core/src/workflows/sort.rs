use crate::core::io::table::{self, GeometryError};
use crate::core::models::geometry::{CrtGeometry, GeometryIssue};
use crate::core::sorting::sorter::{sort_aux_dets_standard, sort_module_sensitive};
use crate::engine::config::SortConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

pub const MODULES_OUTPUT_FILE: &str = "modules.sorted.csv";
pub const SENSITIVE_OUTPUT_FILE: &str = "sensitive.sorted.csv";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortReport {
    pub modules: usize,
    pub sensitive: usize,
    /// Modules and strips whose center has a NaN or infinite coordinate.
    pub non_finite: usize,
    pub module_order_changed: bool,
    /// Number of modules whose strips were reordered.
    pub modules_with_reordered_strips: usize,
}

#[derive(Debug, Clone)]
pub struct SortOutcome {
    pub report: SortReport,
    pub modules_output: PathBuf,
    pub sensitive_output: PathBuf,
}

/// Sorts the whole geometry into the standard configuration.
///
/// Modules are ordered and numbered first so that every strip can pick up its
/// module's final index as back-reference. Anomalies found on the way are logged
/// and reported as [`Progress::Warning`]; they never abort the sort.
#[instrument(skip_all, name = "sort_workflow")]
pub fn run(
    geometry: &mut CrtGeometry,
    config: &SortConfig,
    reporter: &ProgressReporter,
) -> SortReport {
    // === Phase 1: Inspect input ===
    reporter.report(Progress::PhaseStart { name: "Validation" });
    let non_finite = report_issues(&geometry.validate(), reporter);
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Modules ===
    reporter.report(Progress::PhaseStart { name: "Modules" });
    info!(
        modules = geometry.module_count(),
        order = %config.module_order,
        strategy = %config.strategy,
        "Sorting modules."
    );
    let module_order_changed = sort_aux_dets_standard(geometry.modules_mut(), config);
    geometry.rebuild_name_map();
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Strips, one module at a time ===
    reporter.report(Progress::PhaseStart {
        name: "Sensitive volumes",
    });
    reporter.report(Progress::TaskStart {
        total_steps: geometry.module_count() as u64,
        unit: "modules",
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = geometry.modules_mut().iter_mut();

    #[cfg(feature = "parallel")]
    let iterator = geometry.modules_mut().par_iter_mut();

    let modules_with_reordered_strips = iterator
        .map(|module| {
            let changed = sort_module_sensitive(module, config);
            reporter.report(Progress::ItemFinished {
                name: module.name.clone(),
                changed,
            });
            changed
        })
        .filter(|&changed| changed)
        .count();

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let report = SortReport {
        modules: geometry.module_count(),
        sensitive: geometry.sensitive_count(),
        non_finite,
        module_order_changed,
        modules_with_reordered_strips,
    };
    info!(
        modules = report.modules,
        sensitive = report.sensitive,
        module_order_changed,
        modules_with_reordered_strips,
        "Standard ordering complete."
    );
    report
}

/// Loads the geometry tables, sorts them and writes the sorted tables into
/// `output_dir` as [`MODULES_OUTPUT_FILE`] and [`SENSITIVE_OUTPUT_FILE`].
#[instrument(skip_all, name = "sort_files_workflow")]
pub fn run_files(
    modules_path: &Path,
    sensitive_path: Option<&Path>,
    output_dir: &Path,
    config: &SortConfig,
    reporter: &ProgressReporter,
) -> Result<SortOutcome, EngineError> {
    reporter.report(Progress::PhaseStart { name: "Loading" });
    info!(modules = %modules_path.display(), "Loading geometry tables.");
    let mut geometry = table::load_geometry(modules_path, sensitive_path)?;
    reporter.report(Progress::PhaseFinish);

    let report = run(&mut geometry, config, reporter);

    reporter.report(Progress::PhaseStart { name: "Writing" });
    std::fs::create_dir_all(output_dir).map_err(|source| GeometryError::Io {
        path: output_dir.to_string_lossy().to_string(),
        source,
    })?;
    let modules_output = output_dir.join(MODULES_OUTPUT_FILE);
    let sensitive_output = output_dir.join(SENSITIVE_OUTPUT_FILE);
    table::write_geometry(&geometry, &modules_output, &sensitive_output)?;
    info!(output = %output_dir.display(), "Sorted geometry written.");
    reporter.report(Progress::PhaseFinish);

    Ok(SortOutcome {
        report,
        modules_output,
        sensitive_output,
    })
}

/// Logs every issue and returns how many of them are non-finite centers.
fn report_issues(issues: &[GeometryIssue], reporter: &ProgressReporter) -> usize {
    let mut non_finite = 0;
    for issue in issues {
        let message = match issue {
            GeometryIssue::DuplicateModuleName(name) => {
                format!("Duplicate module name '{}'.", name)
            }
            GeometryIssue::DuplicateSensitiveName { module, strip } => {
                format!("Duplicate sensitive volume '{}' in module '{}'.", strip, module)
            }
            GeometryIssue::NonFiniteModuleCenter(name) => {
                non_finite += 1;
                format!("Module '{}' has a non-finite center; it sorts last.", name)
            }
            GeometryIssue::NonFiniteSensitiveCenter { module, strip } => {
                non_finite += 1;
                format!(
                    "Sensitive volume '{}' in module '{}' has a non-finite center; it sorts last.",
                    strip, module
                )
            }
        };
        warn!("{}", message);
        reporter.report(Progress::Warning(message));
    }
    non_finite
}
