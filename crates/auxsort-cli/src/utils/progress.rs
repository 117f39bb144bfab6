use auxsort::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Bar plus the tallies shown when a phase finishes.
struct PhaseDisplay {
    pb: ProgressBar,
    phase: &'static str,
    unit: Option<&'static str>,
    changed: u64,
    warnings: u64,
}

impl PhaseDisplay {
    fn start_phase(&mut self, name: &'static str) {
        self.phase = name;
        self.unit = None;
        self.changed = 0;
        self.warnings = 0;
    }

    /// e.g. "✓ Sensitive volumes: 3 of 12 modules reordered, 1 warning".
    fn summary(&self) -> String {
        let mut details = Vec::new();
        if let Some(unit) = self.unit {
            let total = self.pb.length().unwrap_or(0);
            details.push(format!("{} of {} {} reordered", self.changed, total, unit));
        }
        if self.warnings > 0 {
            let plural = if self.warnings == 1 { "" } else { "s" };
            details.push(format!("{} warning{}", self.warnings, plural));
        }
        if details.is_empty() {
            format!("✓ {}", self.phase)
        } else {
            format!("✓ {}: {}", self.phase, details.join(", "))
        }
    }
}

#[derive(Clone)]
pub struct CliProgressHandler {
    state: Arc<Mutex<PhaseDisplay>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0)
            .with_style(Self::spinner_style())
            .with_message("Initializing...");
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.disable_steady_tick();
        pb.finish_and_clear();

        Self {
            state: Arc::new(Mutex::new(PhaseDisplay {
                pb,
                phase: "",
                unit: None,
                changed: 0,
                warnings: 0,
            })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let state = self.state.clone();

        Box::new(move |progress: Progress| {
            let Ok(mut display) = state.lock() else {
                warn!("Progress display mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    display.start_phase(name);
                    let pb = &display.pb;
                    pb.reset();
                    pb.set_length(0);
                    pb.set_style(Self::spinner_style());
                    pb.set_prefix(name);
                    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb.set_message(name);
                }
                Progress::PhaseFinish => {
                    let summary = display.summary();
                    display.pb.disable_steady_tick();
                    display.pb.finish_with_message(summary);
                }
                Progress::TaskStart { total_steps, unit } => {
                    display.unit = Some(unit);
                    display.changed = 0;
                    let pb = &display.pb;
                    pb.disable_steady_tick();
                    pb.reset();
                    pb.set_length(total_steps);
                    pb.set_position(0);
                    pb.set_style(Self::bar_style(unit));
                    pb.set_message("");
                }
                Progress::ItemFinished { name, changed } => {
                    if changed {
                        display.changed += 1;
                    }
                    display.pb.inc(1);
                    display.pb.set_message(name);
                }
                Progress::TaskFinish => {
                    let pb = &display.pb;
                    let length = pb.length().unwrap_or(0);
                    if pb.position() < length {
                        pb.set_position(length);
                    }
                    pb.finish();
                }
                Progress::Message(msg) => {
                    if !display.pb.is_finished() {
                        display.pb.println(format!("  {}", msg));
                    } else {
                        display.pb.set_message(msg);
                    }
                }
                Progress::Warning(msg) => {
                    display.warnings += 1;
                    display.pb.println(format!("  ⚠ {}", msg));
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .expect("Failed to create spinner style template")
    }

    /// Phase name on the left, the item just finished on the right.
    fn bar_style(unit: &str) -> ProgressStyle {
        let template =
            format!("{{prefix:<18}} [{{bar:30.cyan/blue}}] {{pos}}/{{len}} {unit} ({{eta}}) {{wide_msg}}");
        ProgressStyle::with_template(&template)
            .expect("Failed to create bar style template")
            .with_key(
                "eta",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
                },
            )
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
