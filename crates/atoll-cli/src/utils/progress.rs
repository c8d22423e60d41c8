use atoll::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::time::Duration;

const SPINNER_TICK_MS: u64 = 80;

/// Renders the two phases of a comparison run: a spinner while the reference is
/// prepared, then one bar step per aligned structure.
///
/// Per-structure warnings are printed above the bar so they stay visible once it
/// finishes.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: ProgressBar,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::with_draw_target(Some(0), target).with_style(Self::spinner_style());
        pb.finish_and_clear();
        Self { pb }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb = self.pb.clone();

        Box::new(move |progress: Progress| match progress {
            Progress::ReferenceStart { label } => {
                pb.reset();
                pb.set_length(0);
                pb.set_style(Self::spinner_style());
                pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                pb.set_message(format!("Preparing reference {label}"));
            }
            Progress::ReferenceReady { label, residues } => {
                pb.disable_steady_tick();
                pb.finish_with_message(format!("✓ Reference {label} ({residues} residues)"));
            }
            Progress::AlignmentStart { total } => {
                pb.reset();
                pb.set_style(Self::bar_style());
                pb.set_length(total);
                pb.set_position(0);
                pb.set_message("Aligning");
            }
            Progress::StructureDone { label, mapped } => {
                let status = if mapped { "mapped" } else { "skipped" };
                pb.set_message(format!("{label} ({status})"));
                pb.inc(1);
            }
            Progress::Warning { label, message } => {
                pb.println(format!("  ⚠ {label}: {message}"));
            }
            Progress::AlignmentFinish { mapped, total } => {
                pb.set_position(pb.length().unwrap_or(0));
                pb.finish_with_message(format!("✓ {mapped}/{total} mapped"));
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .expect("Failed to create spinner style template")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<24} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn hidden() -> CliProgressHandler {
        CliProgressHandler::with_draw_target(ProgressDrawTarget::hidden())
    }

    #[test]
    fn handler_starts_finished_and_empty() {
        let handler = hidden();
        assert_eq!(handler.pb.length(), Some(0));
        assert!(handler.pb.is_finished());
    }

    #[test]
    fn reference_phase_uses_a_spinner() {
        let handler = hidden();
        let callback = handler.get_callback();

        callback(Progress::ReferenceStart { label: "5ZBH".into() });
        assert_eq!(handler.pb.message(), "Preparing reference 5ZBH");
        assert!(!handler.pb.is_finished());

        callback(Progress::ReferenceReady {
            label: "5ZBH".into(),
            residues: 312,
        });
        assert!(handler.pb.is_finished());
        assert_eq!(handler.pb.message(), "✓ Reference 5ZBH (312 residues)");
    }

    #[test]
    fn alignment_phase_advances_once_per_structure() {
        let handler = hidden();
        let callback = handler.get_callback();

        callback(Progress::AlignmentStart { total: 3 });
        assert_eq!(handler.pb.length(), Some(3));
        assert_eq!(handler.pb.position(), 0);

        callback(Progress::StructureDone {
            label: "5ZBH".into(),
            mapped: true,
        });
        assert_eq!(handler.pb.message(), "5ZBH (mapped)");
        assert_eq!(handler.pb.position(), 1);

        callback(Progress::Warning {
            label: "4DKL".into(),
            message: "low sequence identity (21.0%)".into(),
        });
        callback(Progress::StructureDone {
            label: "4DKL".into(),
            mapped: false,
        });
        assert_eq!(handler.pb.message(), "4DKL (skipped)");
        assert_eq!(handler.pb.position(), 2);

        callback(Progress::AlignmentFinish { mapped: 1, total: 3 });
        assert!(handler.pb.is_finished());
        assert_eq!(handler.pb.position(), 3);
        assert_eq!(handler.pb.message(), "✓ 1/3 mapped");
    }

    #[test]
    fn callback_is_thread_safe() {
        let handler = hidden();
        let callback = handler.get_callback();
        callback(Progress::AlignmentStart { total: 8 });

        thread::spawn(move || {
            for i in 0..8 {
                callback(Progress::StructureDone {
                    label: format!("s{i}"),
                    mapped: true,
                });
            }
        })
        .join()
        .unwrap();

        assert_eq!(handler.pb.position(), 8);
    }
}
