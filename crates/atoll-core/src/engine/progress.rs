/// Events emitted while a comparison runs.
///
/// A run has two phases: the reference is prepared, then every query is aligned
/// against it. Warnings concern a single structure and never stop the run.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    ReferenceStart { label: String },
    ReferenceReady { label: String, residues: usize },

    AlignmentStart { total: u64 },
    StructureDone { label: String, mapped: bool },
    AlignmentFinish { mapped: usize, total: usize },

    Warning { label: String, message: String },
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards [`Progress`] events to an optional callback.
///
/// The reporter is shared by reference across worker threads, so callbacks must be
/// `Send + Sync`.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;
    use std::sync::Mutex;

    #[test]
    fn silent_reporter_ignores_events() {
        ProgressReporter::new().report(Progress::AlignmentStart { total: 3 });
    }

    #[test]
    fn callback_receives_events_from_worker_threads() {
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            seen.lock().unwrap().push(event);
        }));

        (0..8).into_par_iter().for_each(|i| {
            reporter.report(Progress::StructureDone {
                label: format!("s{i}"),
                mapped: i % 2 == 0,
            })
        });
        reporter.report(Progress::AlignmentFinish { mapped: 4, total: 8 });
        drop(reporter);

        let events = seen.into_inner().unwrap();
        assert_eq!(events.len(), 9);
        assert_eq!(
            events.last(),
            Some(&Progress::AlignmentFinish { mapped: 4, total: 8 })
        );
    }
}
