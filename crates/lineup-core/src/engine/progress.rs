/// Events emitted while a generation run advances.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    /// Lineup generation begins; `lineups` is the number requested.
    RunStart { lineups: u64 },
    /// Lineup `lineup_number` (1-based) was accepted with the given selection score.
    LineupAccepted { lineup_number: usize, score: f64 },
    /// Generation stopped before producing lineup `lineup_number`.
    RunHalted { lineup_number: usize, reason: String },
    RunFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards [`Progress`] events to an optional observer. A reporter without one drops them.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    observer: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(observer: ProgressCallback<'a>) -> Self {
        Self {
            observer: Some(observer),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(observer) = &self.observer {
            observer(event);
        }
    }

    pub(crate) fn phase<T>(&self, name: &'static str, body: impl FnOnce() -> T) -> T {
        self.report(Progress::PhaseStart { name });
        let result = body();
        self.report(Progress::PhaseFinish);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording() -> (ProgressReporter<'static>, Arc<Mutex<Vec<Progress>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            sink.lock().unwrap().push(event);
        }));
        (reporter, seen)
    }

    #[test]
    fn reporter_without_observer_drops_events() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::RunFinish);
    }

    #[test]
    fn events_arrive_in_order() {
        let (reporter, seen) = recording();
        reporter.report(Progress::RunStart { lineups: 2 });
        reporter.report(Progress::LineupAccepted {
            lineup_number: 1,
            score: 120.5,
        });
        reporter.report(Progress::RunFinish);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                Progress::RunStart { lineups: 2 },
                Progress::LineupAccepted {
                    lineup_number: 1,
                    score: 120.5
                },
                Progress::RunFinish,
            ]
        );
    }

    #[test]
    fn phase_brackets_its_body() {
        let (reporter, seen) = recording();
        let value = reporter.phase("Preparation", || {
            reporter.report(Progress::Message("inside".into()));
            7
        });
        assert_eq!(value, 7);
        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], Progress::PhaseStart { name: "Preparation" });
        assert_eq!(seen[1], Progress::Message("inside".into()));
        assert_eq!(seen[2], Progress::PhaseFinish);
    }
}
