use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use lineforge::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;
const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
const BAR_TEMPLATE: &str = "{msg:<24} [{bar:40.cyan/blue}] {pos}/{len} lineups ({elapsed})";

/// Renders engine progress events on stderr.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::with_draw_target(Some(0), target).with_style(spinner_style());
        pb.finish_and_clear();
        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb = Arc::clone(&self.pb);

        Box::new(move |progress: Progress| {
            let Ok(pb) = pb.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    pb.reset();
                    pb.set_length(0);
                    pb.set_style(spinner_style());
                    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb.set_message(name);
                }
                Progress::PhaseFinish => {
                    pb.disable_steady_tick();
                    pb.finish_with_message("Done");
                }
                Progress::RunStart { lineups } => {
                    pb.disable_steady_tick();
                    pb.reset();
                    pb.set_length(lineups);
                    pb.set_position(0);
                    pb.set_style(bar_style());
                }
                Progress::LineupAccepted {
                    lineup_number,
                    score,
                } => {
                    pb.inc(1);
                    pb.set_message(format!("Lineup {lineup_number}: {score:.2} pts"));
                }
                Progress::RunHalted {
                    lineup_number,
                    reason,
                } => {
                    pb.println(format!("  Stopped at lineup {lineup_number}: {reason}"));
                }
                Progress::RunFinish => pb.finish(),
                Progress::Message(msg) => {
                    if pb.is_finished() {
                        pb.set_message(msg);
                    } else {
                        pb.println(format!("  {msg}"));
                    }
                }
            }
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn hidden() -> CliProgressHandler {
        CliProgressHandler::with_target(ProgressDrawTarget::hidden())
    }

    #[test]
    fn templates_are_valid() {
        assert!(ProgressStyle::with_template(SPINNER_TEMPLATE).is_ok());
        assert!(ProgressStyle::with_template(BAR_TEMPLATE).is_ok());
    }

    #[test]
    fn generation_events_drive_the_bar() {
        let handler = hidden();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "Generating Lineups",
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.message(), "Generating Lineups");
            assert!(!pb.is_finished());
        }

        callback(Progress::RunStart { lineups: 3 });
        callback(Progress::LineupAccepted {
            lineup_number: 1,
            score: 141.256,
        });
        {
            let pb = handler.pb.lock().unwrap();
            assert_eq!(pb.length(), Some(3));
            assert_eq!(pb.position(), 1);
            assert_eq!(pb.message(), "Lineup 1: 141.26 pts");
        }

        callback(Progress::RunHalted {
            lineup_number: 2,
            reason: "no feasible lineup".into(),
        });
        callback(Progress::RunFinish);
        callback(Progress::PhaseFinish);
        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "Done");
    }

    #[test]
    fn callback_is_usable_from_another_thread() {
        let handler = hidden();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart {
                name: "Preparation",
            });
            callback(Progress::Message("note".into()));
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "Done");
    }
}
