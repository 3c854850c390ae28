/// Events emitted while a foam is being built.
///
/// Phases nest tasks: a phase may run one counted task, whose steps are reported one
/// increment at a time. Messages are free-form notes for the user, such as skipped work.
#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards progress events to an optional callback.
///
/// A reporter without a callback discards every event, so library code can report
/// unconditionally.
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

    /// Reports a [`Progress::Message`].
    pub fn message(&self, text: impl Into<String>) {
        self.report(Progress::Message(text.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reporter_without_callback_ignores_events() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::TaskIncrement);
    }

    #[test]
    fn reporter_forwards_events_in_order() {
        let seen = Mutex::new(Vec::new());
        {
            let reporter = ProgressReporter::with_callback(Box::new(|event: Progress| {
                seen.lock().unwrap().push(format!("{:?}", event));
            }));
            reporter.report(Progress::PhaseStart { name: "Grid" });
            reporter.report(Progress::TaskStart { total_steps: 2 });
            reporter.report(Progress::PhaseFinish);
        }
        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].contains("Grid"));
        assert!(seen[1].contains("total_steps: 2"));
    }

    #[test]
    fn message_wraps_text_in_a_message_event() {
        let seen = Mutex::new(None);
        {
            let reporter = ProgressReporter::with_callback(Box::new(|event: Progress| {
                if let Progress::Message(text) = event {
                    *seen.lock().unwrap() = Some(text);
                }
            }));
            reporter.message("halfway");
        }
        assert_eq!(seen.into_inner().unwrap().as_deref(), Some("halfway"));
    }
}
