use log::Level;
use strand_core::Observer;
use strand_solvers::director::Event;

/// Reports director progress through the [`log`] facade.
///
/// Accepted steps are logged at the configured level and rejected attempts
/// at [`Level::Warn`]. The observer never stops a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogObserver {
    level: Level,
    target: &'static str,
    accepted: usize,
    rejected: usize,
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}

impl LogObserver {
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self {
            level,
            target: module_path!(),
            accepted: 0,
            rejected: 0,
        }
    }

    /// Logs under `target` instead of this module's path.
    #[must_use]
    pub fn with_target(mut self, target: &'static str) -> Self {
        self.target = target;
        self
    }

    /// Accepted events seen so far, including the initial state.
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    #[must_use]
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

impl<A> Observer<Event<'_>, A> for LogObserver {
    fn observe(&mut self, event: &Event<'_>) -> Option<A> {
        match event {
            Event::Accepted {
                step,
                step_size,
                solver,
                sample,
            } => {
                self.accepted += 1;
                log::log!(
                    target: self.target,
                    self.level,
                    "step {step} ({solver}, h = {step_size:e}): t = {}, x = {:?}",
                    sample.time,
                    sample.states
                );
            }
            Event::Rejected { step, rejection } => {
                self.rejected += 1;
                log::warn!(
                    target: self.target,
                    "step {step} rejected at t = {}, h = {:e}: {:?}",
                    rejection.time,
                    rejection.step_size,
                    rejection.reason
                );
            }
        }
        None
    }
}
