use strand_core::Observer;

use crate::traits::{CanStopEarly, HasTime};

/// Stops a run at the first event at or after a given time.
///
/// The step that crosses `time` is still recorded, so the last sample may lie
/// past it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopAt {
    time: f64,
}

impl StopAt {
    #[must_use]
    pub fn new(time: f64) -> Self {
        Self { time }
    }
}

impl<E: HasTime, A: CanStopEarly> Observer<E, A> for StopAt {
    fn observe(&mut self, event: &E) -> Option<A> {
        (event.time() >= self.time).then(A::stop_early)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use strand_core::Schedule;
    use strand_solvers::{
        director::{Director, Status},
        transient::SolverKind,
    };

    #[test]
    fn stops_once_time_is_reached() {
        let mut director = Director::builder()
            .scheduler(Schedule::ode(1, |_, _, dx| dx[0] = 1.0))
            .integrators([0.0])
            .solver(SolverKind::ForwardEuler)
            .build()
            .expect("should build");

        let solution = director.run(StopAt::new(0.25)).expect("should stop early");

        assert_eq!(solution.status, Status::StoppedByObserver);
        assert_eq!(solution.steps, 3);
        let last = solution.history.last().expect("non-empty history");
        assert!(last.time >= 0.25);
    }
}
