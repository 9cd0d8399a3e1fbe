use crate::transient::SolverKind;

use super::Sample;

/// Events emitted by the director during a run.
///
/// Step 0 is the initial state after derivatives have been resolved.
/// Rejected attempts of step `n` are reported before step `n` is accepted.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// A step was accepted and committed.
    Accepted {
        /// The step number (0 for the initial state).
        step: usize,

        /// The step size the solver resolved with.
        step_size: f64,

        /// The solver that resolved the step.
        solver: SolverKind,

        /// States at the end of the step.
        sample: &'a Sample,
    },

    /// An attempt was rolled back and will be retried.
    Rejected {
        /// The step number being attempted.
        step: usize,

        /// Why and where the attempt failed.
        rejection: Rejection,
    },
}

impl Event<'_> {
    /// The step number this event belongs to.
    #[must_use]
    pub fn step(&self) -> usize {
        match self {
            Self::Accepted { step, .. } | Self::Rejected { step, .. } => *step,
        }
    }
}

/// A failed integration attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct Rejection {
    /// Time at which the attempt started.
    pub time: f64,

    /// Step size of the failed attempt.
    pub step_size: f64,

    pub reason: Reason,
}

/// Why an attempt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum Reason {
    /// The solver's fixed-point iteration did not settle.
    NotConverged { iterations: usize },

    /// At least one integrator exceeded the error tolerance.
    Inaccurate,
}

/// Summary of one accepted step, returned by [`Director::step`].
///
/// [`Director::step`]: super::Director::step
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Time after the step.
    pub time: f64,

    /// Step size the accepted attempt used.
    pub step_size: f64,

    /// The solver that resolved the step.
    pub solver: SolverKind,

    /// Attempts rolled back before this one succeeded.
    pub rejections: Vec<Rejection>,
}
