use thiserror::Error;

use crate::transient::{self, SolverKind};

/// Errors that can occur while a director advances time.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Solver(#[from] transient::Error),

    #[error("step size {step_size} at t = {time} is too small to make progress")]
    StepSizeTooSmall { time: f64, step_size: f64 },

    #[error("cannot fire at t = {time}, the director is already at t = {now}")]
    InvalidBreakpoint { time: f64, now: f64 },

    #[error("no integrator at index {index}")]
    UnknownIntegrator { index: usize },

    #[error("the run already reached its stop time t = {stop_time}")]
    Finished { stop_time: f64 },
}

/// Errors that can occur when building a director.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    #[error("a scheduler is required")]
    MissingScheduler,

    #[error("at least one integrator is required")]
    MissingIntegrators,

    #[error("scheduler expects {expected} integrators, found {found}")]
    IntegratorCountMismatch { expected: usize, found: usize },

    #[error("{0} does not advance time and cannot be the main solver")]
    BreakpointSolverAsSolver(SolverKind),

    #[error("{0} advances time and cannot run at breakpoints")]
    NotABreakpointSolver(SolverKind),
}
