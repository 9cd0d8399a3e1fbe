//! Core types for round-based ODE integration.
//!
//! This crate defines the shared pieces that solvers and directors build on:
//!
//! - [`Integrator`]: one scalar state variable with committed, tentative, and
//!   auxiliary values plus its data channel
//! - [`StepContext`]: the clock, tolerances, and [`Round`] bookkeeping lent
//!   to a solver for one integration attempt
//! - [`Scheduler`]: the ordered state-transition and dynamic stages a solver
//!   fires each round, with [`Schedule`] as a ready-made implementation
//! - [`Observer`]: receives events and optionally returns control actions

mod context;
mod integrator;
mod observer;
mod schedule;

pub use context::{Round, StepContext, ToleranceError, Tolerances, tally_votes};
pub use integrator::{AuxVariables, Integrator, MAX_AUX_VARIABLES};
pub use observer::Observer;
pub use schedule::{Channels, Schedule, ScheduleError, Scheduler, Transition, TransitionError};
