//! Capability traits for director observers.
//!
//! These traits abstract over event and action types, so observers can be
//! written once and reused across directors.
//!
//! # Event traits
//!
//! - [`HasTime`]: events that happen at a simulated time
//! - [`HasStepSize`]: events that carry the step size of an attempt
//!
//! # Action traits
//!
//! - [`CanStopEarly`]: actions that can signal early termination
//!
//! # Example
//!
//! ```rust
//! use strand_core::Observer;
//! use strand_observers::traits::{CanStopEarly, HasStepSize};
//!
//! /// Stops once the director settles on steps smaller than `floor`.
//! struct Stalled {
//!     floor: f64,
//! }
//!
//! impl<E: HasStepSize, A: CanStopEarly> Observer<E, A> for Stalled {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         (event.step_size() < self.floor).then(A::stop_early)
//!     }
//! }
//! ```

use strand_solvers::director::{Action, Event};

/// An event that happens at a simulated time.
pub trait HasTime {
    fn time(&self) -> f64;
}

/// An event that carries a step size.
pub trait HasStepSize {
    fn step_size(&self) -> f64;
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the director early.
    fn stop_early() -> Self;
}

// --- director::Event ---

impl HasTime for Event<'_> {
    /// End of an accepted step, or start of a rejected attempt.
    fn time(&self) -> f64 {
        match self {
            Event::Accepted { sample, .. } => sample.time,
            Event::Rejected { rejection, .. } => rejection.time,
        }
    }
}

impl HasStepSize for Event<'_> {
    fn step_size(&self) -> f64 {
        match self {
            Event::Accepted { step_size, .. } => *step_size,
            Event::Rejected { rejection, .. } => rejection.step_size,
        }
    }
}

// --- director::Action ---

impl CanStopEarly for Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}
