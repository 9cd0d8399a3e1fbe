//! Round-based integration algorithms for ODE networks.
//!
//! A [`Solver`] advances every [`Integrator`] of a network across one step.
//! Each step is resolved in rounds: the scheduler's state-transition stage
//! evaluates `f(x, u, t)` from what the integrators emitted, then the dynamic
//! stage fires each integrator, which reads its derivative, updates its
//! tentative values, and emits a new state. Explicit methods stop after a
//! fixed number of rounds. Implicit methods stop once every integrator votes
//! that its value has settled.
//!
//! Solvers hold no state of their own. The round count, converged flag, time,
//! and step size live in the [`StepContext`] the director lends them, and all
//! per-variable scratch data lives in the integrators' auxiliary slots.
//!
//! # Solvers
//!
//! - [`ForwardEuler`]: fixed step, explicit, one round
//! - [`BackwardEuler`]: fixed step, implicit, fixed-point iteration
//! - [`ExplicitRk23`]: variable step, Bogacki–Shampine 2(3)
//! - [`ExplicitRk45`]: variable step, Cash–Karp 4(5)
//! - [`Trapezoidal`]: variable step, implicit, step-doubling error control
//! - [`DerivativeResolver`]: breakpoint solver, no time advance
//! - [`ImpulseBackwardEuler`]: breakpoint solver for Dirac impulses
//!
//! [`SolverKind`] wraps them all for callers that choose a method at runtime.

mod backward_euler;
mod derivative_resolver;
mod error;
mod forward_euler;
mod impulse_backward_euler;
mod kind;
mod runge_kutta;
mod stage;
mod trapezoidal;

pub use backward_euler::BackwardEuler;
pub use derivative_resolver::DerivativeResolver;
pub use error::Error;
pub use forward_euler::ForwardEuler;
pub use impulse_backward_euler::ImpulseBackwardEuler;
pub use kind::{SolverKind, UnknownSolver};
pub use runge_kutta::{ExplicitRk23, ExplicitRk45};
pub use trapezoidal::Trapezoidal;

use strand_core::{Integrator, Scheduler, StepContext};

/// Outcome of one call to [`Solver::resolve_states`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum Resolution {
    /// Every integrator holds a tentative state at `time + step_size`.
    Resolved,

    /// A fixed-point iteration did not settle within the iteration limit.
    NotConverged {
        /// Rounds fired without reaching convergence.
        iterations: usize,
    },
}

impl Resolution {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

/// An integration strategy.
///
/// The per-integrator hooks define what a method does to a single state
/// variable. [`resolve_states`](Self::resolve_states) drives the rounds that
/// apply those hooks to the whole network.
pub trait Solver {
    /// Short name, used in logs and for [`SolverKind`] lookup.
    fn name(&self) -> &'static str;

    /// Number of auxiliary slots each integrator must provide.
    fn aux_variable_count(&self) -> usize;

    /// Performs this method's per-round update on one integrator.
    ///
    /// Returns the integrator's convergence vote. Explicit methods always vote
    /// `true`.
    fn integrator_fire(&self, integrator: &mut Integrator, ctx: &StepContext) -> bool;

    /// Reports whether the integrator's last resolved step met the error
    /// tolerance.
    ///
    /// Takes the integrator mutably because some methods record their error
    /// estimate in an auxiliary slot.
    fn integrator_is_accurate(&self, integrator: &mut Integrator, ctx: &StepContext) -> bool;

    /// Step size this integrator would like for the next step.
    fn integrator_predicted_step_size(&self, integrator: &Integrator, ctx: &StepContext) -> f64;

    /// Step size to retry with after an inaccurate attempt.
    ///
    /// Only meaningful after
    /// [`integrator_is_accurate`](Self::integrator_is_accurate) has run for
    /// the same attempt.
    fn integrator_refined_step_size(&self, _integrator: &Integrator, ctx: &StepContext) -> f64 {
        0.5 * ctx.step_size()
    }

    /// Resolves the tentative state of every integrator over one step.
    ///
    /// On return the context's time is where the method leaves it, normally
    /// `time + step_size`. On failure the caller rolls the context and the
    /// integrators back.
    ///
    /// # Errors
    ///
    /// Returns an error if a state-transition unit fails or an integrator
    /// reads a non-finite derivative. A fixed-point iteration that does not
    /// settle is not an error; it is reported as
    /// [`Resolution::NotConverged`].
    fn resolve_states<S>(
        &self,
        ctx: &mut StepContext,
        integrators: &mut [Integrator],
        scheduler: &mut S,
    ) -> Result<Resolution, Error>
    where
        S: Scheduler + ?Sized;
}
