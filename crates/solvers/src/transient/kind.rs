use std::{fmt, str::FromStr};

use strand_core::{Integrator, Scheduler, StepContext};
use thiserror::Error;

use super::{
    BackwardEuler, DerivativeResolver, Error, ExplicitRk23, ExplicitRk45, ForwardEuler,
    ImpulseBackwardEuler, Resolution, Solver, Trapezoidal,
};

/// Any of the built-in solvers, chosen at runtime.
///
/// Parses from and displays as the solver's [`name`](Solver::name).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverKind {
    ForwardEuler,
    BackwardEuler,
    ExplicitRk23,
    #[default]
    ExplicitRk45,
    Trapezoidal,
    DerivativeResolver,
    ImpulseBackwardEuler,
}

/// Returned when parsing a name that matches no built-in solver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown solver: {0}")]
pub struct UnknownSolver(pub String);

impl SolverKind {
    pub const ALL: [Self; 7] = [
        Self::ForwardEuler,
        Self::BackwardEuler,
        Self::ExplicitRk23,
        Self::ExplicitRk45,
        Self::Trapezoidal,
        Self::DerivativeResolver,
        Self::ImpulseBackwardEuler,
    ];

    /// Returns `true` for the solvers meant to run at breakpoints.
    #[must_use]
    pub fn is_breakpoint_solver(&self) -> bool {
        matches!(self, Self::DerivativeResolver | Self::ImpulseBackwardEuler)
    }

    fn solver(&self) -> &dyn Hooks {
        match self {
            Self::ForwardEuler => &ForwardEuler,
            Self::BackwardEuler => &BackwardEuler,
            Self::ExplicitRk23 => &ExplicitRk23,
            Self::ExplicitRk45 => &ExplicitRk45,
            Self::Trapezoidal => &Trapezoidal,
            Self::DerivativeResolver => &DerivativeResolver,
            Self::ImpulseBackwardEuler => &ImpulseBackwardEuler,
        }
    }
}

/// The object-safe part of [`Solver`].
trait Hooks {
    fn name(&self) -> &'static str;
    fn aux_variable_count(&self) -> usize;
    fn integrator_fire(&self, integrator: &mut Integrator, ctx: &StepContext) -> bool;
    fn integrator_is_accurate(&self, integrator: &mut Integrator, ctx: &StepContext) -> bool;
    fn integrator_predicted_step_size(&self, integrator: &Integrator, ctx: &StepContext) -> f64;
    fn integrator_refined_step_size(&self, integrator: &Integrator, ctx: &StepContext) -> f64;
}

impl<T: Solver> Hooks for T {
    fn name(&self) -> &'static str {
        Solver::name(self)
    }

    fn aux_variable_count(&self) -> usize {
        Solver::aux_variable_count(self)
    }

    fn integrator_fire(&self, integrator: &mut Integrator, ctx: &StepContext) -> bool {
        Solver::integrator_fire(self, integrator, ctx)
    }

    fn integrator_is_accurate(&self, integrator: &mut Integrator, ctx: &StepContext) -> bool {
        Solver::integrator_is_accurate(self, integrator, ctx)
    }

    fn integrator_predicted_step_size(&self, integrator: &Integrator, ctx: &StepContext) -> f64 {
        Solver::integrator_predicted_step_size(self, integrator, ctx)
    }

    fn integrator_refined_step_size(&self, integrator: &Integrator, ctx: &StepContext) -> f64 {
        Solver::integrator_refined_step_size(self, integrator, ctx)
    }
}

impl Solver for SolverKind {
    fn name(&self) -> &'static str {
        self.solver().name()
    }

    fn aux_variable_count(&self) -> usize {
        self.solver().aux_variable_count()
    }

    fn integrator_fire(&self, integrator: &mut Integrator, ctx: &StepContext) -> bool {
        self.solver().integrator_fire(integrator, ctx)
    }

    fn integrator_is_accurate(&self, integrator: &mut Integrator, ctx: &StepContext) -> bool {
        self.solver().integrator_is_accurate(integrator, ctx)
    }

    fn integrator_predicted_step_size(&self, integrator: &Integrator, ctx: &StepContext) -> f64 {
        self.solver().integrator_predicted_step_size(integrator, ctx)
    }

    fn integrator_refined_step_size(&self, integrator: &Integrator, ctx: &StepContext) -> f64 {
        self.solver().integrator_refined_step_size(integrator, ctx)
    }

    fn resolve_states<S>(
        &self,
        ctx: &mut StepContext,
        integrators: &mut [Integrator],
        scheduler: &mut S,
    ) -> Result<Resolution, Error>
    where
        S: Scheduler + ?Sized,
    {
        match self {
            Self::ForwardEuler => ForwardEuler.resolve_states(ctx, integrators, scheduler),
            Self::BackwardEuler => BackwardEuler.resolve_states(ctx, integrators, scheduler),
            Self::ExplicitRk23 => ExplicitRk23.resolve_states(ctx, integrators, scheduler),
            Self::ExplicitRk45 => ExplicitRk45.resolve_states(ctx, integrators, scheduler),
            Self::Trapezoidal => Trapezoidal.resolve_states(ctx, integrators, scheduler),
            Self::DerivativeResolver => {
                DerivativeResolver.resolve_states(ctx, integrators, scheduler)
            }
            Self::ImpulseBackwardEuler => {
                ImpulseBackwardEuler.resolve_states(ctx, integrators, scheduler)
            }
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Solver::name(self))
    }
}

impl FromStr for SolverKind {
    type Err = UnknownSolver;

    /// Matches solver names case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| Solver::name(kind).eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownSolver(s.to_owned()))
    }
}
