use strand_core::{Integrator, Scheduler, StepContext};

use crate::transient::SolverKind;

use super::{BuildError, Config, Director, breakpoints::Breakpoints};

/// Assembles a [`Director`].
///
/// A scheduler and at least one integrator are required. The solver defaults
/// to [`SolverKind::ExplicitRk45`], the breakpoint solver to
/// [`SolverKind::DerivativeResolver`], and the config to [`Config::default`].
#[derive(Debug)]
pub struct Builder<S> {
    scheduler: Option<S>,
    initial_states: Vec<f64>,
    solver: SolverKind,
    breakpoint_solver: SolverKind,
    config: Config,
}

impl<S> Default for Builder<S> {
    fn default() -> Self {
        Self {
            scheduler: None,
            initial_states: Vec::new(),
            solver: SolverKind::ExplicitRk45,
            breakpoint_solver: SolverKind::DerivativeResolver,
            config: Config::default(),
        }
    }
}

impl<S: Scheduler> Builder<S> {
    #[must_use]
    pub fn scheduler(mut self, scheduler: S) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Sets one integrator per initial state, in scheduler index order.
    #[must_use]
    pub fn integrators(mut self, initial_states: impl IntoIterator<Item = f64>) -> Self {
        self.initial_states = initial_states.into_iter().collect();
        self
    }

    /// Sets the solver used between breakpoints.
    #[must_use]
    pub fn solver(mut self, solver: SolverKind) -> Self {
        self.solver = solver;
        self
    }

    /// Sets the solver used at breakpoints.
    #[must_use]
    pub fn breakpoint_solver(mut self, solver: SolverKind) -> Self {
        self.breakpoint_solver = solver;
        self
    }

    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Builds the director.
    ///
    /// The director is not yet initialized; the first call to
    /// [`Director::step`] or [`Director::run`] does that.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduler or integrators are missing, if the
    /// scheduler was built for a different number of integrators, or if a
    /// solver is assigned to the wrong role.
    pub fn build(self) -> Result<Director<S>, BuildError> {
        let scheduler = self.scheduler.ok_or(BuildError::MissingScheduler)?;

        if self.initial_states.is_empty() {
            return Err(BuildError::MissingIntegrators);
        }

        let expected = scheduler.integrator_count();
        let found = self.initial_states.len();
        if expected != found {
            return Err(BuildError::IntegratorCountMismatch { expected, found });
        }

        if self.solver.is_breakpoint_solver() {
            return Err(BuildError::BreakpointSolverAsSolver(self.solver));
        }
        if !self.breakpoint_solver.is_breakpoint_solver() {
            return Err(BuildError::NotABreakpointSolver(self.breakpoint_solver));
        }

        let config = self.config;
        Ok(Director {
            scheduler,
            integrators: self.initial_states.iter().copied().map(Integrator::new).collect(),
            initial_states: self.initial_states,
            solver: self.solver,
            breakpoint_solver: self.breakpoint_solver,
            ctx: StepContext::new(
                config.start_time(),
                config.initial_step_size(),
                *config.tolerances(),
            ),
            breakpoints: Breakpoints::default(),
            suggested_step_size: config.initial_step_size(),
            initialized: false,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use strand_core::Schedule;

    #[test]
    fn requires_a_scheduler() {
        let result = Builder::<Schedule>::default().integrators([1.0]).build();
        assert_eq!(result.err(), Some(BuildError::MissingScheduler));
    }

    #[test]
    fn requires_integrators() {
        let result = Director::builder().scheduler(Schedule::new(1)).build();
        assert_eq!(result.err(), Some(BuildError::MissingIntegrators));
    }

    #[test]
    fn integrator_count_must_match_scheduler() {
        let result = Director::builder()
            .scheduler(Schedule::new(2))
            .integrators([1.0, 2.0, 3.0])
            .build();

        assert_eq!(
            result.err(),
            Some(BuildError::IntegratorCountMismatch {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn main_solver_must_advance_time() {
        for solver in [
            SolverKind::DerivativeResolver,
            SolverKind::ImpulseBackwardEuler,
        ] {
            let result = Director::builder()
                .scheduler(Schedule::new(1))
                .integrators([1.0])
                .solver(solver)
                .build();

            assert_eq!(
                result.err(),
                Some(BuildError::BreakpointSolverAsSolver(solver))
            );
        }
    }

    #[test]
    fn breakpoint_solver_must_hold_time() {
        let result = Director::builder()
            .scheduler(Schedule::new(1))
            .integrators([1.0])
            .solver(SolverKind::BackwardEuler)
            .breakpoint_solver(SolverKind::ForwardEuler)
            .build();

        assert_eq!(
            result.err(),
            Some(BuildError::NotABreakpointSolver(SolverKind::ForwardEuler))
        );
    }

    #[test]
    fn defaults_pick_rk45_and_derivative_resolver() {
        let director = Director::builder()
            .scheduler(Schedule::new(1))
            .integrators([0.0])
            .build()
            .expect("should build");

        assert_eq!(director.solver(), SolverKind::ExplicitRk45);
        assert_eq!(director.breakpoint_solver(), SolverKind::DerivativeResolver);
        assert_eq!(director.config(), &Config::default());
    }
}
