use strand_core::{Integrator, Scheduler, StepContext};

use super::{BackwardEuler, Error, Resolution, Solver};

/// Breakpoint solver that smooths a Dirac impulse.
///
/// Takes a backward Euler step forward by `h`, commits it, then a backward
/// Euler step back by `h` to the starting time. The net effect leaves time
/// unchanged but re-resolves states and derivatives after the discontinuity.
///
/// This is the one solver that commits integrators itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImpulseBackwardEuler;

impl Solver for ImpulseBackwardEuler {
    fn name(&self) -> &'static str {
        "ImpulseBackwardEuler"
    }

    fn aux_variable_count(&self) -> usize {
        BackwardEuler.aux_variable_count()
    }

    fn integrator_fire(&self, integrator: &mut Integrator, ctx: &StepContext) -> bool {
        BackwardEuler.integrator_fire(integrator, ctx)
    }

    fn integrator_is_accurate(&self, _integrator: &mut Integrator, _ctx: &StepContext) -> bool {
        true
    }

    fn integrator_predicted_step_size(&self, _integrator: &Integrator, ctx: &StepContext) -> f64 {
        ctx.step_size()
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
        let h = ctx.step_size();

        let forward = BackwardEuler.resolve_states(ctx, integrators, scheduler)?;
        if !forward.is_resolved() {
            return Ok(forward);
        }

        for integrator in integrators.iter_mut() {
            integrator.commit();
        }

        ctx.set_step_size(-h);
        let backward = BackwardEuler.resolve_states(ctx, integrators, scheduler);
        ctx.set_step_size(h);

        backward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use strand_core::{Schedule, Tolerances};

    fn decay() -> Schedule {
        Schedule::ode(1, |_, x, dx| dx[0] = -x[0])
    }

    #[test]
    fn matches_manual_forward_then_backward() {
        let h = 1e-3;

        let mut schedule = decay();
        let mut impulse = vec![Integrator::new(2.0)];
        let mut ctx = StepContext::new(1.0, h, Tolerances::default());
        let resolution = ImpulseBackwardEuler
            .resolve_states(&mut ctx, &mut impulse, &mut schedule)
            .expect("should resolve");

        let mut manual_schedule = decay();
        let mut manual = vec![Integrator::new(2.0)];
        let mut manual_ctx = StepContext::new(1.0, h, Tolerances::default());
        BackwardEuler
            .resolve_states(&mut manual_ctx, &mut manual, &mut manual_schedule)
            .expect("forward half");
        manual[0].commit();
        manual_ctx.set_step_size(-h);
        BackwardEuler
            .resolve_states(&mut manual_ctx, &mut manual, &mut manual_schedule)
            .expect("backward half");

        assert_eq!(resolution, Resolution::Resolved);
        assert_relative_eq!(impulse[0].tentative_state(), manual[0].tentative_state());
        assert_relative_eq!(
            impulse[0].tentative_derivative(),
            manual[0].tentative_derivative()
        );
        assert_relative_eq!(ctx.time(), manual_ctx.time());
        assert_relative_eq!(ctx.step_size(), h);
    }

    #[test]
    fn round_trip_returns_to_start() {
        let h = 1e-3;
        let mut schedule = decay();
        let mut integrators = vec![Integrator::new(2.0)];
        let mut ctx = StepContext::new(1.0, h, Tolerances::default());

        ImpulseBackwardEuler
            .resolve_states(&mut ctx, &mut integrators, &mut schedule)
            .expect("should resolve");

        assert_relative_eq!(ctx.time(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(integrators[0].tentative_state(), 2.0, epsilon = 1e-5);
        assert_relative_eq!(integrators[0].tentative_derivative(), -2.0, epsilon = 1e-5);
    }

    #[test]
    fn forward_failure_stops_before_commit() {
        let tolerances = Tolerances::new(1e-4, 1e-6, 3).expect("valid tolerances");
        let mut schedule = Schedule::ode(1, |_, x, dx| dx[0] = -5.0 * x[0]);
        let mut integrators = vec![Integrator::new(1.0)];
        let mut ctx = StepContext::new(0.0, 1.0, tolerances);

        let resolution = ImpulseBackwardEuler
            .resolve_states(&mut ctx, &mut integrators, &mut schedule)
            .expect("should not error");

        assert_eq!(resolution, Resolution::NotConverged { iterations: 4 });
        assert_relative_eq!(integrators[0].state(), 1.0);
    }
}
