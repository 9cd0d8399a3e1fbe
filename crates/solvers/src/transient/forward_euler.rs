use strand_core::{Integrator, Scheduler, StepContext};

use super::{Error, Resolution, Solver, stage};

/// Explicit forward Euler.
///
/// ```text
/// x(t + h) = x(t) + h * f(x(t), t)
/// ```
///
/// One round per step, no error estimate. The step size never changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwardEuler;

impl Solver for ForwardEuler {
    fn name(&self) -> &'static str {
        "ForwardEuler"
    }

    fn aux_variable_count(&self) -> usize {
        0
    }

    fn integrator_fire(&self, integrator: &mut Integrator, ctx: &StepContext) -> bool {
        let derivative = integrator.input();
        let next = integrator.state() + derivative * ctx.step_size();

        integrator.set_tentative_state(next);
        integrator.set_tentative_derivative(derivative);
        integrator.emit(next);
        true
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
        ctx.round_mut().reset();

        stage::fire_round(ctx, integrators, scheduler, |integrator, ctx| {
            self.integrator_fire(integrator, ctx)
        })?;

        ctx.set_time(ctx.time() + ctx.step_size());
        ctx.round_mut().set_converged(true);

        Ok(Resolution::Resolved)
    }
}
