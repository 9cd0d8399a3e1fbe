use strand_core::{Integrator, Scheduler, StepContext};

use super::{Error, Resolution, Solver, stage};

/// Breakpoint solver that evaluates derivatives without advancing time.
///
/// Used at the start of a run and after discontinuities, so the first step
/// of the next solver sees derivatives consistent with the current states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DerivativeResolver;

impl Solver for DerivativeResolver {
    fn name(&self) -> &'static str {
        "DerivativeResolver"
    }

    fn aux_variable_count(&self) -> usize {
        0
    }

    fn integrator_fire(&self, integrator: &mut Integrator, _ctx: &StepContext) -> bool {
        let state = integrator.state();

        integrator.set_tentative_derivative(integrator.input());
        integrator.set_tentative_state(state);
        integrator.emit(state);
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

        ctx.round_mut().set_converged(true);
        Ok(Resolution::Resolved)
    }
}
