use strand_core::{Integrator, Scheduler, StepContext};

use super::{Error, Resolution, Solver, stage};

/// Implicit backward Euler, solved by fixed-point iteration.
///
/// ```text
/// x(t + h) = x(t) + h * f(x(t + h), t + h)
/// ```
///
/// Each round re-evaluates the derivative at the latest iterate. An
/// integrator votes for convergence when two successive iterates differ by
/// less than the value resolution. The attempt fails with
/// [`Resolution::NotConverged`] after one initial round plus
/// `max_iterations` corrections.
///
/// The iteration is a contraction only while `h * |∂f/∂x| < 1`, so stiff
/// problems need small steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackwardEuler;

impl Solver for BackwardEuler {
    fn name(&self) -> &'static str {
        "BackwardEuler"
    }

    fn aux_variable_count(&self) -> usize {
        0
    }

    fn integrator_fire(&self, integrator: &mut Integrator, ctx: &StepContext) -> bool {
        let derivative = integrator.input();
        let next = integrator.state() + derivative * ctx.step_size();
        let converged = (next - integrator.tentative_state()).abs() < ctx.value_resolution();

        integrator.set_tentative_state(next);
        integrator.set_tentative_derivative(derivative);
        integrator.emit(next);
        converged
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
        ctx.set_time(ctx.time() + ctx.step_size());

        let mut iterations = 0;
        loop {
            let converged = stage::fire_round(ctx, integrators, scheduler, |integrator, ctx| {
                self.integrator_fire(integrator, ctx)
            })?;

            if converged {
                ctx.round_mut().set_converged(true);
                return Ok(Resolution::Resolved);
            }

            iterations += 1;
            if iterations > ctx.max_iterations() {
                log::debug!(
                    "{} did not converge at t = {} after {iterations} rounds",
                    self.name(),
                    ctx.time()
                );
                return Ok(Resolution::NotConverged { iterations });
            }
        }
    }
}
