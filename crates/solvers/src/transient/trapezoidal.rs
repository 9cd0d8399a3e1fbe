//! Implicit trapezoidal rule with step-doubling error control.
//!
//! ```text
//! x(t + h) = x(t) + h/2 * (f(x(t), t) + f(x(t + h), t + h))
//! ```
//!
//! Each step is solved three times by fixed-point iteration, each seeded with
//! a forward Euler predictor: once across the full step, then as two half
//! steps. The two-half-step result is kept, and a third of its difference from
//! the full-step result estimates the local error.

use strand_core::{Integrator, Scheduler, StepContext};

use super::{Error, Resolution, Solver, stage};

const BASE_STATE: usize = 0;
const BASE_DERIVATIVE: usize = 1;
const FULL_STEP_STATE: usize = 2;
const LOCAL_ERROR: usize = 3;
const AUX_VARIABLE_COUNT: usize = 4;

/// Largest growth factor a single prediction may apply.
const MAX_GROWTH: f64 = 2.0;

/// Variable-step implicit trapezoidal rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Trapezoidal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    FullStep,
    FirstHalf,
    SecondHalf,
}

impl Trapezoidal {
    /// Starts a phase from `(state, derivative)` and emits its predictor.
    fn begin_phase(integrator: &mut Integrator, state: f64, derivative: f64, h: f64) {
        integrator.set_aux_variable(BASE_STATE, state);
        integrator.set_aux_variable(BASE_DERIVATIVE, derivative);

        let predictor = state + h * derivative;
        integrator.set_tentative_state(predictor);
        integrator.emit(predictor);
    }

    /// One corrector iteration over a (sub)step of size `h`.
    fn correct(integrator: &mut Integrator, h: f64, value_resolution: f64) -> bool {
        let aux = integrator.aux_variables();
        let (base_state, base_derivative) = (aux[BASE_STATE], aux[BASE_DERIVATIVE]);

        let derivative = integrator.input();
        let next = base_state + 0.5 * h * (base_derivative + derivative);
        let converged = (next - integrator.tentative_state()).abs() < value_resolution;

        integrator.set_tentative_state(next);
        integrator.set_tentative_derivative(derivative);
        integrator.emit(next);
        converged
    }

    /// Iterates one phase to convergence.
    fn converge<S>(
        phase: Phase,
        ctx: &mut StepContext,
        integrators: &mut [Integrator],
        scheduler: &mut S,
        h: f64,
    ) -> Result<Resolution, Error>
    where
        S: Scheduler + ?Sized,
    {
        let mut iterations = 0;
        loop {
            let converged = stage::fire_round(ctx, integrators, scheduler, |integrator, ctx| {
                Self::correct(integrator, h, ctx.value_resolution())
            })?;

            if converged {
                return Ok(Resolution::Resolved);
            }

            iterations += 1;
            if iterations > ctx.max_iterations() {
                log::debug!(
                    "trapezoidal {phase:?} did not converge at t = {} after {iterations} rounds",
                    ctx.time()
                );
                return Ok(Resolution::NotConverged { iterations });
            }
        }
    }

    fn local_error(integrator: &Integrator) -> f64 {
        integrator.aux_variables()[LOCAL_ERROR]
    }
}

impl Solver for Trapezoidal {
    fn name(&self) -> &'static str {
        "Trapezoidal"
    }

    fn aux_variable_count(&self) -> usize {
        AUX_VARIABLE_COUNT
    }

    /// Corrector iteration across the full step.
    fn integrator_fire(&self, integrator: &mut Integrator, ctx: &StepContext) -> bool {
        Self::correct(integrator, ctx.step_size(), ctx.value_resolution())
    }

    fn integrator_is_accurate(&self, integrator: &mut Integrator, ctx: &StepContext) -> bool {
        Self::local_error(integrator) < ctx.error_tolerance()
    }

    fn integrator_predicted_step_size(&self, integrator: &Integrator, ctx: &StepContext) -> f64 {
        let h = ctx.step_size();
        let error = Self::local_error(integrator);

        if error <= ctx.value_resolution() {
            return MAX_GROWTH * h;
        }

        let factor = (3.0 * ctx.error_tolerance() / error).cbrt();
        h * factor.min(MAX_GROWTH)
    }

    fn integrator_refined_step_size(&self, integrator: &Integrator, ctx: &StepContext) -> f64 {
        let h = ctx.step_size();

        if Self::local_error(integrator) < ctx.error_tolerance() {
            h
        } else {
            (0.5 * h).min(self.integrator_predicted_step_size(integrator, ctx))
        }
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

        let start = ctx.time();
        let h = ctx.step_size();
        let half = 0.5 * h;

        for phase in [Phase::FullStep, Phase::FirstHalf, Phase::SecondHalf] {
            let (sub_step, end) = match phase {
                Phase::FullStep => (h, start + h),
                Phase::FirstHalf => (half, start + half),
                Phase::SecondHalf => (half, start + h),
            };

            for integrator in integrators.iter_mut() {
                let (state, derivative) = match phase {
                    Phase::FullStep | Phase::FirstHalf => {
                        (integrator.state(), integrator.derivative())
                    }
                    Phase::SecondHalf => (
                        integrator.tentative_state(),
                        integrator.tentative_derivative(),
                    ),
                };
                Self::begin_phase(integrator, state, derivative, sub_step);
            }

            ctx.set_time(end);

            let resolution = Self::converge(phase, ctx, integrators, scheduler, sub_step)?;
            if !resolution.is_resolved() {
                return Ok(resolution);
            }

            if phase == Phase::FullStep {
                for integrator in integrators.iter_mut() {
                    let full = integrator.tentative_state();
                    integrator.set_aux_variable(FULL_STEP_STATE, full);
                }
            }
        }

        for integrator in integrators.iter_mut() {
            let aux = integrator.aux_variables();
            let error = (aux[FULL_STEP_STATE] - integrator.tentative_state()).abs() / 3.0;
            integrator.set_aux_variable(LOCAL_ERROR, error);
        }

        ctx.round_mut().set_converged(true);
        Ok(Resolution::Resolved)
    }
}
