//! Explicit embedded Runge–Kutta methods.
//!
//! Both methods share one round structure. With `S` stages, round `r < S`
//! reads stage derivative `k[r]`, stores it in auxiliary slot `r`, and emits
//! the state at the next stage's abscissa. Round `S - 1` emits the new state,
//! and a final round `S` evaluates the derivative there. The embedded
//! lower-order solution gives a local error estimate that drives step-size
//! control.

mod tableau;

#[cfg(test)]
mod tests;

use strand_core::{Integrator, Scheduler, StepContext};

use self::tableau::{BOGACKI_SHAMPINE, CASH_KARP, Tableau};
use super::{Error, Resolution, Solver, stage};

/// Largest growth factor a single prediction may apply.
const MAX_GROWTH: f64 = 5.0;

/// Bogacki–Shampine 2(3): third-order steps with a second-order error estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExplicitRk23;

/// Cash–Karp 4(5): fifth-order steps with a fourth-order error estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExplicitRk45;

impl Solver for ExplicitRk23 {
    fn name(&self) -> &'static str {
        "ExplicitRK23"
    }

    fn aux_variable_count(&self) -> usize {
        BOGACKI_SHAMPINE.aux_variable_count()
    }

    fn integrator_fire(&self, integrator: &mut Integrator, ctx: &StepContext) -> bool {
        fire(&BOGACKI_SHAMPINE, integrator, ctx)
    }

    fn integrator_is_accurate(&self, integrator: &mut Integrator, ctx: &StepContext) -> bool {
        is_accurate(&BOGACKI_SHAMPINE, integrator, ctx)
    }

    fn integrator_predicted_step_size(&self, integrator: &Integrator, ctx: &StepContext) -> f64 {
        predict(&BOGACKI_SHAMPINE, integrator, ctx, |ratio| {
            (0.8 * ratio).max(0.5)
        })
    }

    fn integrator_refined_step_size(&self, integrator: &Integrator, ctx: &StepContext) -> f64 {
        refine(
            &BOGACKI_SHAMPINE,
            integrator,
            ctx,
            self.integrator_predicted_step_size(integrator, ctx),
        )
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
        resolve(&BOGACKI_SHAMPINE, ctx, integrators, scheduler)
    }
}

impl Solver for ExplicitRk45 {
    fn name(&self) -> &'static str {
        "ExplicitRK45"
    }

    fn aux_variable_count(&self) -> usize {
        CASH_KARP.aux_variable_count()
    }

    fn integrator_fire(&self, integrator: &mut Integrator, ctx: &StepContext) -> bool {
        fire(&CASH_KARP, integrator, ctx)
    }

    fn integrator_is_accurate(&self, integrator: &mut Integrator, ctx: &StepContext) -> bool {
        is_accurate(&CASH_KARP, integrator, ctx)
    }

    fn integrator_predicted_step_size(&self, integrator: &Integrator, ctx: &StepContext) -> f64 {
        predict(&CASH_KARP, integrator, ctx, |ratio| ratio)
    }

    fn integrator_refined_step_size(&self, integrator: &Integrator, ctx: &StepContext) -> f64 {
        refine(
            &CASH_KARP,
            integrator,
            ctx,
            self.integrator_predicted_step_size(integrator, ctx),
        )
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
        resolve(&CASH_KARP, ctx, integrators, scheduler)
    }
}

fn fire(tableau: &Tableau, integrator: &mut Integrator, ctx: &StepContext) -> bool {
    let round = ctx.round().count();
    let k = integrator.input();

    if round < tableau.stages() {
        integrator.set_aux_variable(round, k);

        let increment: f64 = tableau.weights[round]
            .iter()
            .zip(integrator.aux_variables())
            .map(|(b, k)| b * k)
            .sum();
        let value = integrator.state() + ctx.step_size() * increment;

        if round + 1 == tableau.stages() {
            integrator.set_tentative_state(value);
        }
        integrator.emit(value);
    } else {
        integrator.set_tentative_derivative(k);
    }

    true
}

fn resolve<S>(
    tableau: &Tableau,
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

    for &increment in tableau.time_increments {
        stage::fire_round(ctx, integrators, scheduler, |integrator, ctx| {
            fire(tableau, integrator, ctx)
        })?;
        ctx.set_time(start + h * increment);
    }

    // Derivative at the new point.
    stage::fire_round(ctx, integrators, scheduler, |integrator, ctx| {
        fire(tableau, integrator, ctx)
    })?;

    ctx.round_mut().set_converged(true);
    Ok(Resolution::Resolved)
}

/// Local error of the last resolved step, `h * |Σ E[j] k[j]|`.
fn local_error(tableau: &Tableau, integrator: &Integrator, h: f64) -> f64 {
    let stages = tableau.stages();
    let k = integrator.aux_variables();

    let weighted: f64 = tableau
        .error_weights
        .iter()
        .enumerate()
        .map(|(j, e)| {
            let kj = if j < stages {
                k[j]
            } else {
                integrator.tentative_derivative()
            };
            e * kj
        })
        .sum();

    (h * weighted).abs()
}

fn is_accurate(tableau: &Tableau, integrator: &mut Integrator, ctx: &StepContext) -> bool {
    let error = local_error(tableau, integrator, ctx.step_size());
    integrator.set_aux_variable(tableau.error_slot(), error);
    error < ctx.error_tolerance()
}

/// Scales the step by `growth((tol / error)^(1 / order))`, at most five-fold.
///
/// Errors at or below the value resolution are treated as zero.
fn predict<G>(tableau: &Tableau, integrator: &Integrator, ctx: &StepContext, growth: G) -> f64
where
    G: Fn(f64) -> f64,
{
    let h = ctx.step_size();
    let error = integrator.aux_variables()[tableau.error_slot()];

    if error <= ctx.value_resolution() {
        return MAX_GROWTH * h;
    }

    let ratio = (ctx.error_tolerance() / error).powf(1.0 / f64::from(tableau.order));
    h * growth(ratio).min(MAX_GROWTH)
}

fn refine(tableau: &Tableau, integrator: &Integrator, ctx: &StepContext, predicted: f64) -> f64 {
    let h = ctx.step_size();
    let error = integrator.aux_variables()[tableau.error_slot()];

    if error < ctx.error_tolerance() {
        h
    } else {
        (0.5 * h).min(predicted)
    }
}
