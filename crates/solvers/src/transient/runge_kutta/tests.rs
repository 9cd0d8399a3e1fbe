use approx::assert_relative_eq;
use strand_core::{Integrator, Schedule, StepContext, Tolerances};

use crate::transient::{Resolution, Solver};

use super::{ExplicitRk23, ExplicitRk45};

// --- Test fixtures ---

/// Resolves one step of `schedule` from `x0` at `t0` and returns the
/// integrator and context afterwards.
fn one_step<S: Solver>(
    solver: &S,
    mut schedule: Schedule,
    x0: f64,
    t0: f64,
    h: f64,
) -> (Integrator, StepContext) {
    let mut integrators = vec![Integrator::new(x0)];
    integrators[0].prepare_aux_variables(solver.aux_variable_count());
    let mut ctx = StepContext::new(t0, h, Tolerances::default());

    let resolution = solver
        .resolve_states(&mut ctx, &mut integrators, &mut schedule)
        .expect("should resolve");
    assert_eq!(resolution, Resolution::Resolved);

    let integrator = integrators.pop().expect("one integrator");
    (integrator, ctx)
}

fn ramp() -> Schedule {
    Schedule::ode(1, |t, _, dx| dx[0] = t)
}

fn growth() -> Schedule {
    Schedule::ode(1, |_, x, dx| dx[0] = x[0])
}

fn local_error<S: Solver>(solver: &S, h: f64) -> f64 {
    let (integrator, _) = one_step(solver, growth(), 1.0, 0.0, h);
    (integrator.tentative_state() - h.exp()).abs()
}

/// Integrator whose error slot holds `error` for a method with `slot` as its
/// error index.
fn with_error(count: usize, slot: usize, error: f64) -> Integrator {
    let mut integrator = Integrator::new(0.0);
    integrator.prepare_aux_variables(count);
    integrator.set_aux_variable(slot, error);
    integrator
}

// --- Tests ---

#[test]
fn rk23_is_exact_for_ramp() {
    let (integrator, ctx) = one_step(&ExplicitRk23, ramp(), 1.0, 0.5, 0.2);

    // x(t) = 1 + (t^2 - 0.25) / 2
    assert_relative_eq!(integrator.tentative_state(), 1.0 + (0.49 - 0.25) / 2.0, epsilon = 1e-14);
    assert_relative_eq!(integrator.tentative_derivative(), 0.7, epsilon = 1e-14);
    assert_relative_eq!(ctx.time(), 0.7, epsilon = 1e-14);
    assert_eq!(ctx.round().count(), 4);
    assert!(ctx.round().is_converged());
}

#[test]
fn rk45_is_exact_for_ramp() {
    let (integrator, ctx) = one_step(&ExplicitRk45, ramp(), 0.0, 0.0, 0.5);

    assert_relative_eq!(integrator.tentative_state(), 0.125, epsilon = 1e-14);
    assert_relative_eq!(integrator.tentative_derivative(), 0.5, epsilon = 1e-14);
    assert_relative_eq!(ctx.time(), 0.5);
    assert_eq!(ctx.round().count(), 7);
}

#[test]
fn stage_derivatives_land_in_aux_slots() {
    let (integrator, _) = one_step(&ExplicitRk23, ramp(), 0.0, 0.0, 1.0);

    // k[r] = t at the stage abscissae 0, 1/2, 3/4.
    assert_eq!(&integrator.aux_variables()[..3], &[0.0, 0.5, 0.75]);
}

#[test]
fn rk23_error_drops_with_third_order() {
    let coarse = local_error(&ExplicitRk23, 0.1);
    let fine = local_error(&ExplicitRk23, 0.05);

    assert!(coarse / fine >= 8.0, "ratio was {}", coarse / fine);
}

#[test]
fn rk45_error_drops_with_fifth_order() {
    let coarse = local_error(&ExplicitRk45, 0.4);
    let fine = local_error(&ExplicitRk45, 0.2);

    assert!(coarse / fine >= 32.0, "ratio was {}", coarse / fine);
}

#[test]
fn rk23_error_estimate_flags_large_steps() {
    let (mut small, ctx_small) = one_step(&ExplicitRk23, growth(), 1.0, 0.0, 0.01);
    assert!(ExplicitRk23.integrator_is_accurate(&mut small, &ctx_small));

    let (mut large, ctx_large) = one_step(&ExplicitRk23, growth(), 1.0, 0.0, 1.0);
    assert!(!ExplicitRk23.integrator_is_accurate(&mut large, &ctx_large));
    assert!(large.aux_variables()[3] > ctx_large.error_tolerance());

    let refined = ExplicitRk23.integrator_refined_step_size(&large, &ctx_large);
    assert_relative_eq!(refined, 0.5);
}

#[test]
fn rk45_error_estimate_flags_large_steps() {
    let (mut small, ctx_small) = one_step(&ExplicitRk45, growth(), 1.0, 0.0, 0.05);
    assert!(ExplicitRk45.integrator_is_accurate(&mut small, &ctx_small));
    assert_relative_eq!(
        ExplicitRk45.integrator_refined_step_size(&small, &ctx_small),
        0.05
    );

    let (mut large, ctx_large) = one_step(&ExplicitRk45, growth(), 1.0, 0.0, 2.0);
    assert!(!ExplicitRk45.integrator_is_accurate(&mut large, &ctx_large));
    assert!(ExplicitRk45.integrator_refined_step_size(&large, &ctx_large) <= 1.0);
}

#[test]
fn negligible_error_grows_step_five_fold() {
    let ctx = StepContext::new(0.0, 0.1, Tolerances::default());

    let rk23 = with_error(4, 3, 0.0);
    assert_relative_eq!(ExplicitRk23.integrator_predicted_step_size(&rk23, &ctx), 0.5);

    let rk45 = with_error(7, 6, 1e-7);
    assert_relative_eq!(ExplicitRk45.integrator_predicted_step_size(&rk45, &ctx), 0.5);
}

#[test]
fn rk23_prediction_is_bounded_below() {
    let ctx = StepContext::new(0.0, 0.1, Tolerances::default());
    let integrator = with_error(4, 3, 1.0);

    assert_relative_eq!(
        ExplicitRk23.integrator_predicted_step_size(&integrator, &ctx),
        0.05
    );
}

#[test]
fn prediction_is_monotone_in_error() {
    let ctx = StepContext::new(0.0, 0.1, Tolerances::default());
    let errors = [0.0, 1e-6, 2e-6, 1e-5, 1e-4, 5e-4, 1e-2, 1.0];

    let rk23: Vec<f64> = errors
        .iter()
        .map(|&e| ExplicitRk23.integrator_predicted_step_size(&with_error(4, 3, e), &ctx))
        .collect();
    let rk45: Vec<f64> = errors
        .iter()
        .map(|&e| ExplicitRk45.integrator_predicted_step_size(&with_error(7, 6, e), &ctx))
        .collect();

    for steps in [rk23, rk45] {
        assert!(steps.windows(2).all(|w| w[1] <= w[0]), "{steps:?}");
        assert!(steps.iter().all(|&h| h <= 0.5 + 1e-15));
    }
}
