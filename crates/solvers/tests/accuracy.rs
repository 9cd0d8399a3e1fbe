use approx::assert_relative_eq;
use strand_core::Schedule;
use strand_solvers::{
    director::{Config, Director, Status},
    transient::SolverKind,
};

// --- Test fixtures ---

/// x' = -x, x(0) = 1, solved on [0, 1].
fn solve_decay(solver: SolverKind) -> f64 {
    let mut director = Director::builder()
        .scheduler(Schedule::ode(1, |_, x, dx| dx[0] = -x[0]))
        .integrators([1.0])
        .solver(solver)
        .build()
        .expect("should build");

    let solution = director.run_unobserved().expect("should solve");
    assert_eq!(solution.status, Status::Complete);

    let last = solution.history.last().expect("history is never empty");
    assert_eq!(last.time, 1.0);
    last.states[0]
}

/// Harmonic oscillator x'' = -x as two integrators, solved on [0, pi].
fn solve_oscillator(solver: SolverKind) -> Vec<f64> {
    let config = Config::new(0.0, std::f64::consts::PI).expect("valid span");
    let mut director = Director::builder()
        .scheduler(Schedule::ode(2, |_, x, dx| {
            dx[0] = x[1];
            dx[1] = -x[0];
        }))
        .integrators([1.0, 0.0])
        .solver(solver)
        .config(config)
        .build()
        .expect("should build");

    let solution = director.run_unobserved().expect("should solve");
    solution
        .history
        .last()
        .expect("history is never empty")
        .states
        .clone()
}

// --- Tests ---

#[test]
fn fixed_step_solvers_are_first_order() {
    let exact = (-1.0_f64).exp();

    // 0.9^10 and 1.1^-10
    assert_relative_eq!(solve_decay(SolverKind::ForwardEuler), 0.9_f64.powi(10), epsilon = 1e-12);
    assert_relative_eq!(solve_decay(SolverKind::BackwardEuler), 1.1_f64.powi(-10), epsilon = 1e-4);
    assert!((solve_decay(SolverKind::ForwardEuler) - exact).abs() < 0.05);
    assert!((solve_decay(SolverKind::BackwardEuler) - exact).abs() < 0.05);
}

#[test]
fn variable_step_solvers_meet_tolerance() {
    let exact = (-1.0_f64).exp();

    for solver in [
        SolverKind::ExplicitRk23,
        SolverKind::ExplicitRk45,
        SolverKind::Trapezoidal,
    ] {
        let x = solve_decay(solver);
        assert!((x - exact).abs() < 1e-3, "{solver}: {x} vs {exact}");
    }
}

#[test]
fn oscillator_reaches_half_period() {
    for solver in [
        SolverKind::ExplicitRk23,
        SolverKind::ExplicitRk45,
        SolverKind::Trapezoidal,
    ] {
        let states = solve_oscillator(solver);
        assert!((states[0] + 1.0).abs() < 1e-2, "{solver}: {states:?}");
        assert!(states[1].abs() < 1e-2, "{solver}: {states:?}");
    }
}

#[test]
fn solvers_parse_from_names() {
    let solver: SolverKind = "Trapezoidal".parse().expect("known solver");
    assert_eq!(solver, SolverKind::Trapezoidal);
}
