//! Step-size control and time advance over a network of integrators.
//!
//! The [`Director`] owns simulated time. Each [`step`](Director::step) picks
//! a solver and a step size, asks the solver to resolve every integrator, and
//! either commits the result or rolls it back and retries:
//!
//! - If the solver's fixed-point iteration does not settle, the step size is
//!   halved.
//! - If any integrator reports an inaccurate step, the step is retried with
//!   the smallest refined size the integrators propose.
//! - Once accepted, the next step size is the smallest size the integrators
//!   predict, capped at the maximum.
//!
//! Steps never cross a registered breakpoint; they are shortened to land on
//! it exactly. At a breakpoint the breakpoint solver runs once with the
//! minimum step size before the regular solver resumes at the initial step
//! size. The stop time is always a breakpoint.
//!
//! # Example
//!
//! ```
//! use strand_core::Schedule;
//! use strand_solvers::{director::Director, transient::SolverKind};
//!
//! // x' = -x, x(0) = 1
//! let schedule = Schedule::ode(1, |_, x, dx| dx[0] = -x[0]);
//!
//! let mut director = Director::builder()
//!     .scheduler(schedule)
//!     .integrators([1.0])
//!     .solver(SolverKind::ExplicitRk45)
//!     .build()?;
//!
//! let solution = director.run_unobserved()?;
//! let last = solution.history.last().expect("at least the initial sample");
//! assert!((last.states[0] - (-1.0_f64).exp()).abs() < 1e-3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod action;
mod breakpoints;
mod builder;
mod config;
mod error;
mod event;
mod solution;


pub use action::Action;
pub use builder::Builder;
pub use config::{Config, ConfigError};
pub use error::{BuildError, Error};
pub use event::{Event, Reason, Rejection, Step};
pub use solution::{Sample, Solution, Status};

use strand_core::{Integrator, Observer, Scheduler, StepContext, tally_votes};

use crate::transient::{DerivativeResolver, Resolution, Solver, SolverKind};

use self::breakpoints::Breakpoints;

/// Drives a [`Scheduler`] and its integrators through simulated time.
#[derive(Debug)]
pub struct Director<S> {
    scheduler: S,
    integrators: Vec<Integrator>,
    initial_states: Vec<f64>,
    solver: SolverKind,
    breakpoint_solver: SolverKind,
    config: Config,
    ctx: StepContext,
    breakpoints: Breakpoints,
    suggested_step_size: f64,
    initialized: bool,
}

impl<S: Scheduler> Director<S> {
    #[must_use]
    pub fn builder() -> Builder<S> {
        Builder::default()
    }

    /// Resets the run to the start time.
    ///
    /// Integrators return to their initial states, auxiliary slots are sized
    /// for both solvers, pending breakpoints are cleared except the stop
    /// time, and derivatives are resolved at the start time and committed.
    ///
    /// # Errors
    ///
    /// Returns an error if the state-transition stage fails.
    pub fn initialize(&mut self) -> Result<(), Error> {
        let resolution = self.config.time_resolution();
        let aux_count = self
            .solver
            .aux_variable_count()
            .max(self.breakpoint_solver.aux_variable_count());

        self.integrators = self
            .initial_states
            .iter()
            .map(|&state| {
                let mut integrator = Integrator::new(state);
                integrator.prepare_aux_variables(aux_count);
                integrator
            })
            .collect();

        self.ctx = StepContext::new(
            self.config.start_time(),
            self.config.initial_step_size(),
            *self.config.tolerances(),
        );
        self.suggested_step_size = self.config.initial_step_size();

        self.breakpoints = Breakpoints::default();
        self.breakpoints.insert(self.config.stop_time(), resolution);

        self.ctx.begin_attempt();
        DerivativeResolver.resolve_states(
            &mut self.ctx,
            &mut self.integrators,
            &mut self.scheduler,
        )?;
        for integrator in &mut self.integrators {
            integrator.commit();
        }

        self.initialized = true;
        log::debug!(
            "initialized {} integrators at t = {} with {}",
            self.integrators.len(),
            self.ctx.time(),
            self.solver
        );
        Ok(())
    }

    /// Registers a breakpoint at `time`.
    ///
    /// # Errors
    ///
    /// Returns an error if `time` is not finite or lies in the past, or if
    /// initialization fails.
    pub fn fire_at(&mut self, time: f64) -> Result<(), Error> {
        self.ensure_initialized()?;

        let now = self.ctx.time();
        let resolution = self.config.time_resolution();
        if !time.is_finite() || time < now - resolution {
            return Err(Error::InvalidBreakpoint { time, now });
        }

        self.breakpoints.insert(time, resolution);
        Ok(())
    }

    /// Adds a Dirac impulse of `weight` to integrator `index`.
    ///
    /// The current time becomes a breakpoint, so the next step runs the
    /// breakpoint solver.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range or initialization fails.
    pub fn apply_impulse(&mut self, index: usize, weight: f64) -> Result<(), Error> {
        self.ensure_initialized()?;

        self.integrators
            .get_mut(index)
            .ok_or(Error::UnknownIntegrator { index })?
            .apply_impulse(weight);

        self.fire_at(self.ctx.time())
    }

    /// Advances time by one accepted step.
    ///
    /// # Errors
    ///
    /// Returns an error if the stop time has already been reached, if a
    /// solver fails, or if the step size has to shrink below what the config
    /// allows. Integrators and time are left at the start of the failed step.
    pub fn step(&mut self) -> Result<Step, Error> {
        self.ensure_initialized()?;

        let now = self.ctx.time();
        let time_resolution = self.config.time_resolution();
        let stop_time = self.config.stop_time();
        if now >= stop_time - time_resolution {
            return Err(Error::Finished { stop_time });
        }
        let min_step_size = self.config.min_step_size();

        let at_breakpoint = self.breakpoints.is_at(now, time_resolution);
        let (solver, requested) = if at_breakpoint {
            (self.breakpoint_solver, min_step_size)
        } else {
            (self.solver, self.suggested_step_size)
        };

        let mut step_size = requested;
        let mut landing = None;
        if !at_breakpoint {
            if let Some(next) = self.breakpoints.next() {
                if now + step_size > next - time_resolution {
                    step_size = next - now;
                    landing = Some(next);
                }
            }
        }

        let snapshot = self.integrators.clone();
        let mut rejections = Vec::new();

        loop {
            self.ctx.set_step_size(step_size);
            self.ctx.begin_attempt();

            let outcome =
                solver.resolve_states(&mut self.ctx, &mut self.integrators, &mut self.scheduler);
            let resolution = match outcome {
                Ok(resolution) => resolution,
                Err(error) => {
                    self.restore(&snapshot);
                    return Err(error.into());
                }
            };

            let (reason, retry_size) = match resolution {
                Resolution::NotConverged { iterations } => {
                    (Reason::NotConverged { iterations }, 0.5 * step_size)
                }
                Resolution::Resolved => {
                    let ctx = &self.ctx;
                    let accurate = tally_votes(
                        self.integrators
                            .iter_mut()
                            .map(|integrator| solver.integrator_is_accurate(integrator, ctx)),
                    );
                    if accurate {
                        break;
                    }

                    let refined = self
                        .integrators
                        .iter()
                        .map(|integrator| solver.integrator_refined_step_size(integrator, ctx))
                        .fold(f64::INFINITY, f64::min);
                    (Reason::Inaccurate, refined.max(min_step_size))
                }
            };

            self.restore(&snapshot);
            rejections.push(Rejection {
                time: now,
                step_size,
                reason,
            });
            log::warn!(
                "{solver} rejected step at t = {now}, h = {step_size}: {reason:?}"
            );

            let exhausted = match reason {
                Reason::NotConverged { .. } => step_size < 0.5 * min_step_size,
                Reason::Inaccurate => step_size <= min_step_size + time_resolution,
            };
            if exhausted {
                return Err(Error::StepSizeTooSmall {
                    time: now,
                    step_size,
                });
            }

            step_size = retry_size;
            landing = None;
        }

        for integrator in &mut self.integrators {
            integrator.commit();
        }
        // Land exactly on the breakpoint; breakpoint solvers end where they began.
        if let Some(time) = landing.or(at_breakpoint.then_some(now)) {
            self.ctx.set_time(time);
        }

        self.suggested_step_size = if at_breakpoint {
            self.breakpoints.remove_through(now, time_resolution);
            self.config.initial_step_size()
        } else if landing.is_some() {
            requested
        } else {
            let ctx = &self.ctx;
            self.integrators
                .iter()
                .map(|integrator| solver.integrator_predicted_step_size(integrator, ctx))
                .fold(f64::INFINITY, f64::min)
                .clamp(min_step_size, self.config.max_step_size())
        };

        log::debug!(
            "{solver} accepted step to t = {}, h = {step_size}, next h = {}",
            self.ctx.time(),
            self.suggested_step_size
        );

        Ok(Step {
            time: self.ctx.time(),
            step_size,
            solver,
            rejections,
        })
    }

    /// Steps until the stop time, reporting each step to `observer`.
    ///
    /// The observer receives [`Event::Accepted`] for the initial state and
    /// every accepted step, preceded by [`Event::Rejected`] for each attempt
    /// rolled back along the way. Returning [`Action::StopEarly`] ends the run
    /// once the current step has been recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if initialization or any step fails.
    pub fn run<Obs>(&mut self, mut observer: Obs) -> Result<Solution, Error>
    where
        Obs: for<'a> Observer<Event<'a>, Action>,
    {
        self.ensure_initialized()?;

        let end = self.config.stop_time() - self.config.time_resolution();
        let mut history = Vec::new();
        let mut steps = 0;
        let mut rejected = 0;

        let initial = self.sample();
        let event = Event::Accepted {
            step: 0,
            step_size: 0.0,
            solver: SolverKind::DerivativeResolver,
            sample: &initial,
        };
        let mut stop_early = matches!(observer.observe(&event), Some(Action::StopEarly));
        history.push(initial);

        while !stop_early && self.ctx.time() < end {
            let step = self.step()?;
            steps += 1;

            for &rejection in &step.rejections {
                rejected += 1;
                let event = Event::Rejected {
                    step: steps,
                    rejection,
                };
                stop_early |= matches!(observer.observe(&event), Some(Action::StopEarly));
            }

            let sample = self.sample();
            let event = Event::Accepted {
                step: steps,
                step_size: step.step_size,
                solver: step.solver,
                sample: &sample,
            };
            stop_early |= matches!(observer.observe(&event), Some(Action::StopEarly));
            history.push(sample);
        }

        let status = if stop_early {
            Status::StoppedByObserver
        } else {
            Status::Complete
        };

        Ok(Solution {
            status,
            history,
            steps,
            rejected,
        })
    }

    /// Steps until the stop time without observation.
    ///
    /// # Errors
    ///
    /// Returns an error if initialization or any step fails.
    pub fn run_unobserved(&mut self) -> Result<Solution, Error> {
        self.run(())
    }

    /// Current simulated time.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.ctx.time()
    }

    /// Step size the next regular step will try first.
    #[must_use]
    pub fn suggested_step_size(&self) -> f64 {
        self.suggested_step_size
    }

    /// The earliest pending breakpoint, including the stop time.
    #[must_use]
    pub fn next_breakpoint(&self) -> Option<f64> {
        self.breakpoints.next()
    }

    #[must_use]
    pub fn integrators(&self) -> &[Integrator] {
        &self.integrators
    }

    /// Committed states at the current time.
    #[must_use]
    pub fn sample(&self) -> Sample {
        Sample {
            time: self.ctx.time(),
            states: self.integrators.iter().map(Integrator::state).collect(),
        }
    }

    #[must_use]
    pub fn solver(&self) -> SolverKind {
        self.solver
    }

    #[must_use]
    pub fn breakpoint_solver(&self) -> SolverKind {
        self.breakpoint_solver
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn ensure_initialized(&mut self) -> Result<(), Error> {
        if self.initialized {
            Ok(())
        } else {
            self.initialize()
        }
    }

    /// Puts integrators and time back where the current attempt started.
    fn restore(&mut self, snapshot: &[Integrator]) {
        self.integrators.clone_from_slice(snapshot);
        self.ctx.roll_back();
    }
}
