use std::error::Error as StdError;

use thiserror::Error;

use crate::Integrator;

/// Error type returned by a failing [`Transition`].
pub type TransitionError = Box<dyn StdError + Send + Sync>;

/// A view of the integrators' data channels during a state-transition round.
///
/// Transition units read what each integrator emitted and write what each
/// integrator will read next. They cannot touch committed, tentative, or
/// auxiliary values, which belong to the active solver.
pub struct Channels<'a> {
    integrators: &'a mut [Integrator],
}

impl<'a> Channels<'a> {
    pub fn new(integrators: &'a mut [Integrator]) -> Self {
        Self { integrators }
    }

    /// Number of integrators on the bus.
    #[must_use]
    pub fn len(&self) -> usize {
        self.integrators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.integrators.is_empty()
    }

    /// Returns the value integrator `index` emitted this round.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn output(&self, index: usize) -> f64 {
        self.integrators[index].output()
    }

    /// Writes `value` into the input channel of integrator `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn set_input(&mut self, index: usize, value: f64) {
        self.integrators[index].set_input(value);
    }
}

/// A computational unit in the state-transition stage.
///
/// Given the time and the values the integrators emitted, a transition
/// evaluates its part of `f(x, u, t)` and writes the results back into the
/// integrators' input channels.
///
/// Closures of the form `FnMut(f64, &mut Channels<'_>) -> Result<(), TransitionError>`
/// implement this trait.
pub trait Transition {
    /// Fires the unit once.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] if the unit cannot be evaluated.
    fn fire(&mut self, time: f64, channels: &mut Channels<'_>) -> Result<(), TransitionError>;
}

impl<F> Transition for F
where
    F: FnMut(f64, &mut Channels<'_>) -> Result<(), TransitionError>,
{
    fn fire(&mut self, time: f64, channels: &mut Channels<'_>) -> Result<(), TransitionError> {
        self(time, channels)
    }
}

/// Supplies the ordered stages a solver fires each round.
pub trait Scheduler {
    /// Number of integrators the schedule was built for.
    fn integrator_count(&self) -> usize;

    /// The state-transition units, in firing order.
    fn state_transition_actors(&mut self) -> &mut [Box<dyn Transition>];

    /// The integrator indices of the dynamic stage, in firing order.
    fn dynamic_actors(&self) -> &[usize];
}

/// Errors that can occur when building a [`Schedule`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("dynamic order has {found} entries, expected {expected}")]
    OrderLength { expected: usize, found: usize },

    #[error("dynamic order must fire each integrator exactly once, {index} is repeated or out of range")]
    NotAPermutation { index: usize },
}

/// A static schedule over a fixed number of integrators.
///
/// By default the dynamic stage fires integrators in index order.
pub struct Schedule {
    transitions: Vec<Box<dyn Transition>>,
    dynamic: Vec<usize>,
}

impl Schedule {
    /// Creates a schedule for `integrators` integrators with no transitions.
    #[must_use]
    pub fn new(integrators: usize) -> Self {
        Self {
            transitions: Vec::new(),
            dynamic: (0..integrators).collect(),
        }
    }

    /// Creates a schedule whose only transition evaluates a vector field.
    ///
    /// `field(t, x, dx)` receives the emitted values `x` and must fill in the
    /// derivatives `dx`; both slices have one entry per integrator.
    #[must_use]
    pub fn ode<F>(integrators: usize, mut field: F) -> Self
    where
        F: FnMut(f64, &[f64], &mut [f64]) + 'static,
    {
        let mut x = vec![0.0; integrators];
        let mut dx = vec![0.0; integrators];

        Self::new(integrators).with_fn(move |t, channels| {
            for (i, xi) in x.iter_mut().enumerate() {
                *xi = channels.output(i);
            }
            field(t, &x, &mut dx);
            for (i, dxi) in dx.iter().enumerate() {
                channels.set_input(i, *dxi);
            }
            Ok(())
        })
    }

    /// Appends a transition unit to the state-transition stage.
    #[must_use]
    pub fn with_transition(mut self, unit: impl Transition + 'static) -> Self {
        self.transitions.push(Box::new(unit));
        self
    }

    /// Appends a closure to the state-transition stage.
    ///
    /// Equivalent to [`with_transition`](Self::with_transition), but lets the
    /// compiler infer the closure's argument types.
    #[must_use]
    pub fn with_fn<F>(self, unit: F) -> Self
    where
        F: FnMut(f64, &mut Channels<'_>) -> Result<(), TransitionError> + 'static,
    {
        self.with_transition(unit)
    }

    /// Replaces the dynamic-stage firing order.
    ///
    /// # Errors
    ///
    /// Returns an error unless `order` fires every integrator exactly once.
    pub fn with_dynamic_order(mut self, order: Vec<usize>) -> Result<Self, ScheduleError> {
        let expected = self.dynamic.len();
        if order.len() != expected {
            return Err(ScheduleError::OrderLength {
                expected,
                found: order.len(),
            });
        }

        let mut seen = vec![false; expected];
        for &index in &order {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                _ => return Err(ScheduleError::NotAPermutation { index }),
            }
        }

        self.dynamic = order;
        Ok(self)
    }
}

impl Scheduler for Schedule {
    fn integrator_count(&self) -> usize {
        self.dynamic.len()
    }

    fn state_transition_actors(&mut self) -> &mut [Box<dyn Transition>] {
        &mut self.transitions
    }

    fn dynamic_actors(&self) -> &[usize] {
        &self.dynamic
    }
}
