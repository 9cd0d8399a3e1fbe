use std::ops::Deref;

/// The largest number of auxiliary variables any solver may request.
///
/// The fifth-order Runge-Kutta solver needs the most: six stage derivatives
/// plus one slot for its error estimate.
pub const MAX_AUX_VARIABLES: usize = 7;

/// Solver-private scratch slots stored inline in an [`Integrator`].
///
/// The number of active slots is set once per run with
/// [`Integrator::prepare_aux_variables`]. Indices are defined by the solver
/// that requested them and are stable across a single integration attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct AuxVariables {
    values: [f64; MAX_AUX_VARIABLES],
    len: usize,
}

impl AuxVariables {
    fn with_len(len: usize) -> Self {
        assert!(
            len <= MAX_AUX_VARIABLES,
            "requested {len} auxiliary variables, at most {MAX_AUX_VARIABLES} are supported"
        );
        Self {
            values: [0.0; MAX_AUX_VARIABLES],
            len,
        }
    }
}

impl Deref for AuxVariables {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &self.values[..self.len]
    }
}

/// One scalar state variable of an ODE system.
///
/// An integrator holds the committed state and derivative at the current
/// time, the tentative values a solver is working toward, and a handful of
/// auxiliary slots the solver uses for intermediate results.
///
/// It also owns the two ends of its data channel: the value it last emitted
/// on its state output ([`output`](Self::output)) and the value the
/// state-transition stage last wrote into its input
/// ([`input`](Self::input)).
///
/// Tentative values are only promoted to committed values by
/// [`commit`](Self::commit), which the director calls once a step has been
/// accepted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct Integrator {
    state: f64,
    tentative_state: f64,
    derivative: f64,
    tentative_derivative: f64,
    aux: AuxVariables,
    input: f64,
    output: f64,
}

impl Integrator {
    /// Creates an integrator at `initial_state` with a zero derivative.
    ///
    /// The initial state is also emitted, so the state-transition stage sees
    /// it on the first round.
    #[must_use]
    pub fn new(initial_state: f64) -> Self {
        Self {
            state: initial_state,
            tentative_state: initial_state,
            derivative: 0.0,
            tentative_derivative: 0.0,
            aux: AuxVariables::with_len(0),
            input: 0.0,
            output: initial_state,
        }
    }

    /// Returns the last committed state.
    #[must_use]
    pub fn state(&self) -> f64 {
        self.state
    }

    /// Returns the derivative at the last committed time.
    #[must_use]
    pub fn derivative(&self) -> f64 {
        self.derivative
    }

    /// Returns the candidate state at the end of the current step.
    #[must_use]
    pub fn tentative_state(&self) -> f64 {
        self.tentative_state
    }

    pub fn set_tentative_state(&mut self, value: f64) {
        self.tentative_state = value;
    }

    /// Returns the candidate derivative at the end of the current step.
    #[must_use]
    pub fn tentative_derivative(&self) -> f64 {
        self.tentative_derivative
    }

    pub fn set_tentative_derivative(&mut self, value: f64) {
        self.tentative_derivative = value;
    }

    /// Returns the active auxiliary variables.
    #[must_use]
    pub fn aux_variables(&self) -> &[f64] {
        &self.aux
    }

    /// Sets one auxiliary variable.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the slots requested by the solver, which
    /// indicates an inconsistency in the solver rather than in user input.
    pub fn set_aux_variable(&mut self, index: usize, value: f64) {
        assert!(
            index < self.aux.len,
            "auxiliary variable index {index} out of range (solver requested {})",
            self.aux.len
        );
        self.aux.values[index] = value;
    }

    /// Resizes the auxiliary slots to `count` and clears them.
    ///
    /// # Panics
    ///
    /// Panics if `count` exceeds [`MAX_AUX_VARIABLES`].
    pub fn prepare_aux_variables(&mut self, count: usize) {
        self.aux = AuxVariables::with_len(count);
    }

    /// Returns the value last written into this integrator's input channel.
    #[must_use]
    pub fn input(&self) -> f64 {
        self.input
    }

    pub(crate) fn set_input(&mut self, value: f64) {
        self.input = value;
    }

    /// Returns the value last emitted on this integrator's state channel.
    #[must_use]
    pub fn output(&self) -> f64 {
        self.output
    }

    /// Emits `value` on the state channel for the next state-transition round.
    pub fn emit(&mut self, value: f64) {
        self.output = value;
    }

    /// Promotes the tentative state and derivative to committed values.
    ///
    /// The committed state is emitted so the next attempt starts from it.
    pub fn commit(&mut self) {
        self.state = self.tentative_state;
        self.derivative = self.tentative_derivative;
        self.output = self.state;
    }

    /// Discards the tentative state and re-emits the committed state.
    pub fn roll_back(&mut self) {
        self.tentative_state = self.state;
        self.output = self.state;
    }

    /// Adds the weight of a Dirac impulse to the committed state.
    pub fn apply_impulse(&mut self, weight: f64) {
        self.reset_state(self.state + weight);
    }

    /// Replaces the committed state, discarding any tentative state.
    pub fn reset_state(&mut self, value: f64) {
        self.state = value;
        self.roll_back();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn new_emits_initial_state() {
        let integrator = Integrator::new(2.5);

        assert_relative_eq!(integrator.state(), 2.5);
        assert_relative_eq!(integrator.tentative_state(), 2.5);
        assert_relative_eq!(integrator.output(), 2.5);
        assert!(integrator.aux_variables().is_empty());
    }

    #[test]
    fn commit_promotes_tentative_values() {
        let mut integrator = Integrator::new(1.0);
        integrator.set_tentative_state(1.5);
        integrator.set_tentative_derivative(-0.25);
        integrator.emit(1.5);

        integrator.commit();

        assert_relative_eq!(integrator.state(), 1.5);
        assert_relative_eq!(integrator.derivative(), -0.25);
        assert_relative_eq!(integrator.output(), 1.5);
    }

    #[test]
    fn roll_back_restores_committed_state() {
        let mut integrator = Integrator::new(1.0);
        integrator.set_tentative_state(4.0);
        integrator.emit(4.0);

        integrator.roll_back();

        assert_relative_eq!(integrator.tentative_state(), 1.0);
        assert_relative_eq!(integrator.output(), 1.0);
    }

    #[test]
    fn impulse_shifts_committed_state() {
        let mut integrator = Integrator::new(1.0);
        integrator.apply_impulse(0.5);

        assert_relative_eq!(integrator.state(), 1.5);
        assert_relative_eq!(integrator.tentative_state(), 1.5);
        assert_relative_eq!(integrator.output(), 1.5);
    }

    #[test]
    fn aux_variables_are_sized_by_solver() {
        let mut integrator = Integrator::new(0.0);
        integrator.prepare_aux_variables(3);
        integrator.set_aux_variable(2, 7.0);

        assert_eq!(integrator.aux_variables(), &[0.0, 0.0, 7.0]);

        integrator.prepare_aux_variables(1);
        assert_eq!(integrator.aux_variables(), &[0.0]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn aux_index_outside_request_panics() {
        let mut integrator = Integrator::new(0.0);
        integrator.prepare_aux_variables(2);
        integrator.set_aux_variable(2, 1.0);
    }
}
