use thiserror::Error;

/// Numerical tolerances shared by every solver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerances {
    error_tolerance: f64,
    value_resolution: f64,
    max_iterations: usize,
}

/// Errors that can occur when validating [`Tolerances`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ToleranceError {
    #[error("error_tolerance must be finite and positive")]
    ErrorTolerance,

    #[error("value_resolution must be finite and positive")]
    ValueResolution,

    #[error("max_iterations must be at least 1")]
    MaxIterations,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            error_tolerance: 1e-4,
            value_resolution: 1e-6,
            max_iterations: 20,
        }
    }
}

impl Tolerances {
    /// Creates validated tolerances.
    ///
    /// # Errors
    ///
    /// Returns an error if a tolerance is non-positive or non-finite, or if
    /// `max_iterations` is zero.
    pub fn new(
        error_tolerance: f64,
        value_resolution: f64,
        max_iterations: usize,
    ) -> Result<Self, ToleranceError> {
        if !error_tolerance.is_finite() || error_tolerance <= 0.0 {
            return Err(ToleranceError::ErrorTolerance);
        }
        if !value_resolution.is_finite() || value_resolution <= 0.0 {
            return Err(ToleranceError::ValueResolution);
        }
        if max_iterations == 0 {
            return Err(ToleranceError::MaxIterations);
        }

        Ok(Self {
            error_tolerance,
            value_resolution,
            max_iterations,
        })
    }

    /// Local truncation error a variable-step solver may accept.
    #[must_use]
    pub fn error_tolerance(&self) -> f64 {
        self.error_tolerance
    }

    /// Threshold below which two successive fixed-point iterates are equal.
    #[must_use]
    pub fn value_resolution(&self) -> f64 {
        self.value_resolution
    }

    /// Maximum number of fixed-point corrections per attempt.
    #[must_use]
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }
}

/// Round bookkeeping for one integration attempt.
///
/// Explicit solvers finish after a fixed number of rounds; implicit solvers
/// finish when every integrator votes for convergence in the same round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Round {
    count: usize,
    converged: bool,
}

impl Round {
    /// Starts a new attempt: zero rounds fired, not converged.
    pub fn reset(&mut self) {
        self.count = 0;
        self.converged = false;
    }

    pub fn increment(&mut self) {
        self.count += 1;
    }

    /// Number of rounds fired in the current attempt.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn set_converged(&mut self, converged: bool) {
        self.converged = converged;
    }

    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.converged
    }
}

/// Folds the convergence votes of one round.
///
/// The tally starts at `true`, so a round is converged only when every vote
/// is `true`. Every vote is consumed, even after a veto.
pub fn tally_votes<I>(votes: I) -> bool
where
    I: IntoIterator<Item = bool>,
{
    votes.into_iter().fold(true, |tally, vote| tally & vote)
}

/// The clock and tolerances a solver sees during one integration attempt.
///
/// The director owns the context and lends it to the active solver. The
/// solver advances `time` as its stages require and records its progress in
/// the [`Round`]; it never keeps that state itself, so one solver value can
/// serve any number of independent runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepContext {
    time: f64,
    step_size: f64,
    attempt_start: f64,
    tolerances: Tolerances,
    round: Round,
}

impl StepContext {
    #[must_use]
    pub fn new(time: f64, step_size: f64, tolerances: Tolerances) -> Self {
        Self {
            time,
            step_size,
            attempt_start: time,
            tolerances,
            round: Round::default(),
        }
    }

    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    #[must_use]
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn set_step_size(&mut self, step_size: f64) {
        self.step_size = step_size;
    }

    #[must_use]
    pub fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    #[must_use]
    pub fn error_tolerance(&self) -> f64 {
        self.tolerances.error_tolerance
    }

    #[must_use]
    pub fn value_resolution(&self) -> f64 {
        self.tolerances.value_resolution
    }

    #[must_use]
    pub fn max_iterations(&self) -> usize {
        self.tolerances.max_iterations
    }

    #[must_use]
    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn round_mut(&mut self) -> &mut Round {
        &mut self.round
    }

    /// Marks the current time as the start of a new attempt and resets the round.
    pub fn begin_attempt(&mut self) {
        self.attempt_start = self.time;
        self.round.reset();
    }

    /// Time at which the current attempt began.
    #[must_use]
    pub fn attempt_start(&self) -> f64 {
        self.attempt_start
    }

    /// Restores `time` to exactly the start of the current attempt.
    ///
    /// Solvers may move time forward before they know whether the attempt
    /// succeeds. Rolling back never subtracts a step size, so the result does
    /// not depend on what the step size was when the attempt failed.
    pub fn roll_back(&mut self) {
        self.time = self.attempt_start;
        self.round.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn tolerances_reject_invalid_values() {
        assert_eq!(
            Tolerances::new(0.0, 1e-6, 10),
            Err(ToleranceError::ErrorTolerance)
        );
        assert_eq!(
            Tolerances::new(1e-4, f64::NAN, 10),
            Err(ToleranceError::ValueResolution)
        );
        assert_eq!(
            Tolerances::new(1e-4, 1e-6, 0),
            Err(ToleranceError::MaxIterations)
        );
        assert!(Tolerances::new(1e-4, 1e-6, 1).is_ok());
    }

    #[test]
    fn round_counts_and_resets() {
        let mut round = Round::default();
        round.increment();
        round.increment();
        round.set_converged(true);

        assert_eq!(round.count(), 2);
        assert!(round.is_converged());

        round.reset();
        assert_eq!(round.count(), 0);
        assert!(!round.is_converged());
    }

    #[test]
    fn one_veto_fails_the_tally() {
        assert!(tally_votes(std::iter::empty()));
        assert!(tally_votes([true, true, true]));
        assert!(!tally_votes([true, false, true]));
    }

    #[test]
    fn tally_consumes_every_vote() {
        let mut seen = 0;
        let votes = [false, true, true].into_iter().inspect(|_| seen += 1);

        assert!(!tally_votes(votes));
        assert_eq!(seen, 3);
    }

    #[test]
    fn roll_back_returns_to_attempt_start() {
        let mut ctx = StepContext::new(2.0, 0.5, Tolerances::default());
        ctx.begin_attempt();

        ctx.set_time(2.5);
        ctx.set_step_size(0.125);
        ctx.round_mut().increment();
        ctx.roll_back();

        assert_relative_eq!(ctx.time(), 2.0);
        assert_relative_eq!(ctx.attempt_start(), 2.0);
        assert_eq!(ctx.round().count(), 0);
    }
}
