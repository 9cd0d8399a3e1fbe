use strand_core::Tolerances;
use thiserror::Error;

/// Time span, step-size bounds, and tolerances for a [`Director`] run.
///
/// [`Director`]: super::Director
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    start_time: f64,
    stop_time: f64,
    initial_step_size: f64,
    min_step_size: f64,
    max_step_size: f64,
    time_resolution: f64,
    tolerances: Tolerances,
}

/// Errors that can occur when validating a director config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("start and stop times must be finite with start < stop")]
    TimeSpan,

    #[error("step sizes must be finite with 0 < min <= initial <= max")]
    StepSizes,

    #[error("time_resolution must be finite and positive")]
    TimeResolution,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            stop_time: 1.0,
            initial_step_size: 0.1,
            min_step_size: 1e-5,
            max_step_size: 1.0,
            time_resolution: 1e-10,
            tolerances: Tolerances::default(),
        }
    }
}

impl Config {
    /// Creates a config for `[start_time, stop_time]` with default step sizes
    /// and tolerances.
    ///
    /// # Errors
    ///
    /// Returns an error if either time is non-finite or `start_time >= stop_time`.
    pub fn new(start_time: f64, stop_time: f64) -> Result<Self, ConfigError> {
        if !start_time.is_finite() || !stop_time.is_finite() || start_time >= stop_time {
            return Err(ConfigError::TimeSpan);
        }

        Ok(Self {
            start_time,
            stop_time,
            ..Self::default()
        })
    }

    /// Replaces the initial, minimum, and maximum step sizes.
    ///
    /// # Errors
    ///
    /// Returns an error unless `0 < min <= initial <= max` and all are finite.
    pub fn with_step_sizes(self, initial: f64, min: f64, max: f64) -> Result<Self, ConfigError> {
        let finite = initial.is_finite() && min.is_finite() && max.is_finite();
        if !finite || min <= 0.0 || min > initial || initial > max {
            return Err(ConfigError::StepSizes);
        }

        Ok(Self {
            initial_step_size: initial,
            min_step_size: min,
            max_step_size: max,
            ..self
        })
    }

    /// Replaces the time resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if `time_resolution` is non-positive or non-finite.
    pub fn with_time_resolution(self, time_resolution: f64) -> Result<Self, ConfigError> {
        if !time_resolution.is_finite() || time_resolution <= 0.0 {
            return Err(ConfigError::TimeResolution);
        }

        Ok(Self {
            time_resolution,
            ..self
        })
    }

    /// Replaces the solver tolerances, which are validated on construction.
    #[must_use]
    pub fn with_tolerances(self, tolerances: Tolerances) -> Self {
        Self { tolerances, ..self }
    }

    #[must_use]
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    #[must_use]
    pub fn stop_time(&self) -> f64 {
        self.stop_time
    }

    /// Step size for the first step and after every breakpoint.
    #[must_use]
    pub fn initial_step_size(&self) -> f64 {
        self.initial_step_size
    }

    /// Smallest step size before a failing step becomes fatal.
    #[must_use]
    pub fn min_step_size(&self) -> f64 {
        self.min_step_size
    }

    #[must_use]
    pub fn max_step_size(&self) -> f64 {
        self.max_step_size
    }

    /// Two times closer than this are treated as equal.
    #[must_use]
    pub fn time_resolution(&self) -> f64 {
        self.time_resolution
    }

    #[must_use]
    pub fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }
}
