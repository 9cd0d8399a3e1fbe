/// Indicates how the run terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// Reached the stop time.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// The committed states of every integrator at one time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    pub time: f64,
    pub states: Vec<f64>,
}

/// The result of a director run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// How the run terminated.
    pub status: Status,

    /// One sample per accepted step, including the initial state.
    pub history: Vec<Sample>,

    /// Number of accepted steps.
    pub steps: usize,

    /// Number of rejected attempts across all steps.
    pub rejected: usize,
}
