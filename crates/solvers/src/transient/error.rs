use strand_core::TransitionError;

/// Errors that can occur while a solver resolves states.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("state transition failed at t = {time}: {source}")]
    Transition {
        time: f64,
        #[source]
        source: TransitionError,
    },

    #[error("integrator {index} received a non-finite derivative ({value})")]
    InvalidDerivative { index: usize, value: f64 },
}
