//! Integration algorithms and a step-size controlling director.
//!
//! - [`transient`]: the [`Solver`](transient::Solver) protocol and its
//!   fixed-step, variable-step, and breakpoint implementations
//! - [`director`]: owns simulated time, chooses step sizes, rolls back
//!   failed attempts, and reports progress to an observer

pub mod director;
pub mod transient;
