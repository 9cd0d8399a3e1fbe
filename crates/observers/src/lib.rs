//! Reusable observers for Strand directors.
//!
//! This crate provides [`Observer`] implementations and capability traits that
//! work with any director whose events and actions implement them.
//!
//! # Modules
//!
//! - [`traits`]: Capability traits for reusable observers
//!   ([`HasTime`], [`HasStepSize`], [`CanStopEarly`])
//!
//! # Observers
//!
//! - [`LogObserver`]: reports accepted and rejected steps through `log`
//! - [`StopAt`]: stops a run once simulated time reaches a threshold
//!
//! [`Observer`]: strand_core::Observer
//! [`HasTime`]: traits::HasTime
//! [`HasStepSize`]: traits::HasStepSize
//! [`CanStopEarly`]: traits::CanStopEarly

pub mod traits;

mod logging;
mod stop;

pub use logging::LogObserver;
pub use stop::StopAt;
