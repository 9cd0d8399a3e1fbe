/// Control actions supported by the director.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the run after the current step and return the solution so far.
    StopEarly,
}
