//! Errors raised while constructing a SAT back-end.
use thiserror::Error;

/// Failures that can occur while selecting or constructing a [`crate::SatSolver`].
#[derive(Debug, Error)]
pub enum SatSolverError {
    /// An external engine was selected but this build does not link against
    /// a native solver for it.
    ///
    /// The concrete SAT engines are explicitly out of scope for this
    /// workspace (`spec.md` §1); only the contract and the dispatch point
    /// are implemented here.
    #[error("SAT engine '{0}' is not available in this build")]
    EngineUnavailable(&'static str),
}
