//! Error kinds for the finite model builder (`spec.md` §7).
use thiserror::Error;

/// Failures that can stop the model builder while attempting a single
/// candidate size; none of these are fatal to the overall search, they just
/// determine which [`crate::fmb::Outcome`] the current size contributes.
#[derive(Debug, Error)]
pub enum FmbError {
    /// Propositional variable numbering for this size would exceed the
    /// counter range (`spec.md` §3, "Propositional variable numbering").
    #[error("cannot represent all propositional literals at size {size}")]
    Overflow { size: usize },

    /// No SAT back-end could be constructed for the requested
    /// [`fmb_sat::SatSolverKind`].
    #[error(transparent)]
    SatSolver(#[from] fmb_sat::SatSolverError),
}
