//! Tagged dispatch over the SAT solver family (`spec.md` §9, "Inheritance
//! in the SAT-solver family").
use crate::contract::SatSolver;
use crate::error::SatSolverError;
use crate::internal::InternalSolver;

/// Which SAT back-end to construct.
///
/// Mirrors the `sat_solver` option of the Options bundle (`spec.md` §6).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SatSolverKind {
    InternalCdcl,
    ExternalLingeling,
    ExternalMinisat,
}

impl Default for SatSolverKind {
    fn default() -> SatSolverKind {
        SatSolverKind::InternalCdcl
    }
}

impl SatSolverKind {
    /// Constructs a boxed solver implementing the contract of `spec.md` §4.2.
    ///
    /// The two external variants are not linked against a native library in
    /// this workspace; see [`SatSolverError::EngineUnavailable`].
    pub fn build(self) -> Result<Box<dyn SatSolver>, SatSolverError> {
        match self {
            SatSolverKind::InternalCdcl => Ok(Box::new(InternalSolver::new())),
            SatSolverKind::ExternalLingeling => {
                Err(SatSolverError::EngineUnavailable("external_lingeling"))
            }
            SatSolverKind::ExternalMinisat => {
                Err(SatSolverError::EngineUnavailable("external_minisat"))
            }
        }
    }
}
