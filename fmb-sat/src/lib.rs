//! SAT solver contract (C3): a uniform capability set over heterogeneous
//! back-ends, plus a reference internal implementation.
pub mod contract;
pub mod error;
pub mod internal;
pub mod kind;

pub use contract::{Assignment, SatSolver, SolveResult};
pub use error::SatSolverError;
pub use internal::InternalSolver;
pub use kind::SatSolverKind;
