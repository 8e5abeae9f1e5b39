//! The uniform capability set every SAT back-end must provide (`spec.md` §4.2).
use fmb_formula::{Lit, Var};

/// Result of a call to [`SatSolver::solve`] or [`SatSolver::status`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SolveResult {
    Sat,
    Unsat,
    Unknown,
}

impl Default for SolveResult {
    fn default() -> SolveResult {
        SolveResult::Unknown
    }
}

/// The value assigned to a variable, valid only after a [`SolveResult::Sat`] solve.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Assignment {
    True,
    False,
    DontCare,
}

/// Uniform capability set over heterogeneous SAT back-ends.
///
/// Implementations may be bit-level (CDCL), incremental, or a thin wrapper
/// around an external native library. See [`crate::error::SatSolverError`]
/// for the only way an implementation may fail to provide this contract.
///
/// Contract: after [`SatSolver::retract_all_assumptions`], the solver is in
/// the same state it would be had no assumption ever been made; permanent
/// clauses added via [`SatSolver::add_clauses`]/[`SatSolver::add_clause`]
/// are preserved.
pub trait SatSolver {
    /// Widens the variable universe to at least `n` variables.
    fn ensure_var_count(&mut self, n: usize);

    /// Ingests a batch of clauses. If `only_propagate` is set, the solver
    /// performs unit propagation on them but takes no search decisions
    /// before the next call to [`SatSolver::solve`].
    fn add_clauses(&mut self, clauses: &mut dyn Iterator<Item = &[Lit]>, only_propagate: bool);

    /// Ingests a single clause. Equivalent to calling [`SatSolver::add_clauses`]
    /// with a singleton iterator, provided as a convenience for the common case.
    fn add_clause(&mut self, lits: &[Lit], only_propagate: bool) {
        self.add_clauses(&mut std::iter::once(lits), only_propagate);
    }

    /// Runs the solver to completion (subject to internal resource limits).
    fn solve(&mut self) -> SolveResult;

    /// The last computed satisfiability status, without resolving.
    fn status(&self) -> SolveResult;

    /// The value of `var` in the current model. Only meaningful after a
    /// [`SolveResult::Sat`] result from [`SatSolver::solve`].
    fn assignment(&self, var: Var) -> Assignment;

    /// Adds a temporary assumption literal.
    fn add_assumption(&mut self, lit: Lit, only_propagate: bool);

    /// Removes every assumption added since the solver was created or last
    /// had its assumptions retracted.
    fn retract_all_assumptions(&mut self);
}
