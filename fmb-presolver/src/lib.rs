//! Transparent pre-solver (C4): pure-literal reasoning layered in front of a
//! SAT solver contract (`spec.md` §4.3) without modifying the inner solver.
pub mod presolver;
mod state;

pub use presolver::TransparentPresolver;

#[cfg(test)]
mod tests {
    use super::*;

    use fmb_formula::{lit, lits};
    use fmb_sat::{InternalSolver, SatSolver, SolveResult};

    fn presolver() -> TransparentPresolver {
        let mut p = TransparentPresolver::new(Box::new(InternalSolver::new()));
        p.ensure_var_count(8);
        p
    }

    #[test]
    fn pure_literal_clauses_are_never_forwarded() {
        // Every clause mentions variable 1 only positively; a correctly
        // behaving pre-solver never needs to forward any of them.
        let mut p = presolver();
        p.add_clause(&lits![1, 2], false);
        p.add_clause(&lits![1, -2], false);
        p.add_clause(&lits![1, 3], false);
        assert_eq!(p.solve(), SolveResult::Sat);
    }

    #[test]
    fn unit_then_watched_then_forced_impure_is_unsat() {
        // The scenario from spec.md §8: {A}, {~A, B}, {~B}.
        let mut p = presolver();
        p.add_clause(&lits![1], false);
        p.add_clause(&lits![-1, 2], false);
        p.add_clause(&lits![-2], false);
        assert_eq!(p.solve(), SolveResult::Unsat);
    }

    #[test]
    fn contradictory_clauses_on_an_otherwise_pure_variable_are_unsat() {
        let mut p = presolver();
        p.add_clause(&lits![1, 2], false);
        p.add_clause(&lits![1, -2], false);
        p.add_clause(&lits![-1, 3], false);
        p.add_clause(&lits![-1, -3], false);
        assert_eq!(p.solve(), SolveResult::Unsat);
    }

    #[test]
    fn matching_assumption_on_a_pure_variable_is_absorbed() {
        let mut p = presolver();
        p.add_clause(&lits![1, 2], false);
        p.add_assumption(lit!(1), false);
        assert_eq!(p.solve(), SolveResult::Sat);
    }

    #[test]
    fn mismatched_assumption_on_a_pure_variable_with_no_alternative_forwards() {
        let mut p = presolver();
        p.add_clause(&lits![1, 2], false);
        p.add_assumption(lit!(-1), false);
        p.add_assumption(lit!(-2), false);
        assert_eq!(p.solve(), SolveResult::Unsat);
    }

    #[test]
    fn contradictory_assumptions_are_unsat() {
        let mut p = presolver();
        p.add_clause(&lits![1, 2], false);
        p.add_assumption(lit!(1), false);
        p.add_assumption(lit!(-1), false);
        assert_eq!(p.solve(), SolveResult::Unsat);
    }

    #[test]
    fn retracting_assumptions_restores_satisfiability() {
        let mut p = presolver();
        p.add_clause(&lits![1, 2], false);
        p.add_assumption(lit!(-1), false);
        p.add_assumption(lit!(-2), false);
        assert_eq!(p.solve(), SolveResult::Unsat);

        p.retract_all_assumptions();
        assert_eq!(p.solve(), SolveResult::Sat);
    }

    #[test]
    fn duplicate_assumptions_are_idempotent() {
        let mut p = presolver();
        p.add_clause(&lits![1, 2], false);
        p.add_assumption(lit!(-1), false);
        p.add_assumption(lit!(-1), false);
        p.add_assumption(lit!(-2), false);
        assert_eq!(p.solve(), SolveResult::Unsat);
    }
}
