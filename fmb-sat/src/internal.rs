//! A small watched-free unit-propagation/DPLL solver.
//!
//! This is the `internal_cdcl` variant of [`crate::kind::SatSolverKind`]. It
//! is deliberately not the production CDCL engine (clause learning, VSIDS,
//! restarts, clause deletion): `spec.md` §1 declares the concrete SAT
//! engines out of scope and assumes "some solver implementing the contract
//! of §4.2". This implementation exists so the workspace is self-contained
//! and the finite model builder can be exercised end to end without a
//! native dependency.
use log::{debug, trace};

use fmb_formula::{Lit, Var};

use crate::contract::{Assignment, SatSolver, SolveResult};

/// Reference implementation of [`SatSolver`].
#[derive(Default)]
pub struct InternalSolver {
    clauses: Vec<Vec<Lit>>,
    assumptions: Vec<Lit>,
    num_vars: usize,
    assignment: Vec<Assignment>,
    status: SolveResult,
}

impl InternalSolver {
    pub fn new() -> InternalSolver {
        InternalSolver::default()
    }

    fn grow_for(&mut self, lit: Lit) {
        let needed = lit.index() + 1;
        if needed > self.num_vars {
            self.ensure_var_count(needed);
        }
    }
}

impl SatSolver for InternalSolver {
    fn ensure_var_count(&mut self, n: usize) {
        if n > self.num_vars {
            self.num_vars = n;
            self.assignment.resize(n, Assignment::DontCare);
        }
    }

    fn add_clauses(&mut self, clauses: &mut dyn Iterator<Item = &[Lit]>, only_propagate: bool) {
        for clause in clauses {
            for &lit in clause {
                self.grow_for(lit);
            }
            self.clauses.push(clause.to_vec());
        }
        trace!(
            "added clauses (only_propagate={}), now {} permanent clauses",
            only_propagate,
            self.clauses.len()
        );
        // Adding clauses can only invalidate a previously known SAT/UNSAT
        // verdict, never manufacture one; recompute lazily on next solve().
        self.status = SolveResult::Unknown;
    }

    fn solve(&mut self) -> SolveResult {
        let mut partial = vec![None; self.num_vars];
        for &lit in &self.assumptions {
            match partial[lit.index()] {
                Some(value) if value != lit.is_positive() => {
                    debug!("assumptions are immediately contradictory");
                    self.status = SolveResult::Unsat;
                    return self.status;
                }
                _ => partial[lit.index()] = Some(lit.is_positive()),
            }
        }

        self.status = if search(&self.clauses, &mut partial) {
            self.assignment = partial
                .into_iter()
                .map(|value| match value {
                    Some(true) => Assignment::True,
                    Some(false) => Assignment::False,
                    None => Assignment::DontCare,
                })
                .collect();
            SolveResult::Sat
        } else {
            SolveResult::Unsat
        };
        self.status
    }

    fn status(&self) -> SolveResult {
        self.status
    }

    fn assignment(&self, var: Var) -> Assignment {
        self.assignment
            .get(var.index())
            .copied()
            .unwrap_or(Assignment::DontCare)
    }

    fn add_assumption(&mut self, lit: Lit, _only_propagate: bool) {
        self.grow_for(lit);
        self.assumptions.push(lit);
        self.status = SolveResult::Unknown;
    }

    fn retract_all_assumptions(&mut self) {
        self.assumptions.clear();
        self.status = SolveResult::Unknown;
    }
}

/// Outcome of one round of unit propagation.
enum Propagate {
    /// Fixpoint reached without conflict.
    Fixpoint,
    /// A clause has no satisfied and no unassigned literal.
    Conflict,
}

fn propagate(clauses: &[Vec<Lit>], partial: &mut [Option<bool>]) -> Propagate {
    loop {
        let mut changed = false;
        for clause in clauses {
            let mut unassigned: Option<Lit> = None;
            let mut satisfied = false;
            let mut unassigned_count = 0;
            for &lit in clause {
                match partial[lit.index()] {
                    Some(value) if value == lit.is_positive() => {
                        satisfied = true;
                        break;
                    }
                    Some(_) => {}
                    None => {
                        unassigned_count += 1;
                        unassigned = Some(lit);
                    }
                }
            }
            if satisfied {
                continue;
            }
            if unassigned_count == 0 {
                return Propagate::Conflict;
            }
            if unassigned_count == 1 {
                let lit = unassigned.unwrap();
                partial[lit.index()] = Some(lit.is_positive());
                changed = true;
            }
        }
        if !changed {
            return Propagate::Fixpoint;
        }
    }
}

fn search(clauses: &[Vec<Lit>], partial: &mut [Option<bool>]) -> bool {
    if let Propagate::Conflict = propagate(clauses, partial) {
        return false;
    }

    let next_unassigned = partial.iter().position(|value| value.is_none());

    let var = match next_unassigned {
        Some(index) => index,
        None => return true,
    };

    for &value in &[true, false] {
        let mut trial = partial.to_vec();
        trial[var] = Some(value);
        if search(clauses, &mut trial) {
            partial.copy_from_slice(&trial);
            return true;
        }
    }

    false
}
