//! The finite model builder main loop (C5, `spec.md` §4.4.1).
use fmb_formula::fo::{Clause, FoLiteral, Signature};
use fmb_formula::{Lit, Var};
use fmb_presolver::TransparentPresolver;
use fmb_sat::{Assignment, SatSolver, SolveResult};

use crate::encoding::VarNumbering;
use crate::error::FmbError;
use crate::families;
use crate::flatten::flatten;
use crate::model::Model;
use crate::options::SolverOptions;
use crate::signature::infer_bounds;

/// Per-size bookkeeping kept around for diagnostics (`spec.md` §6, "Run
/// statistics").
#[derive(Clone, Debug)]
pub struct SizeStats {
    pub size: usize,
    pub var_count: usize,
    pub clause_count: usize,
    pub result: SolveResult,
}

#[derive(Clone, Debug, Default)]
pub struct FmbStats {
    pub sizes: Vec<SizeStats>,
}

/// Why the search stopped without deciding satisfiability either way.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum UnknownReason {
    /// The requested SAT back-end could not be constructed.
    SolverUnavailable,
    /// The next candidate size would overflow the SAT variable space.
    Overflow,
    /// [`SolverOptions::complete`] is `false`: the problem is not known to
    /// be FMB-admissible, so no size is attempted (`spec.md` §4.4.5).
    NotFmbAdmissible,
}

/// Outcome of a finite model building run: one of the four exit statuses of
/// `spec.md` §6 ("SATISFIABLE", "REFUTATION", "UNKNOWN", "TIME_LIMIT").
pub enum Outcome {
    /// A model of the returned size was found.
    Satisfiable(Model),
    /// No model up to `max_model_size` exists, or a clause collapsed to the
    /// empty clause during flattening (`spec.md` §7, "RefutationFound").
    Refutation,
    Unknown(UnknownReason),
    /// [`SolverOptions::deadline`] reported expiry before a size attempt
    /// could finish (`spec.md` §7, "TimeLimit").
    TimeLimit,
}

/// Tightens an a-priori bound on the model size that must be searched
/// before a negative result can be reported as a refutation
/// (`spec.md` §4.4.1, "Bounding the search").
///
/// Two independent sources of tightening, both conservative (i.e. they can
/// only lower the bound, never cause a real model to be missed):
///
/// - Effectively propositional problems (no non-constant function symbols)
///   need at most as many domain elements as there are constants (or `1`,
///   if there are none at all).
/// - A clause consisting entirely of positive variable-variable
///   equalities between `k` distinct variables forces every model to
///   collapse at least two of those variables together once the domain has
///   more than `k - 1` elements (`spec.md` §8, "Concrete Scenario 4").
fn max_model_size(signature: &Signature, clauses: &[Clause]) -> Option<usize> {
    let mut bound: Option<usize> = None;
    let mut tighten = |candidate: usize| {
        bound = Some(bound.map_or(candidate, |b| b.min(candidate)));
    };

    let is_epr = signature.functions().all(|f| signature.bounds(f).arity == 0);
    if is_epr {
        let constants = signature.constants().count();
        tighten(constants.max(1));
    }

    for clause in clauses {
        let all_positive_equalities = !clause.is_empty()
            && clause
                .literals()
                .iter()
                .all(|l| matches!(l, FoLiteral::Equality { polarity: true, .. }) && l.is_two_var_equality());
        if all_positive_equalities && clause.var_count() >= 2 {
            tighten(clause.var_count() - 1);
        }
    }

    bound
}

fn build_clauses(
    signature: &Signature,
    flattened: &[Clause],
    numbering: &VarNumbering,
    size: usize,
) -> Vec<Vec<Lit>> {
    let mut all = families::ground_clauses(flattened, numbering);
    all.extend(families::instances(flattened, signature, numbering));
    all.extend(families::functional_definitions(signature, numbering));
    all.extend(families::symmetry(signature, numbering, size));
    all.extend(families::totality(signature, numbering));
    all
}

/// Runs the ascending-size search (`spec.md` §4.4.1), returning the outcome
/// together with the per-size statistics collected along the way.
///
/// `clauses` need not already be flattened; flattening (C2) and sort-bound
/// inference (C1) are applied here before the search begins.
pub fn solve(
    signature: &mut Signature,
    clauses: &[Clause],
    options: &SolverOptions,
) -> Result<(Outcome, FmbStats), FmbError> {
    if !options.complete {
        log::info!("problem not marked FMB-admissible; skipping the search entirely");
        return Ok((Outcome::Unknown(UnknownReason::NotFmbAdmissible), FmbStats::default()));
    }

    // Sort-bound inference (C1) runs before flattening (C2): flattening
    // lifts constants behind fresh existential variables, which would hide
    // exactly the constant occurrences this pass looks for.
    infer_bounds(signature, clauses);

    let flattened: Vec<Clause> = clauses.iter().map(flatten).collect();

    // `spec.md` §7, "RefutationFound": a clause reduced to the empty clause
    // by flattening refutes the input outright, short-circuiting before any
    // size is attempted.
    if flattened.iter().any(Clause::is_empty) {
        log::info!("flattening produced the empty clause; immediate refutation");
        return Ok((Outcome::Refutation, FmbStats::default()));
    }

    let mut bound = max_model_size(signature, &flattened);
    if let Some(override_size) = options.max_model_size_override {
        bound = Some(bound.map_or(override_size, |b| b.min(override_size)));
    }

    let mut stats = FmbStats::default();
    let mut size = 1usize;
    loop {
        if options.is_past_deadline() {
            log::info!("deadline reached before size {}", size);
            return Ok((Outcome::TimeLimit, stats));
        }
        if let Some(bound) = bound {
            if size > bound {
                log::info!("exhausted bounded search at size {}; refutation", bound);
                return Ok((Outcome::Refutation, stats));
            }
        }

        let numbering = match VarNumbering::build(signature, size) {
            Ok(n) => n,
            Err(FmbError::Overflow { .. }) => {
                log::warn!("variable numbering overflowed at size {}", size);
                return Ok((Outcome::Unknown(UnknownReason::Overflow), stats));
            }
            Err(other) => return Err(other),
        };

        let family_clauses = build_clauses(signature, &flattened, &numbering, size);

        if options.emit_dimacs {
            log::debug!(
                "size {}: {} variables, {} clauses",
                size,
                numbering.var_count(),
                family_clauses.len()
            );
        }

        let inner = match options.sat_solver.build() {
            Ok(solver) => solver,
            Err(_) => return Ok((Outcome::Unknown(UnknownReason::SolverUnavailable), stats)),
        };
        let mut solver = TransparentPresolver::new(inner);
        solver.ensure_var_count(numbering.var_count());
        solver.add_clauses(&mut family_clauses.iter().map(|c| &c[..]), false);

        let result = solver.solve();
        stats.sizes.push(SizeStats {
            size,
            var_count: numbering.var_count(),
            clause_count: family_clauses.len(),
            result,
        });

        match result {
            SolveResult::Sat => {
                let model = Model::reconstruct(signature, &numbering, size, |var: Var| {
                    match solver.assignment(var) {
                        Assignment::True => Some(true),
                        Assignment::False => Some(false),
                        Assignment::DontCare => None,
                    }
                });
                return Ok((Outcome::Satisfiable(model), stats));
            }
            SolveResult::Unsat => {
                size += 1;
            }
            SolveResult::Unknown => {
                return Ok((Outcome::TimeLimit, stats));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmb_formula::fo::{FoVar, Term};

    fn var(i: usize) -> Term {
        Term::Var(FoVar::from_index(i))
    }

    #[test]
    fn unsatisfiable_propositional_clash_is_a_refutation() {
        let mut sig = Signature::new();
        let p = sig.intern("p", 0, false);
        let clauses = vec![
            Clause::new(
                vec![FoLiteral::Predicate {
                    polarity: true,
                    symbol: p,
                    args: vec![],
                }],
                0,
            ),
            Clause::new(
                vec![FoLiteral::Predicate {
                    polarity: false,
                    symbol: p,
                    args: vec![],
                }],
                0,
            ),
        ];
        let options = SolverOptions::default();
        let (outcome, stats) = solve(&mut sig, &clauses, &options).unwrap();
        assert!(matches!(outcome, Outcome::Refutation));
        assert_eq!(stats.sizes.len(), 1);
    }

    #[test]
    fn a_single_satisfiable_unit_predicate_finds_a_model_of_size_one() {
        let mut sig = Signature::new();
        let p = sig.intern("p", 0, false);
        let clauses = vec![Clause::new(
            vec![FoLiteral::Predicate {
                polarity: true,
                symbol: p,
                args: vec![],
            }],
            0,
        )];
        let options = SolverOptions::default();
        let (outcome, _stats) = solve(&mut sig, &clauses, &options).unwrap();
        match outcome {
            Outcome::Satisfiable(model) => assert_eq!(model.size(), 1),
            _ => panic!("expected a model"),
        }
    }

    #[test]
    fn contradictory_ground_equality_and_disequality_is_a_refutation() {
        // {a = b}, {a != b}: a direct contradiction, unsatisfiable at every
        // domain size (`spec.md` §8, "Concrete Scenario 2").
        let mut sig = Signature::new();
        let a = sig.intern("a", 0, true);
        let b = sig.intern("b", 0, true);
        let a_term = Term::Func(a, vec![]);
        let b_term = Term::Func(b, vec![]);
        let clauses = vec![
            Clause::new(
                vec![FoLiteral::Equality {
                    polarity: true,
                    lhs: a_term.clone(),
                    rhs: b_term.clone(),
                }],
                0,
            ),
            Clause::new(
                vec![FoLiteral::Equality {
                    polarity: false,
                    lhs: a_term,
                    rhs: b_term,
                }],
                0,
            ),
        ];
        let options = SolverOptions::default();
        let (outcome, _stats) = solve(&mut sig, &clauses, &options).unwrap();
        assert!(matches!(outcome, Outcome::Refutation));
    }

    #[test]
    fn two_variable_equality_bounds_the_model_to_size_one() {
        let mut sig = Signature::new();
        // x = y, with no other constraint: forces the domain to collapse
        // to a single element.
        let clauses = vec![Clause::new(
            vec![FoLiteral::Equality {
                polarity: true,
                lhs: var(0),
                rhs: var(1),
            }],
            2,
        )];
        let options = SolverOptions::default();
        let (outcome, _stats) = solve(&mut sig, &clauses, &options).unwrap();
        match outcome {
            Outcome::Satisfiable(model) => assert_eq!(model.size(), 1),
            _ => panic!("expected a size-1 model, got a different outcome"),
        }
    }
}
