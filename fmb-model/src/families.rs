//! Clause families emitted at each candidate size (`spec.md` §4.4.3).
//!
//! Every family is generated in deterministic odometer order
//! (`spec.md` §5); families themselves are emitted in the order given in
//! `spec.md` §4.4.1: ground clauses, instances, functional definitions,
//! symmetry axioms, totality.
use fmb_formula::fo::{Clause, FoLiteral, FoVar, Signature, Symbol, Term};
use fmb_formula::Lit;

use crate::encoding::VarNumbering;
use crate::odometer::Odometer;

/// How a single literal translates under one grounding.
enum LitOutcome {
    /// The literal is false under this grounding; drop it from the clause.
    Drop,
    /// The literal is true under this grounding, making the whole clause a
    /// tautology; skip this grounding (instance) entirely.
    Trivial,
    Lit(Lit),
}

fn var_position(vars: &[FoVar], v: FoVar) -> usize {
    vars.iter().position(|&x| x == v).expect("flattened clause references an unbound variable")
}

fn term_value(term: &Term, vars: &[FoVar], grounding: &[usize]) -> usize {
    match term {
        Term::Var(v) => grounding[var_position(vars, *v)],
        Term::Func(..) => unreachable!("flattened clause has a non-variable subterm"),
    }
}

fn translate_literal(
    literal: &FoLiteral,
    vars: &[FoVar],
    grounding: &[usize],
    numbering: &VarNumbering,
) -> LitOutcome {
    match literal {
        FoLiteral::Equality { polarity, lhs, rhs } if lhs.is_var() && rhs.is_var() => {
            let a = term_value(lhs, vars, grounding);
            let b = term_value(rhs, vars, grounding);
            if (a == b) == *polarity {
                LitOutcome::Trivial
            } else {
                LitOutcome::Drop
            }
        }
        FoLiteral::Equality { polarity, lhs, rhs } => {
            let (symbol, args) = match lhs {
                Term::Func(symbol, args) => (*symbol, args),
                Term::Var(_) => unreachable!("flattener always puts the function term on the left"),
            };
            let arg_values: Vec<usize> = args.iter().map(|a| term_value(a, vars, grounding)).collect();
            let result_value = term_value(rhs, vars, grounding);
            let var = numbering.function_var(symbol, &arg_values, result_value);
            LitOutcome::Lit(Lit::from_var(var, *polarity))
        }
        FoLiteral::Predicate {
            polarity,
            symbol,
            args,
        } => {
            let arg_values: Vec<usize> = args.iter().map(|a| term_value(a, vars, grounding)).collect();
            let var = numbering.predicate_var(*symbol, &arg_values);
            LitOutcome::Lit(Lit::from_var(var, *polarity))
        }
    }
}

/// Translates one grounding of `clause`'s `vars` into a SAT clause, or
/// `None` if the grounding is a tautology (`spec.md` §4.4.3:
/// "skip-instance-if-contradicted").
fn translate_clause(
    clause: &Clause,
    vars: &[FoVar],
    grounding: &[usize],
    numbering: &VarNumbering,
) -> Option<Vec<Lit>> {
    let mut lits = Vec::with_capacity(clause.literals().len());
    for literal in clause.literals() {
        match translate_literal(literal, vars, grounding, numbering) {
            LitOutcome::Drop => {}
            LitOutcome::Trivial => return None,
            LitOutcome::Lit(lit) => lits.push(lit),
        }
    }
    Some(lits)
}

/// Distinct variables of a clause, in first-occurrence (i.e. index) order.
fn clause_vars(clause: &Clause) -> Vec<FoVar> {
    (0..clause.var_count()).map(FoVar::from_index).collect()
}

/// The grounding bound for `target` within `clause` (`spec.md` §4.4.3:
/// "per-variable bounds b1..bn").
///
/// Direct argument occurrences (`target` passed as an argument to some
/// function or predicate symbol) genuinely share one sort across a clause,
/// so their bounds are intersected (the minimum is still a safe
/// over-approximation of that shared sort). Equality-result occurrences
/// (`target` as the `y` of a flattened `f(x⃗)=y` literal) are different: the
/// flattener's function-to-function case (`f(x⃗)=g(z⃗)` becoming
/// `f(x⃗)=y, ~(g(z⃗)=y)`) makes one fresh variable stand for two unrelated
/// symbols' result ranges at once, so those are combined with the maximum
/// instead. Taking the minimum there would wrongly clip `y`'s range to
/// whichever symbol's result bound happens to be smaller, dropping
/// groundings the other symbol still needs.
fn variable_bound(clause: &Clause, target: FoVar, signature: &Signature) -> usize {
    let mut arg_bound: Option<usize> = None;
    let mut result_bound: Option<usize> = None;

    let mut note_args = |symbol: Symbol, args: &[Term]| {
        for (i, arg) in args.iter().enumerate() {
            if let Term::Var(v) = arg {
                if *v == target {
                    let b = signature.bounds(symbol).arg_bound(i);
                    arg_bound = Some(arg_bound.map_or(b, |cur| cur.min(b)));
                }
            }
        }
    };

    for literal in clause.literals() {
        match literal {
            FoLiteral::Predicate { symbol, args, .. } => note_args(*symbol, args),
            FoLiteral::Equality { lhs, rhs, .. } => {
                if let Term::Func(symbol, args) = lhs {
                    note_args(*symbol, args);
                    if let Term::Var(v) = rhs {
                        if *v == target {
                            let b = signature.bounds(*symbol).result_bound();
                            result_bound = Some(result_bound.map_or(b, |cur| cur.max(b)));
                        }
                    }
                }
            }
        }
    }

    let mut bound = usize::MAX;
    if let Some(b) = arg_bound {
        bound = bound.min(b);
    }
    if let Some(b) = result_bound {
        bound = bound.min(b);
    }
    bound
}

/// Ground clauses: direct translation of every zero-variable clause.
pub fn ground_clauses(clauses: &[Clause], numbering: &VarNumbering) -> Vec<Vec<Lit>> {
    clauses
        .iter()
        .filter(|c| c.is_ground())
        .filter_map(|c| translate_clause(c, &[], &[], numbering))
        .collect()
}

/// Instances: every grounding of every non-ground clause over
/// `[1..min(bi, size)]` per variable (`spec.md` §4.4.3), in odometer order
/// (`spec.md` §5).
pub fn instances(clauses: &[Clause], signature: &Signature, numbering: &VarNumbering) -> Vec<Vec<Lit>> {
    let size = numbering.size();
    let mut out = vec![];
    for clause in clauses.iter().filter(|c| !c.is_ground()) {
        let vars = clause_vars(clause);
        let bounds: Vec<usize> = vars
            .iter()
            .map(|&v| variable_bound(clause, v, signature).min(size))
            .collect();
        for grounding in Odometer::new(bounds) {
            if let Some(lits) = translate_clause(clause, &vars, &grounding, numbering) {
                out.push(lits);
            }
        }
    }
    out
}

/// Functional definitions: `¬f(x⃗)=y ∨ ¬f(x⃗)=z` for every `y < z` in the
/// result range (unordered pairs suffice; the clause is symmetric in `y`
/// and `z`).
pub fn functional_definitions(signature: &Signature, numbering: &VarNumbering) -> Vec<Vec<Lit>> {
    let size = numbering.size();
    let mut out = vec![];
    for symbol in signature.functions() {
        let bounds = signature.bounds(symbol);
        let arg_bounds: Vec<usize> = (0..bounds.arity).map(|i| bounds.arg_bound(i).min(size)).collect();
        let result_bound = bounds.result_bound().min(size);
        for args in Odometer::new(arg_bounds) {
            for y in 1..=result_bound {
                for z in (y + 1)..=result_bound {
                    let lit_y = Lit::from_var(numbering.function_var(symbol, &args, y), false);
                    let lit_z = Lit::from_var(numbering.function_var(symbol, &args, z), false);
                    out.push(vec![lit_y, lit_z]);
                }
            }
        }
    }
    out
}

/// Totality: for every function, every grounding of its arguments must
/// produce at least one result value.
pub fn totality(signature: &Signature, numbering: &VarNumbering) -> Vec<Vec<Lit>> {
    let size = numbering.size();
    let mut out = vec![];
    for symbol in signature.functions() {
        let bounds = signature.bounds(symbol);
        let arg_bounds: Vec<usize> = (0..bounds.arity).map(|i| bounds.arg_bound(i).min(size)).collect();
        let result_bound = bounds.result_bound().min(size);
        for args in Odometer::new(arg_bounds) {
            let clause = (1..=result_bound)
                .map(|y| Lit::from_var(numbering.function_var(symbol, &args, y), true))
                .collect();
            out.push(clause);
        }
    }
    out
}

/// Symmetry axioms (`spec.md` §4.4.3), cumulative over every size `1..=size`.
pub fn symmetry(signature: &Signature, numbering: &VarNumbering, size: usize) -> Vec<Vec<Lit>> {
    let constants: Vec<Symbol> = signature.constants().collect();
    let n = constants.len();
    let non_constants: Vec<Symbol> = signature
        .functions()
        .filter(|&f| signature.bounds(f).arity > 0)
        .collect();

    let mut out = vec![];

    for s in 1..=size {
        if s <= n {
            let c = constants[s - 1];
            // Restrict the constant at index s-1 to values in [1..s].
            let restriction: Vec<Lit> = (1..=s)
                .map(|d| Lit::from_var(numbering.function_var(c, &[], d), true))
                .collect();
            out.push(restriction);

            // Canonicity: if c_s = d, some earlier constant must equal d-1.
            for d in 1..s {
                let mut clause = vec![Lit::from_var(numbering.function_var(c, &[], d), false)];
                for &earlier in &constants[..s - 1] {
                    if d >= 1 {
                        let target = d - 1;
                        if target >= 1 {
                            clause.push(Lit::from_var(
                                numbering.function_var(earlier, &[], target),
                                true,
                            ));
                        }
                    }
                }
                out.push(clause);
            }
        } else if n > 0 {
            // `spec.md` §9: the source returns early here when n == 0;
            // preserved by the `else if n > 0` guard above.
            if non_constants.is_empty() {
                continue;
            }
            let func_index = (s / n) % non_constants.len();
            let f = non_constants[func_index];
            let element_offset = s % n;
            let element = if element_offset == 0 { n } else { element_offset };

            let arity = signature.bounds(f).arity;
            let args = vec![element; arity];
            let restriction: Vec<Lit> = (1..=s)
                .map(|d| Lit::from_var(numbering.function_var(f, &args, d), true))
                .collect();
            out.push(restriction);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmb_formula::fo::Signature;

    #[test]
    fn ground_unit_clause_translates_directly() {
        let mut sig = Signature::new();
        let p = sig.intern("p", 0, false);
        let numbering = VarNumbering::build(&sig, 1).unwrap();
        let clause = Clause::new(
            vec![FoLiteral::Predicate {
                polarity: true,
                symbol: p,
                args: vec![],
            }],
            0,
        );
        let clauses = ground_clauses(&[clause], &numbering);
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].len(), 1);
    }

    #[test]
    fn two_variable_equality_collapses_to_empty_clause_when_values_differ() {
        let sig = Signature::new();
        let numbering = VarNumbering::build(&sig, 2).unwrap();
        // x = y
        let clause = Clause::new(
            vec![FoLiteral::Equality {
                polarity: true,
                lhs: Term::Var(FoVar::from_index(0)),
                rhs: Term::Var(FoVar::from_index(1)),
            }],
            2,
        );
        let vars = clause_vars(&clause);
        assert_eq!(translate_clause(&clause, &vars, &[1, 2], &numbering), Some(vec![]));
        assert_eq!(translate_clause(&clause, &vars, &[1, 1], &numbering), None);
    }

    #[test]
    fn functional_definitions_forbid_two_distinct_results() {
        let mut sig = Signature::new();
        sig.intern("f", 0, true);
        let numbering = VarNumbering::build(&sig, 3).unwrap();
        let defs = functional_definitions(&sig, &numbering);
        // C(3, 2) = 3 pairs for a nullary function with result bound 3.
        assert_eq!(defs.len(), 3);
    }

    #[test]
    fn totality_offers_every_result_value() {
        let mut sig = Signature::new();
        sig.intern("f", 0, true);
        let numbering = VarNumbering::build(&sig, 3).unwrap();
        let clauses = totality(&sig, &numbering);
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].len(), 3);
    }

    #[test]
    fn first_constant_is_pinned_to_the_first_domain_element() {
        let mut sig = Signature::new();
        let a = sig.intern("a", 0, true);
        let numbering = VarNumbering::build(&sig, 1).unwrap();
        let clauses = symmetry(&sig, &numbering, 1);
        assert_eq!(clauses.len(), 1);
        assert_eq!(
            clauses[0],
            vec![Lit::from_var(numbering.function_var(a, &[], 1), true)]
        );
    }

    #[test]
    fn no_function_symbols_means_no_cycling_symmetry_beyond_constants() {
        let mut sig = Signature::new();
        sig.intern("a", 0, true);
        let numbering = VarNumbering::build(&sig, 3).unwrap();
        // Only s=1 contributes a clause (constant range restriction);
        // s=2,3 have no more constants and no functions to cycle through.
        let clauses = symmetry(&sig, &numbering, 3);
        assert_eq!(clauses.len(), 1);
    }

    #[test]
    fn variable_bound_intersects_direct_argument_positions() {
        let mut sig = Signature::new();
        let p = sig.intern("p", 1, false);
        let q = sig.intern("q", 1, false);
        sig.info_mut(p).bounds.raise_arg_bound(0, 2);
        sig.info_mut(q).bounds.raise_arg_bound(0, 5);

        // p(x) | q(x)
        let clause = Clause::new(
            vec![
                FoLiteral::Predicate {
                    polarity: true,
                    symbol: p,
                    args: vec![var(0)],
                },
                FoLiteral::Predicate {
                    polarity: true,
                    symbol: q,
                    args: vec![var(0)],
                },
            ],
            1,
        );
        assert_eq!(variable_bound(&clause, FoVar::from_index(0), &sig), 2);
    }

    #[test]
    fn variable_bound_uses_the_maximum_across_shared_equality_results() {
        // Models the flattener's `f(x)=g(y)` case: `f(x)=v, ~(g(y)=v)`, where
        // `v` is simultaneously `f`'s and `g`'s result.
        let mut sig = Signature::new();
        let f = sig.intern("f", 1, true);
        let g = sig.intern("g", 1, true);
        sig.info_mut(f).bounds.set_result_bound(2);
        sig.info_mut(g).bounds.set_result_bound(5);

        let clause = Clause::new(
            vec![
                FoLiteral::Equality {
                    polarity: true,
                    lhs: Term::Func(f, vec![var(0)]),
                    rhs: var(2),
                },
                FoLiteral::Equality {
                    polarity: false,
                    lhs: Term::Func(g, vec![var(1)]),
                    rhs: var(2),
                },
            ],
            3,
        );
        // Taking the minimum (2) here would drop groundings g(y)=v needs for
        // v in 3..=5; the maximum keeps both symbols' result ranges covered.
        assert_eq!(variable_bound(&clause, FoVar::from_index(2), &sig), 5);
    }

    #[test]
    fn instances_restricts_groundings_to_the_inferred_bound() {
        let mut sig = Signature::new();
        let p = sig.intern("p", 1, false);
        sig.info_mut(p).bounds.raise_arg_bound(0, 1);
        let numbering = VarNumbering::build(&sig, 3).unwrap();

        // p(x), with x's only occurrence bounding it to [1..1].
        let clause = Clause::new(
            vec![FoLiteral::Predicate {
                polarity: true,
                symbol: p,
                args: vec![var(0)],
            }],
            1,
        );
        let out = instances(&[clause], &sig, &numbering);
        assert_eq!(out.len(), 1);
    }

    fn var(i: usize) -> Term {
        Term::Var(FoVar::from_index(i))
    }
}
