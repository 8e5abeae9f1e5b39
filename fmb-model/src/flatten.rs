//! Clause flattener (C2, `spec.md` §4.1).
//!
//! Rewrites a clause in arbitrary form into the canonical shape required by
//! the rest of the pipeline: every argument position of every non-equality
//! literal is a variable, and every equality literal is either `t = x`
//! (`t` a variable-argumented functional term, `x` a variable) or the
//! "two-variable" form `x = y`.
use fmb_formula::fo::{Clause, FoLiteral, FoVar, Term};

/// Flattens `clause` into the canonical form described in `spec.md` §3/§4.1.
///
/// Idempotent: `flatten(&flatten(c)) == flatten(c)` for any `c`, since an
/// already-flat clause has no compound subterms left to lift and its
/// variables are already in first-occurrence order.
pub fn flatten(clause: &Clause) -> Clause {
    let mut var_count = clause.var_count();
    let mut literals = Vec::with_capacity(clause.literals().len());
    let mut extra = Vec::new();

    for literal in clause.literals() {
        literals.push(flatten_literal(literal, &mut var_count, &mut extra));
    }
    literals.extend(extra);

    canonicalize(literals, var_count)
}

/// Lifts `term`'s arguments (if it's a functional term) so they are all
/// variables, recursing into nested function applications first. The term
/// itself is left in place; only its *children* are forced to be variables.
/// This is what an equality literal's two sides need (`spec.md` §4.1:
/// "for equalities `f(…)=g(…)`, both sides are lifted").
fn flatten_top(term: Term, var_count: &mut usize, extra: &mut Vec<FoLiteral>) -> Term {
    match term {
        Term::Var(_) => term,
        Term::Func(symbol, args) => {
            let args = args
                .into_iter()
                .map(|arg| lift_to_var(arg, var_count, extra))
                .collect();
            Term::Func(symbol, args)
        }
    }
}

/// Forces `term` itself to become a bare variable: if it already is one,
/// returns it unchanged; otherwise flattens its own arguments, introduces a
/// fresh existential variable `y`, and records the disequality `¬(t' = y)`
/// that must accompany the clause (`spec.md` §4.1: "pulling nested terms
/// out via fresh existentially bound variables and adding disequalities").
fn lift_to_var(term: Term, var_count: &mut usize, extra: &mut Vec<FoLiteral>) -> Term {
    match term {
        Term::Var(_) => term,
        Term::Func(..) => {
            let flattened = flatten_top(term, var_count, extra);
            let fresh = FoVar::from_index(*var_count);
            *var_count += 1;
            extra.push(FoLiteral::Equality {
                polarity: false,
                lhs: flattened,
                rhs: Term::Var(fresh),
            });
            Term::Var(fresh)
        }
    }
}

fn flatten_literal(literal: &FoLiteral, var_count: &mut usize, extra: &mut Vec<FoLiteral>) -> FoLiteral {
    match literal {
        FoLiteral::Predicate {
            polarity,
            symbol,
            args,
        } => {
            let args = args
                .iter()
                .cloned()
                .map(|arg| lift_to_var(arg, var_count, extra))
                .collect();
            FoLiteral::Predicate {
                polarity: *polarity,
                symbol: *symbol,
                args,
            }
        }
        FoLiteral::Equality { polarity, lhs, rhs } => {
            let lhs = flatten_top(lhs.clone(), var_count, extra);
            let rhs = flatten_top(rhs.clone(), var_count, extra);
            match (lhs, rhs) {
                (lhs @ Term::Var(_), rhs @ Term::Var(_)) => FoLiteral::Equality {
                    polarity: *polarity,
                    lhs,
                    rhs,
                },
                (lhs @ Term::Func(..), rhs @ Term::Var(_)) => FoLiteral::Equality {
                    polarity: *polarity,
                    lhs,
                    rhs,
                },
                // Equalities are symmetric; swapping keeps the required
                // `t = x` shape without changing meaning.
                (lhs @ Term::Var(_), rhs @ Term::Func(..)) => FoLiteral::Equality {
                    polarity: *polarity,
                    lhs: rhs,
                    rhs: lhs,
                },
                (lhs @ Term::Func(..), rhs @ Term::Func(..)) => {
                    let rhs = lift_to_var(rhs, var_count, extra);
                    FoLiteral::Equality {
                        polarity: *polarity,
                        lhs,
                        rhs,
                    }
                }
            }
        }
    }
}

/// Renumbers variables by first-occurrence order across `literals` (left to
/// right, literal by literal) so clauses that differ only by variable
/// naming become literally equal (`spec.md` §4.1, post-condition).
fn canonicalize(literals: Vec<FoLiteral>, _var_count: usize) -> Clause {
    let mut mapping = std::collections::HashMap::new();
    let mut next = 0usize;
    let mut renumber_term = |term: Term, mapping: &mut std::collections::HashMap<FoVar, FoVar>, next: &mut usize| -> Term {
        fn go(
            term: Term,
            mapping: &mut std::collections::HashMap<FoVar, FoVar>,
            next: &mut usize,
        ) -> Term {
            match term {
                Term::Var(v) => {
                    let renamed = *mapping.entry(v).or_insert_with(|| {
                        let fresh = FoVar::from_index(*next);
                        *next += 1;
                        fresh
                    });
                    Term::Var(renamed)
                }
                Term::Func(symbol, args) => {
                    Term::Func(symbol, args.into_iter().map(|a| go(a, mapping, next)).collect())
                }
            }
        }
        go(term, mapping, next)
    };

    let literals: Vec<FoLiteral> = literals
        .into_iter()
        .map(|literal| match literal {
            FoLiteral::Predicate {
                polarity,
                symbol,
                args,
            } => FoLiteral::Predicate {
                polarity,
                symbol,
                args: args
                    .into_iter()
                    .map(|a| renumber_term(a, &mut mapping, &mut next))
                    .collect(),
            },
            FoLiteral::Equality { polarity, lhs, rhs } => FoLiteral::Equality {
                polarity,
                lhs: renumber_term(lhs, &mut mapping, &mut next),
                rhs: renumber_term(rhs, &mut mapping, &mut next),
            },
        })
        .collect();

    Clause::new(literals, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmb_formula::fo::Signature;

    fn var(i: usize) -> Term {
        Term::Var(FoVar::from_index(i))
    }

    #[test]
    fn already_flat_predicate_clause_is_unchanged_up_to_var_naming() {
        let mut sig = Signature::new();
        let p = sig.intern("p", 1, false);
        let clause = Clause::new(
            vec![FoLiteral::Predicate {
                polarity: true,
                symbol: p,
                args: vec![var(0)],
            }],
            1,
        );
        let flat = flatten(&clause);
        assert_eq!(flat, clause);
    }

    #[test]
    fn nested_function_argument_is_lifted_with_a_disequality() {
        let mut sig = Signature::new();
        let p = sig.intern("p", 1, false);
        let f = sig.intern("f", 1, true);

        // p(f(x))
        let clause = Clause::new(
            vec![FoLiteral::Predicate {
                polarity: true,
                symbol: p,
                args: vec![Term::Func(f, vec![var(0)])],
            }],
            1,
        );
        let flat = flatten(&clause);

        assert_eq!(flat.var_count(), 2);
        assert_eq!(flat.literals().len(), 2);
        // p(y)
        assert!(matches!(
            &flat.literals()[0],
            FoLiteral::Predicate { symbol, args, .. } if *symbol == p && args == &[var(1)]
        ));
        // ~(f(x) = y)
        assert!(matches!(
            &flat.literals()[1],
            FoLiteral::Equality { polarity: false, lhs, rhs }
                if lhs == &Term::Func(f, vec![var(0)]) && rhs == &var(1)
        ));
    }

    #[test]
    fn function_equals_function_lifts_the_right_hand_side() {
        let mut sig = Signature::new();
        let f = sig.intern("f", 1, true);
        let g = sig.intern("g", 1, true);

        // f(x) = g(y)
        let clause = Clause::new(
            vec![FoLiteral::Equality {
                polarity: true,
                lhs: Term::Func(f, vec![var(0)]),
                rhs: Term::Func(g, vec![var(1)]),
            }],
            2,
        );
        let flat = flatten(&clause);
        assert_eq!(flat.var_count(), 3);
        assert!(matches!(
            &flat.literals()[0],
            FoLiteral::Equality { polarity: true, lhs, rhs }
                if lhs == &Term::Func(f, vec![var(0)]) && rhs == &var(2)
        ));
    }

    #[test]
    fn flatten_is_idempotent() {
        let mut sig = Signature::new();
        let p = sig.intern("p", 1, false);
        let f = sig.intern("f", 1, true);
        let clause = Clause::new(
            vec![FoLiteral::Predicate {
                polarity: true,
                symbol: p,
                args: vec![Term::Func(f, vec![var(0)])],
            }],
            1,
        );
        let once = flatten(&clause);
        let twice = flatten(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_clause_stays_empty() {
        let clause = Clause::new(vec![], 0);
        let flat = flatten(&clause);
        assert!(flat.is_empty());
    }
}
