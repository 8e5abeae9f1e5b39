//! Sorted signature inference (C1, `spec.md` §3 "Sorted signature").
//!
//! Callers already intern every function/predicate symbol that occurs in
//! the clause set (with its correct arity) into a
//! [`fmb_formula::fo::Signature`] before handing it here, the same way a
//! TPTP parser would. What this module does is tighten the per-argument
//! bounds from the clause set: every
//! bound starts at `1` (`Signature::intern`'s default) and this module
//! raises it conservatively and monotonically, never lowering a bound that
//! a previous call already raised.
use fmb_formula::fo::{Clause, FoLiteral, Signature, Symbol, Term};
use rustc_hash::{FxHashMap, FxHashSet};

/// Raises every symbol's argument (and, for functions, result) bounds based
/// on the distinct constants observed in each position across `clauses`.
///
/// A symbol occurring in argument position `i` always raises `bound[i]` to
/// at least `1` (trivially true already). Additionally, every *distinct*
/// 0-arity function symbol (constant) observed as a direct argument in
/// position `i` of some occurrence of `f` raises `bound[i]` to at least the
/// number of such distinct constants seen there so far: the position must
/// be able to hold at least that many different elements. Likewise, a
/// constant appearing as the right-hand side of an equality whose left-hand
/// side is a functional term raises that function's result bound.
///
/// This is sound (every raised bound is still an over-approximation, since
/// it can only grow what `spec.md` §4.4.3 allows a variable/argument to
/// range over) and monotone: repeated calls only ever raise bounds further.
pub fn infer_bounds(signature: &mut Signature, clauses: &[Clause]) {
    // (symbol, position) -> distinct constants observed there.
    let mut arg_constants: FxHashMap<(Symbol, usize), FxHashSet<Symbol>> = FxHashMap::default();
    let mut result_constants: FxHashMap<Symbol, FxHashSet<Symbol>> = FxHashMap::default();

    let mut note_args = |symbol: Symbol, args: &[Term]| {
        for (i, arg) in args.iter().enumerate() {
            if let Term::Func(c, inner) = arg {
                if inner.is_empty() {
                    arg_constants.entry((symbol, i)).or_default().insert(*c);
                }
            }
        }
    };

    for clause in clauses {
        for literal in clause.literals() {
            match literal {
                FoLiteral::Predicate { symbol, args, .. } => note_args(*symbol, args),
                FoLiteral::Equality { lhs, rhs, .. } => {
                    if let Term::Func(symbol, args) = lhs {
                        note_args(*symbol, args);
                        if let Term::Func(c, inner) = rhs {
                            if inner.is_empty() {
                                result_constants.entry(*symbol).or_default().insert(*c);
                            }
                        }
                    }
                    if let Term::Func(symbol, args) = rhs {
                        note_args(*symbol, args);
                        if let Term::Func(c, inner) = lhs {
                            if inner.is_empty() {
                                result_constants.entry(*symbol).or_default().insert(*c);
                            }
                        }
                    }
                }
            }
        }
    }

    for (&(symbol, position), constants) in &arg_constants {
        signature
            .info_mut(symbol)
            .bounds
            .raise_arg_bound(position, constants.len());
    }
    for (&symbol, constants) in &result_constants {
        let bounds = &mut signature.info_mut(symbol).bounds;
        let raised = bounds.result_bound().max(constants.len());
        bounds.set_result_bound(raised);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmb_formula::fo::FoVar;

    fn var(i: usize) -> Term {
        Term::Var(FoVar::from_index(i))
    }

    fn constant(signature: &mut Signature, name: &str) -> Term {
        let symbol = signature.intern(name, 0, true);
        Term::Func(symbol, vec![])
    }

    #[test]
    fn distinct_constants_in_the_same_argument_position_raise_its_bound() {
        let mut sig = Signature::new();
        let p = sig.intern("p", 1, false);
        let a = constant(&mut sig, "a");
        let b = constant(&mut sig, "b");

        let clauses = vec![
            Clause::new(
                vec![FoLiteral::Predicate {
                    polarity: true,
                    symbol: p,
                    args: vec![a],
                }],
                0,
            ),
            Clause::new(
                vec![FoLiteral::Predicate {
                    polarity: true,
                    symbol: p,
                    args: vec![b],
                }],
                0,
            ),
        ];

        infer_bounds(&mut sig, &clauses);
        assert_eq!(sig.bounds(p).arg_bound(0), 2);
    }

    #[test]
    fn a_variable_argument_does_not_raise_the_bound_beyond_one() {
        let mut sig = Signature::new();
        let p = sig.intern("p", 1, false);

        let clauses = vec![Clause::new(
            vec![FoLiteral::Predicate {
                polarity: true,
                symbol: p,
                args: vec![var(0)],
            }],
            1,
        )];

        infer_bounds(&mut sig, &clauses);
        assert_eq!(sig.bounds(p).arg_bound(0), 1);
    }

    #[test]
    fn a_constant_equated_to_a_function_result_raises_its_result_bound() {
        let mut sig = Signature::new();
        let f = sig.intern("f", 1, true);
        let a = constant(&mut sig, "a");
        let b = constant(&mut sig, "b");

        let clauses = vec![
            Clause::new(
                vec![FoLiteral::Equality {
                    polarity: true,
                    lhs: Term::Func(f, vec![var(0)]),
                    rhs: a,
                }],
                1,
            ),
            Clause::new(
                vec![FoLiteral::Equality {
                    polarity: true,
                    lhs: Term::Func(f, vec![var(0)]),
                    rhs: b,
                }],
                1,
            ),
        ];

        infer_bounds(&mut sig, &clauses);
        assert_eq!(sig.bounds(f).result_bound(), 2);
    }
}
