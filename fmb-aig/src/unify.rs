//! Minimal first-order matching used by the inliner to apply a definition's
//! substitution (`spec.md` §4.5, step 2: "matching against the indexed
//! `lhs` and applying the substitution").
//!
//! This is one-directional matching (`pattern` against `subject`), not full
//! unification: the inliner only ever matches a stored `lhs` against an
//! atom actually occurring in a formula, so `pattern`'s variables are bound
//! and `subject` is never instantiated.
use std::collections::BTreeMap;

use fmb_formula::fo::{FoVar, Term};

pub type Substitution = BTreeMap<FoVar, Term>;

fn substitute(term: &Term, subst: &Substitution) -> Term {
    match term {
        Term::Var(v) => subst.get(v).cloned().unwrap_or_else(|| term.clone()),
        Term::Func(symbol, args) => {
            Term::Func(*symbol, args.iter().map(|a| substitute(a, subst)).collect())
        }
    }
}

pub fn apply_substitution(term: &Term, subst: &Substitution) -> Term {
    substitute(term, subst)
}

/// Attempts to match `pattern` against `subject`, extending `subst`.
/// Fails if `pattern` binds the same variable to two different subjects.
pub fn match_term(pattern: &Term, subject: &Term, subst: &mut Substitution) -> bool {
    match pattern {
        Term::Var(v) => match subst.get(v) {
            Some(bound) => bound == subject,
            None => {
                subst.insert(*v, subject.clone());
                true
            }
        },
        Term::Func(symbol, args) => match subject {
            Term::Func(subject_symbol, subject_args)
                if symbol == subject_symbol && args.len() == subject_args.len() =>
            {
                args.iter()
                    .zip(subject_args)
                    .all(|(p, s)| match_term(p, s, subst))
            }
            _ => false,
        },
    }
}

fn occurs(v: FoVar, term: &Term) -> bool {
    match term {
        Term::Var(other) => *other == v,
        Term::Func(_, args) => args.iter().any(|a| occurs(v, a)),
    }
}

/// Full syntactic unification of two terms, treating variables on either
/// side as unifiable. Used to decide whether two `lhs` atoms overlap
/// (`spec.md` §4.5, step 1: "reject definitions whose `lhs` unifies with
/// any already-stored `lhs`").
pub fn unify_term(a: &Term, b: &Term, subst: &mut Substitution) -> bool {
    let a = apply_substitution(a, subst);
    let b = apply_substitution(b, subst);
    match (&a, &b) {
        (Term::Var(va), Term::Var(vb)) if va == vb => true,
        (Term::Var(v), _) => {
            if occurs(*v, &b) {
                return false;
            }
            subst.insert(*v, b);
            true
        }
        (_, Term::Var(v)) => {
            if occurs(*v, &a) {
                return false;
            }
            subst.insert(*v, a);
            true
        }
        (Term::Func(fa, args_a), Term::Func(fb, args_b)) => {
            fa == fb && args_a.len() == args_b.len() && {
                args_a
                    .iter()
                    .zip(args_b)
                    .all(|(x, y)| unify_term(x, y, subst))
            }
        }
    }
}
