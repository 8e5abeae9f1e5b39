//! Built-in problems exercising the concrete scenarios of `spec.md` §8.4,
//! standing in for the out-of-scope TPTP front end.
use anyhow::{anyhow, Error};

use fmb_formula::fo::{Clause, FoLiteral, FoVar, Signature, Term};

pub const NAMES: [&str; 4] = ["distinct-constants", "equality-clash", "tautology", "equality-collapse"];

fn var(i: usize) -> Term {
    Term::Var(FoVar::from_index(i))
}

fn constant(signature: &mut Signature, name: &str) -> Term {
    let symbol = signature.intern(name, 0, true);
    Term::Func(symbol, vec![])
}

/// `{P(a), ~P(b)}`: least model has two elements (`spec.md` §8, scenario 1).
fn distinct_constants() -> (Signature, Vec<Clause>) {
    let mut signature = Signature::new();
    let p = signature.intern("p", 1, false);
    let a = constant(&mut signature, "a");
    let b = constant(&mut signature, "b");

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
                polarity: false,
                symbol: p,
                args: vec![b],
            }],
            0,
        ),
    ];
    (signature, clauses)
}

/// `{a = b, a != b}`: refuted at size 1 (`spec.md` §8, scenario 2).
fn equality_clash() -> (Signature, Vec<Clause>) {
    let mut signature = Signature::new();
    let a = constant(&mut signature, "a");
    let b = constant(&mut signature, "b");

    let clauses = vec![
        Clause::new(
            vec![FoLiteral::Equality {
                polarity: true,
                lhs: a.clone(),
                rhs: b.clone(),
            }],
            0,
        ),
        Clause::new(
            vec![FoLiteral::Equality {
                polarity: false,
                lhs: a,
                rhs: b,
            }],
            0,
        ),
    ];
    (signature, clauses)
}

/// `{P(x) | ~P(x)}`: trivially satisfiable at size 1 (`spec.md` §8, scenario 3).
fn tautology() -> (Signature, Vec<Clause>) {
    let mut signature = Signature::new();
    let p = signature.intern("p", 1, false);

    let clauses = vec![Clause::new(
        vec![
            FoLiteral::Predicate {
                polarity: true,
                symbol: p,
                args: vec![var(0)],
            },
            FoLiteral::Predicate {
                polarity: false,
                symbol: p,
                args: vec![var(0)],
            },
        ],
        1,
    )];
    (signature, clauses)
}

/// `{x = y}`: a single positive two-variable equality, collapsing the least
/// model to size 1 (`spec.md` §8, scenario 4).
fn equality_collapse() -> (Signature, Vec<Clause>) {
    let signature = Signature::new();
    let clauses = vec![Clause::new(
        vec![FoLiteral::Equality {
            polarity: true,
            lhs: var(0),
            rhs: var(1),
        }],
        2,
    )];
    (signature, clauses)
}

pub fn build(name: &str) -> Result<(Signature, Vec<Clause>), Error> {
    match name {
        "distinct-constants" => Ok(distinct_constants()),
        "equality-clash" => Ok(equality_clash()),
        "tautology" => Ok(tautology()),
        "equality-collapse" => Ok(equality_collapse()),
        other => Err(anyhow!("unknown demo problem '{}'", other)),
    }
}
