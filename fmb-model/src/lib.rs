//! Sorted signature inference (C1), clause flattening (C2), propositional
//! encoding and the non-incremental finite model builder (C5) —
//! `spec.md` §3-4.
pub mod encoding;
pub mod error;
pub mod families;
pub mod flatten;
pub mod fmb;
pub mod model;
pub mod odometer;
pub mod options;
pub mod signature;

pub use error::FmbError;
pub use fmb::{solve, FmbStats, Outcome, SizeStats, UnknownReason};
pub use model::Model;
pub use options::{Deadline, Mode, SolverOptions};

#[cfg(test)]
mod tests {
    use super::*;
    use fmb_formula::fo::{Clause, FoLiteral, FoVar, Signature, Term};

    fn var(i: usize) -> Term {
        Term::Var(FoVar::from_index(i))
    }

    /// A tiny non-ground problem: `p(x) | q(x)`, `~p(a)`, `~q(b)`, with
    /// `a` and `b` distinct constants. No model of size 1 can satisfy both
    /// negative unit clauses simultaneously while keeping `p(x) | q(x)`
    /// total, so the least model has size 2.
    #[test]
    fn end_to_end_search_finds_the_least_model() {
        let mut sig = Signature::new();
        let p = sig.intern("p", 1, false);
        let q = sig.intern("q", 1, false);
        let a = sig.intern("a", 0, true);
        let b = sig.intern("b", 0, true);

        let a_term = Term::Func(a, vec![]);
        let b_term = Term::Func(b, vec![]);

        let clauses = vec![
            Clause::new(
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
            ),
            Clause::new(
                vec![FoLiteral::Predicate {
                    polarity: false,
                    symbol: p,
                    args: vec![a_term],
                }],
                0,
            ),
            Clause::new(
                vec![FoLiteral::Predicate {
                    polarity: false,
                    symbol: q,
                    args: vec![b_term],
                }],
                0,
            ),
        ];

        let options = SolverOptions::default();
        let (outcome, stats) = solve(&mut sig, &clauses, &options).unwrap();
        match outcome {
            Outcome::Satisfiable(model) => {
                assert!(model.size() <= 2);
            }
            _ => panic!("expected a model"),
        }
        assert!(!stats.sizes.is_empty());
    }

    #[test]
    fn model_display_emits_tptp_domain_and_distinctness() {
        let mut sig = Signature::new();
        let a = sig.intern("a", 0, true);
        let clauses = vec![Clause::new(
            vec![FoLiteral::Equality {
                polarity: true,
                lhs: Term::Func(a, vec![]),
                rhs: Term::Func(a, vec![]),
            }],
            0,
        )];

        let options = SolverOptions::default();
        let (outcome, _stats) = solve(&mut sig, &clauses, &options).unwrap();
        let model = match outcome {
            Outcome::Satisfiable(model) => model,
            _ => panic!("expected a model"),
        };
        let rendered = model.display(&sig).to_string();
        assert!(rendered.contains("fof(domain"));
    }
}
