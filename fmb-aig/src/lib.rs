//! And-inverter graph representation (C6), definition inliner (C7) and
//! definition introducer (C8) — `spec.md` §3-4.
pub mod definer;
pub mod error;
pub mod inliner;
pub mod node;
pub mod unify;

pub use definer::{DefinitionIntroducer, IntroducedDefinition};
pub use error::AigError;
pub use inliner::{Definition, IdentityNormalizer, Inliner, Normalizer, UnitShape};
pub use node::{Aig, AigRef, Atom, NodeKind};

#[cfg(test)]
mod tests {
    use super::*;
    use fmb_formula::fo::{FoVar, Signature};

    fn var(i: usize) -> fmb_formula::fo::Term {
        fmb_formula::fo::Term::Var(FoVar::from_index(i))
    }

    #[test]
    fn hash_consing_shares_identical_atoms() {
        let mut aig = Aig::new();
        let mut sig = Signature::new();
        let p = sig.intern("p", 1, false);
        let a1 = aig.mk_atom(Atom::Predicate(p, vec![var(0)])).unwrap();
        let a2 = aig.mk_atom(Atom::Predicate(p, vec![var(0)])).unwrap();
        assert_eq!(a1, a2);
    }

    #[test]
    fn and_is_commutative_under_hash_consing() {
        let mut aig = Aig::new();
        let mut sig = Signature::new();
        let p = sig.intern("p", 1, false);
        let q = sig.intern("q", 1, false);
        let a = aig.mk_atom(Atom::Predicate(p, vec![var(0)])).unwrap();
        let b = aig.mk_atom(Atom::Predicate(q, vec![var(0)])).unwrap();
        assert_eq!(aig.mk_and(a, b).unwrap(), aig.mk_and(b, a).unwrap());
    }

    #[test]
    fn and_with_its_own_negation_folds_to_false() {
        let mut aig = Aig::new();
        let mut sig = Signature::new();
        let p = sig.intern("p", 1, false);
        let a = aig.mk_atom(Atom::Predicate(p, vec![var(0)])).unwrap();
        assert!(aig.mk_and(a, !a).unwrap().is_false());
    }

    #[test]
    fn negation_is_a_bit_flip_not_a_new_node() {
        let mut aig = Aig::new();
        let mut sig = Signature::new();
        let p = sig.intern("p", 1, false);
        let before = aig.node_count();
        let a = aig.mk_atom(Atom::Predicate(p, vec![var(0)])).unwrap();
        let _ = !a;
        assert_eq!(aig.node_count(), before + 1);
    }

    #[test]
    fn inliner_saturates_chained_definitions() {
        // p(x) <=> q(x) & r(x), q(x) <=> s(x).
        // apply(p(c)) should resolve to s(c) & r(c).
        let mut aig = Aig::new();
        let mut sig = Signature::new();
        let p = sig.intern("p", 1, false);
        let q = sig.intern("q", 1, false);
        let r = sig.intern("r", 1, false);
        let s = sig.intern("s", 1, false);
        let c = sig.intern("c", 0, true);

        let p_x = aig.mk_atom(Atom::Predicate(p, vec![var(0)])).unwrap();
        let q_x = aig.mk_atom(Atom::Predicate(q, vec![var(0)])).unwrap();
        let r_x = aig.mk_atom(Atom::Predicate(r, vec![var(0)])).unwrap();
        let s_x = aig.mk_atom(Atom::Predicate(s, vec![var(0)])).unwrap();
        let q_and_r = aig.mk_and(q_x, r_x).unwrap();

        let mut inliner = Inliner::new();
        inliner.scan(
            &aig,
            &[
                UnitShape::Equivalence {
                    lhs: p_x,
                    rhs: q_and_r,
                },
                UnitShape::Equivalence { lhs: q_x, rhs: s_x },
            ],
        );
        inliner.build_inline_map(&mut aig).unwrap();
        inliner.saturate(&mut aig).unwrap();

        let c_term = fmb_formula::fo::Term::Func(c, vec![]);
        let p_c = aig.mk_atom(Atom::Predicate(p, vec![c_term.clone()])).unwrap();
        let r_c = aig.mk_atom(Atom::Predicate(r, vec![c_term.clone()])).unwrap();
        let s_c = aig.mk_atom(Atom::Predicate(s, vec![c_term])).unwrap();
        let expected = aig.mk_and(s_c, r_c).unwrap();

        assert_eq!(inliner.apply(p_c), expected);
    }

    #[test]
    fn definer_names_a_node_once_it_crosses_the_threshold() {
        let mut aig = Aig::new();
        let mut sig = Signature::new();
        let p = sig.intern("p", 1, false);
        let q = sig.intern("q", 1, false);
        let p_x = aig.mk_atom(Atom::Predicate(p, vec![var(0)])).unwrap();
        let q_x = aig.mk_atom(Atom::Predicate(q, vec![var(0)])).unwrap();
        let shared = aig.mk_and(p_x, q_x).unwrap();

        // Four independent top-level roots all referencing the same shared
        // conjunction: its direct_refs is 0 (it's in the root list itself
        // for this unit test) but its formula_ref_count should reach 4.
        let topo = vec![shared, shared, shared, shared];
        let mut definer = DefinitionIntroducer::new(4);
        let defs = definer.introduce(&mut aig, &mut sig, &topo);

        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].body, shared);
        assert_eq!(defs[0].args, vec![FoVar::from_index(0)]);
    }
}
