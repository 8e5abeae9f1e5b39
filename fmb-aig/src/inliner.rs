//! AIG definition inliner (C7, `spec.md` §4.5).
use std::collections::HashSet as StdHashSet;

use log::trace;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::AigError;
use crate::node::{Aig, Atom, AigRef, NodeKind};
use crate::unify::{apply_substitution, match_term, unify_term, Substitution};

/// Variable indices in two independently-scoped atoms are put into disjoint
/// ranges before unifying them, by shifting one side up by this much. No
/// realistic clause uses anywhere near this many variables.
const DISJOINT_OFFSET: usize = 1_000_000;

/// How a formula unit presents itself to the inliner: either a bare literal
/// (an atom with a polarity) or an equivalence between an atom and an
/// arbitrary right-hand side. Recognising *which* a given formula is is a
/// syntactic question handled upstream by whatever constructs formula units
/// in the first place.
#[derive(Copy, Clone, Debug)]
pub enum UnitShape {
    Atom(AigRef),
    Equivalence { lhs: AigRef, rhs: AigRef },
}

/// An equivalence definition (`spec.md` §3, "Equivalence definition").
#[derive(Clone, Debug)]
pub struct Definition {
    pub lhs: Atom,
    pub active_rhs: AigRef,
}

/// Builds and applies a literal-indexed rewrite map from a batch of
/// equivalence definitions.
#[derive(Default)]
pub struct Inliner {
    definitions: Vec<Definition>,
    inline_map: FxHashMap<AigRef, AigRef>,
    simpl_map: FxHashMap<AigRef, AigRef>,
}

/// The BDD-based normaliser hook assumed by `spec.md` §1 ("on-the-fly AIG
/// simplification beyond propagation of known names and a fixed BDD-based
/// normaliser hook" is explicitly out of scope: this trait is the hook
/// itself, not an implementation of it).
pub trait Normalizer {
    fn normalize(&mut self, aig: &mut Aig, r: AigRef) -> AigRef;
}

/// A normaliser that performs no simplification, for callers that have not
/// wired in a real BDD package.
pub struct IdentityNormalizer;

impl Normalizer for IdentityNormalizer {
    fn normalize(&mut self, _aig: &mut Aig, r: AigRef) -> AigRef {
        r
    }
}

impl Inliner {
    pub fn new() -> Inliner {
        Inliner::default()
    }

    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    fn conflicts_with_existing(&self, atom: &Atom) -> bool {
        let shifted = atom.shift_vars(DISJOINT_OFFSET);
        self.definitions.iter().any(|def| {
            let mut subst = Substitution::new();
            unify_atoms(&def.lhs, &shifted, &mut subst)
        })
    }

    /// Step 1 of `scan`: collects tentative definitions, rejecting any whose
    /// `lhs` unifies with an already-accepted one.
    pub fn scan(&mut self, aig: &Aig, units: &[UnitShape]) {
        for &unit in units {
            let (lhs_ref, rhs_ref) = match unit {
                UnitShape::Atom(r) => (r, None),
                UnitShape::Equivalence { lhs, rhs } => (lhs, Some(rhs)),
            };
            // The definition's head must itself be an atom, never a
            // compound formula.
            let atom = match aig.kind(lhs_ref) {
                NodeKind::Atom(atom) => atom.clone(),
                _ => continue,
            };
            let active_rhs = match rhs_ref {
                Some(rhs) => {
                    if lhs_ref.polarity() {
                        rhs
                    } else {
                        !rhs
                    }
                }
                None => {
                    if lhs_ref.polarity() {
                        AigRef::truthy()
                    } else {
                        AigRef::falsy()
                    }
                }
            };
            if self.conflicts_with_existing(&atom) {
                trace!("rejecting definition for {:?}: lhs overlaps an existing one", atom);
                continue;
            }
            self.definitions.push(Definition { lhs: atom, active_rhs });
        }
    }

    /// Step 2: builds the initial rewrite map by matching every atom in
    /// `aig` against the stored definitions.
    pub fn build_inline_map(&mut self, aig: &mut Aig) -> Result<(), AigError> {
        self.inline_map.clear();
        let atoms: Vec<(AigRef, Atom)> = aig
            .atoms()
            .map(|(r, atom)| (r, atom.clone()))
            .collect();
        for (r, atom) in atoms {
            for def in &self.definitions {
                let mut subst = Substitution::new();
                if match_atom(&def.lhs, &atom, &mut subst) {
                    let instantiated = instantiate(aig, def.active_rhs, &subst)?;
                    self.inline_map.insert(r, instantiated);
                    self.inline_map.insert(!r, !instantiated);
                    break;
                }
            }
        }
        Ok(())
    }

    /// Step 3: composes the rewrite map with itself until a fixed point.
    /// Guards each resolution chain against cycles (a defining equation
    /// that is, directly or indirectly, self-referential).
    pub fn saturate(&mut self, aig: &mut Aig) -> Result<(), AigError> {
        loop {
            let keys: Vec<AigRef> = self.inline_map.keys().copied().collect();
            let mut changed = false;
            for k in keys {
                let v = self.inline_map[&k];
                let mut guard = FxHashSet::default();
                guard.insert(k);
                let rewritten = deep_rewrite(&self.inline_map, aig, v, &mut guard)?;
                if rewritten != v {
                    self.inline_map.insert(k, rewritten);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        Ok(())
    }

    /// Step 4: populates the orthogonal simplification map via the
    /// (externally supplied) normaliser hook.
    pub fn populate_simplification(&mut self, aig: &mut Aig, normalizer: &mut dyn Normalizer) {
        self.simpl_map.clear();
        let images: StdHashSet<AigRef> = self.inline_map.values().copied().collect();
        for image in images {
            let normalized = normalizer.normalize(aig, image);
            if normalized != image {
                self.simpl_map.insert(image, normalized);
            }
        }
    }

    /// `apply(aig) = simpl_map[inline_map[aig]]`, a single indirection
    /// through each map (`spec.md` §4.5).
    pub fn apply(&self, r: AigRef) -> AigRef {
        let after_inline = self.inline_map.get(&r).copied().unwrap_or(r);
        self.simpl_map.get(&after_inline).copied().unwrap_or(after_inline)
    }
}

fn unify_atoms(a: &Atom, b: &Atom, subst: &mut Substitution) -> bool {
    match (a, b) {
        (Atom::Equality(l1, r1), Atom::Equality(l2, r2)) => {
            unify_term(l1, l2, subst) && unify_term(r1, r2, subst)
        }
        (Atom::Predicate(s1, a1), Atom::Predicate(s2, a2)) => {
            s1 == s2
                && a1.len() == a2.len()
                && a1.iter().zip(a2).all(|(x, y)| unify_term(x, y, subst))
        }
        _ => false,
    }
}

fn match_atom(pattern: &Atom, subject: &Atom, subst: &mut Substitution) -> bool {
    match (pattern, subject) {
        (Atom::Equality(l1, r1), Atom::Equality(l2, r2)) => {
            match_term(l1, l2, subst) && match_term(r1, r2, subst)
        }
        (Atom::Predicate(s1, a1), Atom::Predicate(s2, a2)) => {
            s1 == s2
                && a1.len() == a2.len()
                && a1.iter().zip(a2).all(|(x, y)| match_term(x, y, subst))
        }
        _ => false,
    }
}

fn instantiate_atom(atom: &Atom, subst: &Substitution) -> Atom {
    match atom {
        Atom::Equality(lhs, rhs) => Atom::Equality(
            apply_substitution(lhs, subst),
            apply_substitution(rhs, subst),
        ),
        Atom::Predicate(symbol, args) => Atom::Predicate(
            *symbol,
            args.iter().map(|a| apply_substitution(a, subst)).collect(),
        ),
    }
}

/// Rebuilds `r`'s AIG with every atom's arguments rewritten by `subst`.
fn instantiate(aig: &mut Aig, r: AigRef, subst: &Substitution) -> Result<AigRef, AigError> {
    let polarity = r.polarity();
    let base = match aig.kind(r) {
        NodeKind::True => AigRef::truthy(),
        NodeKind::Atom(atom) => {
            let atom = instantiate_atom(atom, subst);
            aig.mk_atom(atom)?
        }
        NodeKind::And(a, b) => {
            let a2 = instantiate(aig, a, subst)?;
            let b2 = instantiate(aig, b, subst)?;
            aig.mk_and(a2, b2)?
        }
        NodeKind::Quant {
            universal,
            vars,
            body,
        } => {
            let vars = vars.to_vec();
            let filtered: Substitution = subst
                .iter()
                .filter(|(v, _)| !vars.contains(v))
                .map(|(k, v)| (*k, v.clone()))
                .collect();
            let body2 = instantiate(aig, body, &filtered)?;
            aig.mk_quant(universal, vars, body2)?
        }
    };
    Ok(if polarity { base } else { !base })
}

fn deep_rewrite(
    map: &FxHashMap<AigRef, AigRef>,
    aig: &mut Aig,
    r: AigRef,
    guard: &mut FxHashSet<AigRef>,
) -> Result<AigRef, AigError> {
    if !guard.insert(r) {
        return Ok(r);
    }
    let result = if let Some(&mapped) = map.get(&r) {
        deep_rewrite(map, aig, mapped, guard)?
    } else {
        match aig.kind(r) {
            NodeKind::True | NodeKind::Atom(_) => r,
            NodeKind::And(a, b) => {
                let polarity = r.polarity();
                let a2 = deep_rewrite(map, aig, a, guard)?;
                let b2 = deep_rewrite(map, aig, b, guard)?;
                let rebuilt = aig.mk_and(a2, b2)?;
                if polarity {
                    rebuilt
                } else {
                    !rebuilt
                }
            }
            NodeKind::Quant {
                universal,
                vars,
                body,
            } => {
                let polarity = r.polarity();
                let vars = vars.to_vec();
                let body2 = deep_rewrite(map, aig, body, guard)?;
                let rebuilt = aig.mk_quant(universal, vars, body2)?;
                if polarity {
                    rebuilt
                } else {
                    !rebuilt
                }
            }
        }
    };
    guard.remove(&r);
    Ok(result)
}
