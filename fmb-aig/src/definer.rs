//! AIG definition introducer (C8, `spec.md` §4.6): a reference-count-driven
//! naming pass that folds frequently-occurring sub-formulas behind fresh
//! predicate symbols, Tseitin-style.
use rustc_hash::FxHashMap;

use fmb_formula::fo::{FoVar, Signature, Symbol};

use crate::node::{Aig, AigRef, NodeKind};

/// Default reference-count threshold above which a node gets its own name.
pub const DEFAULT_THRESHOLD: usize = 4;

pub struct IntroducedDefinition {
    pub symbol: Symbol,
    pub args: Vec<FoVar>,
    pub body: AigRef,
}

#[derive(Default, Clone)]
struct NodeInfo {
    direct_refs: usize,
    under_quantifier: bool,
    formula_ref_count: usize,
}

pub struct DefinitionIntroducer {
    threshold: usize,
    named: FxHashMap<AigRef, Symbol>,
}

impl DefinitionIntroducer {
    pub fn new(threshold: usize) -> DefinitionIntroducer {
        DefinitionIntroducer {
            threshold,
            named: FxHashMap::default(),
        }
    }

    pub fn with_default_threshold() -> DefinitionIntroducer {
        DefinitionIntroducer::new(DEFAULT_THRESHOLD)
    }

    pub fn named(&self) -> &FxHashMap<AigRef, Symbol> {
        &self.named
    }

    /// Runs both passes over `topo`, a list of nodes ordered roots-first
    /// (every node appears after the root(s) it is reachable from, and
    /// before any node only reachable through it).
    ///
    /// Reference counting propagates root-to-leaves: a node's count is
    /// final only once every occurrence from above has been folded in, so
    /// the multiplicative "how many times would this sub-formula appear if
    /// fully expanded" count is sound. Minting a definition for a node
    /// resets its count to 1 before it is handed down to its children,
    /// exactly so a newly-named node's children see one occurrence through
    /// it rather than the pre-naming multiplicity.
    pub fn introduce(
        &mut self,
        aig: &mut Aig,
        signature: &mut Signature,
        topo: &[AigRef],
    ) -> Vec<IntroducedDefinition> {
        let mut info: FxHashMap<usize, NodeInfo> = FxHashMap::default();
        for &r in topo {
            info.entry(r.index()).or_insert_with(NodeInfo::default);
        }

        // Pass 1: direct reference counts and the under-quantifier bit.
        for &r in topo {
            let under_quantifier = info[&r.index()].under_quantifier;
            match aig.kind(r) {
                NodeKind::And(a, b) => {
                    for &child in &[a, b] {
                        let e = info.entry(child.index()).or_insert_with(NodeInfo::default);
                        e.direct_refs += 1;
                        e.under_quantifier |= under_quantifier;
                    }
                }
                NodeKind::Quant { body, .. } => {
                    let e = info.entry(body.index()).or_insert_with(NodeInfo::default);
                    e.direct_refs += 1;
                    e.under_quantifier = true;
                }
                NodeKind::True | NodeKind::Atom(_) => {}
            }
        }

        // Every node with no incoming edge in this list is a top-level
        // formula unit, contributing one occurrence of its own.
        for &r in topo {
            if info[&r.index()].direct_refs == 0 {
                info.get_mut(&r.index()).unwrap().formula_ref_count += 1;
            }
        }

        let mut defs = vec![];

        // Pass 2: fold frequently-occurring nodes into fresh names, then
        // propagate the (possibly reset) count down to children.
        for &r in topo {
            let idx = r.index();
            let count = info[&idx].formula_ref_count;
            let under_quantifier = info[&idx].under_quantifier;
            let nameable = matches!(aig.kind(r), NodeKind::And(..) | NodeKind::Quant { .. });

            if !under_quantifier
                && nameable
                && count >= self.threshold
                && !self.named.contains_key(&canonical(r))
            {
                let free_vars = free_vars_of(aig, r);
                let arity = free_vars.len();
                let name = format!("definition_{}", self.named.len());
                let symbol = signature.intern(&name, arity, false);
                self.named.insert(canonical(r), symbol);
                defs.push(IntroducedDefinition {
                    symbol,
                    args: free_vars,
                    body: r,
                });
                info.get_mut(&idx).unwrap().formula_ref_count = 1;
            }

            let propagated = info[&idx].formula_ref_count;
            match aig.kind(r) {
                NodeKind::And(a, b) => {
                    for &child in &[a, b] {
                        info.get_mut(&child.index()).unwrap().formula_ref_count += propagated;
                    }
                }
                NodeKind::Quant { body, .. } => {
                    info.get_mut(&body.index()).unwrap().formula_ref_count += propagated;
                }
                NodeKind::True | NodeKind::Atom(_) => {}
            }
        }

        defs
    }
}

fn canonical(r: AigRef) -> AigRef {
    if r.polarity() {
        r
    } else {
        !r
    }
}

fn free_vars_of(aig: &Aig, r: AigRef) -> Vec<FoVar> {
    fn walk(aig: &Aig, r: AigRef, out: &mut Vec<FoVar>, bound: &mut Vec<FoVar>) {
        match aig.kind(r) {
            NodeKind::True => {}
            NodeKind::Atom(atom) => {
                for v in atom.free_vars() {
                    if !bound.contains(&v) && !out.contains(&v) {
                        out.push(v);
                    }
                }
            }
            NodeKind::And(a, b) => {
                walk(aig, a, out, bound);
                walk(aig, b, out, bound);
            }
            NodeKind::Quant { vars, body, .. } => {
                let added = vars.len();
                bound.extend_from_slice(vars);
                walk(aig, body, out, bound);
                bound.truncate(bound.len() - added);
            }
        }
    }
    let mut out = vec![];
    let mut bound = vec![];
    walk(aig, r, &mut out, &mut bound);
    out.sort_by_key(|v| v.index());
    out
}
