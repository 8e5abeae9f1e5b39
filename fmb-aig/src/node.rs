//! Hash-consed and-inverter graph (`spec.md` §3, "AIG node"; §9, "Shared DAG").
use std::fmt;

use fmb_formula::fo::{FoVar, Term};
use rustc_hash::FxHashMap;

use crate::error::AigError;

/// The backing index type for arena-allocated nodes.
pub type NodeIdx = u32;

/// A reference to an AIG node together with a polarity bit.
///
/// Mirrors the bit-packing of [`fmb_formula::Lit`]: the low bit of `code` is
/// the negation bit, the remaining bits are the node index. Negation is a
/// zero-cost XOR on this value; it never touches the arena.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct AigRef {
    code: NodeIdx,
}

impl AigRef {
    const TRUE_NODE: NodeIdx = 0;

    #[inline]
    fn from_parts(index: NodeIdx, polarity: bool) -> AigRef {
        AigRef {
            code: (index << 1) | (!polarity as NodeIdx),
        }
    }

    /// The constant `true` reference. Every [`Aig`] arena reserves index 0
    /// for it.
    #[inline]
    pub fn truthy() -> AigRef {
        AigRef::from_parts(AigRef::TRUE_NODE, true)
    }

    /// The constant `false` reference (`true`, negated).
    #[inline]
    pub fn falsy() -> AigRef {
        !AigRef::truthy()
    }

    #[inline]
    pub fn index(self) -> usize {
        (self.code >> 1) as usize
    }

    #[inline]
    pub fn polarity(self) -> bool {
        (self.code & 1) == 0
    }

    #[inline]
    pub fn is_true(self) -> bool {
        self == AigRef::truthy()
    }

    #[inline]
    pub fn is_false(self) -> bool {
        self == AigRef::falsy()
    }

    /// The positive-polarity reference to the node at `index`.
    #[inline]
    pub fn from_node_index(index: NodeIdx) -> AigRef {
        AigRef::from_parts(index, true)
    }
}

impl std::ops::Not for AigRef {
    type Output = AigRef;

    #[inline]
    fn not(self) -> AigRef {
        AigRef {
            code: self.code ^ 1,
        }
    }
}

impl fmt::Debug for AigRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.polarity() {
            write!(f, "!")?;
        }
        write!(f, "n{}", self.index())
    }
}

/// A positive-polarity atomic formula (an equality or a predicate
/// application). Always stored with implicit positive polarity; the
/// surrounding [`AigRef`] carries the real sign.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Atom {
    Equality(Term, Term),
    Predicate(fmb_formula::fo::Symbol, Vec<Term>),
}

impl Atom {
    pub fn free_vars(&self) -> Vec<FoVar> {
        fn walk(term: &Term, out: &mut Vec<FoVar>) {
            match term {
                Term::Var(v) => {
                    if !out.contains(v) {
                        out.push(*v);
                    }
                }
                Term::Func(_, args) => {
                    for arg in args {
                        walk(arg, out);
                    }
                }
            }
        }
        let mut out = vec![];
        match self {
            Atom::Equality(lhs, rhs) => {
                walk(lhs, &mut out);
                walk(rhs, &mut out);
            }
            Atom::Predicate(_, args) => {
                for arg in args {
                    walk(arg, &mut out);
                }
            }
        }
        out
    }

    fn map_vars(&self, f: &mut impl FnMut(FoVar) -> FoVar) -> Atom {
        fn walk(term: &Term, f: &mut impl FnMut(FoVar) -> FoVar) -> Term {
            match term {
                Term::Var(v) => Term::Var(f(*v)),
                Term::Func(s, args) => Term::Func(*s, args.iter().map(|a| walk(a, f)).collect()),
            }
        }
        match self {
            Atom::Equality(lhs, rhs) => Atom::Equality(walk(lhs, f), walk(rhs, f)),
            Atom::Predicate(s, args) => {
                Atom::Predicate(*s, args.iter().map(|a| walk(a, f)).collect())
            }
        }
    }

    /// Renumbers this atom's variables by first-occurrence order starting
    /// at 0, so that two atoms equal up to variable renaming compare equal.
    pub fn canonicalize(&self) -> Atom {
        let mut seen = FxHashMap::default();
        self.map_vars(&mut |v| {
            let next = seen.len();
            *seen.entry(v).or_insert_with(|| FoVar::from_index(next))
        })
    }

    /// Shifts every variable index up by `offset`, used to put two
    /// independently-scoped atoms into disjoint variable namespaces before
    /// attempting unification.
    pub fn shift_vars(&self, offset: usize) -> Atom {
        self.map_vars(&mut |v| FoVar::from_index(v.index() + offset))
    }
}

/// The four node kinds from `spec.md` §3.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum Node {
    True,
    Atom(Atom),
    And(AigRef, AigRef),
    Quant {
        universal: bool,
        vars: Vec<FoVar>,
        body: AigRef,
    },
}

/// What a node actually is, as returned by [`Aig::kind`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum NodeKind<'a> {
    True,
    Atom(&'a Atom),
    And(AigRef, AigRef),
    Quant {
        universal: bool,
        vars: &'a [FoVar],
        body: AigRef,
    },
}

/// Hash-consing arena of AIG nodes.
///
/// Structural equality of a node implies reference equality of its
/// [`AigRef`] (modulo polarity), so two formulas that are syntactically
/// identical always compress to the same sub-graph.
#[derive(Default)]
pub struct Aig {
    nodes: Vec<Node>,
    index: FxHashMap<Node, NodeIdx>,
}

impl Aig {
    pub fn new() -> Aig {
        let mut aig = Aig {
            nodes: vec![Node::True],
            index: FxHashMap::default(),
        };
        aig.index.insert(Node::True, AigRef::TRUE_NODE);
        aig
    }

    fn intern(&mut self, node: Node) -> Result<AigRef, AigError> {
        if let Some(&idx) = self.index.get(&node) {
            return Ok(AigRef::from_parts(idx, true));
        }
        if self.nodes.len() >= NodeIdx::MAX as usize {
            return Err(AigError::ArenaExhausted);
        }
        let idx = self.nodes.len() as NodeIdx;
        self.index.insert(node.clone(), idx);
        self.nodes.push(node);
        Ok(AigRef::from_parts(idx, true))
    }

    pub fn mk_atom(&mut self, atom: Atom) -> Result<AigRef, AigError> {
        self.intern(Node::Atom(atom))
    }

    /// Builds a conjunction with constant folding for the trivial cases;
    /// only the genuinely non-trivial conjunction allocates a node.
    pub fn mk_and(&mut self, a: AigRef, b: AigRef) -> Result<AigRef, AigError> {
        if a.is_false() || b.is_false() {
            return Ok(AigRef::falsy());
        }
        if a.is_true() {
            return Ok(b);
        }
        if b.is_true() {
            return Ok(a);
        }
        if a == b {
            return Ok(a);
        }
        if a == !b {
            return Ok(AigRef::falsy());
        }
        // Canonical child order so `and(a, b)` and `and(b, a)` hash-cons to
        // the same node.
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        self.intern(Node::And(lo, hi))
    }

    pub fn mk_or(&mut self, a: AigRef, b: AigRef) -> Result<AigRef, AigError> {
        self.mk_and(!a, !b).map(|r| !r)
    }

    pub fn mk_quant(
        &mut self,
        universal: bool,
        mut vars: Vec<FoVar>,
        body: AigRef,
    ) -> Result<AigRef, AigError> {
        vars.sort_by_key(|v| v.index());
        vars.dedup();
        if vars.is_empty() {
            return Ok(body);
        }
        self.intern(Node::Quant {
            universal,
            vars,
            body,
        })
    }

    /// The kind of node `r` points to, ignoring `r`'s own polarity bit.
    pub fn kind(&self, r: AigRef) -> NodeKind<'_> {
        match &self.nodes[r.index()] {
            Node::True => NodeKind::True,
            Node::Atom(atom) => NodeKind::Atom(atom),
            &Node::And(a, b) => NodeKind::And(a, b),
            Node::Quant {
                universal,
                vars,
                body,
            } => NodeKind::Quant {
                universal: *universal,
                vars,
                body: *body,
            },
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every atom node in the arena, with its canonical (positive-polarity)
    /// reference.
    pub fn atoms(&self) -> impl Iterator<Item = (AigRef, &Atom)> + '_ {
        self.nodes.iter().enumerate().filter_map(|(i, n)| match n {
            Node::Atom(atom) => Some((AigRef::from_node_index(i as NodeIdx), atom)),
            _ => None,
        })
    }
}
