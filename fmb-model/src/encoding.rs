//! Propositional variable numbering (`spec.md` §3, §4.4.2): a static,
//! size-dependent bijection from `(symbol, grounding)` to a SAT variable.
use fmb_formula::fo::{Signature, Symbol};
use fmb_formula::Var;
use rustc_hash::FxHashMap;

use crate::error::FmbError;

/// Per-size cumulative block layout over every function/predicate symbol.
///
/// For a function of arity `a` the block has `size^(a+1)` variables,
/// encoding `f(x1..xa) = y`; for a predicate of arity `a` the block has
/// `size^a` variables, encoding `p(x1..xa)`. Blocks are laid out in
/// [`Signature::iter`] order at cumulative offsets.
pub struct VarNumbering {
    size: usize,
    offsets: FxHashMap<Symbol, usize>,
    var_count: usize,
}

impl VarNumbering {
    /// Builds the numbering for `size`, or reports [`FmbError::Overflow`]
    /// if the cumulative variable count would exceed what [`Var`] can
    /// represent (`spec.md` §3: "Overflow of a 32-bit counter causes the
    /// current size attempt to be abandoned").
    pub fn build(signature: &Signature, size: usize) -> Result<VarNumbering, FmbError> {
        let limit = Var::max_count() as u64;
        let mut offsets = FxHashMap::default();
        let mut total: u64 = 0;

        for symbol in signature.iter() {
            let bounds = signature.bounds(symbol);
            let block_arity = if bounds.is_function {
                bounds.arity + 1
            } else {
                bounds.arity
            };
            let block = (size as u64).checked_pow(block_arity as u32);
            let block = block.ok_or(FmbError::Overflow { size })?;

            offsets.insert(symbol, total as usize);

            let next_total = total.checked_add(block).ok_or(FmbError::Overflow { size })?;
            // `spec.md` §9 notes the source uses a strict `<` here
            // (excluding equality); preserved verbatim even though it is
            // borderline-safe.
            if next_total >= limit {
                return Err(FmbError::Overflow { size });
            }
            total = next_total;
        }

        Ok(VarNumbering {
            size,
            offsets,
            var_count: total as usize,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of SAT variables used by this numbering.
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    fn grounding_index(&self, grounding: &[usize]) -> usize {
        let mut index = 0usize;
        let mut weight = 1usize;
        for &value in grounding {
            debug_assert!(value >= 1 && value <= self.size);
            index += (value - 1) * weight;
            weight *= self.size;
        }
        index
    }

    /// The SAT variable for `p(args)`.
    pub fn predicate_var(&self, symbol: Symbol, args: &[usize]) -> Var {
        Var::from_index(self.offsets[&symbol] + self.grounding_index(args))
    }

    /// The SAT variable for `f(args) = result`.
    pub fn function_var(&self, symbol: Symbol, args: &[usize], result: usize) -> Var {
        let mut grounding = args.to_vec();
        grounding.push(result);
        Var::from_index(self.offsets[&symbol] + self.grounding_index(&grounding))
    }
}
