//! Model reconstruction and TPTP-style output (`spec.md` §4.4.4, §6).
use std::fmt;

use fmb_formula::fo::{Signature, Symbol};
use fmb_formula::Var;

use crate::encoding::VarNumbering;
use crate::odometer::Odometer;

/// A finite model of a fixed domain size, read back from a satisfying
/// assignment.
///
/// Functions are stored as flat grounding-index tables rather than nested
/// maps: the same `grounding_index` order [`VarNumbering`] uses for
/// variable numbering, so lookups need no extra bookkeeping.
pub struct Model {
    size: usize,
    functions: Vec<(Symbol, usize, Vec<usize>)>,
    predicates: Vec<(Symbol, usize, Vec<bool>)>,
}

impl Model {
    /// Reads a model of domain size `size` out of a satisfying assignment.
    /// `assignment` reports the polarity, if known, of every SAT variable
    /// relevant to `numbering`.
    pub fn reconstruct(
        signature: &Signature,
        numbering: &VarNumbering,
        size: usize,
        assignment: impl Fn(Var) -> Option<bool>,
    ) -> Model {
        let mut functions = vec![];
        let mut predicates = vec![];

        for symbol in signature.functions() {
            let arity = signature.bounds(symbol).arity;
            let arg_bounds = vec![size; arity];
            let mut table = vec![];
            for args in Odometer::new(arg_bounds) {
                let mut value = 0;
                for candidate in 1..=size {
                    let var = numbering.function_var(symbol, &args, candidate);
                    if assignment(var) == Some(true) {
                        value = candidate;
                        break;
                    }
                }
                debug_assert!(value != 0, "totality clauses guarantee every tuple has a result");
                table.push(value);
            }
            functions.push((symbol, arity, table));
        }

        for symbol in signature.predicates() {
            let arity = signature.bounds(symbol).arity;
            let arg_bounds = vec![size; arity];
            let mut table = vec![];
            for args in Odometer::new(arg_bounds) {
                let var = numbering.predicate_var(symbol, &args);
                table.push(assignment(var) == Some(true));
            }
            predicates.push((symbol, arity, table));
        }

        Model {
            size,
            functions,
            predicates,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn grounding_index(&self, args: &[usize]) -> usize {
        let mut index = 0usize;
        let mut weight = 1usize;
        for &value in args {
            index += (value - 1) * weight;
            weight *= self.size;
        }
        index
    }

    pub fn function_value(&self, symbol: Symbol, args: &[usize]) -> usize {
        let (_, _, table) = self.functions.iter().find(|(s, ..)| *s == symbol).expect("unknown function symbol");
        table[self.grounding_index(args)]
    }

    pub fn predicate_value(&self, symbol: Symbol, args: &[usize]) -> bool {
        let (_, _, table) = self
            .predicates
            .iter()
            .find(|(s, ..)| *s == symbol)
            .expect("unknown predicate symbol");
        table[self.grounding_index(args)]
    }

    /// Renders this model as TPTP `fof` annotated formulas (`spec.md` §6):
    /// a domain declaration, a distinctness axiom, and one formula per
    /// interpreted symbol.
    pub fn display<'a>(&'a self, signature: &'a Signature) -> TptpModel<'a> {
        TptpModel {
            model: self,
            signature,
        }
    }
}

fn element(index: usize) -> String {
    format!("fmb{}", index)
}

pub struct TptpModel<'a> {
    model: &'a Model,
    signature: &'a Signature,
}

impl<'a> fmt::Display for TptpModel<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let model = self.model;
        let elements: Vec<String> = (1..=model.size).map(element).collect();

        writeln!(
            f,
            "fof(domain, fi_domain, ( ! [X] : ( {} ) ) ).",
            elements
                .iter()
                .map(|e| format!("X = {}", e))
                .collect::<Vec<_>>()
                .join(" | ")
        )?;

        if elements.len() > 1 {
            writeln!(
                f,
                "fof(distinct_domain, fi_distinct, ( {} ) ).",
                elements
                    .iter()
                    .enumerate()
                    .flat_map(|(i, a)| elements[i + 1..].iter().map(move |b| format!("{} != {}", a, b)))
                    .collect::<Vec<_>>()
                    .join(" & ")
            )?;
        }

        for &(symbol, arity, ref table) in &model.functions {
            let name = self.signature.name(symbol);
            if arity == 0 {
                writeln!(f, "fof({}, fi_functors, ( {} = {} ) ).", name, name, element(table[0]))?;
                continue;
            }
            for args in Odometer::new(vec![model.size; arity]) {
                let idx = model.grounding_index(&args);
                let lhs_args = args.iter().map(|&a| element(a)).collect::<Vec<_>>().join(",");
                writeln!(
                    f,
                    "fof({}, fi_functors, ( {}({}) = {} ) ).",
                    name,
                    name,
                    lhs_args,
                    element(table[idx])
                )?;
            }
        }

        for &(symbol, arity, ref table) in &model.predicates {
            let name = self.signature.name(symbol);
            for args in Odometer::new(vec![model.size; arity]) {
                let idx = model.grounding_index(&args);
                let sign = if table[idx] { "" } else { "~" };
                let call = if arity == 0 {
                    name.to_string()
                } else {
                    format!(
                        "{}({})",
                        name,
                        args.iter().map(|&a| element(a)).collect::<Vec<_>>().join(",")
                    )
                };
                writeln!(f, "fof({}, fi_predicates, ( {}{} ) ).", name, sign, call)?;
            }
        }

        Ok(())
    }
}
