//! Transparent pure-literal pre-solver (`spec.md` §4.3).
use std::collections::VecDeque;

use fmb_formula::{Lit, Var};
use fmb_sat::{Assignment, SatSolver, SolveResult};
use log::trace;
use rustc_hash::FxHashSet;

use crate::state::{PureState, VarTable};

/// A handle into the clause arena.
type ClauseHandle = usize;

/// Wraps a [`SatSolver`] and absorbs pure-literal reasoning before anything
/// reaches it.
///
/// Clauses that are satisfied by construction (because one of their literals
/// names a variable that, as far as this wrapper has ever seen, only ever
/// appears with one polarity) are *watched* locally instead of being handed
/// to the inner solver. Only clauses that cannot be explained this way are
/// forwarded. See `spec.md` §4.3 for the full algorithm this implements.
pub struct TransparentPresolver {
    inner: Box<dyn SatSolver>,
    vars: VarTable,
    clauses: Vec<Vec<Lit>>,
    /// For each variable, the clauses currently watched on it.
    watch: Vec<Vec<ClauseHandle>>,
    /// Every assumption literal added since creation or the last retraction,
    /// in the order `add_assumption` was called.
    assumption_log: Vec<Lit>,
    /// Variables for which two contradictory assumptions have been recorded;
    /// these bypass pure-literal absorption entirely so the inner solver is
    /// guaranteed to see the conflict.
    contradictory_vars: FxHashSet<Var>,
}

impl TransparentPresolver {
    pub fn new(inner: Box<dyn SatSolver>) -> TransparentPresolver {
        TransparentPresolver {
            inner,
            vars: VarTable::default(),
            clauses: vec![],
            watch: vec![],
            assumption_log: vec![],
            contradictory_vars: FxHashSet::default(),
        }
    }

    fn ensure_capacity(&mut self, n: usize) {
        if n > self.watch.len() {
            self.watch.resize(n, vec![]);
        }
        self.vars.ensure_var_count(n);
    }

    fn qualifies(&self, lit: Lit) -> bool {
        match self.vars.pure(lit.var().index()) {
            PureState::Unseen => true,
            PureState::Pure(p) => p == lit.is_positive(),
            PureState::Impure => false,
        }
    }

    /// Registers that `lit` was just chosen as the anchor for a watched (or
    /// asserted) clause, updating the pure/impure state machine for its
    /// variable. Returns whether this caused a transition to `Impure`.
    fn touch(
        &mut self,
        lit: Lit,
        pending: &mut VecDeque<Vec<Lit>>,
        to_forward: &mut Vec<Vec<Lit>>,
    ) -> bool {
        let index = lit.var().index();
        match self.vars.pure(index) {
            PureState::Unseen => {
                self.vars.set_pure(index, PureState::Pure(lit.is_positive()));
                false
            }
            PureState::Pure(p) if p == lit.is_positive() => false,
            PureState::Pure(_) => {
                self.make_impure(lit.var(), pending, to_forward);
                true
            }
            PureState::Impure => false,
        }
    }

    /// Forces `var` impure: re-queues every clause currently watched on it
    /// and, if a unit clause had pinned its value, forwards that fact so the
    /// inner solver learns what the pre-solver used to guarantee on its own.
    fn make_impure(
        &mut self,
        var: Var,
        pending: &mut VecDeque<Vec<Lit>>,
        to_forward: &mut Vec<Vec<Lit>>,
    ) {
        let index = var.index();
        if self.vars.pure(index) == PureState::Impure {
            return;
        }
        self.vars.set_pure(index, PureState::Impure);
        let watched = std::mem::take(&mut self.watch[index]);
        for handle in watched {
            pending.push_back(self.clauses[handle].clone());
        }
        if let Some(p) = self.vars.unit(index) {
            to_forward.push(vec![Lit::from_var(var, p)]);
        }
    }

    fn watch_clause(&mut self, clause: Vec<Lit>, anchor: Var) {
        let handle = self.clauses.len();
        self.clauses.push(clause);
        self.watch[anchor.index()].push(handle);
    }

    /// Attempts to re-home every clause watched on `var` onto some other
    /// qualifying variable of the same clause. Never re-homes a clause back
    /// onto `var` itself. On success `var` reverts to `Unseen`; on failure
    /// nothing is mutated.
    fn sweep(&mut self, var: Var) -> bool {
        let index = var.index();
        let mut new_homes = Vec::with_capacity(self.watch[index].len());
        for &handle in &self.watch[index] {
            let mut found = None;
            for &lit in &self.clauses[handle] {
                if lit.var() == var {
                    continue;
                }
                if self.qualifies(lit) {
                    found = Some(lit.var());
                    break;
                }
            }
            match found {
                Some(new_var) => new_homes.push((handle, new_var)),
                None => return false,
            }
        }
        for (handle, new_var) in new_homes {
            self.watch[new_var.index()].push(handle);
        }
        self.watch[index].clear();
        self.vars.set_pure(index, PureState::Unseen);
        true
    }

    fn process_unit(
        &mut self,
        lit: Lit,
        pending: &mut VecDeque<Vec<Lit>>,
        to_forward: &mut Vec<Vec<Lit>>,
    ) {
        let became_impure = self.touch(lit, pending, to_forward);
        if became_impure {
            to_forward.push(vec![lit]);
        }
        self.vars.set_unit(lit.var().index(), lit.is_positive());
    }

    fn process_longer(
        &mut self,
        clause: Vec<Lit>,
        pending: &mut VecDeque<Vec<Lit>>,
        to_forward: &mut Vec<Vec<Lit>>,
    ) {
        if let Some(&anchor) = clause.iter().find(|&&lit| self.qualifies(lit)) {
            self.touch(anchor, pending, to_forward);
            self.watch_clause(clause, anchor.var());
            return;
        }

        let sweep_candidates: Vec<Var> = clause
            .iter()
            .map(|lit| lit.var())
            .filter(|v| self.vars.sweep_eligible(v.index()))
            .collect();

        for var in sweep_candidates {
            if self.sweep(var) {
                trace!("swept watched clauses off variable {}", var);
                self.watch_clause(clause, var);
                return;
            }
        }

        for &lit in &clause {
            self.make_impure(lit.var(), pending, to_forward);
        }
        to_forward.push(clause);
    }

    fn process_clause(
        &mut self,
        clause: Vec<Lit>,
        pending: &mut VecDeque<Vec<Lit>>,
        to_forward: &mut Vec<Vec<Lit>>,
    ) {
        for &lit in &clause {
            self.ensure_capacity(lit.var().index() + 1);
        }
        if clause.len() == 1 {
            self.process_unit(clause[0], pending, to_forward);
        } else {
            self.process_longer(clause, pending, to_forward);
        }
    }

    fn drain(&mut self, mut pending: VecDeque<Vec<Lit>>, to_forward: &mut Vec<Vec<Lit>>) {
        while let Some(clause) = pending.pop_front() {
            self.process_clause(clause, &mut pending, to_forward);
        }
    }

    /// Recomputes which recorded assumptions must live on the inner solver
    /// and rebuilds its assumption stack to match, attempting a sweep for
    /// every pure-but-mismatched assumption along the way.
    fn reconcile_assumptions(&mut self) {
        self.inner.retract_all_assumptions();
        self.vars.clear_local_assumed();

        let log = self.assumption_log.clone();
        let mut forwarded = vec![];
        for lit in log {
            let var = lit.var();
            let index = var.index();
            let polarity = lit.is_positive();

            if self.contradictory_vars.contains(&var) {
                forwarded.push(lit);
                continue;
            }

            if self.vars.sweep_eligible(index) {
                let pure_polarity = match self.vars.pure(index) {
                    PureState::Pure(p) => p,
                    _ => unreachable!(),
                };
                if pure_polarity == polarity {
                    continue;
                }
                if self.sweep(var) {
                    self.vars.set_local_assumed(index, polarity);
                    continue;
                }
                let mut pending = VecDeque::new();
                let mut new_forward = vec![];
                self.make_impure(var, &mut pending, &mut new_forward);
                self.drain(pending, &mut new_forward);
                if !new_forward.is_empty() {
                    self.inner
                        .add_clauses(&mut new_forward.iter().map(|c| c.as_slice()), false);
                }
                forwarded.push(lit);
            } else {
                forwarded.push(lit);
            }
        }

        let last = forwarded.len().saturating_sub(1);
        for (i, &lit) in forwarded.iter().enumerate() {
            self.inner.add_assumption(lit, i != last);
        }
    }
}

impl SatSolver for TransparentPresolver {
    fn ensure_var_count(&mut self, n: usize) {
        self.ensure_capacity(n);
        self.inner.ensure_var_count(n);
    }

    fn add_clauses(&mut self, clauses: &mut dyn Iterator<Item = &[Lit]>, only_propagate: bool) {
        let mut pending = VecDeque::new();
        for clause in clauses {
            pending.push_back(clause.to_vec());
        }
        let mut to_forward = vec![];
        self.drain(pending, &mut to_forward);
        if !to_forward.is_empty() {
            self.inner
                .add_clauses(&mut to_forward.iter().map(|c| c.as_slice()), only_propagate);
        }
    }

    fn solve(&mut self) -> SolveResult {
        self.inner.solve()
    }

    fn status(&self) -> SolveResult {
        self.inner.status()
    }

    fn assignment(&self, var: Var) -> Assignment {
        let index = var.index();
        if index < self.vars.var_count() {
            if let Some(p) = self.vars.local_assumed(index) {
                return if p { Assignment::True } else { Assignment::False };
            }
            if let PureState::Pure(p) = self.vars.pure(index) {
                if self.vars.unit(index).is_none() {
                    return if p { Assignment::True } else { Assignment::False };
                }
            }
        }
        self.inner.assignment(var)
    }

    fn add_assumption(&mut self, lit: Lit, _only_propagate: bool) {
        self.ensure_capacity(lit.var().index() + 1);
        if self.assumption_log.contains(&lit) {
            return;
        }
        if self.assumption_log.contains(&!lit) {
            self.contradictory_vars.insert(lit.var());
        }
        self.assumption_log.push(lit);
        self.reconcile_assumptions();
    }

    fn retract_all_assumptions(&mut self) {
        self.assumption_log.clear();
        self.contradictory_vars.clear();
        self.vars.clear_local_assumed();
        self.inner.retract_all_assumptions();
    }
}
