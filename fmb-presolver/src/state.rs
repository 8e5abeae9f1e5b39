//! Per-variable pure-literal bookkeeping (`spec.md` §3, "Pure-variable info").

/// Lifecycle state of a single SAT variable as seen by the pre-solver.
///
/// Monotone `Unseen -> Pure -> Impure`, with the narrow exception that
/// sweeping every watched clause away from a pure variable returns it to
/// `Unseen` (`spec.md` §9, open questions).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum PureState {
    Unseen,
    Pure(bool),
    Impure,
}

impl Default for PureState {
    fn default() -> PureState {
        PureState::Unseen
    }
}

/// Bookkeeping for every SAT variable known to the pre-solver.
#[derive(Default)]
pub struct VarTable {
    pure: Vec<PureState>,
    /// Polarity of a one-literal clause fixing this variable, if any.
    unit: Vec<Option<bool>>,
    /// Polarity this variable was assumed to have, when the assumption was
    /// absorbed locally (never forwarded to the inner solver).
    local_assumed: Vec<Option<bool>>,
}

impl VarTable {
    pub fn ensure_var_count(&mut self, n: usize) {
        if n > self.pure.len() {
            self.pure.resize(n, PureState::Unseen);
            self.unit.resize(n, None);
            self.local_assumed.resize(n, None);
        }
    }

    pub fn var_count(&self) -> usize {
        self.pure.len()
    }

    pub fn pure(&self, index: usize) -> PureState {
        self.pure[index]
    }

    pub fn set_pure(&mut self, index: usize, state: PureState) {
        self.pure[index] = state;
    }

    pub fn unit(&self, index: usize) -> Option<bool> {
        self.unit[index]
    }

    pub fn set_unit(&mut self, index: usize, polarity: bool) {
        if self.unit[index].is_none() {
            self.unit[index] = Some(polarity);
        }
    }

    pub fn local_assumed(&self, index: usize) -> Option<bool> {
        self.local_assumed[index]
    }

    pub fn set_local_assumed(&mut self, index: usize, polarity: bool) {
        self.local_assumed[index] = Some(polarity);
    }

    pub fn clear_local_assumed(&mut self) {
        for slot in &mut self.local_assumed {
            *slot = None;
        }
    }

    /// A variable is eligible to be swept only while it is purely committed
    /// to one polarity and no unit clause has pinned its value.
    pub fn sweep_eligible(&self, index: usize) -> bool {
        matches!(self.pure[index], PureState::Pure(_)) && self.unit[index].is_none()
    }
}
