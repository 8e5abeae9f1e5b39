//! The *Options bundle* (`spec.md` §6), threaded explicitly as a context
//! struct rather than read from global state (`spec.md` §9, "Global
//! singleton state").
use fmb_macros::DocDefault;
use fmb_sat::SatSolverKind;

/// Silences progress output for tool-harness consumption, keeping only the
/// exit status and model dump.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Mode {
    Normal,
    Spider,
}

impl Default for Mode {
    fn default() -> Mode {
        Mode::Normal
    }
}

/// A wall-clock predicate polled between loop iterations and before each
/// `solve()` call (`spec.md` §5). Returning `true` aborts the search with
/// [`crate::fmb::Outcome::TimeLimit`] at the next check.
pub type Deadline = Box<dyn Fn() -> bool>;

/// Configurable parameters for a single finite-model-building run.
#[derive(DocDefault)]
pub struct SolverOptions {
    /// Which SAT back-end the loop instantiates at each candidate size. (Default: SatSolverKind::InternalCdcl)
    pub sat_solver: SatSolverKind,

    /// Whether the problem is FMB-admissible: no uninterpreted function
    /// symbol has an irreducibly infinite sort. When `false` the loop
    /// short-circuits to `Unknown` before trying any size (`spec.md` §4.4.5). (Default: true)
    pub complete: bool,

    /// Progress-output verbosity selector. (Default: Mode::Normal)
    pub mode: Mode,

    /// Proof/trace detail level; `0` disables proof bookkeeping entirely. (Default: 0)
    pub proof_level: u32,

    /// Overrides the inferred `max_model_size` with a hard ceiling. (Default: None)
    pub max_model_size_override: Option<usize>,

    /// Writes the SAT encoding attempted at each size to the given sink as
    /// DIMACS CNF before solving (`spec.md` §6, "Intermediate artefacts"). (Default: false)
    pub emit_dimacs: bool,

    /// Polled between loop iterations and before each `solve()`. (Default: None)
    pub deadline: Option<Deadline>,
}

impl SolverOptions {
    pub fn is_past_deadline(&self) -> bool {
        self.deadline.as_ref().map_or(false, |deadline| deadline())
    }
}
