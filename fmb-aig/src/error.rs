//! Error type for `fmb-aig` (`spec.md` §7 "Error Handling Design").
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AigError {
    /// The arena already holds `u32::MAX` nodes; hash-consing one more node
    /// would overflow the 32-bit index every [`crate::node::AigRef`] packs
    /// its polarity bit against.
    #[error("AIG arena exhausted its 32-bit node index space")]
    ArenaExhausted,
}
