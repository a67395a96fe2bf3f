//! Cell line clones, the unit being screened
//!
//! A clone is a set of immutable intrinsic traits plus a mutable observed
//! state, with the history of states read at each checkpoint.

mod clone;
mod state;
mod traits;

pub use clone::CellClone;
pub use state::ObservedState;
pub use traits::{Glycosylation, IntrinsicTraits};
