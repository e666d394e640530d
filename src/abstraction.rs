//! State abstraction: reducing a full board observation to a small table key
//!
//! Each sub-policy looks at the board through its own abstractor. Most
//! flavors read only the current block and its (up to) four neighbors, so
//! the resulting key space stays small enough for tabular learning:
//!
//! | Flavor | Position | Neighbor code |
//! |--------|----------|---------------|
//! | `simple` | kept | raw flag of the neighbor block (0/1) |
//! | `adjacent` | dropped | feature count around the neighbor (0-4) |
//! | `adjacent_conservative` | dropped | danger (2), disc (1) or plain (0) |
//! | `along_direction` | dropped | feature count walking that way (0-3) |
//! | `verbose` | kept | full board snapshot, no neighbor slots |
//!
//! In every slotted flavor a neighbor is `None` exactly when the move toward
//! it leaves the pyramid.

pub mod abstractor;
pub mod repr;
pub mod state;

pub use abstractor::StateAbstractor;
pub use repr::{PolicyKind, PolicyReprs, StateRepr};
pub use state::AbstractState;
