//! Investigation forest: node model, expansion algorithm, and the
//! serialized session wrapper used by the UI.

mod session;
mod store;
mod types;

pub use session::Session;
pub use store::{ExpandOutcome, GraphStore, Unchanged};
pub use types::{Node, NodeId};
