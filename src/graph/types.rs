//! Node model for the investigation forest.

use std::fmt;

use serde::Serialize;

/// Session-unique node identifier. Assigned monotonically from 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// One seed or discovered candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Node {
	/// Unique within the session.
	pub id: NodeId,
	/// Seed term, canonical identity, or discovered URL/handle/platform.
	pub label: String,
	/// `None` marks the root of an investigation thread.
	pub parent: Option<NodeId>,
}

impl Node {
	/// Whether this node starts a thread.
	pub fn is_root(&self) -> bool {
		self.parent.is_none()
	}
}

/// Case-insensitive form used for dedup and matching.
pub(crate) fn normalize_label(label: &str) -> String {
	label.to_lowercase()
}
