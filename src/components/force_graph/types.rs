//! Node/edge view consumed by the layout engine.

use url::Url;

use crate::graph::NodeId;

/// Display category derived from the shape of a label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
	/// Looks like a fetchable resource; clicking opens the URL.
	Resource(Url),
	/// Anything else (seed keywords, usernames, e-mail addresses).
	Seed,
}

impl NodeKind {
	/// Classifies a label. Labels with an http(s) scheme, or scheme-less
	/// `host.tld/path` forms, are resources.
	pub fn classify(label: &str) -> Self {
		let label = label.trim();
		if let Ok(url) = Url::parse(label) {
			if matches!(url.scheme(), "http" | "https") && url.host().is_some() {
				return NodeKind::Resource(url);
			}
			return NodeKind::Seed;
		}
		let host = label.split('/').next().unwrap_or_default();
		let plausible = host.contains('.')
			&& !host.starts_with('.')
			&& !host.ends_with('.')
			&& !label.contains('@')
			&& !label.chars().any(char::is_whitespace);
		if plausible {
			if let Ok(url) = Url::parse(&format!("https://{label}")) {
				return NodeKind::Resource(url);
			}
		}
		NodeKind::Seed
	}

	/// URL to open, for resources.
	pub fn url(&self) -> Option<&Url> {
		match self {
			NodeKind::Resource(url) => Some(url),
			NodeKind::Seed => None,
		}
	}

	/// Whether clicking opens something.
	pub fn is_resource(&self) -> bool {
		matches!(self, NodeKind::Resource(_))
	}
}

/// A node in the view.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	/// Store id.
	pub id: NodeId,
	/// Text drawn next to the node.
	pub label: String,
	/// Roots are drawn larger.
	pub is_root: bool,
	/// Display category.
	pub kind: NodeKind,
}

/// Edge from a parent to one of its children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphLink {
	/// Parent.
	pub source: NodeId,
	/// Child.
	pub target: NodeId,
}

/// Complete view: nodes and derived links.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	/// Nodes in id order.
	pub nodes: Vec<GraphNode>,
	/// One link per non-root node.
	pub links: Vec<GraphLink>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn urls_and_host_paths_are_resources() {
		assert!(NodeKind::classify("https://github.com/alice").is_resource());
		assert!(NodeKind::classify("site.com/x").is_resource());
		assert!(NodeKind::classify("office365.com").is_resource());
		assert_eq!(
			NodeKind::classify("site.com/x").url().map(Url::as_str),
			Some("https://site.com/x")
		);
	}

	#[test]
	fn seeds_are_not_resources() {
		assert_eq!(NodeKind::classify("alice123"), NodeKind::Seed);
		assert_eq!(NodeKind::classify("alice@example.com"), NodeKind::Seed);
		assert_eq!(NodeKind::classify("acme corp"), NodeKind::Seed);
		assert_eq!(NodeKind::classify("mailto:alice@example.com"), NodeKind::Seed);
		assert_eq!(NodeKind::classify("v1."), NodeKind::Seed);
	}
}
