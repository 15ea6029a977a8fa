//! Forest invariants over arbitrary expansion sequences.

#![allow(unused_crate_dependencies)]

use std::collections::{HashMap, HashSet};

use futures::executor::block_on;
use lead_graph::graph::{GraphStore, NodeId};
use lead_graph::search::{Candidates, SearchAdapter, SearchMode};
use proptest::prelude::*;

const KEYWORDS: &[&str] = &["a", "b", "ab", "A.com", "shared", "x", "B", " a "];

/// Deterministic service whose answers overlap heavily across keywords.
/// Identity lookups resolve to a canonical name except for "x", which
/// fails like an unreachable service.
struct Overlapping;

impl SearchAdapter for Overlapping {
	async fn resolve(&self, keyword: &str, mode: SearchMode) -> Candidates {
		let k = keyword.to_lowercase();
		let labels = vec![
			format!("{k}.com"),
			format!("{}.COM", k.to_uppercase()),
			"shared".to_string(),
			format!("{k}/{}", k.len()),
			String::new(),
		];
		match mode {
			SearchMode::Keyword => Candidates::labels(labels),
			_ if k == "x" => Candidates::default(),
			_ => Candidates::labels(labels).with_canonical(format!("{k}_id")),
		}
	}
}

fn step() -> impl Strategy<Value = (&'static str, SearchMode)> {
	(
		prop::sample::select(KEYWORDS),
		prop::sample::select(SearchMode::ALL.to_vec()),
	)
}

fn check_forest(store: &GraphStore) -> Result<(), TestCaseError> {
	let mut ids = HashSet::new();
	let mut labels = HashSet::new();
	let mut previous: Option<NodeId> = None;
	for node in store.nodes() {
		prop_assert!(ids.insert(node.id), "duplicate id {}", node.id);
		prop_assert!(
			labels.insert(node.label.to_lowercase()),
			"duplicate label {:?}",
			node.label
		);
		prop_assert!(!node.label.trim().is_empty());
		if let Some(parent) = node.parent {
			prop_assert!(store.get(parent).is_some(), "dangling parent {}", parent);
			prop_assert!(parent < node.id);
		}
		prop_assert!(previous.is_none_or(|p| p < node.id));
		previous = Some(node.id);
	}
	Ok(())
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	#[test]
	fn expansions_preserve_invariants(steps in prop::collection::vec(step(), 1..12)) {
		let mut store = GraphStore::new();
		for (keyword, mode) in steps {
			let before = store.nodes().to_vec();
			let outcome = block_on(store.expand(&Overlapping, keyword, mode));
			check_forest(&store)?;

			// Append-only.
			prop_assert_eq!(&store.nodes()[..before.len()], &before[..]);
			prop_assert_eq!(store.len(), before.len() + outcome.created());

			// Repeating the same request right away adds nothing.
			let snapshot = store.nodes().to_vec();
			let again = block_on(store.expand(&Overlapping, keyword, mode));
			prop_assert!(again.is_unchanged(), "{:?} {:?} grew again: {:?}", keyword, mode, again);
			prop_assert_eq!(store.nodes(), &snapshot[..]);
		}
	}

	#[test]
	fn view_mirrors_parent_references(steps in prop::collection::vec(step(), 1..8)) {
		let mut store = GraphStore::new();
		for (keyword, mode) in steps {
			block_on(store.expand(&Overlapping, keyword, mode));
		}
		let view = store.view();
		let parents: HashMap<NodeId, NodeId> =
			view.links.iter().map(|l| (l.target, l.source)).collect();

		prop_assert_eq!(view.nodes.len(), store.len());
		prop_assert_eq!(view.links.len(), store.nodes().iter().filter(|n| !n.is_root()).count());
		for (graph_node, node) in view.nodes.iter().zip(store.nodes()) {
			prop_assert_eq!(graph_node.id, node.id);
			prop_assert_eq!(graph_node.is_root, node.is_root());
			prop_assert_eq!(parents.get(&node.id).copied(), node.parent);
		}
	}
}
