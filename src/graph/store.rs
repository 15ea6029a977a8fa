//! Forest of investigation threads and the expansion algorithm.
//!
//! Nodes live in an append-only arena ordered by id. A lowercase label set
//! backs the forest-wide dedup rule and an id index gives O(1) parent
//! lookups; both are kept in step with the arena on every insert.

use std::collections::{HashMap, HashSet};

use futures::future::join_all;
use log::{debug, info};

use super::types::{Node, NodeId, normalize_label};
use crate::components::force_graph::{GraphData, GraphLink, GraphNode, NodeKind};
use crate::search::{SearchAdapter, SearchMode};

/// Why an `expand` call left the forest untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unchanged {
	/// The keyword was empty after trimming.
	EmptyKeyword,
	/// A root for this seed (or its canonical identity) already exists and
	/// nothing new was found for it.
	DuplicateRoot,
	/// Every candidate was already present in the forest.
	NothingNew,
}

/// Result of one expansion step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExpandOutcome {
	/// At least one node was created.
	Grew {
		/// Root created by this step, if any.
		root: Option<NodeId>,
		/// Children created by this step, in id order.
		added: Vec<NodeId>,
	},
	/// Nothing was created.
	Unchanged(Unchanged),
}

impl ExpandOutcome {
	/// Whether the forest is exactly as before the step.
	pub fn is_unchanged(&self) -> bool {
		matches!(self, ExpandOutcome::Unchanged(_))
	}

	/// Number of nodes the step created.
	pub fn created(&self) -> usize {
		match self {
			ExpandOutcome::Grew { root, added } => usize::from(root.is_some()) + added.len(),
			ExpandOutcome::Unchanged(_) => 0,
		}
	}
}

/// Owns every node of the session.
#[derive(Clone, Debug)]
pub struct GraphStore {
	nodes: Vec<Node>,
	index: HashMap<NodeId, usize>,
	labels: HashSet<String>,
	next_id: u64,
}

impl Default for GraphStore {
	fn default() -> Self {
		Self::new()
	}
}

impl GraphStore {
	/// Empty forest; the first node gets id 1.
	pub fn new() -> Self {
		Self {
			nodes: Vec::new(),
			index: HashMap::new(),
			labels: HashSet::new(),
			next_id: 1,
		}
	}

	/// Every node in id order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Node by id.
	pub fn get(&self, id: NodeId) -> Option<&Node> {
		self.index.get(&id).map(|&i| &self.nodes[i])
	}

	/// Number of nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether no search has created a node yet.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Roots in id order, one per investigation thread.
	pub fn roots(&self) -> impl Iterator<Item = &Node> {
		self.nodes.iter().filter(|n| n.is_root())
	}

	/// Direct children of `parent` in id order.
	pub fn children_of(&self, parent: NodeId) -> impl Iterator<Item = &Node> {
		self.nodes.iter().filter(move |n| n.parent == Some(parent))
	}

	/// Whether any node carries `label`, ignoring case.
	pub fn contains_label(&self, label: &str) -> bool {
		self.labels.contains(&normalize_label(label))
	}

	/// Drops the whole forest; ids restart because a new session begins.
	pub fn clear(&mut self) {
		*self = Self::new();
	}

	/// Projects the forest into the node/edge view drawn by the layout
	/// engine. Edges are derived from parent references.
	pub fn view(&self) -> GraphData {
		let nodes = self
			.nodes
			.iter()
			.map(|n| GraphNode {
				id: n.id,
				label: n.label.clone(),
				is_root: n.is_root(),
				kind: NodeKind::classify(&n.label),
			})
			.collect();
		let links = self
			.nodes
			.iter()
			.filter_map(|n| {
				n.parent.map(|parent| GraphLink {
					source: parent,
					target: n.id,
				})
			})
			.collect();
		GraphData { nodes, links }
	}

	/// Applies one `(keyword, mode)` expansion request.
	///
	/// - No label contains `keyword` (always true for an empty forest):
	///   start a new root and attach its candidates. An identity lookup
	///   whose canonical name already labels a node attaches there instead.
	/// - Otherwise: resolve candidates once per matching node and attach
	///   them under that node.
	///
	/// Candidates whose label already exists anywhere are skipped. Lookup
	/// failures arrive as empty candidate lists, so the worst case is a
	/// childless root.
	pub async fn expand<A: SearchAdapter>(
		&mut self,
		adapter: &A,
		keyword: &str,
		mode: SearchMode,
	) -> ExpandOutcome {
		let keyword = keyword.trim();
		if keyword.is_empty() {
			return ExpandOutcome::Unchanged(Unchanged::EmptyKeyword);
		}

		// A root labelled `keyword` always matches it, so a repeated seed
		// takes the match branch and can only add unseen candidates.
		let matches = self.matching(keyword);
		let outcome = if matches.is_empty() {
			self.start_thread(adapter, keyword, mode).await
		} else {
			self.branch(adapter, keyword, mode, &matches).await
		};

		match &outcome {
			ExpandOutcome::Grew { root, .. } => info!(
				"lead-graph: {} expansion of {:?} added {} nodes (new root: {}), forest has {}",
				mode,
				keyword,
				outcome.created(),
				root.map_or_else(|| "none".to_string(), |r| r.to_string()),
				self.len()
			),
			ExpandOutcome::Unchanged(reason) => {
				info!("lead-graph: {} expansion of {:?} changed nothing ({:?})", mode, keyword, reason)
			}
		}
		outcome
	}

	/// Ids of nodes whose label contains `keyword`, ignoring case.
	fn matching(&self, keyword: &str) -> Vec<NodeId> {
		let needle = normalize_label(keyword);
		self.nodes
			.iter()
			.filter(|n| normalize_label(&n.label).contains(&needle))
			.map(|n| n.id)
			.collect()
	}

	fn labelled(&self, label: &str) -> Option<NodeId> {
		let wanted = normalize_label(label);
		self.nodes
			.iter()
			.find(|n| normalize_label(&n.label) == wanted)
			.map(|n| n.id)
	}

	/// Creates a new root for `keyword` and attaches its candidates.
	async fn start_thread<A: SearchAdapter>(
		&mut self,
		adapter: &A,
		keyword: &str,
		mode: SearchMode,
	) -> ExpandOutcome {
		let candidates = adapter.resolve(keyword, mode).await;

		let (root_label, labels) = if mode.is_identity() {
			match candidates.canonical.as_deref().map(str::trim) {
				Some(canonical) if !canonical.is_empty() => {
					(canonical.to_owned(), candidates.labels)
				}
				_ => (keyword.to_owned(), Vec::new()),
			}
		} else {
			(keyword.to_owned(), candidates.labels)
		};

		// The canonical identity may already be in the forest even though the
		// typed keyword matched nothing; re-query it instead of duplicating.
		if let Some(existing) = self.labelled(&root_label) {
			debug!(
				"lead-graph: {:?} already present as node {}, attaching there",
				root_label, existing
			);
			let added = self.attach(existing, labels);
			return if added.is_empty() {
				ExpandOutcome::Unchanged(Unchanged::DuplicateRoot)
			} else {
				ExpandOutcome::Grew { root: None, added }
			};
		}

		let root = self.insert(root_label, None);
		let added = self.attach(root, labels);
		ExpandOutcome::Grew {
			root: Some(root),
			added,
		}
	}

	/// Resolves fresh candidates under every matching node.
	///
	/// Lookups run concurrently; results are merged only after all of them
	/// resolve, in matching order, so id assignment stays deterministic.
	async fn branch<A: SearchAdapter>(
		&mut self,
		adapter: &A,
		keyword: &str,
		mode: SearchMode,
		parents: &[NodeId],
	) -> ExpandOutcome {
		let lookups = parents.iter().map(|_| adapter.resolve(keyword, mode));
		let results = join_all(lookups).await;

		let mut added = Vec::new();
		for (&parent, candidates) in parents.iter().zip(results) {
			added.extend(self.attach(parent, candidates.labels));
		}

		if added.is_empty() {
			ExpandOutcome::Unchanged(Unchanged::NothingNew)
		} else {
			ExpandOutcome::Grew { root: None, added }
		}
	}

	/// Adds one child per new label; labels already in the forest (or
	/// earlier in `labels`) are skipped.
	fn attach(&mut self, parent: NodeId, labels: Vec<String>) -> Vec<NodeId> {
		let mut added = Vec::new();
		for label in labels {
			let label = label.trim();
			if label.is_empty() {
				continue;
			}
			if self.contains_label(label) {
				debug!("lead-graph: skipping duplicate candidate {:?}", label);
				continue;
			}
			added.push(self.insert(label.to_owned(), Some(parent)));
		}
		added
	}

	fn insert(&mut self, label: String, parent: Option<NodeId>) -> NodeId {
		debug_assert!(parent.is_none_or(|p| self.index.contains_key(&p)));
		let id = NodeId(self.next_id);
		self.next_id += 1;
		self.labels.insert(normalize_label(&label));
		self.index.insert(id, self.nodes.len());
		self.nodes.push(Node { id, label, parent });
		id
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::collections::HashMap;

	use futures::executor::block_on;
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::search::Candidates;

	/// Answers from a fixed table and records every call.
	#[derive(Default)]
	struct Scripted {
		answers: HashMap<(String, SearchMode), Candidates>,
		calls: RefCell<Vec<(String, SearchMode)>>,
	}

	impl Scripted {
		fn answer(mut self, keyword: &str, mode: SearchMode, candidates: Candidates) -> Self {
			self.answers.insert((keyword.to_string(), mode), candidates);
			self
		}
	}

	impl SearchAdapter for Scripted {
		async fn resolve(&self, keyword: &str, mode: SearchMode) -> Candidates {
			self.calls.borrow_mut().push((keyword.to_string(), mode));
			self.answers
				.get(&(keyword.to_string(), mode))
				.cloned()
				.unwrap_or_default()
		}
	}

	fn node(id: u64, label: &str, parent: Option<u64>) -> Node {
		Node {
			id: NodeId(id),
			label: label.to_string(),
			parent: parent.map(NodeId),
		}
	}

	#[test]
	fn first_keyword_search_builds_root_and_deduped_children() {
		let adapter = Scripted::default().answer(
			"sample",
			SearchMode::Keyword,
			Candidates::labels(["a.com", "b.com", "a.com"]),
		);
		let mut store = GraphStore::new();
		let outcome = block_on(store.expand(&adapter, "sample", SearchMode::Keyword));

		assert_eq!(
			outcome,
			ExpandOutcome::Grew {
				root: Some(NodeId(1)),
				added: vec![NodeId(2), NodeId(3)],
			}
		);
		assert_eq!(
			store.nodes(),
			&[
				node(1, "sample", None),
				node(2, "a.com", Some(1)),
				node(3, "b.com", Some(1)),
			]
		);
		assert_eq!(store.roots().map(|n| n.id).collect::<Vec<_>>(), vec![NodeId(1)]);
		assert_eq!(store.children_of(NodeId(1)).count(), 2);
		assert_eq!(store.children_of(NodeId(2)).count(), 0);
	}

	#[test]
	fn empty_keyword_is_a_no_op() {
		let adapter = Scripted::default();
		let mut store = GraphStore::new();
		let outcome = block_on(store.expand(&adapter, "   ", SearchMode::Keyword));
		assert_eq!(outcome, ExpandOutcome::Unchanged(Unchanged::EmptyKeyword));
		assert!(store.is_empty());
		assert!(adapter.calls.borrow().is_empty());
	}

	#[test]
	fn username_root_takes_canonical_identity() {
		let adapter = Scripted::default().answer(
			"Alice123",
			SearchMode::Username,
			Candidates::labels(["https://github.com/alice123"]).with_canonical("alice123"),
		);
		let mut store = GraphStore::new();
		block_on(store.expand(&adapter, " Alice123 ", SearchMode::Username));
		assert_eq!(
			store.nodes(),
			&[
				node(1, "alice123", None),
				node(2, "https://github.com/alice123", Some(1)),
			]
		);
	}

	#[test]
	fn identity_lookup_failure_leaves_literal_childless_root() {
		let adapter = Scripted::default().answer(
			"ghost@example.com",
			SearchMode::Email,
			Candidates::labels(["should-not-attach.com"]),
		);
		let mut store = GraphStore::new();
		let outcome = block_on(store.expand(&adapter, "ghost@example.com", SearchMode::Email));
		assert_eq!(
			outcome,
			ExpandOutcome::Grew {
				root: Some(NodeId(1)),
				added: vec![],
			}
		);
		assert_eq!(store.nodes(), &[node(1, "ghost@example.com", None)]);
	}

	#[test]
	fn keyword_lookup_failure_leaves_childless_root() {
		let adapter = Scripted::default();
		let mut store = GraphStore::new();
		block_on(store.expand(&adapter, "offline", SearchMode::Keyword));
		assert_eq!(store.nodes(), &[node(1, "offline", None)]);
	}

	#[test]
	fn matching_nodes_each_get_their_own_lookup() {
		let adapter = Scripted::default()
			.answer("acme", SearchMode::Keyword, Candidates::labels(["acme.com", "acme.org"]))
			.answer("ACME.", SearchMode::Keyword, Candidates::labels(["shop.acme.com"]));
		let mut store = GraphStore::new();
		block_on(store.expand(&adapter, "acme", SearchMode::Keyword));

		let outcome = block_on(store.expand(&adapter, "ACME.", SearchMode::Keyword));
		// "acme.com" and "acme.org" match; each lookup yields the same label,
		// which only the first parent keeps.
		assert_eq!(
			outcome,
			ExpandOutcome::Grew {
				root: None,
				added: vec![NodeId(4)],
			}
		);
		assert_eq!(store.get(NodeId(4)), Some(&node(4, "shop.acme.com", Some(2))));
		assert_eq!(adapter.calls.borrow().len(), 3);
	}

	#[test]
	fn candidate_already_in_forest_is_skipped_across_branches() {
		let adapter = Scripted::default()
			.answer("one", SearchMode::Keyword, Candidates::labels(["site.com/x"]))
			.answer("two", SearchMode::Keyword, Candidates::labels(["SITE.COM/X", "two.net"]));
		let mut store = GraphStore::new();
		block_on(store.expand(&adapter, "one", SearchMode::Keyword));
		block_on(store.expand(&adapter, "two", SearchMode::Keyword));

		assert_eq!(
			store.nodes(),
			&[
				node(1, "one", None),
				node(2, "site.com/x", Some(1)),
				node(3, "two", None),
				node(4, "two.net", Some(3)),
			]
		);
	}

	#[test]
	fn repeated_expand_converges() {
		let adapter = Scripted::default().answer(
			"zzz",
			SearchMode::Keyword,
			Candidates::labels(["zzz.io", "other.io"]),
		);
		let mut store = GraphStore::new();
		block_on(store.expand(&adapter, "zzz", SearchMode::Keyword));
		let before = store.nodes().to_vec();

		let outcome = block_on(store.expand(&adapter, "zzz", SearchMode::Keyword));
		assert_eq!(outcome, ExpandOutcome::Unchanged(Unchanged::NothingNew));
		assert_eq!(store.nodes(), before.as_slice());
	}

	#[test]
	fn repeated_seed_never_opens_a_second_root() {
		let mut store = GraphStore::new();
		// Service down: childless root.
		block_on(store.expand(&Scripted::default(), "zzz", SearchMode::Keyword));

		let quiet = Scripted::default();
		let outcome = block_on(store.expand(&quiet, "ZZZ", SearchMode::Keyword));
		assert_eq!(outcome, ExpandOutcome::Unchanged(Unchanged::NothingNew));
		assert_eq!(quiet.calls.borrow().len(), 1);
		assert_eq!(store.len(), 1);

		// Service back: results land under the existing root.
		let back = Scripted::default().answer(
			"zzz",
			SearchMode::Keyword,
			Candidates::labels(["zzz.io"]),
		);
		let outcome = block_on(store.expand(&back, "zzz", SearchMode::Keyword));
		assert_eq!(
			outcome,
			ExpandOutcome::Grew {
				root: None,
				added: vec![NodeId(2)],
			}
		);
		assert_eq!(store.roots().count(), 1);
		assert_eq!(store.get(NodeId(2)), Some(&node(2, "zzz.io", Some(1))));
	}

	#[test]
	fn canonical_identity_already_present_reuses_that_node() {
		let adapter = Scripted::default()
			.answer(
				"bob@example.com",
				SearchMode::Email,
				Candidates::labels(["office365.com"]).with_canonical("bob@example.com"),
			)
			.answer(
				"robert",
				SearchMode::Email,
				Candidates::labels(["office365.com", "spotify.com"]).with_canonical("BOB@example.com"),
			);
		let mut store = GraphStore::new();
		block_on(store.expand(&adapter, "bob@example.com", SearchMode::Email));
		let outcome = block_on(store.expand(&adapter, "robert", SearchMode::Email));

		assert_eq!(
			outcome,
			ExpandOutcome::Grew {
				root: None,
				added: vec![NodeId(3)],
			}
		);
		assert_eq!(store.roots().count(), 1);
		assert_eq!(store.get(NodeId(3)), Some(&node(3, "spotify.com", Some(1))));
	}

	#[test]
	fn canonical_identity_with_nothing_new_is_duplicate_root() {
		let adapter = Scripted::default()
			.answer("bob", SearchMode::Username, Candidates::labels(["x.com/bob"]).with_canonical("bob"))
			.answer("b0b", SearchMode::Username, Candidates::labels(["x.com/bob"]).with_canonical("bob"));
		let mut store = GraphStore::new();
		block_on(store.expand(&adapter, "bob", SearchMode::Username));
		let outcome = block_on(store.expand(&adapter, "b0b", SearchMode::Username));
		assert_eq!(outcome, ExpandOutcome::Unchanged(Unchanged::DuplicateRoot));
		assert_eq!(store.len(), 2);
	}

	#[test]
	fn view_derives_one_link_per_child() {
		let adapter = Scripted::default().answer(
			"seed",
			SearchMode::Keyword,
			Candidates::labels(["a.com", "b.com"]),
		);
		let mut store = GraphStore::new();
		block_on(store.expand(&adapter, "seed", SearchMode::Keyword));
		let view = store.view();

		assert_eq!(view.nodes.len(), 3);
		assert!(view.nodes[0].is_root);
		assert_eq!(view.nodes[0].kind, NodeKind::Seed);
		assert!(view.nodes[1].kind.is_resource());
		assert_eq!(
			view.links,
			vec![
				GraphLink { source: NodeId(1), target: NodeId(2) },
				GraphLink { source: NodeId(1), target: NodeId(3) },
			]
		);
	}

	#[test]
	fn clear_restarts_session() {
		let adapter = Scripted::default();
		let mut store = GraphStore::new();
		block_on(store.expand(&adapter, "first", SearchMode::Keyword));
		store.clear();
		assert!(store.is_empty());
		assert!(!store.contains_label("first"));
		block_on(store.expand(&adapter, "second", SearchMode::Keyword));
		assert_eq!(store.nodes(), &[node(1, "second", None)]);
	}
}
