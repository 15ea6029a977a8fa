//! One investigation session.
//!
//! The UI may submit a new search while an earlier one is still waiting on
//! the lookup service. Every operation takes the store lock for its whole
//! duration, so expansions queue up and apply one after another; dedup and
//! id assignment never see a half-merged forest.

use futures::lock::Mutex;

use super::store::{ExpandOutcome, GraphStore};
use super::types::Node;
use crate::components::force_graph::GraphData;
use crate::search::{SearchAdapter, SearchMode};

/// Lookup adapter plus the forest it grows.
pub struct Session<A> {
	adapter: A,
	store: Mutex<GraphStore>,
}

impl<A: SearchAdapter> Session<A> {
	/// Session with an empty forest.
	pub fn new(adapter: A) -> Self {
		Self {
			adapter,
			store: Mutex::new(GraphStore::new()),
		}
	}

	/// The lookup adapter in use.
	pub fn adapter(&self) -> &A {
		&self.adapter
	}

	/// Runs one expansion once all earlier ones have finished and returns
	/// its outcome with the resulting view.
	pub async fn expand(&self, keyword: &str, mode: SearchMode) -> (ExpandOutcome, GraphData) {
		let mut store = self.store.lock().await;
		let outcome = store.expand(&self.adapter, keyword, mode).await;
		(outcome, store.view())
	}

	/// Current node/edge view.
	pub async fn view(&self) -> GraphData {
		self.store.lock().await.view()
	}

	/// Snapshot of every node, e.g. for export.
	pub async fn nodes(&self) -> Vec<Node> {
		self.store.lock().await.nodes().to_vec()
	}

	/// Starts a fresh session, discarding the forest.
	pub async fn reset(&self) {
		self.store.lock().await.clear();
	}
}
