//! lead-graph: interactive lead-expansion graph for open-source investigations.
//!
//! A seed term (keyword, username or email) is sent to a lookup service and
//! every returned candidate becomes a child node. Searching a term that is
//! already in the forest expands that node instead of starting a new tree.
//! The forest is drawn as a force-directed canvas and can be exported as CSV.

use std::rc::Rc;

use chrono::Utc;
use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};

/// Leptos UI pieces.
pub mod components;
pub mod config;
pub mod export;
pub mod graph;
pub mod search;

pub use components::force_graph::{GraphData, GraphLink, GraphNode, LeadGraphCanvas, NodeKind};
use components::{SearchBar, SearchRequest};
use graph::Session;
use search::HttpSearchAdapter;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("lead-graph: logging initialized");
}

async fn download_csv(session: &Session<HttpSearchAdapter>) {
	let nodes = session.nodes().await;
	if nodes.is_empty() {
		warn!("lead-graph: nothing to export yet");
		return;
	}
	let name = export::file_name(Utc::now());
	match export::to_csv(&nodes).and_then(|csv| export::download(&csv, &name)) {
		Ok(()) => info!("lead-graph: exported {} nodes to {}", nodes.len(), name),
		Err(e) => warn!("lead-graph: export failed: {}", e),
	}
}

/// Main application component: search bar, canvas, and session controls.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = config::load_config();
	let session = Rc::new(Session::new(HttpSearchAdapter::new(config.search.clone())));

	let graph = RwSignal::new(GraphData::default());
	let pending = RwSignal::new(0usize);
	let fit = RwSignal::new(0u32);
	let (request, set_request) = signal(None::<SearchRequest>);

	let session_search = session.clone();
	Effect::new(move |_| {
		let Some(SearchRequest { keyword, mode }) = request.get() else {
			return;
		};
		let session = session_search.clone();
		pending.update(|n| *n += 1);
		wasm_bindgen_futures::spawn_local(async move {
			let (outcome, view) = session.expand(&keyword, mode).await;
			info!("lead-graph: {} '{}' -> {:?}", mode, keyword, outcome);
			if !outcome.is_unchanged() {
				graph.set(view);
			}
			pending.update(|n| *n = n.saturating_sub(1));
		});
	});

	let session_download = session.clone();
	let on_download = move |_| {
		let session = session_download.clone();
		wasm_bindgen_futures::spawn_local(async move { download_csv(&session).await });
	};

	let on_reset = move |_| {
		let session = session.clone();
		wasm_bindgen_futures::spawn_local(async move {
			session.reset().await;
			graph.set(session.view().await);
			info!("lead-graph: started a new session");
		});
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Lead Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<LeadGraphCanvas data=graph fit=fit config=config.layout fullscreen=true />
			<div class="graph-overlay">
				<h1>"Lead Graph"</h1>
				<SearchBar on_search=set_request pending=pending />
				<div class="controls">
					<button on:click=move |_| fit.update(|n| *n += 1)>"Fit"</button>
					<button on:click=on_download>"Download CSV"</button>
					<button on:click=on_reset>"New session"</button>
				</div>
				<p class="subtitle">
					"Click a link to open it. Drag nodes to reposition. Scroll to zoom. Drag background to pan."
				</p>
			</div>
		</div>
	}
}
