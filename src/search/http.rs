//! Browser `fetch` adapter for the lookup service.

use log::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::{Candidates, LookupError, SearchAdapter, SearchMode, normalize};
use crate::config::SearchConfig;

/// Queries the configured HTTP endpoints through `window.fetch`.
#[derive(Clone, Debug)]
pub struct HttpSearchAdapter {
	config: SearchConfig,
}

impl HttpSearchAdapter {
	/// Adapter for the endpoints in `config`.
	pub fn new(config: SearchConfig) -> Self {
		Self { config }
	}

	async fn fetch(&self, keyword: &str, mode: SearchMode) -> Result<Candidates, LookupError> {
		let url = self
			.config
			.endpoint(mode, keyword)
			.map_err(|e| LookupError::Transport(format!("bad endpoint: {e}")))?;
		debug!("lead-graph: {} lookup {}", mode, url);

		let opts = RequestInit::new();
		opts.set_method("GET");
		opts.set_mode(RequestMode::Cors);

		let request = Request::new_with_str_and_init(url.as_str(), &opts)
			.map_err(|e| LookupError::Transport(format!("request error: {e:?}")))?;

		let window =
			web_sys::window().ok_or_else(|| LookupError::Transport("no window".into()))?;
		let resp_value = JsFuture::from(window.fetch_with_request(&request))
			.await
			.map_err(|e| LookupError::Transport(format!("fetch error: {e:?}")))?;
		let resp: Response = resp_value
			.dyn_into()
			.map_err(|_| LookupError::Transport("response is not a Response".into()))?;

		if !resp.ok() {
			return Err(LookupError::Status(resp.status()));
		}

		let text = JsFuture::from(
			resp.text()
				.map_err(|e| LookupError::Transport(format!("body promise error: {e:?}")))?,
		)
		.await
		.map_err(|e| LookupError::Transport(format!("body error: {e:?}")))?;
		let body = text
			.as_string()
			.ok_or_else(|| LookupError::Transport("body is not text".into()))?;

		normalize::parse(mode, &body)
	}
}

impl SearchAdapter for HttpSearchAdapter {
	async fn resolve(&self, keyword: &str, mode: SearchMode) -> Candidates {
		match self.fetch(keyword, mode).await {
			Ok(candidates) => {
				debug!(
					"lead-graph: {} lookup for {:?} returned {} candidates",
					mode,
					keyword,
					candidates.labels.len()
				);
				candidates
			}
			Err(e) => {
				warn!("lead-graph: {} lookup for {:?} failed: {}", mode, keyword, e);
				Candidates::default()
			}
		}
	}
}
