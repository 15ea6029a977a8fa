//! Runtime configuration.
//!
//! Every field has a default so a page can embed only the values it wants
//! to override:
//!
//! ```html
//! <script id="lead-config" type="application/json">
//!   { "search": { "base_url": "https://osint.example" }, "layout": { "link_distance": 120 } }
//! </script>
//! ```

use log::{info, warn};
use serde::Deserialize;
use url::Url;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

use crate::search::SearchMode;

/// Id of the script element holding the JSON config.
pub const CONFIG_ELEMENT_ID: &str = "lead-config";

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
	/// Lookup service location.
	pub search: SearchConfig,
	/// Physics and viewport tuning.
	pub layout: LayoutConfig,
}

impl AppConfig {
	/// Parses a (possibly partial) JSON config.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}
}

/// Where the lookup service lives.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
	/// Scheme and host of the lookup service.
	pub base_url: String,
	/// Keyword search path.
	pub keyword_path: String,
	/// Username lookup path.
	pub username_path: String,
	/// Email lookup path.
	pub email_path: String,
}

impl Default for SearchConfig {
	fn default() -> Self {
		Self {
			base_url: "http://127.0.0.1:8000".into(),
			keyword_path: "/search".into(),
			username_path: "/identity/search".into(),
			email_path: "/identity/check-email".into(),
		}
	}
}

impl SearchConfig {
	fn path(&self, mode: SearchMode) -> &str {
		match mode {
			SearchMode::Keyword => &self.keyword_path,
			SearchMode::Username => &self.username_path,
			SearchMode::Email => &self.email_path,
		}
	}

	/// Full request URL for a lookup, with the term query-encoded.
	pub fn endpoint(&self, mode: SearchMode, term: &str) -> Result<Url, url::ParseError> {
		let mut url = Url::parse(&self.base_url)?.join(self.path(mode))?;
		url.query_pairs_mut().append_pair(mode.query_param(), term);
		Ok(url)
	}
}

/// Physics and viewport tuning for the layout engine.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Rest length of a parent/child spring, in world units.
	pub link_distance: f64,
	/// Spring stiffness.
	pub link_strength: f64,
	/// Pairwise repulsion; force falls off as 1/distance.
	pub repulsion: f64,
	/// Pull of every body toward the layout origin.
	pub center_strength: f64,
	/// Body radius used for the minimum-separation constraint.
	pub collision_radius: f64,
	/// Fraction of velocity kept per tick.
	pub velocity_damping: f64,
	/// Per-tick velocity cap.
	pub max_speed: f64,
	/// Mean kinetic energy per body below which the simulation idles.
	pub energy_threshold: f64,
	/// Smallest zoom factor.
	pub min_zoom: f64,
	/// Largest zoom factor.
	pub max_zoom: f64,
	/// Screen-space margin kept around the forest by fit-to-view.
	pub fit_margin: f64,
	/// Fit-to-view never magnifies beyond this factor.
	pub fit_max_zoom: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			link_distance: 90.0,
			link_strength: 0.06,
			repulsion: 900.0,
			center_strength: 0.01,
			collision_radius: 14.0,
			velocity_damping: 0.82,
			max_speed: 30.0,
			energy_threshold: 0.01,
			min_zoom: 0.1,
			max_zoom: 8.0,
			fit_margin: 40.0,
			fit_max_zoom: 2.0,
		}
	}
}

/// Reads the config script element, falling back to defaults when it is
/// absent or malformed.
pub fn load_config() -> AppConfig {
	let Some(text) = config_text() else {
		return AppConfig::default();
	};
	match AppConfig::from_json(&text) {
		Ok(config) => {
			info!("lead-graph: loaded config, lookup service at {}", config.search.base_url);
			config
		}
		Err(e) => {
			warn!("lead-graph: ignoring malformed config: {}", e);
			AppConfig::default()
		}
	}
}

fn config_text() -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(CONFIG_ELEMENT_ID)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let config =
			AppConfig::from_json(r#"{"search": {"base_url": "https://osint.example"}, "layout": {"max_zoom": 4}}"#)
				.unwrap();
		assert_eq!(config.search.base_url, "https://osint.example");
		assert_eq!(config.search.email_path, "/identity/check-email");
		assert_eq!(config.layout.max_zoom, 4.0);
		assert_eq!(config.layout.min_zoom, LayoutConfig::default().min_zoom);
	}

	#[test]
	fn empty_object_is_default() {
		assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
	}

	#[test]
	fn endpoint_encodes_term_per_mode() {
		let search = SearchConfig::default();
		let url = search.endpoint(SearchMode::Email, "a b@c.com").unwrap();
		assert_eq!(
			url.as_str(),
			"http://127.0.0.1:8000/identity/check-email?email=a+b%40c.com"
		);
		let url = search.endpoint(SearchMode::Keyword, "acme&co").unwrap();
		assert_eq!(url.as_str(), "http://127.0.0.1:8000/search?keyword=acme%26co");
		let url = search.endpoint(SearchMode::Username, "Alice123").unwrap();
		assert_eq!(url.as_str(), "http://127.0.0.1:8000/identity/search?username=Alice123");
	}
}
