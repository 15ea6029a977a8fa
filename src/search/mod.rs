//! Lookup-service adapter.
//!
//! Three backend endpoints answer with different JSON shapes. Everything in
//! this module funnels them into one [`Candidates`] value; transport and
//! shape failures are logged here and surface to callers only as an empty
//! result.

mod http;
/// Response decoding, independent of transport.
pub mod normalize;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::HttpSearchAdapter;

/// How the seed term should be interpreted by the lookup service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchMode {
	/// Free-text keyword search.
	#[default]
	Keyword,
	/// Account lookup across sites.
	Username,
	/// Platforms registered to an address.
	Email,
}

impl SearchMode {
	/// Every mode, in selector order.
	pub const ALL: [SearchMode; 3] = [SearchMode::Keyword, SearchMode::Username, SearchMode::Email];

	/// Username and email lookups return a canonical identity for the root.
	pub fn is_identity(self) -> bool {
		matches!(self, SearchMode::Username | SearchMode::Email)
	}

	/// Query parameter carrying the seed term.
	pub fn query_param(self) -> &'static str {
		match self {
			SearchMode::Keyword => "keyword",
			SearchMode::Username => "username",
			SearchMode::Email => "email",
		}
	}
}

impl fmt::Display for SearchMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.query_param())
	}
}

impl FromStr for SearchMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"keyword" => Ok(SearchMode::Keyword),
			"username" => Ok(SearchMode::Username),
			"email" => Ok(SearchMode::Email),
			other => Err(format!("unknown search mode: {other}")),
		}
	}
}

/// Normalized lookup result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Candidates {
	/// Canonical username/email; never set for keyword lookups.
	pub canonical: Option<String>,
	/// Candidate labels in service order, trimmed, empties removed.
	pub labels: Vec<String>,
}

impl Candidates {
	/// Plain candidate list without a canonical identity.
	pub fn labels<I, S>(labels: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			canonical: None,
			labels: labels.into_iter().map(Into::into).collect(),
		}
	}

	/// Sets the canonical identity.
	pub fn with_canonical(mut self, canonical: impl Into<String>) -> Self {
		self.canonical = Some(canonical.into());
		self
	}
}

/// Failures absorbed at the adapter boundary.
#[derive(Debug, Error)]
pub enum LookupError {
	/// Request could not be made or completed.
	#[error("transport failure: {0}")]
	Transport(String),
	/// Non-2xx response.
	#[error("lookup service answered HTTP {0}")]
	Status(u16),
	/// Body is not JSON.
	#[error("response is not valid JSON: {0}")]
	Json(#[from] serde_json::Error),
	/// JSON lacks the expected fields.
	#[error("response has unexpected shape: {0}")]
	Shape(String),
}

/// Resolves a seed term into candidate labels.
///
/// Implementations must not fail: on any error they log and return
/// [`Candidates::default`].
#[allow(
	async_fn_in_trait,
	reason = "adapters run on the single-threaded browser executor"
)]
pub trait SearchAdapter {
	/// Candidates for `keyword`; empty on any failure.
	async fn resolve(&self, keyword: &str, mode: SearchMode) -> Candidates;
}
