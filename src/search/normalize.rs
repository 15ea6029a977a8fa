//! Response-shape normalization.
//!
//! Bodies are decoded into a [`serde_json::Value`] first so that invalid
//! JSON ([`LookupError::Json`]) is told apart from well-formed JSON with
//! the wrong structure ([`LookupError::Shape`]).

use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::Value;

use super::{Candidates, LookupError, SearchMode};

/// An entry of a result list: a bare string, a record carrying URL fields,
/// or anything else (ignored).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Item {
	Plain(String),
	Record(Record),
	#[allow(dead_code, reason = "placeholder for unrecognized entries")]
	Other(IgnoredAny),
}

#[derive(Debug, Deserialize)]
struct Record {
	#[serde(default)]
	url: Option<String>,
	#[serde(default)]
	url_user: Option<String>,
	#[serde(default)]
	url_main: Option<String>,
}

impl Record {
	/// Keyword results prefer `url`, then `url_user`, then `url_main`.
	fn result_url(&self) -> Option<String> {
		first_label([&self.url, &self.url_user, &self.url_main])
	}

	/// Site records prefer the profile URL over the site's main page.
	fn site_url(&self) -> Option<String> {
		first_label([&self.url_user, &self.url_main])
	}
}

fn first_label<const N: usize>(fields: [&Option<String>; N]) -> Option<String> {
	fields
		.into_iter()
		.find_map(|field| field.as_deref().and_then(clean))
}

fn clean(label: &str) -> Option<String> {
	let trimmed = label.trim();
	(!trimmed.is_empty()).then(|| trimmed.to_owned())
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeywordBody {
	Urls { urls: Vec<Item> },
	Results { results: Vec<Item> },
	Bare(Vec<Item>),
}

#[derive(Debug, Deserialize)]
struct UsernameBody {
	#[serde(default)]
	username: Option<String>,
	#[serde(default)]
	sites_found: Option<Vec<Item>>,
}

#[derive(Debug, Deserialize)]
struct EmailBody {
	#[serde(default)]
	email: Option<String>,
	#[serde(default)]
	platforms_found: Option<Vec<Item>>,
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, LookupError> {
	T::deserialize(value).map_err(|e| LookupError::Shape(e.to_string()))
}

/// Normalizes a keyword-search response.
///
/// Accepts `{ urls: [...] }`, `{ results: [...] }`, or a bare array, where
/// entries may be strings or URL records.
pub fn keyword_candidates(value: Value) -> Result<Candidates, LookupError> {
	let items = match decode::<KeywordBody>(value)? {
		KeywordBody::Urls { urls } => urls,
		KeywordBody::Results { results } => results,
		KeywordBody::Bare(items) => items,
	};
	let labels = items
		.into_iter()
		.filter_map(|item| match item {
			Item::Plain(s) => clean(&s),
			Item::Record(record) => record.result_url(),
			Item::Other(_) => None,
		})
		.collect();
	Ok(Candidates {
		canonical: None,
		labels,
	})
}

/// Normalizes an identity-lookup response into a canonical username and
/// the profile URLs of every site it was found on.
pub fn username_candidates(value: Value) -> Result<Candidates, LookupError> {
	let body = decode::<UsernameBody>(value)?;
	let canonical = body
		.username
		.as_deref()
		.and_then(clean)
		.ok_or_else(|| LookupError::Shape("missing username".into()))?;
	let labels = body
		.sites_found
		.unwrap_or_default()
		.into_iter()
		.filter_map(|item| match item {
			Item::Record(record) => record.site_url(),
			_ => None,
		})
		.collect();
	Ok(Candidates {
		canonical: Some(canonical),
		labels,
	})
}

/// Normalizes an e-mail check into the canonical address and the names of
/// the platforms it is registered on.
pub fn email_candidates(value: Value) -> Result<Candidates, LookupError> {
	let body = decode::<EmailBody>(value)?;
	let canonical = body
		.email
		.as_deref()
		.and_then(clean)
		.ok_or_else(|| LookupError::Shape("missing email".into()))?;
	let labels = body
		.platforms_found
		.unwrap_or_default()
		.into_iter()
		.filter_map(|item| match item {
			Item::Plain(s) => clean(&s),
			_ => None,
		})
		.collect();
	Ok(Candidates {
		canonical: Some(canonical),
		labels,
	})
}

/// Parses a raw response body for the given mode.
pub fn parse(mode: SearchMode, body: &str) -> Result<Candidates, LookupError> {
	let value: Value = serde_json::from_str(body)?;
	match mode {
		SearchMode::Keyword => keyword_candidates(value),
		SearchMode::Username => username_candidates(value),
		SearchMode::Email => email_candidates(value),
	}
}
