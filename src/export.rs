//! CSV snapshot of the forest.
//!
//! Columns are `id,url,parentId`; roots leave `parentId` empty. Fields are
//! quoted only when they contain a delimiter, quote, or line break.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement};

use crate::graph::Node;

/// Why an export could not be produced or offered.
#[derive(Debug, Error)]
pub enum ExportError {
	/// Writer rejected a record.
	#[error("csv writer failed: {0}")]
	Csv(#[from] csv::Error),
	/// Output bytes were not UTF-8.
	#[error("csv output is not valid UTF-8")]
	Encoding,
	/// A browser API was missing or failed.
	#[error("browser refused the download: {0}")]
	Browser(String),
}

#[derive(Serialize)]
struct Row<'a> {
	id: u64,
	url: &'a str,
	#[serde(rename = "parentId")]
	parent_id: Option<u64>,
}

/// Serializes every node, one row each, header first.
pub fn to_csv(nodes: &[Node]) -> Result<String, ExportError> {
	let mut writer = csv::WriterBuilder::new()
		.has_headers(false)
		.from_writer(Vec::new());
	writer.write_record(["id", "url", "parentId"])?;
	for node in nodes {
		writer.serialize(Row {
			id: node.id.0,
			url: &node.label,
			parent_id: node.parent.map(|p| p.0),
		})?;
	}
	let bytes = writer
		.into_inner()
		.map_err(|e| ExportError::Csv(e.into_error().into()))?;
	String::from_utf8(bytes).map_err(|_| ExportError::Encoding)
}

/// Download name, unique to the second.
pub fn file_name(at: DateTime<Utc>) -> String {
	format!("node_map_{}.csv", at.format("%Y-%m-%dT%H-%M-%S"))
}

/// Offers `csv` to the user as a file download.
pub fn download(csv: &str, file_name: &str) -> Result<(), ExportError> {
	let browser = |e: wasm_bindgen::JsValue| ExportError::Browser(format!("{e:?}"));

	let window = web_sys::window().ok_or_else(|| ExportError::Browser("no window".into()))?;
	let document = window
		.document()
		.ok_or_else(|| ExportError::Browser("no document".into()))?;
	let body = document
		.body()
		.ok_or_else(|| ExportError::Browser("no body".into()))?;

	let parts = js_sys::Array::of1(&wasm_bindgen::JsValue::from_str(csv));
	let options = BlobPropertyBag::new();
	options.set_type("text/csv;charset=utf-8;");
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(browser)?;
	let href = web_sys::Url::create_object_url_with_blob(&blob).map_err(browser)?;

	let anchor: HtmlAnchorElement = document
		.create_element("a")
		.map_err(browser)?
		.dyn_into()
		.map_err(|_| ExportError::Browser("anchor is not an HtmlAnchorElement".into()))?;
	anchor.set_href(&href);
	anchor.set_download(file_name);
	let _ = anchor.style().set_property("visibility", "hidden");

	body.append_child(&anchor).map_err(browser)?;
	anchor.click();
	let _ = body.remove_child(&anchor);
	web_sys::Url::revoke_object_url(&href).map_err(browser)
}

#[cfg(test)]
mod tests {
	use chrono::TimeZone;
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::graph::NodeId;

	fn node(id: u64, label: &str, parent: Option<u64>) -> Node {
		Node {
			id: NodeId(id),
			label: label.to_string(),
			parent: parent.map(NodeId),
		}
	}

	#[test]
	fn empty_forest_is_header_only() {
		assert_eq!(to_csv(&[]).unwrap(), "id,url,parentId\n");
	}

	#[test]
	fn roots_have_empty_parent() {
		let csv = to_csv(&[node(1, "sample", None), node(2, "a.com", Some(1))]).unwrap();
		assert_eq!(csv, "id,url,parentId\n1,sample,\n2,a.com,1\n");
	}

	#[test]
	fn commas_and_quotes_are_escaped() {
		let csv = to_csv(&[
			node(1, "acme, inc", None),
			node(2, r#"say "hi".com"#, Some(1)),
		])
		.unwrap();
		assert_eq!(
			csv,
			"id,url,parentId\n1,\"acme, inc\",\n2,\"say \"\"hi\"\".com\",1\n"
		);
	}

	#[test]
	fn file_name_embeds_timestamp() {
		let at = Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).unwrap();
		assert_eq!(file_name(at), "node_map_2025-03-09T14-05-07.csv");
	}
}
