//! Fetching and decoding of the concept document.

use log::info;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use super::model::ConceptModel;
use super::types::ConceptDocument;

/// Fatal initialization failures. There is no retry: the host page shows a
/// static error view and the component stays down until reload.
#[derive(Clone, Debug, Error)]
pub enum LoadError {
	#[error("fetching {url} failed: {message}")]
	Network { url: String, message: String },
	#[error("{url} returned HTTP {status}")]
	Http { url: String, status: u16 },
	#[error("concept data is malformed: {0}")]
	Malformed(String),
	#[error("concept data is missing the \"ai\" root entry")]
	MissingRoot,
}

/// Decode a JSON document and build the model, failing fast when the root
/// entry is absent.
pub fn parse_concepts(json: &str) -> Result<ConceptModel, LoadError> {
	let doc: ConceptDocument =
		serde_json::from_str(json).map_err(|e| LoadError::Malformed(e.to_string()))?;
	ConceptModel::from_document(doc)
}

/// Fetch the concept document from `url` and build the model. The only
/// asynchronous step in the component's lifetime.
pub async fn fetch_concepts(url: &str) -> Result<ConceptModel, LoadError> {
	let window = web_sys::window().ok_or_else(|| LoadError::Network {
		url: url.to_string(),
		message: "no window".to_string(),
	})?;
	let response = JsFuture::from(window.fetch_with_str(url))
		.await
		.map_err(|e| network_error(url, &e))?;
	let response: Response = response.dyn_into().map_err(|e| network_error(url, &e))?;
	if !response.ok() {
		return Err(LoadError::Http {
			url: url.to_string(),
			status: response.status(),
		});
	}
	let body = JsFuture::from(response.text().map_err(|e| network_error(url, &e))?)
		.await
		.map_err(|e| network_error(url, &e))?;
	let body = body
		.as_string()
		.ok_or_else(|| LoadError::Malformed("response body is not text".to_string()))?;

	let model = parse_concepts(&body)?;
	info!("loaded {} concepts from {url}", model.len());
	Ok(model)
}

fn network_error(url: &str, value: &JsValue) -> LoadError {
	LoadError::Network {
		url: url.to_string(),
		message: value.as_string().unwrap_or_else(|| format!("{value:?}")),
	}
}
