use std::time::Duration;

use reqwest::{Client, header::HeaderMap};
use serde_json::Value;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchPayload {
	pub results: Vec<Value>,
	pub total: u64,
	pub elapsed_ms: Option<u64>,
}

/// Issues exactly one POST to the configured search endpoint. No retries.
///
/// `deadline` can only tighten the configured timeout.
pub async fn search(
	cfg: &argus_config::Backend,
	extra_headers: &HeaderMap,
	body: &Value,
	deadline: Option<Duration>,
) -> Result<SearchPayload> {
	if cfg.base_url.trim().is_empty() {
		return Err(Error::InvalidConfig {
			message: "backend.base_url is not configured.".to_string(),
		});
	}

	let configured = Duration::from_millis(cfg.timeout_ms);
	let timeout = deadline.map(|deadline| deadline.min(configured)).unwrap_or(configured);
	let client = Client::builder().timeout(timeout).build()?;
	let url = format!("{}{}", cfg.base_url, cfg.search_path);
	let headers = crate::merge_headers(
		crate::merge_headers(crate::json_headers(), &crate::default_headers(&cfg.default_headers)?),
		extra_headers,
	);
	let res = client
		.post(&url)
		.headers(headers)
		.json(body)
		.send()
		.await
		.map_err(|err| Error::Transport { message: err.to_string() })?;
	let status = res.status();

	if !status.is_success() {
		let body = res
			.bytes()
			.await
			.ok()
			.and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok())
			.unwrap_or_else(|| placeholder_error(status));

		tracing::debug!(status = status.as_u16(), %url, "Search backend returned an error status.");

		return Err(Error::Backend { status: status.as_u16(), body });
	}

	let bytes = res.bytes().await.map_err(|err| Error::Transport { message: err.to_string() })?;

	if bytes.iter().all(u8::is_ascii_whitespace) {
		return Err(Error::InvalidResponse {
			message: "Search response body is empty.".to_string(),
		});
	}

	let json: Value = serde_json::from_slice(&bytes)?;

	parse_search_response(json)
}

/// Validates the `{results, total, elapsed_ms}` envelope. Entries themselves stay untyped.
pub fn parse_search_response(json: Value) -> Result<SearchPayload> {
	let Value::Object(mut envelope) = json else {
		return Err(Error::InvalidResponse {
			message: "Search response must be a JSON object.".to_string(),
		});
	};
	let results = match envelope.remove("results") {
		None | Some(Value::Null) => Vec::new(),
		Some(Value::Array(items)) => items,
		Some(_) => {
			return Err(Error::InvalidResponse {
				message: "Search response results must be an array.".to_string(),
			});
		},
	};
	let total = envelope
		.get("total")
		.and_then(Value::as_f64)
		.filter(|total| *total >= 0.0)
		.map(|total| total as u64)
		.unwrap_or(results.len() as u64);
	let elapsed_ms = envelope
		.get("elapsed_ms")
		.and_then(Value::as_f64)
		.filter(|elapsed| *elapsed >= 0.0)
		.map(|elapsed| elapsed.round() as u64);

	Ok(SearchPayload { results, total, elapsed_ms })
}

fn placeholder_error(status: reqwest::StatusCode) -> Value {
	serde_json::json!({ "message": status.canonical_reason().unwrap_or("Request failed") })
}
