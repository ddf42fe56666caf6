pub mod error;
pub mod search;

pub use error::{Error, Result};

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};

use argus_config::Credentials;

/// Credential headers derived from configuration. Only configured values are emitted.
pub fn auth_headers(credentials: &Credentials) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	if let Some(api_key) = credentials.api_key.as_deref() {
		headers.insert(
			HeaderName::from_bytes(credentials.api_key_header.as_bytes())?,
			api_key.parse()?,
		);
	}
	if let Some(token) = credentials.bearer_token.as_deref() {
		headers.insert(AUTHORIZATION, format!("Bearer {token}").parse()?);
	}
	if let Some(user) = credentials.forwarded_user.as_deref() {
		headers.insert(
			HeaderName::from_bytes(credentials.forwarded_user_header.as_bytes())?,
			user.parse()?,
		);
	}

	Ok(headers)
}

pub fn default_headers(default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

pub fn json_headers() -> HeaderMap {
	let mut headers = HeaderMap::new();

	headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
	headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

	headers
}

/// Merges `extra` into `base`. The JSON content negotiation headers are never overwritten.
pub fn merge_headers(mut base: HeaderMap, extra: &HeaderMap) -> HeaderMap {
	for (name, value) in extra {
		if *name == ACCEPT || *name == CONTENT_TYPE {
			continue;
		}

		base.insert(name.clone(), value.clone());
	}

	base
}
