use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	#[serde(default)]
	pub backend: Backend,
	#[serde(default)]
	pub credentials: Credentials,
	#[serde(default)]
	pub search: Search,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Backend {
	/// Base URL of the search backend. Blank means no live backend is configured and every
	/// search is served from the built-in dataset.
	#[serde(default)]
	pub base_url: String,
	#[serde(default = "default_search_path")]
	pub search_path: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}
impl Default for Backend {
	fn default() -> Self {
		Self {
			base_url: String::new(),
			search_path: default_search_path(),
			timeout_ms: default_timeout_ms(),
			default_headers: Map::new(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Credentials {
	pub api_key: Option<String>,
	pub api_key_header: String,
	pub bearer_token: Option<String>,
	pub forwarded_user: Option<String>,
	pub forwarded_user_header: String,
}
impl Default for Credentials {
	fn default() -> Self {
		Self {
			api_key: None,
			api_key_header: "X-API-Key".to_string(),
			bearer_token: None,
			forwarded_user: None,
			forwarded_user_header: "X-Forwarded-User".to_string(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub default_page_size: u32,
	pub max_page_size: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self { default_page_size: 20, max_page_size: 100 }
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_search_path() -> String {
	"/api/v1/search".to_string()
}

fn default_timeout_ms() -> u64 {
	10_000
}
