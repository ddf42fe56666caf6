pub mod error;
pub mod fallback;
pub mod search;

pub use error::{Error, Result};
pub use search::{SearchRequest, SearchResponse, SearchStats};

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use reqwest::header::HeaderMap;
use serde_json::Value;
use uuid::Uuid;

use argus_config::{Backend, Config, Credentials};
use argus_domain::{PresetResolver, StandardPresets};
use argus_providers::search::SearchPayload;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Per-call information handed to collaborators.
#[derive(Debug, Clone)]
pub struct RequestContext {
	pub request_id: Uuid,
	pub saved_search_id: Option<String>,
}

pub trait CredentialProvider
where
	Self: Send + Sync,
{
	fn headers<'a>(&'a self, ctx: &'a RequestContext) -> BoxFuture<'a, Result<HeaderMap>>;
}

pub trait SearchBackend
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a Backend,
		headers: &'a HeaderMap,
		body: &'a Value,
		deadline: Option<Duration>,
	) -> BoxFuture<'a, argus_providers::Result<SearchPayload>>;
}

#[derive(Clone)]
pub struct Providers {
	pub backend: Arc<dyn SearchBackend>,
	pub credentials: Arc<dyn CredentialProvider>,
	pub presets: Arc<dyn PresetResolver>,
}
impl Providers {
	pub fn new(
		backend: Arc<dyn SearchBackend>,
		credentials: Arc<dyn CredentialProvider>,
		presets: Arc<dyn PresetResolver>,
	) -> Self {
		Self { backend, credentials, presets }
	}

	pub fn from_config(cfg: &Config) -> Self {
		Self {
			backend: Arc::new(HttpBackend),
			credentials: Arc::new(ConfigCredentials::new(cfg.credentials.clone())),
			presets: Arc::new(StandardPresets),
		}
	}
}

/// Emits the credential headers configured under `[credentials]`.
pub struct ConfigCredentials {
	credentials: Credentials,
}
impl ConfigCredentials {
	pub fn new(credentials: Credentials) -> Self {
		Self { credentials }
	}
}
impl CredentialProvider for ConfigCredentials {
	fn headers<'a>(&'a self, _ctx: &'a RequestContext) -> BoxFuture<'a, Result<HeaderMap>> {
		let headers = argus_providers::auth_headers(&self.credentials)
			.map_err(|err| Error::Credentials { message: err.to_string() });

		Box::pin(async move { headers })
	}
}

struct HttpBackend;
impl SearchBackend for HttpBackend {
	fn search<'a>(
		&'a self,
		cfg: &'a Backend,
		headers: &'a HeaderMap,
		body: &'a Value,
		deadline: Option<Duration>,
	) -> BoxFuture<'a, argus_providers::Result<SearchPayload>> {
		Box::pin(argus_providers::search::search(cfg, headers, body, deadline))
	}
}

pub struct ArgusService {
	pub cfg: Config,
	pub providers: Providers,
}
impl ArgusService {
	pub fn new(cfg: Config) -> Self {
		let providers = Providers::from_config(&cfg);

		Self { cfg, providers }
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		Self { cfg, providers }
	}
}
