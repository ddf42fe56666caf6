mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Backend, Config, Credentials, Search, Service};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	from_toml_str(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } =>
			Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn from_toml_str(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if !cfg.backend.search_path.starts_with('/') {
		return Err(Error::Validation {
			message: "backend.search_path must start with '/'.".to_string(),
		});
	}
	if cfg.backend.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "backend.timeout_ms must be greater than zero.".to_string(),
		});
	}

	for (key, value) in &cfg.backend.default_headers {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: "backend.default_headers keys must be non-empty.".to_string(),
			});
		}
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("backend.default_headers.{key} must be a string."),
			});
		}
	}
	for (label, value) in [
		("credentials.api_key_header", &cfg.credentials.api_key_header),
		("credentials.forwarded_user_header", &cfg.credentials.forwarded_user_header),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.search.max_page_size == 0 {
		return Err(Error::Validation {
			message: "search.max_page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.search.default_page_size == 0
		|| cfg.search.default_page_size > cfg.search.max_page_size
	{
		return Err(Error::Validation {
			message: "search.default_page_size must be between 1 and search.max_page_size."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.backend.base_url = cfg.backend.base_url.trim().trim_end_matches('/').to_string();

	for secret in [
		&mut cfg.credentials.api_key,
		&mut cfg.credentials.bearer_token,
		&mut cfg.credentials.forwarded_user,
	] {
		if secret.as_deref().map(|value| value.trim().is_empty()).unwrap_or(false) {
			*secret = None;
		}
	}
}
