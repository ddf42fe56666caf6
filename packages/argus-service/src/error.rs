use serde_json::Value;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Configuration error: {message}")]
	Config { message: String },
	#[error("Credential provider error: {message}")]
	Credentials { message: String },
	#[error("Transport error: {message}")]
	Transport { message: String },
	#[error("Backend error: HTTP {status}.")]
	Backend { status: u16, body: Value },
	#[error("Invalid backend response: {message}")]
	InvalidResponse { message: String },
}
impl From<argus_providers::Error> for Error {
	fn from(err: argus_providers::Error) -> Self {
		use argus_providers::Error as ProviderError;

		match err {
			ProviderError::Reqwest(inner) => Self::Transport { message: inner.to_string() },
			ProviderError::SerdeJson(inner) => Self::InvalidResponse { message: inner.to_string() },
			ProviderError::InvalidHeaderName(inner) => Self::Config { message: inner.to_string() },
			ProviderError::InvalidHeaderValue(inner) => Self::Config { message: inner.to_string() },
			ProviderError::InvalidConfig { message } => Self::Config { message },
			ProviderError::Transport { message } => Self::Transport { message },
			ProviderError::Backend { status, body } => Self::Backend { status, body },
			ProviderError::InvalidResponse { message } => Self::InvalidResponse { message },
		}
	}
}
