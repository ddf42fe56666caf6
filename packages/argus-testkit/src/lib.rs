mod error;

pub use error::{Error, Result};

use std::{
	net::SocketAddr,
	sync::{Arc, Mutex},
	time::Duration,
};

use axum::{
	Router,
	body::Bytes,
	extract::State,
	http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
	response::{IntoResponse, Response},
	routing,
};
use serde_json::Value;
use tokio::{net::TcpListener, sync::oneshot};

pub const SEARCH_PATH: &str = "/api/v1/search";

/// What the stub answers to every search call.
#[derive(Debug, Clone)]
pub enum StubReply {
	Json(StatusCode, Value),
	Raw(StatusCode, String),
}

#[derive(Debug, Clone)]
pub struct CapturedRequest {
	pub headers: HeaderMap,
	pub body: Value,
}

struct Shared {
	reply: StubReply,
	delay: Duration,
	captured: Mutex<Vec<CapturedRequest>>,
}

/// In-process search backend bound to an ephemeral loopback port.
pub struct StubBackend {
	addr: SocketAddr,
	shared: Arc<Shared>,
	shutdown: Option<oneshot::Sender<()>>,
}
impl StubBackend {
	pub async fn start(reply: StubReply) -> Result<Self> {
		Self::start_delayed(reply, Duration::ZERO).await
	}

	/// Like [`StubBackend::start`], but every reply is held back for `delay` after the request
	/// has been captured.
	pub async fn start_delayed(reply: StubReply, delay: Duration) -> Result<Self> {
		let shared = Arc::new(Shared { reply, delay, captured: Mutex::new(Vec::new()) });
		let app = Router::new()
			.route(SEARCH_PATH, routing::post(handle_search))
			.with_state(shared.clone());
		let listener = TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let (tx, rx) = oneshot::channel();
		let server = axum::serve(listener, app).with_graceful_shutdown(async move {
			let _ = rx.await;
		});

		tokio::spawn(async move {
			if let Err(err) = server.await {
				eprintln!("Stub backend stopped with an error: {err}.");
			}
		});

		Ok(Self { addr, shared, shutdown: Some(tx) })
	}

	pub fn base_url(&self) -> String {
		format!("http://{}", self.addr)
	}

	/// A backend section pointing at this stub.
	pub fn backend_config(&self) -> argus_config::Backend {
		backend_config(&self.base_url())
	}

	pub fn requests(&self) -> Vec<CapturedRequest> {
		self.shared.captured.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl Drop for StubBackend {
	fn drop(&mut self) {
		if let Some(tx) = self.shutdown.take() {
			let _ = tx.send(());
		}
	}
}

/// A loopback URL with nothing listening on it.
pub async fn unreachable_base_url() -> Result<String> {
	let listener = TcpListener::bind("127.0.0.1:0").await?;
	let addr = listener.local_addr()?;

	drop(listener);

	Ok(format!("http://{addr}"))
}

pub fn backend_config(base_url: &str) -> argus_config::Backend {
	argus_config::Backend {
		base_url: base_url.to_string(),
		search_path: SEARCH_PATH.to_string(),
		timeout_ms: 2_000,
		..Default::default()
	}
}

async fn handle_search(
	State(shared): State<Arc<Shared>>,
	headers: HeaderMap,
	body: Bytes,
) -> Response {
	let body = serde_json::from_slice(&body).unwrap_or(Value::Null);

	shared
		.captured
		.lock()
		.unwrap_or_else(|err| err.into_inner())
		.push(CapturedRequest { headers, body });

	if !shared.delay.is_zero() {
		tokio::time::sleep(shared.delay).await;
	}

	match &shared.reply {
		StubReply::Json(status, value) => (*status, axum::Json(value.clone())).into_response(),
		StubReply::Raw(status, raw) =>
			(*status, [(CONTENT_TYPE, "text/plain")], raw.clone()).into_response(),
	}
}
