use std::{
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use reqwest::{StatusCode, header::HeaderMap};
use serde_json::{Value, json};

use argus_config::{Backend, Config, Credentials, Search, Service};
use argus_domain::{FacetField, FilterState, SavedSearchAttachment, SavedSearchContext};
use argus_providers::search::SearchPayload;
use argus_service::{
	ArgusService, BoxFuture, CredentialProvider, Error, Providers, RequestContext, Result,
	SearchBackend, SearchRequest,
};
use argus_testkit::{StubBackend, StubReply};

struct FailingCredentials;
impl CredentialProvider for FailingCredentials {
	fn headers<'a>(&'a self, _ctx: &'a RequestContext) -> BoxFuture<'a, Result<HeaderMap>> {
		Box::pin(async move {
			Err(Error::Credentials { message: "Token store is locked.".to_string() })
		})
	}
}

struct SpyBackend {
	calls: Arc<AtomicUsize>,
	bodies: Arc<Mutex<Vec<Value>>>,
}
impl SpyBackend {
	fn new() -> Self {
		Self { calls: Arc::new(AtomicUsize::new(0)), bodies: Arc::new(Mutex::new(Vec::new())) }
	}

	fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	fn bodies(&self) -> Vec<Value> {
		self.bodies.lock().expect("Spy lock poisoned.").clone()
	}
}
impl SearchBackend for SpyBackend {
	fn search<'a>(
		&'a self,
		_cfg: &'a Backend,
		_headers: &'a HeaderMap,
		body: &'a Value,
		_deadline: Option<Duration>,
	) -> BoxFuture<'a, argus_providers::Result<SearchPayload>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.bodies.lock().expect("Spy lock poisoned.").push(body.clone());

		Box::pin(async move {
			Ok(SearchPayload {
				results: vec![json!({ "record": { "case_id": "SPY-1", "text": "Spy result." } })],
				total: 30,
				elapsed_ms: Some(7),
			})
		})
	}
}

fn test_config(backend: Backend) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		backend,
		credentials: Credentials::default(),
		search: Search { default_page_size: 5, max_page_size: 50 },
	}
}

fn spy_service(spy: Arc<SpyBackend>) -> ArgusService {
	let cfg = test_config(argus_testkit::backend_config("http://127.0.0.1:1"));
	let mut providers = Providers::from_config(&cfg);

	providers.backend = spy;

	ArgusService::with_providers(cfg, providers)
}

fn success_envelope() -> Value {
	json!({
		"results": [
			{
				"sources": ["structured", "vector"],
				"score": 0.9,
				"record": {
					"case_id": "CASE-77",
					"text": "Wallet drainer distributed through a fake airdrop claim page.",
					"classification": "drainer",
					"metadata": { "title": "Airdrop drainer", "tags": ["crypto"] },
					"created_at": "2024-10-01T00:00:00Z"
				}
			},
			{
				"sources": ["vector"],
				"vector": {
					"label": "phishing",
					"text": "Look-alike claim portal.",
					"similarity": 0.8
				}
			}
		],
		"total": 42,
		"elapsed_ms": 100
	})
}

#[tokio::test]
async fn live_backend_results_are_normalized() {
	let stub = StubBackend::start(StubReply::Json(StatusCode::OK, success_envelope()))
		.await
		.expect("Failed to start stub backend.");
	let service = ArgusService::new(test_config(stub.backend_config()));
	let req = SearchRequest {
		filters: FilterState::default().with_query(" drainer "),
		..Default::default()
	};
	let response = service.search_intelligence(req).await;

	assert_eq!(response.stats.total, 42);
	assert_eq!(response.stats.took, 100);
	assert_eq!(response.stats.query, "drainer");
	assert_eq!(response.stats.page, 1);
	assert_eq!(response.stats.page_size, 5);

	let ids: Vec<_> = response.results.iter().map(|result| result.id.as_str()).collect();

	assert_eq!(ids, ["CASE-77", "result-1"]);
	assert_eq!(response.results[0].source, "hybrid");
	assert_eq!(response.results[1].source, "vector");
	assert!(response.facets.iter().any(|facet| facet.field == "source"));
	assert_eq!(response.suggestions[..2], ["drainer".to_string(), "crypto".to_string()]);

	let requests = stub.requests();

	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].body["text"], "drainer");
	assert_eq!(requests[0].body["limit"], 5);
	assert_eq!(requests[0].body["offset"], 0);
}

#[tokio::test]
async fn configured_credentials_reach_the_backend() {
	let stub = StubBackend::start(StubReply::Json(StatusCode::OK, json!({ "results": [] })))
		.await
		.expect("Failed to start stub backend.");
	let mut cfg = test_config(stub.backend_config());

	cfg.credentials.api_key = Some("key-123".to_string());
	cfg.credentials.forwarded_user = Some("analyst@example.com".to_string());

	let response = ArgusService::new(cfg).search_intelligence(SearchRequest::default()).await;

	assert_eq!(response.stats.total, 0);
	assert!(response.results.is_empty());

	let requests = stub.requests();

	assert_eq!(requests[0].headers.get("x-api-key").expect("x-api-key"), "key-123");
	assert_eq!(
		requests[0].headers.get("x-forwarded-user").expect("x-forwarded-user"),
		"analyst@example.com"
	);
}

#[tokio::test]
async fn failing_credential_provider_still_searches() {
	let stub = StubBackend::start(StubReply::Json(StatusCode::OK, success_envelope()))
		.await
		.expect("Failed to start stub backend.");
	let cfg = test_config(stub.backend_config());
	let mut providers = Providers::from_config(&cfg);

	providers.credentials = Arc::new(FailingCredentials);

	let service = ArgusService::with_providers(cfg, providers);
	let response = service.search_intelligence(SearchRequest::default()).await;

	assert_eq!(response.stats.total, 42);

	let requests = stub.requests();

	assert_eq!(requests.len(), 1);
	assert!(requests[0].headers.get("x-api-key").is_none());
}

#[tokio::test]
async fn server_error_falls_back_to_built_in_dataset() {
	let stub = StubBackend::start(StubReply::Json(
		StatusCode::INTERNAL_SERVER_ERROR,
		json!({ "message": "boom" }),
	))
	.await
	.expect("Failed to start stub backend.");
	let service = ArgusService::new(test_config(stub.backend_config()));
	let response = service.search_intelligence(SearchRequest::default()).await;

	assert_eq!(stub.requests().len(), 1);
	assert_eq!(response.stats.total, argus_service::fallback::dataset().len() as u64);
	assert_eq!(response.results.len(), 5);
	assert_eq!(response.stats.page_size, 5);
	assert!(!response.facets.is_empty());
}

#[tokio::test]
async fn non_json_success_falls_back() {
	let stub = StubBackend::start(StubReply::Raw(StatusCode::OK, "<html></html>".to_string()))
		.await
		.expect("Failed to start stub backend.");
	let service = ArgusService::new(test_config(stub.backend_config()));
	let response = service.search_intelligence(SearchRequest::default()).await;

	assert_eq!(response.stats.total, 12);
	assert!(response.results.len() <= 5);
}

#[tokio::test]
async fn unreachable_backend_falls_back() {
	let base_url = argus_testkit::unreachable_base_url().await.expect("Failed to reserve a port.");
	let service = ArgusService::new(test_config(argus_testkit::backend_config(&base_url)));
	let req = SearchRequest { deadline_ms: Some(500), ..Default::default() };
	let response = service.search_intelligence(req).await;

	assert_eq!(response.stats.total, 12);
	assert_eq!(response.results.len(), 5);
}

#[tokio::test]
async fn request_deadline_timeout_falls_back() {
	let stub = StubBackend::start_delayed(
		StubReply::Json(StatusCode::OK, success_envelope()),
		Duration::from_secs(2),
	)
	.await
	.expect("Failed to start stub backend.");
	let service = ArgusService::new(test_config(stub.backend_config()));
	let req = SearchRequest { deadline_ms: Some(150), ..Default::default() };
	let response = service.search_intelligence(req).await;

	assert_eq!(stub.requests().len(), 1);
	assert_eq!(response.stats.total, 12);
	assert_eq!(response.results.len(), 5);
	assert!(response.results.iter().all(|result| result.id != "CASE-77"));
}

#[tokio::test]
async fn deadline_longer_than_reply_keeps_live_results() {
	let stub = StubBackend::start_delayed(
		StubReply::Json(StatusCode::OK, success_envelope()),
		Duration::from_millis(50),
	)
	.await
	.expect("Failed to start stub backend.");
	let service = ArgusService::new(test_config(stub.backend_config()));
	let req = SearchRequest { deadline_ms: Some(1_500), ..Default::default() };
	let response = service.search_intelligence(req).await;

	assert_eq!(response.stats.total, 42);
	assert_eq!(response.results[0].id, "CASE-77");
}

#[tokio::test]
async fn fallback_applies_query_and_facet_filters() {
	let service = ArgusService::new(test_config(Backend::default()));
	let by_source = service
		.search_intelligence(SearchRequest {
			filters: FilterState::default().toggle(FacetField::Sources, "vector"),
			..Default::default()
		})
		.await;

	assert_eq!(by_source.stats.total, 3);
	assert!(by_source.results.iter().all(|result| result.source == "vector"));

	let by_taxonomy = service
		.search_intelligence(SearchRequest {
			filters: FilterState::default().toggle(FacetField::Taxonomy, "crypto"),
			page_size: Some(10),
			..Default::default()
		})
		.await;

	assert_eq!(by_taxonomy.stats.total, 4);
	assert!(
		by_taxonomy.results.iter().all(|result| result.tags.iter().any(|tag| tag == "crypto"))
	);

	let by_query = service
		.search_intelligence(SearchRequest {
			filters: FilterState::default().with_query("PHISHING"),
			..Default::default()
		})
		.await;

	assert_eq!(by_query.stats.query, "PHISHING");
	assert!(by_query.stats.total >= 1);
	assert!(by_query.results.iter().all(|result| {
		let haystack =
			format!("{} {} {}", result.title, result.snippet, result.tags.join(" ")).to_lowercase();

		haystack.contains("phishing")
	}));

	let nothing = service
		.search_intelligence(SearchRequest {
			filters: FilterState::default().with_query("no such indicator anywhere"),
			..Default::default()
		})
		.await;

	assert_eq!(nothing.stats.total, 0);
	assert!(nothing.results.is_empty());
	assert!(nothing.facets.is_empty());
	assert!(nothing.suggestions.is_empty());
}

#[tokio::test]
async fn fallback_pages_past_the_end() {
	let service = ArgusService::new(test_config(Backend::default()));
	let last =
		service.search_intelligence(SearchRequest { page: Some(3), ..Default::default() }).await;

	assert_eq!(last.stats.page, 3);
	assert_eq!(last.results.len(), 2);

	let previous = SearchRequest { page: Some(3), ..Default::default() };
	let beyond = service.load_more(&previous, &last.stats).await;

	assert_eq!(beyond.stats.page, 4);
	assert!(beyond.results.is_empty());
	assert_eq!(beyond.stats.total, 12);
}

#[tokio::test]
async fn load_more_requests_the_next_page() {
	let spy = Arc::new(SpyBackend::new());
	let service = spy_service(spy.clone());
	let first_req = SearchRequest {
		filters: FilterState::default().with_query("drainer"),
		page_size: Some(10),
		..Default::default()
	};
	let first = service.search_intelligence(first_req.clone()).await;
	let second = service.load_more(&first_req, &first.stats).await;

	assert_eq!(spy.count(), 2);
	assert_eq!(second.stats.page, 2);
	assert_eq!(second.stats.page_size, 10);
	assert_eq!(second.stats.took, 7);

	let bodies = spy.bodies();

	assert_eq!(bodies[0]["offset"], 0);
	assert_eq!(bodies[1]["offset"], 10);
	assert_eq!(bodies[1]["text"], "drainer");
}

#[tokio::test]
async fn page_size_is_clamped_to_configured_bounds() {
	let spy = Arc::new(SpyBackend::new());
	let service = spy_service(spy.clone());
	let large = service
		.search_intelligence(SearchRequest { page_size: Some(1_000), ..Default::default() })
		.await;
	let zero = service
		.search_intelligence(SearchRequest {
			page: Some(0),
			page_size: Some(0),
			..Default::default()
		})
		.await;

	assert_eq!(large.stats.page_size, 50);
	assert_eq!(zero.stats.page_size, 1);
	assert_eq!(zero.stats.page, 1);

	let bodies = spy.bodies();

	assert_eq!(bodies[0]["limit"], 50);
	assert_eq!(bodies[1]["limit"], 1);
}

#[tokio::test]
async fn saved_search_is_echoed_only_while_attached() {
	let spy = Arc::new(SpyBackend::new());
	let service = spy_service(spy.clone());
	let filters = FilterState::default().with_saved_search(Some(SavedSearchContext {
		id: "ss-9".to_string(),
		name: "Drainers".to_string(),
		owner: Some("analyst".to_string()),
		tags: vec!["crypto".to_string()],
	}));

	service
		.search_intelligence(SearchRequest {
			filters: filters.clone(),
			saved_search: SavedSearchAttachment::Attached,
			..Default::default()
		})
		.await;
	service
		.search_intelligence(SearchRequest {
			filters,
			saved_search: SavedSearchAttachment::Attached.after_edit(),
			..Default::default()
		})
		.await;

	let bodies = spy.bodies();

	assert_eq!(bodies[0]["saved_search_id"], "ss-9");
	assert_eq!(bodies[0]["saved_search_name"], "Drainers");
	assert_eq!(bodies[0]["saved_search_tags"], json!(["crypto"]));
	assert!(bodies[1].get("saved_search_id").is_none());
	assert!(bodies[1].get("saved_search_tags").is_none());
}
