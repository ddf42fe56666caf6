use std::time::{Duration, Instant};

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use argus_domain::{
	BackendRequest, BuildArgs, Facet, FilterState, NormalizedResult, Pagination,
	SavedSearchAttachment, SearchOverrides, build_facets, build_request, build_suggestions,
	normalize_at,
};

use crate::{ArgusService, Error, RequestContext, Result, fallback};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchRequest {
	pub filters: FilterState,
	pub overrides: SearchOverrides,
	pub saved_search: SavedSearchAttachment,
	pub page: Option<u32>,
	pub page_size: Option<u32>,
	/// Tightens `backend.timeout_ms` for this call only.
	pub deadline_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
	pub query: String,
	pub total: u64,
	pub took: u64,
	pub page: u32,
	pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
	pub results: Vec<NormalizedResult>,
	pub stats: SearchStats,
	pub facets: Vec<Facet>,
	pub suggestions: Vec<String>,
}
impl SearchResponse {
	/// Facets and suggestions always come from the page itself.
	pub fn from_page(results: Vec<NormalizedResult>, stats: SearchStats) -> Self {
		let facets = build_facets(&results);
		let suggestions = build_suggestions(&results);

		Self { results, stats, facets, suggestions }
	}
}

impl ArgusService {
	/// Runs one search. Never fails: any transport, backend or parse error is answered from the
	/// built-in dataset with the same filtering and paging.
	pub async fn search_intelligence(&self, req: SearchRequest) -> SearchResponse {
		let started = Instant::now();
		let request_id = Uuid::new_v4();
		let pagination = self.pagination(&req);
		let backend_request = build_request(BuildArgs {
			state: &req.filters,
			overrides: &req.overrides,
			pagination,
			saved_search: req.saved_search,
			presets: self.providers.presets.as_ref(),
			now: OffsetDateTime::now_utc(),
		});
		let ctx = RequestContext {
			request_id,
			saved_search_id: backend_request.saved_search_id.clone(),
		};
		let deadline = req.deadline_ms.map(Duration::from_millis);

		match self.search_live(&ctx, &backend_request, pagination, deadline, started).await {
			Ok(response) => {
				tracing::info!(
					request_id = %request_id,
					total = response.stats.total,
					returned = response.results.len(),
					took_ms = response.stats.took,
					"Search completed."
				);

				response
			},
			Err(err) => {
				tracing::warn!(
					request_id = %request_id,
					error = %err,
					degraded = true,
					"Search backend unavailable. Serving built-in dataset."
				);

				fallback::search(&backend_request, pagination, started)
			},
		}
	}

	/// Fetches the page after the one described by `stats`, reusing the previous request.
	pub async fn load_more(&self, previous: &SearchRequest, stats: &SearchStats) -> SearchResponse {
		let next = Pagination::new(stats.page, stats.page_size).next();
		let req = SearchRequest {
			page: Some(next.page),
			page_size: Some(next.page_size),
			..previous.clone()
		};

		self.search_intelligence(req).await
	}

	pub fn pagination(&self, req: &SearchRequest) -> Pagination {
		let max = self.cfg.search.max_page_size.max(1);
		let page_size =
			req.page_size.unwrap_or(self.cfg.search.default_page_size).clamp(1, max);

		Pagination::new(req.page.unwrap_or(1), page_size)
	}

	async fn search_live(
		&self,
		ctx: &RequestContext,
		backend_request: &BackendRequest,
		pagination: Pagination,
		deadline: Option<Duration>,
		started: Instant,
	) -> Result<SearchResponse> {
		let body = serde_json::to_value(backend_request)
			.map_err(|err| Error::InvalidRequest { message: err.to_string() })?;
		let headers = match self.providers.credentials.headers(ctx).await {
			Ok(headers) => headers,
			Err(err) => {
				tracing::warn!(
					request_id = %ctx.request_id,
					error = %err,
					"Credential provider failed. Continuing without credential headers."
				);

				HeaderMap::new()
			},
		};
		let payload =
			self.providers.backend.search(&self.cfg.backend, &headers, &body, deadline).await?;
		let now = OffsetDateTime::now_utc();
		let results: Vec<NormalizedResult> = payload
			.results
			.iter()
			.enumerate()
			.map(|(index, entry)| normalize_at(entry, index, now))
			.collect();
		let took = payload.elapsed_ms.unwrap_or_else(|| elapsed_ms(started));
		let stats = SearchStats {
			query: backend_request.text.clone(),
			total: payload.total,
			took,
			page: pagination.page,
			page_size: pagination.page_size,
		};

		Ok(SearchResponse::from_page(results, stats))
	}
}

pub(crate) fn elapsed_ms(started: Instant) -> u64 {
	u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
