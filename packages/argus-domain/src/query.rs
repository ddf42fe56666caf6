use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
	filter::{EntityFilter, FilterState, MatchMode, SavedSearchAttachment},
	preset::{PresetResolver, TimeRange},
	time_serde,
};

/// Caller-supplied bounds as typed by the analyst; parsed leniently when the request is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitRange {
	pub start: String,
	pub end: String,
}

/// Values that take precedence over the applied filter state for a single request.
///
/// Auto-refresh passes none of these; "apply" passes the edited draft.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchOverrides {
	pub query: Option<String>,
	pub entities: Option<Vec<EntityFilter>>,
	pub time_range: Option<ExplicitRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
	pub page: u32,
	pub page_size: u32,
}
impl Pagination {
	pub fn new(page: u32, page_size: u32) -> Self {
		Self { page: page.max(1), page_size: page_size.max(1) }
	}

	/// Back to the first page, keeping the page size. Every filter change goes through here.
	pub fn reset(self) -> Self {
		Self::new(1, self.page_size)
	}

	/// The continuation used by "load more".
	pub fn next(self) -> Self {
		Self::new(self.page.saturating_add(1), self.page_size)
	}

	pub fn offset(self) -> u64 {
		u64::from(self.page.max(1) - 1) * u64::from(self.page_size)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityClause {
	#[serde(rename = "type")]
	pub entity_type: String,
	pub value: String,
	pub match_mode: MatchMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTimeRange {
	pub start: String,
	pub end: String,
}

/// Body of the backend search call. Empty optional arrays are omitted, never sent as `[]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendRequest {
	pub text: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub sources: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub classifications: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub indicator_types: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub datasets: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub entities: Vec<EntityClause>,
	pub limit: u32,
	pub offset: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub time_range: Option<WireTimeRange>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub saved_search_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub saved_search_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub saved_search_owner: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub saved_search_tags: Vec<String>,
}

pub struct BuildArgs<'a> {
	pub state: &'a FilterState,
	pub overrides: &'a SearchOverrides,
	pub pagination: Pagination,
	pub saved_search: SavedSearchAttachment,
	pub presets: &'a dyn PresetResolver,
	pub now: OffsetDateTime,
}

pub fn build_request(args: BuildArgs<'_>) -> BackendRequest {
	let BuildArgs { state, overrides, pagination, saved_search, presets, now } = args;
	let text = overrides.query.as_deref().unwrap_or(&state.query).trim().to_string();
	let entities = compact_entities(overrides.entities.as_deref().unwrap_or(&state.entities));
	let time_range = match overrides.time_range.as_ref() {
		Some(explicit) => resolve_explicit_range(explicit),
		None => state
			.time_preset
			.as_deref()
			.and_then(|preset| presets.resolve(preset, now))
			.and_then(to_wire_range),
	};
	let mut request = BackendRequest {
		text,
		sources: state.sources.iter().cloned().collect(),
		classifications: state.taxonomy.iter().cloned().collect(),
		indicator_types: state.indicator_types.iter().cloned().collect(),
		datasets: state.datasets.iter().cloned().collect(),
		entities,
		limit: pagination.page_size,
		offset: pagination.offset(),
		time_range,
		saved_search_id: None,
		saved_search_name: None,
		saved_search_owner: None,
		saved_search_tags: Vec::new(),
	};

	if saved_search.is_attached()
		&& let Some(saved) = state.saved_search.as_ref()
	{
		request.saved_search_id = Some(saved.id.clone());
		request.saved_search_name = Some(saved.name.clone());
		request.saved_search_owner = saved.owner.clone();
		request.saved_search_tags = saved.tags.clone();
	}

	request
}

/// Drops rows whose value is blank after trimming; match modes pass through unchanged.
pub fn compact_entities(rows: &[EntityFilter]) -> Vec<EntityClause> {
	rows.iter()
		.filter_map(|row| {
			let value = row.value.trim();

			if value.is_empty() {
				return None;
			}

			Some(EntityClause {
				entity_type: row.entity_type.trim().to_string(),
				value: value.to_string(),
				match_mode: row.match_mode,
			})
		})
		.collect()
}

/// Both ends must parse, otherwise the range is omitted.
pub fn resolve_explicit_range(range: &ExplicitRange) -> Option<WireTimeRange> {
	let start = time_serde::parse_lenient(&range.start)?;
	let end = time_serde::parse_lenient(&range.end)?;

	to_wire_range(TimeRange { start, end })
}

fn to_wire_range(range: TimeRange) -> Option<WireTimeRange> {
	Some(WireTimeRange {
		start: time_serde::format_rfc3339(range.start)?,
		end: time_serde::format_rfc3339(range.end)?,
	})
}
