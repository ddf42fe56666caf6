use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
	#[default]
	Exact,
	Prefix,
	Contains,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityFilter {
	pub id: String,
	#[serde(rename = "type")]
	pub entity_type: String,
	pub value: String,
	#[serde(default)]
	pub match_mode: MatchMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SavedSearchContext {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub owner: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
}

/// Facet dimensions whose selections are toggled as sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetField {
	Sources,
	Taxonomy,
	IndicatorTypes,
	Datasets,
}

/// The analyst's current query intent.
///
/// Every mutator returns a new value so callers can keep the previous state around for
/// "last write wins" comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterState {
	pub query: String,
	pub sources: BTreeSet<String>,
	pub taxonomy: BTreeSet<String>,
	pub indicator_types: BTreeSet<String>,
	pub datasets: BTreeSet<String>,
	pub time_preset: Option<String>,
	pub entities: Vec<EntityFilter>,
	pub saved_search: Option<SavedSearchContext>,
}
impl FilterState {
	pub fn with_query(&self, query: impl Into<String>) -> Self {
		Self { query: query.into(), ..self.clone() }
	}

	pub fn with_time_preset(&self, preset: Option<String>) -> Self {
		Self { time_preset: preset.filter(|value| !value.trim().is_empty()), ..self.clone() }
	}

	pub fn with_saved_search(&self, saved_search: Option<SavedSearchContext>) -> Self {
		Self { saved_search, ..self.clone() }
	}

	/// Removes `value` from the facet set when present, adds it otherwise.
	pub fn toggle(&self, field: FacetField, value: &str) -> Self {
		let mut next = self.clone();
		let set = next.facet_mut(field);

		if !set.remove(value) {
			set.insert(value.to_string());
		}

		next
	}

	pub fn facet(&self, field: FacetField) -> &BTreeSet<String> {
		match field {
			FacetField::Sources => &self.sources,
			FacetField::Taxonomy => &self.taxonomy,
			FacetField::IndicatorTypes => &self.indicator_types,
			FacetField::Datasets => &self.datasets,
		}
	}

	pub fn push_entity(&self, entity: EntityFilter) -> Self {
		let mut next = self.clone();

		next.entities.push(entity);

		next
	}

	/// Replaces the entity row with the same id in place, keeping its position.
	pub fn update_entity(&self, entity: EntityFilter) -> Self {
		let mut next = self.clone();

		if let Some(slot) = next.entities.iter_mut().find(|row| row.id == entity.id) {
			*slot = entity;
		}

		next
	}

	pub fn remove_entity(&self, id: &str) -> Self {
		let mut next = self.clone();

		next.entities.retain(|row| row.id != id);

		next
	}

	pub fn clear(&self) -> Self {
		Self::default()
	}

	fn facet_mut(&mut self, field: FacetField) -> &mut BTreeSet<String> {
		match field {
			FacetField::Sources => &mut self.sources,
			FacetField::Taxonomy => &mut self.taxonomy,
			FacetField::IndicatorTypes => &mut self.indicator_types,
			FacetField::Datasets => &mut self.datasets,
		}
	}
}

/// Whether the next request replays the saved-search identity held in the filter state.
///
/// Editing any filter detaches; an explicit run of the saved search attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavedSearchAttachment {
	Attached,
	#[default]
	Detached,
}
impl SavedSearchAttachment {
	pub fn after_edit(self) -> Self {
		Self::Detached
	}

	pub fn after_rerun(self) -> Self {
		Self::Attached
	}

	pub fn is_attached(self) -> bool {
		matches!(self, Self::Attached)
	}
}
