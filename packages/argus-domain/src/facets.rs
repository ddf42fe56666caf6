use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::normalize::NormalizedResult;

pub const SOURCE_FACET: &str = "source";
pub const TAXONOMY_FACET: &str = "taxonomy";
pub const MAX_TAG_SUGGESTIONS: usize = 5;
pub const MAX_TITLE_SUGGESTIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOption {
	pub value: String,
	pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
	pub field: String,
	pub label: String,
	pub options: Vec<FacetOption>,
}

/// Counts values in first-seen order.
#[derive(Default)]
struct Counter {
	index: AHashMap<String, usize>,
	options: Vec<FacetOption>,
}
impl Counter {
	fn add(&mut self, value: &str) {
		if let Some(&slot) = self.index.get(value) {
			self.options[slot].count += 1;

			return;
		}

		self.index.insert(value.to_string(), self.options.len());
		self.options.push(FacetOption { value: value.to_string(), count: 1 });
	}

	fn into_facet(self, field: &str, label: &str) -> Option<Facet> {
		if self.options.is_empty() {
			return None;
		}

		Some(Facet { field: field.to_string(), label: label.to_string(), options: self.options })
	}
}

/// Facets computed from the page on screen; the backend's own counts are ignored.
pub fn build_facets(results: &[NormalizedResult]) -> Vec<Facet> {
	let mut sources = Counter::default();
	let mut tags = Counter::default();

	for result in results {
		sources.add(&result.source);

		for tag in &result.tags {
			tags.add(tag);
		}
	}

	[sources.into_facet(SOURCE_FACET, "Source"), tags.into_facet(TAXONOMY_FACET, "Taxonomy")]
		.into_iter()
		.flatten()
		.collect()
}

/// Up to five distinct tags in encounter order, or the first three titles when the page has no
/// tags at all.
pub fn build_suggestions(results: &[NormalizedResult]) -> Vec<String> {
	let mut suggestions: Vec<String> = Vec::with_capacity(MAX_TAG_SUGGESTIONS);

	for tag in results.iter().flat_map(|result| result.tags.iter()) {
		if suggestions.len() == MAX_TAG_SUGGESTIONS {
			break;
		}
		if !suggestions.contains(tag) {
			suggestions.push(tag.clone());
		}
	}

	if suggestions.is_empty() {
		suggestions =
			results.iter().take(MAX_TITLE_SUGGESTIONS).map(|result| result.title.clone()).collect();
	}

	suggestions
}
