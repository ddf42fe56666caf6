//! Normalization of raw hybrid-search entries.
//!
//! A raw entry may carry a `record` (structured store), a `vector` (semantic store), both, or
//! neither. Each output field is resolved by its own ordered list of probes so the fallback
//! policy for one field never leaks into another.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Duration, OffsetDateTime};

pub const MAX_TAGS: usize = 8;
pub const MAX_SNIPPET_CHARS: usize = 280;
pub const MAX_TITLE_CHARS: usize = 120;
pub const DEFAULT_TITLE: &str = "Result";
pub const EMPTY_SNIPPET: &str = "This result has no excerpt available.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResult {
	pub id: String,
	pub title: String,
	pub snippet: String,
	pub source: String,
	pub tags: Vec<String>,
	pub score: f64,
	#[serde(with = "crate::time_serde")]
	pub occurred_at: OffsetDateTime,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub confidence: Option<f64>,
}

pub fn normalize(entry: &Value, index: usize) -> NormalizedResult {
	normalize_at(entry, index, OffsetDateTime::now_utc())
}

/// Same as [`normalize`] with an explicit clock for entries lacking a usable timestamp.
pub fn normalize_at(entry: &Value, index: usize, now: OffsetDateTime) -> NormalizedResult {
	NormalizedResult {
		id: resolve_id(entry, index),
		title: resolve_title(entry),
		snippet: resolve_snippet(entry),
		source: resolve_source(entry),
		tags: resolve_tags(entry),
		score: resolve_score(entry),
		occurred_at: resolve_occurred_at(entry).unwrap_or(now),
		confidence: record(entry)
			.and_then(|record| record.get("confidence"))
			.and_then(Value::as_f64),
	}
}

pub fn resolve_id(entry: &Value, index: usize) -> String {
	record(entry)
		.and_then(|record| scalar_string(record.get("case_id")))
		.or_else(|| scalar_string(entry.get("case_id")))
		.unwrap_or_else(|| format!("result-{index}"))
}

pub fn resolve_title(entry: &Value) -> String {
	let record = record(entry);
	let vector = vector(entry);

	record
		.and_then(|record| record.get("metadata"))
		.and_then(|metadata| non_blank(metadata.get("title")))
		.map(str::to_string)
		.or_else(|| record.and_then(|record| scalar_string(record.get("case_id"))))
		.or_else(|| record.and_then(|record| first_line(record.get("text"))))
		.or_else(|| vector.and_then(|vector| first_line(vector.get("text"))))
		.unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

pub fn resolve_snippet(entry: &Value) -> String {
	let record = record(entry);
	let vector = vector(entry);
	let body = record
		.and_then(|record| non_blank(record.get("text")))
		.or_else(|| vector.and_then(|vector| non_blank(vector.get("text"))))
		.or_else(|| vector.and_then(|vector| non_blank(vector.get("document"))));

	if let Some(body) = body {
		return truncate_chars(body, MAX_SNIPPET_CHARS);
	}

	let classification = record
		.and_then(|record| non_blank(record.get("classification")))
		.or_else(|| vector.and_then(|vector| non_blank(vector.get("classification"))))
		.or_else(|| {
			entry.get("metadata").and_then(|metadata| non_blank(metadata.get("classification")))
		});

	match classification {
		Some(classification) => truncate_chars(
			&format!("Matched {} intelligence; no excerpt available.", classification.trim()),
			MAX_SNIPPET_CHARS,
		),
		None => EMPTY_SNIPPET.to_string(),
	}
}

/// Fuses the heterogeneous score conventions of both stores into `[0, 1]`.
///
/// Values above 1 are percentages, negative values are distances, anything else is already a
/// similarity.
pub fn resolve_score(entry: &Value) -> f64 {
	let vector = vector(entry);
	let candidate = entry
		.get("score")
		.and_then(Value::as_f64)
		.or_else(|| vector.and_then(|vector| vector.get("similarity")).and_then(Value::as_f64))
		.or_else(|| vector.and_then(|vector| vector.get("score")).and_then(Value::as_f64))
		.or_else(|| vector.and_then(|vector| vector.get("distance")).and_then(Value::as_f64))
		.unwrap_or(0.0);

	fuse_score(candidate)
}

pub fn fuse_score(candidate: f64) -> f64 {
	let unit = if !candidate.is_finite() {
		0.0
	} else if candidate > 1.0 {
		(candidate / 100.0).min(1.0)
	} else if candidate < 0.0 {
		1.0 / (1.0 + candidate.abs())
	} else {
		candidate
	};

	(unit.clamp(0.0, 1.0) * 100.0).round() / 100.0
}

pub fn resolve_source(entry: &Value) -> String {
	match entry.get("sources") {
		Some(Value::Array(items)) if !items.is_empty() => {
			let has = |marker: &str| items.iter().any(|item| item.as_str() == Some(marker));

			if has("structured") && has("vector") {
				return "hybrid".to_string();
			}
			if let Some(first) = non_blank(items.first()) {
				return first.to_string();
			}
		},
		Some(Value::String(label)) if !label.trim().is_empty() => return label.clone(),
		_ => {},
	}

	if vector(entry).is_some() {
		"vector".to_string()
	} else if record(entry).is_some() {
		"structured".to_string()
	} else {
		"unknown".to_string()
	}
}

pub fn resolve_tags(entry: &Value) -> Vec<String> {
	let mut tags = TagSet::default();

	if let Some(record) = record(entry) {
		tags.push(non_blank(record.get("classification")));

		if let Some(items) = record
			.get("metadata")
			.and_then(|metadata| metadata.get("tags"))
			.and_then(Value::as_array)
		{
			items.iter().for_each(|item| tags.push(non_blank(Some(item))));
		}
		if let Some(entities) = record.get("entities").and_then(Value::as_object) {
			for values in entities.values().filter_map(Value::as_array) {
				values.iter().for_each(|item| tags.push(non_blank(Some(item))));
			}
		}
	}

	tags.push(vector(entry).and_then(|vector| non_blank(vector.get("label"))));

	tags.into_vec()
}

/// Timestamps that cannot be written back as RFC 3339 (years outside 0..=9999) are dropped.
pub fn resolve_occurred_at(entry: &Value) -> Option<OffsetDateTime> {
	let parsed = match record(entry)?.get("created_at")? {
		Value::String(raw) => crate::time_serde::parse_lenient(raw),
		Value::Number(millis) => {
			let millis = millis.as_i64()?;

			OffsetDateTime::UNIX_EPOCH.checked_add(Duration::milliseconds(millis))
		},
		_ => None,
	};

	parsed.filter(|value| crate::time_serde::format_rfc3339(*value).is_some())
}

#[derive(Default)]
struct TagSet {
	items: Vec<String>,
}
impl TagSet {
	fn push(&mut self, tag: Option<&str>) {
		let Some(tag) = tag else {
			return;
		};

		if self.items.len() < MAX_TAGS && !self.items.iter().any(|existing| existing == tag) {
			self.items.push(tag.to_string());
		}
	}

	fn into_vec(self) -> Vec<String> {
		self.items
	}
}

fn record(entry: &Value) -> Option<&Value> {
	entry.get("record").filter(|value| value.is_object())
}

fn vector(entry: &Value) -> Option<&Value> {
	entry.get("vector").filter(|value| value.is_object())
}

fn non_blank(value: Option<&Value>) -> Option<&str> {
	value.and_then(Value::as_str).filter(|text| !text.trim().is_empty())
}

/// Strings pass through; numeric identifiers are rendered as text.
fn scalar_string(value: Option<&Value>) -> Option<String> {
	match value? {
		Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
		Value::Number(number) => Some(number.to_string()),
		_ => None,
	}
}

fn first_line(value: Option<&Value>) -> Option<String> {
	let line = non_blank(value)?.lines().map(str::trim).find(|line| !line.is_empty())?;

	Some(truncate_chars(line, MAX_TITLE_CHARS))
}

fn truncate_chars(text: &str, max: usize) -> String {
	match text.char_indices().nth(max) {
		Some((byte_index, _)) => text[..byte_index].to_string(),
		None => text.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn truncates_on_char_boundaries() {
		assert_eq!(truncate_chars("héllo", 2), "hé");
		assert_eq!(truncate_chars("abc", 10), "abc");
	}

	#[test]
	fn fuse_score_keeps_exact_thresholds() {
		assert_eq!(fuse_score(1.0), 1.0);
		assert_eq!(fuse_score(0.0), 0.0);
		assert_eq!(fuse_score(50.0), 0.5);
		assert_eq!(fuse_score(250.0), 1.0);
		assert_eq!(fuse_score(-1.0), 0.5);
		assert_eq!(fuse_score(0.456), 0.46);
	}

	#[test]
	fn first_line_skips_leading_blank_lines() {
		let value = Value::String("\n\n  Wallet drained \nsecond".to_string());

		assert_eq!(first_line(Some(&value)).as_deref(), Some("Wallet drained"));
	}
}
