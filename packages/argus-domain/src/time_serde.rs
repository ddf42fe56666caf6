use serde::{Deserialize, Deserializer, Serializer};
use time::{
	Date, OffsetDateTime, PrimitiveDateTime, Time,
	format_description::well_known::{Iso8601, Rfc3339},
	macros::format_description,
};

pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let formatted = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;

	serializer.serialize_str(&formatted)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = String::deserialize(deserializer)?;

	parse_lenient(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}'")))
}

/// Parses RFC 3339, ISO 8601 (offset optional, UTC assumed) or a bare `YYYY-MM-DD` date.
pub fn parse_lenient(raw: &str) -> Option<OffsetDateTime> {
	let raw = raw.trim();

	if raw.is_empty() {
		return None;
	}
	if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
		return Some(value);
	}
	if let Ok(value) = OffsetDateTime::parse(raw, &Iso8601::DEFAULT) {
		return Some(value);
	}
	if let Ok(value) = PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT) {
		return Some(value.assume_utc());
	}

	Date::parse(raw, format_description!("[year]-[month]-[day]"))
		.ok()
		.map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc())
}

pub fn format_rfc3339(value: OffsetDateTime) -> Option<String> {
	value.format(&Rfc3339).ok()
}
