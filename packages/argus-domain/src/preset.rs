use time::{Duration, OffsetDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
	pub start: OffsetDateTime,
	pub end: OffsetDateTime,
}

/// Expands a named time preset into absolute bounds.
pub trait PresetResolver
where
	Self: Send + Sync,
{
	fn resolve(&self, preset: &str, now: OffsetDateTime) -> Option<TimeRange>;
}

/// Rolling windows ending at `now`: `1h`, `24h`, `7d`, `30d`, `90d` and `1y`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPresets;
impl PresetResolver for StandardPresets {
	fn resolve(&self, preset: &str, now: OffsetDateTime) -> Option<TimeRange> {
		let key = preset.trim().to_ascii_lowercase();
		let key = key.strip_prefix("last_").unwrap_or(&key);
		let span = match key {
			"1h" | "hour" => Duration::hours(1),
			"24h" | "day" => Duration::hours(24),
			"7d" | "week" => Duration::days(7),
			"30d" | "month" => Duration::days(30),
			"90d" | "quarter" => Duration::days(90),
			"1y" | "year" => Duration::days(365),
			_ => return None,
		};

		Some(TimeRange { start: now - span, end: now })
	}
}
