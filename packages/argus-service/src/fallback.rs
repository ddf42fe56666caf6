//! Built-in dataset served when the live backend cannot answer.

use std::{sync::LazyLock, time::Instant};

use serde_json::{Value, json};
use time::OffsetDateTime;

use argus_domain::{BackendRequest, NormalizedResult, Pagination, normalize_at};

use crate::search::{SearchResponse, SearchStats, elapsed_ms};

static DATASET: LazyLock<Vec<NormalizedResult>> = LazyLock::new(|| {
	raw_entries()
		.iter()
		.enumerate()
		.map(|(index, entry)| normalize_at(entry, index, OffsetDateTime::UNIX_EPOCH))
		.collect()
});

pub fn dataset() -> &'static [NormalizedResult] {
	&DATASET
}

/// Applies the query, source and taxonomy predicates of `request` to the dataset, then pages.
pub fn search(request: &BackendRequest, pagination: Pagination, started: Instant) -> SearchResponse {
	let needle = request.text.trim().to_lowercase();
	let matched: Vec<&NormalizedResult> =
		dataset().iter().filter(|result| matches(result, request, &needle)).collect();
	let total = matched.len() as u64;
	let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
	let page: Vec<NormalizedResult> = matched
		.into_iter()
		.skip(offset)
		.take(pagination.page_size as usize)
		.cloned()
		.collect();
	let stats = SearchStats {
		query: request.text.clone(),
		total,
		took: elapsed_ms(started),
		page: pagination.page,
		page_size: pagination.page_size,
	};

	SearchResponse::from_page(page, stats)
}

fn matches(result: &NormalizedResult, request: &BackendRequest, needle: &str) -> bool {
	let text_hit = needle.is_empty()
		|| result.title.to_lowercase().contains(needle)
		|| result.snippet.to_lowercase().contains(needle)
		|| result.tags.iter().any(|tag| tag.to_lowercase().contains(needle));
	let source_hit = request.sources.is_empty() || request.sources.contains(&result.source);
	let taxonomy_hit = request.classifications.is_empty()
		|| result.tags.iter().any(|tag| request.classifications.contains(tag));

	text_hit && source_hit && taxonomy_hit
}

fn raw_entries() -> Vec<Value> {
	vec![
		json!({
			"sources": ["structured", "vector"],
			"score": 0.94,
			"record": {
				"case_id": "CASE-1001",
				"text": "Victim reported a long-running romance scam that moved into a fake crypto trading platform. Funds were routed through three intermediary wallets before reaching an exchange deposit address.",
				"classification": "romance_scam",
				"metadata": { "title": "Romance scam escalates into fake trading platform", "tags": ["crypto", "investment"] },
				"entities": { "wallets": ["0x9f3c1e7d"], "domains": ["tradewave-pro.example"] },
				"created_at": "2024-09-14T08:12:00Z",
				"confidence": 0.88
			},
			"vector": { "label": "pig_butchering", "similarity": 0.91 }
		}),
		json!({
			"sources": ["structured"],
			"score": 87,
			"record": {
				"case_id": "CASE-1002",
				"text": "Ponzi-style investment club promising 4% weekly returns. Recruitment happens in closed messaging groups with referral bonuses paid from new deposits.",
				"classification": "ponzi",
				"metadata": { "title": "Weekly-return investment club", "tags": ["investment", "referral"] },
				"entities": { "channels": ["@weeklyyield"] },
				"created_at": "2024-08-02T17:45:00Z",
				"confidence": 0.73
			}
		}),
		json!({
			"sources": ["vector"],
			"vector": {
				"label": "phishing",
				"text": "Credential phishing kit imitating a regional bank login page, hosted on freshly registered look-alike domains.",
				"similarity": 0.82,
				"classification": "phishing"
			}
		}),
		json!({
			"sources": ["structured"],
			"score": 0.67,
			"record": {
				"case_id": "CASE-1004",
				"text": "Impersonation of a parcel carrier via SMS. Links lead to a payment page collecting card details for a small redelivery fee.",
				"classification": "impersonation",
				"metadata": { "title": "Parcel redelivery SMS lure", "tags": ["smishing", "card_fraud"] },
				"entities": { "domains": ["redeliver-now.example"], "phones": ["+15550104477"] },
				"created_at": "2024-10-01T09:00:00Z"
			}
		}),
		json!({
			"sources": ["structured", "vector"],
			"score": 78,
			"record": {
				"case_id": "CASE-1005",
				"text": "Fake exchange withholding withdrawals until a so-called tax is paid. Support agents escalate pressure with fabricated compliance notices.",
				"classification": "fake_exchange",
				"metadata": { "title": "Exchange demands withdrawal tax", "tags": ["crypto", "advance_fee"] },
				"entities": { "domains": ["coinvault-global.example"] },
				"created_at": "2024-07-21T13:30:00Z",
				"confidence": 0.91
			},
			"vector": { "label": "fake_exchange", "distance": -0.4 }
		}),
		json!({
			"sources": "osint",
			"score": 0.55,
			"record": {
				"case_id": "CASE-1006",
				"text": "Tech-support scam pop-ups instructing victims to call a toll-free number and install remote access tools.",
				"classification": "tech_support",
				"metadata": { "tags": ["remote_access"] },
				"entities": { "phones": ["+18005550199"] },
				"created_at": "2024-06-11T22:05:00Z"
			}
		}),
		json!({
			"sources": ["vector"],
			"vector": {
				"label": "investment",
				"document": "Investment seminar transcript pitching guaranteed returns on a private pre-IPO allocation.",
				"distance": -1.5
			}
		}),
		json!({
			"sources": ["structured"],
			"score": 0.61,
			"record": {
				"case_id": "CASE-1008",
				"text": "Business email compromise redirecting a supplier invoice payment to a newly opened account.",
				"classification": "bec",
				"metadata": { "title": "Supplier invoice redirection", "tags": ["wire_fraud"] },
				"entities": { "emails": ["accounts@supp1ier-billing.example"] },
				"created_at": "2024-05-30T11:20:00Z",
				"confidence": 0.64
			}
		}),
		json!({
			"sources": ["structured", "vector"],
			"score": 0.72,
			"record": {
				"case_id": "CASE-1009",
				"text": "Recovery scam targeting previous crypto fraud victims, promising to retrieve lost funds for an upfront fee.",
				"classification": "recovery_scam",
				"metadata": { "title": "Fund recovery service targets prior victims", "tags": ["crypto", "advance_fee"] },
				"created_at": "2024-09-03T15:10:00Z"
			},
			"vector": { "label": "recovery_scam", "similarity": 0.7 }
		}),
		json!({
			"sources": ["structured"],
			"score": 58,
			"record": {
				"case_id": "CASE-1010",
				"text": "Job offer scam asking applicants to review products and prepay for task bundles that unlock commissions.",
				"classification": "task_scam",
				"metadata": { "title": "Paid review task bundles", "tags": ["employment", "crypto"] },
				"entities": { "channels": ["@taskhub_rewards"] },
				"created_at": "2024-10-12T07:55:00Z"
			}
		}),
		json!({
			"sources": ["vector"],
			"vector": {
				"label": "romance_scam",
				"text": "Dating-app profile network reusing stock photos, moving conversations off-platform within a day.",
				"similarity": 0.64
			}
		}),
		json!({
			"sources": ["structured"],
			"score": 0.49,
			"record": {
				"case_id": "CASE-1012",
				"text": "Charity impersonation soliciting disaster relief donations through gift cards.",
				"classification": "impersonation",
				"metadata": { "title": "Disaster relief gift card appeal", "tags": ["charity", "gift_cards"] },
				"created_at": "2024-04-18T19:40:00Z"
			}
		}),
	]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dataset_is_normalized_and_stable() {
		let first = dataset();
		let second = dataset();

		assert_eq!(first.len(), 12);
		assert!(std::ptr::eq(first, second));
		assert!(first.iter().all(|result| (0.0..=1.0).contains(&result.score)));
		assert!(first.iter().all(|result| !result.title.is_empty() && !result.snippet.is_empty()));

		let ids: std::collections::HashSet<_> = first.iter().map(|result| &result.id).collect();

		assert_eq!(ids.len(), first.len());
	}
}
