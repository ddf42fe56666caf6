pub mod facets;
pub mod filter;
pub mod normalize;
pub mod preset;
pub mod query;
pub mod time_serde;

pub use facets::{Facet, FacetOption, build_facets, build_suggestions};
pub use filter::{
	EntityFilter, FacetField, FilterState, MatchMode, SavedSearchAttachment, SavedSearchContext,
};
pub use normalize::{NormalizedResult, normalize, normalize_at};
pub use preset::{PresetResolver, StandardPresets, TimeRange};
pub use query::{
	BackendRequest, BuildArgs, EntityClause, ExplicitRange, Pagination, SearchOverrides,
	WireTimeRange, build_request,
};
