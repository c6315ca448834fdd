//! Multi-criteria location search.
//!
//! [`SearchQuery`] describes optional predicates and an ordering;
//! [`SearchEngine`] evaluates it against the repository. The pure functions
//! [`apply_query`], [`nearby`] and [`summarise`] do the in-memory work and can
//! be used on any slice of locations.

mod engine;
mod query;

pub use engine::{AvailabilityStatus, SearchEngine, apply_query, nearby, summarise};
pub use query::{LocationMatch, Origin, ParseSortKeyError, Radius, SearchQuery, SortKey};
