//! Per-kind substring search entry points.
//!
//! # Responsibility
//! - Expose case-insensitive "contains" search over each record kind.
//! - Register the SQL helper the search queries depend on.
//!
//! # Invariants
//! - Blank search text returns the unfiltered listing.
//! - Results keep primary-key order and are never paginated.

pub mod contains;

pub use contains::{
    register_search_functions, search, search_kind, search_or_empty, Listing, SearchError,
    SearchOutcome, SearchResult, Searchable,
};
