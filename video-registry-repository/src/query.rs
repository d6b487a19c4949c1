//! Query builder for list and search requests.
//!
//! Produces the store's native query DSL as `serde_json::Value`. Searches use
//! a `simple_query_string` over title and description with OR semantics.

use std::collections::HashSet;

use serde_json::{json, Value};
use video_registry_shared::SearchText;

/// Query DSL key for simple query string searches.
pub const SIMPLE_QUERY_STRING_KEY: &str = "simple_query_string";

/// Fields matched by a free-text search.
pub const SEARCH_FIELDS: [&str; 2] = ["title", "description"];

/// Boolean operator placed between search terms.
pub const DEFAULT_OPERATOR: &str = "OR";

/// Predicate matching every document.
pub fn all_documents() -> Value {
    json!({ "match_all": {} })
}

/// Split a search input into the terms that will be OR-ed together.
///
/// Plain text has its quote characters removed and is split on whitespace,
/// keeping word order. A list of terms is deduplicated first, so its order is
/// not kept.
pub fn search_terms(text: &SearchText) -> Vec<String> {
    match text {
        SearchText::Text(text) => text
            .replace(['"', '\''], "")
            .split_whitespace()
            .map(str::to_string)
            .collect(),
        SearchText::Terms(terms) => terms
            .iter()
            .cloned()
            .collect::<HashSet<String>>()
            .into_iter()
            .collect(),
    }
}

/// The query string sent to the store, e.g. `football OR match`.
pub fn query_string(text: &SearchText) -> String {
    search_terms(text).join(&format!(" {} ", DEFAULT_OPERATOR))
}

/// Predicate for a free-text search over title and description.
pub fn search_query(text: &SearchText) -> Value {
    json!({
        SIMPLE_QUERY_STRING_KEY: {
            "query": query_string(text),
            "fields": SEARCH_FIELDS,
            "default_operator": DEFAULT_OPERATOR,
        }
    })
}

/// A parsed sort field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub descending: bool,
}

impl SortSpec {
    /// Parse `-field` (descending), `+field` or `field` (ascending).
    pub fn parse(sort: &str) -> Self {
        let sort = sort.trim();
        match sort.strip_prefix('-') {
            Some(field) => Self {
                field: field.to_string(),
                descending: true,
            },
            None => Self {
                field: sort.trim_start_matches('+').to_string(),
                descending: false,
            },
        }
    }

    /// Sort clause in the store's query DSL.
    pub fn to_clause(&self) -> Value {
        let order = if self.descending { "desc" } else { "asc" };
        json!({ self.field.as_str(): { "order": order } })
    }
}

/// Full request body for one window of a list or search query.
pub fn request_body(query: Value, sort: &str, offset: usize, limit: usize) -> Value {
    json!({
        "query": query,
        "sort": [SortSpec::parse(sort).to_clause()],
        "from": offset,
        "size": limit,
    })
}
