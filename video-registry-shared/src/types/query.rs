//! Query inputs accepted by the read API.

use serde::{Deserialize, Serialize};

/// Largest page a caller may request.
pub const MAX_LIMIT: usize = 2000;

/// Largest offset a caller may request.
pub const MAX_OFFSET: usize = 10000;

/// Page size used when the caller does not give one.
pub const DEFAULT_LIMIT: usize = 50;

/// Sort applied when the caller does not give one: newest first.
pub const DEFAULT_SORT: &str = "-published_at";

/// Free-text search input.
///
/// Plain text keeps the order of its words. A list of terms is deduplicated
/// and does not keep its order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchText {
    Text(String),
    Terms(Vec<String>),
}

impl SearchText {
    /// Returns true if there is nothing to search for.
    pub fn is_blank(&self) -> bool {
        match self {
            SearchText::Text(text) => text.trim().is_empty(),
            SearchText::Terms(terms) => terms.iter().all(|t| t.trim().is_empty()),
        }
    }
}

impl From<&str> for SearchText {
    fn from(text: &str) -> Self {
        SearchText::Text(text.to_string())
    }
}

impl From<String> for SearchText {
    fn from(text: String) -> Self {
        SearchText::Text(text)
    }
}

impl From<Vec<String>> for SearchText {
    fn from(terms: Vec<String>) -> Self {
        SearchText::Terms(terms)
    }
}

/// Offset/limit window with an optional sort field.
///
/// A sort field may carry a leading `+` (ascending) or `-` (descending).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            sort: None,
        }
    }
}

impl PageRequest {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self {
            limit,
            offset,
            sort: None,
        }
    }

    /// Set an explicit sort field.
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// The sort field to apply, falling back to [`DEFAULT_SORT`].
    pub fn sort_or_default(&self) -> &str {
        self.sort
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SORT)
    }

    /// Validate the window against the read API bounds.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(format!("limit must be between 1 and {}", MAX_LIMIT));
        }
        if self.offset > MAX_OFFSET {
            return Err(format!("offset must be between 0 and {}", MAX_OFFSET));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_bounds() {
        assert!(PageRequest::new(1, 0).validate().is_ok());
        assert!(PageRequest::new(MAX_LIMIT, MAX_OFFSET).validate().is_ok());
        assert!(PageRequest::new(0, 0).validate().is_err());
        assert!(PageRequest::new(MAX_LIMIT + 1, 0).validate().is_err());
        assert!(PageRequest::new(10, MAX_OFFSET + 1).validate().is_err());
    }

    #[test]
    fn test_sort_default() {
        assert_eq!(PageRequest::default().sort_or_default(), "-published_at");
        assert_eq!(
            PageRequest::default().with_sort("+title").sort_or_default(),
            "+title"
        );
        assert_eq!(
            PageRequest::default().with_sort("  ").sort_or_default(),
            "-published_at"
        );
    }

    #[test]
    fn test_search_text_blank() {
        assert!(SearchText::from("   ").is_blank());
        assert!(SearchText::Terms(vec![]).is_blank());
        assert!(!SearchText::from("goal").is_blank());
        assert!(!SearchText::Terms(vec!["a".to_string()]).is_blank());
    }

    #[test]
    fn test_search_text_untagged() {
        let text: SearchText = serde_json::from_str("\"football\"").unwrap();
        assert_eq!(text, SearchText::Text("football".to_string()));

        let terms: SearchText = serde_json::from_str("[\"a\",\"b\"]").unwrap();
        assert_eq!(
            terms,
            SearchText::Terms(vec!["a".to_string(), "b".to_string()])
        );
    }
}
