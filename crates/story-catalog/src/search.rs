//! Substring search over table rows.

use std::collections::HashSet;

use crate::table::TableRow;

/// A query and its case sensitivity, applied to every column of a row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    query: String,
    case_sensitive: bool,
    /// Lowercased query, precomputed for case-insensitive matching.
    folded: String,
}

impl SearchFilter {
    pub fn new(query: impl Into<String>, case_sensitive: bool) -> Self {
        let query = query.into();
        let folded = if case_sensitive {
            String::new()
        } else {
            query.to_lowercase()
        };
        Self {
            query,
            case_sensitive,
            folded,
        }
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// An empty query matches everything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// Whether any of `values` contains the query.
    pub fn matches<'a, I>(&self, values: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        if self.is_empty() {
            return true;
        }
        values.into_iter().any(|value| {
            if self.case_sensitive {
                value.contains(self.query.as_str())
            } else {
                value.to_lowercase().contains(self.folded.as_str())
            }
        })
    }

    /// Ids of the rows that should be hidden. Every row is recomputed.
    #[must_use]
    pub fn apply(&self, rows: &[TableRow]) -> HashSet<usize> {
        if self.is_empty() {
            return HashSet::new();
        }
        rows.iter()
            .filter(|row| !self.matches(row.values().iter().map(String::as_str)))
            .map(TableRow::id)
            .collect()
    }
}
