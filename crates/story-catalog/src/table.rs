//! In-memory table of named columns with sorting, visibility, and selection.
//!
//! Rows keep a stable id (their insertion index) for their whole life:
//! sorting reorders them in place and filtering only toggles their hidden
//! flag, so neither changes which rows exist.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use story_core::error::{Result, StoryError};

use crate::search::SearchFilter;

/// A row as a column → value mapping.
pub type Record = HashMap<String, String>;

/// Direction of a column sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    #[must_use]
    pub fn reverse(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        })
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(format!("unknown sort order '{other}' (expected asc or desc)")),
        }
    }
}

/// One table row: values in header order plus a visibility flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    id: usize,
    values: Vec<String>,
    hidden: bool,
}

impl TableRow {
    /// Stable id, assigned in insertion order.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Values in header order.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

/// Ordered rows sharing one declared header.
#[derive(Debug, Clone)]
pub struct TableModel {
    header: Vec<String>,
    rows: Vec<TableRow>,
    /// Last applied order per column; `None` is unsorted.
    sort_state: Vec<Option<SortOrder>>,
    selected: Option<usize>,
}

impl TableModel {
    /// Create an empty table.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::SchemaMismatch`] if the header is empty or
    /// repeats a column name.
    pub fn new<I, S>(header: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let header: Vec<String> = header.into_iter().map(Into::into).collect();
        if header.is_empty() {
            return Err(StoryError::SchemaMismatch(
                "table needs at least one column".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = header.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(StoryError::SchemaMismatch(format!(
                "duplicate column '{dup}'"
            )));
        }
        Ok(Self {
            sort_state: vec![None; header.len()],
            header,
            rows: Vec::new(),
            selected: None,
        })
    }

    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in current order, hidden ones included.
    #[must_use]
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter().filter(|r| !r.hidden)
    }

    #[must_use]
    pub fn row(&self, id: usize) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Value of `column` in `row`.
    #[must_use]
    pub fn value<'a>(&self, row: &'a TableRow, column: &str) -> Option<&'a str> {
        self.column_index(column)
            .and_then(|i| row.values.get(i))
            .map(String::as_str)
    }

    /// `row` as a column → value mapping.
    #[must_use]
    pub fn record(&self, row: &TableRow) -> Record {
        self.header
            .iter()
            .cloned()
            .zip(row.values.iter().cloned())
            .collect()
    }

    /// Append a row. Its keys must be exactly the header's columns.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::SchemaMismatch`] naming the missing or
    /// unexpected columns.
    pub fn add_row(&mut self, mut record: Record) -> Result<usize> {
        let missing: Vec<&str> = self
            .header
            .iter()
            .filter(|c| !record.contains_key(c.as_str()))
            .map(String::as_str)
            .collect();
        let extra: Vec<&str> = record
            .keys()
            .filter(|k| !self.header.contains(*k))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() || !extra.is_empty() {
            return Err(StoryError::SchemaMismatch(format!(
                "row columns do not match header: missing {missing:?}, unexpected {extra:?}"
            )));
        }

        let values = self
            .header
            .iter()
            .map(|c| record.remove(c).unwrap_or_default())
            .collect();
        Ok(self.push(values))
    }

    /// Append a row given its values in header order.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::SchemaMismatch`] if the value count differs
    /// from the header length.
    pub fn add_values<I, S>(&mut self, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.len() != self.header.len() {
            return Err(StoryError::SchemaMismatch(format!(
                "expected {} values, got {}",
                self.header.len(),
                values.len()
            )));
        }
        Ok(self.push(values))
    }

    fn push(&mut self, values: Vec<String>) -> usize {
        let id = self.rows.len();
        self.rows.push(TableRow {
            id,
            values,
            hidden: false,
        });
        id
    }

    /// Last order applied to `column`, `None` if unsorted or unknown.
    #[must_use]
    pub fn sort_order(&self, column: &str) -> Option<SortOrder> {
        self.column_index(column).and_then(|i| self.sort_state[i])
    }

    /// Stably sort every row, hidden ones included, by the string value of
    /// `column`.
    ///
    /// Without an explicit `order` the direction toggles: an unsorted or
    /// descending column becomes ascending, an ascending one descending.
    /// Sorting one column resets the others to unsorted. Returns the order
    /// applied.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::SchemaMismatch`] for an unknown column.
    pub fn sort(&mut self, column: &str, order: Option<SortOrder>) -> Result<SortOrder> {
        let index = self.column_index(column).ok_or_else(|| {
            StoryError::SchemaMismatch(format!("unknown column '{column}'"))
        })?;

        let order = order.unwrap_or(match self.sort_state[index] {
            Some(SortOrder::Ascending) => SortOrder::Descending,
            None | Some(SortOrder::Descending) => SortOrder::Ascending,
        });

        self.rows.sort_by(|a, b| {
            let ord: Ordering = a.values[index].cmp(&b.values[index]);
            match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        });

        self.sort_state.iter_mut().for_each(|s| *s = None);
        self.sort_state[index] = Some(order);
        tracing::debug!(column, %order, "sorted table");
        Ok(order)
    }

    /// Hide or show one row. Returns `false` if there is no such row.
    pub fn set_hidden(&mut self, id: usize, hidden: bool) -> bool {
        match self.rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.hidden = hidden;
                if hidden && self.selected == Some(id) {
                    self.selected = None;
                }
                true
            }
            None => false,
        }
    }

    /// Recompute every row's visibility from `filter`. Rows that now match
    /// are shown again and rows that no longer match are hidden; a selected
    /// row that becomes hidden is deselected. Returns the visible count.
    pub fn apply_filter(&mut self, filter: &SearchFilter) -> usize {
        let hidden = filter.apply(&self.rows);
        for row in &mut self.rows {
            row.hidden = hidden.contains(&row.id);
        }
        if self.selected.is_some_and(|id| hidden.contains(&id)) {
            self.selected = None;
        }
        self.rows.len() - hidden.len()
    }

    /// Select row `id`, replacing any prior selection. Returns `false` if
    /// there is no such row.
    pub fn select(&mut self, id: usize) -> bool {
        if self.row(id).is_some() {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    /// Select the `index`-th visible row in current order.
    pub fn select_visible(&mut self, index: usize) -> bool {
        let id = self.visible_rows().nth(index).map(TableRow::id);
        match id {
            Some(id) => self.select(id),
            None => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<usize> {
        self.selected
    }

    /// The selected row as a column → value mapping.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::NoSelection`] if nothing is selected.
    pub fn current_selection(&self) -> Result<Record> {
        let row = self.selected_row()?;
        Ok(self.record(row))
    }

    /// One column of the selected row.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::NoSelection`] if nothing is selected and
    /// [`StoryError::SchemaMismatch`] for an unknown column.
    pub fn current_value(&self, column: &str) -> Result<&str> {
        let row = self.selected_row()?;
        self.value(row, column)
            .ok_or_else(|| StoryError::SchemaMismatch(format!("unknown column '{column}'")))
    }

    fn selected_row(&self) -> Result<&TableRow> {
        self.selected
            .and_then(|id| self.row(id))
            .ok_or(StoryError::NoSelection)
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.header.iter().position(|c| c == column)
    }
}
