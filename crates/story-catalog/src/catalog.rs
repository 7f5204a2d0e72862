//! The story catalog: a [`TableModel`] snapshot of a [`DocumentStore`].
//!
//! A catalog is rebuilt from the store whenever it changes; it is never
//! synced incrementally and never written back.

use serde::Serialize;

use story_core::codec::{self, RecordKey};
use story_core::document::OpenedDocument;
use story_core::error::{Result, StoryError};
use story_store::DocumentStore;

use crate::formatter::{format_markdown, format_table, OutputFormat};
use crate::search::SearchFilter;
use crate::table::{SortOrder, TableModel};

pub const COLUMN_TITLE: &str = "Title";
pub const COLUMN_DATE: &str = "Date";
pub const COLUMN_WORDCOUNT: &str = "Wordcount";

/// Columns shown when browsing stories.
pub const CATALOG_HEADER: [&str; 3] = [COLUMN_TITLE, COLUMN_DATE, COLUMN_WORDCOUNT];

/// One stored story as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub filename: String,
    #[serde(flatten)]
    pub key: RecordKey,
    pub word_count: usize,
}

/// Catalog rows plus the entries they were built from, indexed by row id.
#[derive(Debug, Clone)]
pub struct Catalog {
    table: TableModel,
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// List, decode, and count every story in `store`.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::MalformedRecord`] for any `.html` file whose
    /// name does not decode, and store errors from listing or reading.
    pub fn load(store: &DocumentStore) -> Result<Self> {
        let mut entries = Vec::new();
        for filename in store.list()? {
            let key = codec::decode(&filename)?;
            let word_count = store.word_count_of(&filename)?;
            entries.push(CatalogEntry {
                filename,
                key,
                word_count,
            });
        }
        let catalog = Self::from_entries(entries)?;
        tracing::debug!(root = %store.root().display(), stories = catalog.len(), "built catalog");
        Ok(catalog)
    }

    /// Build rows for `entries` in the given order.
    ///
    /// Word counts are right-aligned to a common width so that the string
    /// sort on the `Wordcount` column orders them numerically.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::SchemaMismatch`] only if the header is invalid.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self> {
        let width = entries
            .iter()
            .map(|e| e.word_count.to_string().len())
            .max()
            .unwrap_or(1);

        let mut table = TableModel::new(CATALOG_HEADER)?;
        for entry in &entries {
            table.add_values([
                entry.key.title.clone(),
                entry.key.date.format("%Y-%m-%d").to_string(),
                format!("{:>width$}", entry.word_count),
            ])?;
        }
        Ok(Self { table, entries })
    }

    #[must_use]
    pub fn table(&self) -> &TableModel {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableModel {
        &mut self.table
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry behind row `id`.
    #[must_use]
    pub fn entry(&self, id: usize) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    /// Entries for the visible rows, in current table order.
    pub fn visible_entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.table
            .visible_rows()
            .filter_map(|row| self.entries.get(row.id()))
    }

    /// Render the visible rows. JSON lists entries with numeric word counts.
    #[must_use]
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => format_table(&self.table),
            OutputFormat::Markdown => format_markdown(&self.table),
            OutputFormat::Json => {
                let entries: Vec<&CatalogEntry> = self.visible_entries().collect();
                serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`StoryError::SchemaMismatch`] for an unknown column.
    pub fn sort(&mut self, column: &str, order: Option<SortOrder>) -> Result<SortOrder> {
        self.table.sort(column, order)
    }

    /// Narrow the visible rows to those matching `query`. Returns the number
    /// of rows left visible.
    pub fn search(&mut self, query: &str, case_sensitive: bool) -> usize {
        self.table
            .apply_filter(&SearchFilter::new(query, case_sensitive))
    }

    /// # Errors
    ///
    /// Returns [`StoryError::NoSelection`] if no row is selected.
    pub fn selected_entry(&self) -> Result<&CatalogEntry> {
        self.table
            .selected_id()
            .and_then(|id| self.entries.get(id))
            .ok_or(StoryError::NoSelection)
    }

    /// Read the selected story from `store`.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::NoSelection`] if no row is selected, plus any
    /// [`DocumentStore::open`] error.
    pub fn open_selected(&self, store: &DocumentStore) -> Result<OpenedDocument> {
        let entry = self.selected_entry()?;
        store.open(&entry.filename)
    }
}
