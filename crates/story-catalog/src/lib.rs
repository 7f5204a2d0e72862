//! # story-catalog
//!
//! Browsing layer for Storyteller: a generic sortable, filterable
//! [`TableModel`], the [`SearchFilter`] that drives row visibility, and the
//! [`Catalog`] that snapshots a store into `Title` / `Date` / `Wordcount` rows.

pub mod catalog;
pub mod formatter;
pub mod search;
pub mod table;

pub use catalog::{Catalog, CatalogEntry, CATALOG_HEADER, COLUMN_DATE, COLUMN_TITLE, COLUMN_WORDCOUNT};
pub use formatter::OutputFormat;
pub use search::SearchFilter;
pub use table::{Record, SortOrder, TableModel, TableRow};
