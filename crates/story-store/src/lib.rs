//! # story-store
//!
//! File system storage for Storyteller.
//!
//! The store directory is the authoritative source of truth: each story is a
//! `<YYYY-MM-DD> <title>.html` file, and the catalog is derived from the
//! directory listing rather than kept in a database.

pub mod store;
pub mod titles;
pub mod watcher;

pub use store::DocumentStore;
pub use titles::{TitleList, TITLES_FILE};
pub use watcher::{StoreEvent, StoreWatcher};
