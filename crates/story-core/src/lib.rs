//! # story-core
//!
//! Core types for Storyteller, a word-count goal tracker with a
//! filename-indexed story catalog.
//!
//! - [`count_words`]: whitespace token counting
//! - [`ChangeDebouncer`] / [`DebounceHandle`]: trailing-edge debouncing
//! - [`DebouncedWordCount`]: live editor word count with change-only publishing
//! - [`GoalStatus`]: word count against the goal
//! - [`codec`]: `<YYYY-MM-DD> <title>.html` record keys
//! - [`Document`] / [`OpenedDocument`]: stored markup
//! - [`StoryConfig`]: TOML configuration
//! - Error taxonomy ([`StoryError`])

pub mod codec;
pub mod config;
pub mod debounce;
pub mod document;
pub mod editor;
pub mod error;
pub mod goal;
pub mod wordcount;

pub use codec::RecordKey;
pub use config::StoryConfig;
pub use debounce::{ChangeDebouncer, DebounceHandle};
pub use document::{Document, OpenedDocument};
pub use editor::{DebouncedWordCount, WordCountTracker};
pub use error::{Result, StoryError};
pub use goal::GoalStatus;
pub use wordcount::count_words;
