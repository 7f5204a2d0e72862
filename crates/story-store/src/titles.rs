//! Newline-delimited list of known story titles.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use story_core::codec::validate_title;
use story_core::error::Result;

use crate::store::{write_atomic, DocumentStore};

/// Name of the title list inside the store directory.
pub const TITLES_FILE: &str = "titles.txt";

/// A plain text file with one title per line.
#[derive(Debug, Clone)]
pub struct TitleList {
    path: PathBuf,
}

impl TitleList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The title list kept alongside the stories in `store`.
    #[must_use]
    pub fn for_store(store: &DocumentStore) -> Self {
        Self::new(store.root().join(TITLES_FILE))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every title, sorted. Creates an empty file if none exists.
    ///
    /// # Errors
    ///
    /// Returns [`story_core::StoryError::Storage`] on I/O failure.
    pub fn load(&self) -> Result<Vec<String>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.create_empty()?;
                String::new()
            }
            Err(e) => return Err(e.into()),
        };

        let mut titles: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        titles.sort();
        Ok(titles)
    }

    /// Add `title` unless it is already listed. Returns whether it was added.
    ///
    /// # Errors
    ///
    /// Returns [`story_core::StoryError::InvalidTitle`] for unusable titles
    /// and [`story_core::StoryError::Storage`] on I/O failure.
    pub fn add(&self, title: &str) -> Result<bool> {
        let title = validate_title(title)?;
        let mut titles = self.load()?;
        if titles.iter().any(|t| t == title) {
            return Ok(false);
        }
        titles.push(title.to_string());
        self.replace(&titles)?;
        tracing::debug!(title, "added title");
        Ok(true)
    }

    /// Rewrite the whole file with `titles`, one per line.
    ///
    /// # Errors
    ///
    /// Returns [`story_core::StoryError::Storage`] on I/O failure.
    pub fn replace(&self, titles: &[String]) -> Result<()> {
        let mut text = titles.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        write_atomic(self.dir(), &self.path, text.as_bytes())
    }

    fn create_empty(&self) -> Result<()> {
        fs::create_dir_all(self.dir())?;
        fs::write(&self.path, "")?;
        Ok(())
    }

    fn dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let list = TitleList::new(dir.path().join("nested").join(TITLES_FILE));
        assert!(list.load().unwrap().is_empty());
        assert!(list.path().is_file());
    }

    #[test]
    fn load_sorts_and_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let list = TitleList::new(dir.path().join(TITLES_FILE));
        fs::write(list.path(), "Zebra\n\n  Apple  \nMango\n").unwrap();
        assert_eq!(list.load().unwrap(), vec!["Apple", "Mango", "Zebra"]);
    }

    #[test]
    fn add_appends_unique_titles() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let list = TitleList::for_store(&store);

        assert!(list.add("Second").unwrap());
        assert!(list.add(" First ").unwrap());
        assert!(!list.add("Second").unwrap());
        assert_eq!(list.load().unwrap(), vec!["First", "Second"]);

        // not picked up as a story
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn add_rejects_invalid_title() {
        let dir = tempfile::tempdir().unwrap();
        let list = TitleList::new(dir.path().join(TITLES_FILE));
        assert!(list.add("a/b").is_err());
        assert!(list.add("   ").is_err());
    }

    #[test]
    fn multiline_title_never_reaches_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let list = TitleList::new(dir.path().join(TITLES_FILE));
        assert!(list.add("Kept").unwrap());

        assert!(matches!(
            list.add("Night\nDay"),
            Err(story_core::StoryError::InvalidTitle { .. })
        ));
        assert!(list.add("Night\r\nDay").is_err());
        assert_eq!(list.load().unwrap(), vec!["Kept"]);
    }
}
