//! Directory-backed document store.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use story_core::codec::{self, EXTENSION};
use story_core::document::{Document, OpenedDocument};
use story_core::error::{Result, StoryError};
use story_core::wordcount::count_words;

/// A flat directory of `<date> <title>.html` files.
///
/// The directory is the source of truth; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of all `.html` files, in directory enumeration order.
    ///
    /// A missing directory is an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::Storage`] if the directory cannot be read and
    /// [`StoryError::MalformedRecord`] for a story whose name is not UTF-8.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(root = %self.root.display(), "store directory missing, nothing to list");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !has_store_extension(&path) || !path.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    return Err(StoryError::MalformedRecord {
                        filename: raw.to_string_lossy().into_owned(),
                        reason: "filename is not valid UTF-8".to_string(),
                    });
                }
            }
        }
        tracing::debug!(root = %self.root.display(), count = names.len(), "listed stories");
        Ok(names)
    }

    /// # Errors
    ///
    /// Returns [`StoryError::NotFound`] if there is no such file and
    /// [`StoryError::Storage`] for other I/O failures.
    pub fn read(&self, filename: &str) -> Result<String> {
        let path = self.resolve(filename)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoryError::NotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the file at `filename` with `content`, creating the store
    /// directory if needed.
    ///
    /// The write goes to a temporary file in the store directory that is
    /// then renamed over the target, so a failed write leaves any previous
    /// content intact.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::Storage`] on I/O failure.
    pub fn write(&self, filename: &str, content: &str) -> Result<()> {
        let path = self.resolve(filename)?;
        write_atomic(&self.root, &path, content.as_bytes())?;
        tracing::info!(file = filename, bytes = content.len(), "saved story");
        Ok(())
    }

    /// Word count of the raw stored content.
    ///
    /// # Errors
    ///
    /// Propagates [`DocumentStore::read`] errors.
    pub fn word_count_of(&self, filename: &str) -> Result<usize> {
        Ok(count_words(&self.read(filename)?))
    }

    #[must_use]
    pub fn exists(&self, filename: &str) -> bool {
        self.resolve(filename).is_ok_and(|path| path.is_file())
    }

    /// Render and write `doc` under its record key, returning the filename.
    ///
    /// # Errors
    ///
    /// Propagates [`DocumentStore::write`] errors.
    pub fn save(&self, doc: &Document) -> Result<String> {
        let filename = doc.filename();
        self.write(&filename, &doc.render())?;
        Ok(filename)
    }

    /// Read and parse a stored story.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::MalformedRecord`] if the filename does not
    /// decode, plus any [`DocumentStore::read`] error.
    pub fn open(&self, filename: &str) -> Result<OpenedDocument> {
        codec::decode(filename)?;
        let content = self.read(filename)?;
        OpenedDocument::parse(filename, &content)
    }

    fn resolve(&self, filename: &str) -> Result<PathBuf> {
        let plain = !filename.is_empty()
            && filename != "."
            && filename != ".."
            && !filename.contains(['/', '\\', '\0']);
        if plain {
            Ok(self.root.join(filename))
        } else {
            Err(StoryError::MalformedRecord {
                filename: filename.to_string(),
                reason: "not a plain file name".to_string(),
            })
        }
    }
}

fn has_store_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(EXTENSION)
}

/// Write `bytes` to `path` via a synced temporary file in `dir` and a rename.
pub(crate) fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    commit(stage(dir, bytes)?, path)
}

/// Write `bytes` in full to a new temporary file in `dir`. The temporary is
/// removed if it is dropped uncommitted.
fn stage(dir: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

/// Rename a staged file over `path` in one step.
fn commit(tmp: NamedTempFile, path: &Path) -> Result<()> {
    tmp.persist(path).map_err(|e| StoryError::Storage(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn list_on_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("never-created"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn write_list_decode_and_count() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("stories"));

        let filename = codec::encode(day(2024, 1, 5), "Test");
        store.write(&filename, "one two three four five").unwrap();

        let names = store.list().unwrap();
        assert_eq!(names, vec!["2024-01-05 Test.html".to_string()]);

        let key = codec::decode(&names[0]).unwrap();
        assert_eq!(key.date, day(2024, 1, 5));
        assert_eq!(key.title, "Test");
        assert_eq!(store.word_count_of(&names[0]).unwrap(), 5);
    }

    #[test]
    fn list_filters_to_html_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        fs::write(dir.path().join("2024-01-05 Keep.html"), "x").unwrap();
        fs::write(dir.path().join("titles.txt"), "Keep\n").unwrap();
        fs::write(dir.path().join("notes.md"), "x").unwrap();
        fs::create_dir(dir.path().join("folder.html")).unwrap();

        assert_eq!(store.list().unwrap(), vec!["2024-01-05 Keep.html".to_string()]);
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let err = store.read("2024-01-05 Nope.html").unwrap_err();
        assert!(matches!(err, StoryError::NotFound(name) if name == "2024-01-05 Nope.html"));
    }

    #[test]
    fn write_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        store.write("2024-01-05 Test.html", "first draft that is long").unwrap();
        store.write("2024-01-05 Test.html", "second").unwrap();

        assert_eq!(store.read("2024-01-05 Test.html").unwrap(), "second");
        assert_eq!(store.list().unwrap().len(), 1);
    }

    fn temp_files(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".tmp"))
            .count()
    }

    #[test]
    fn interrupted_replace_keeps_prior_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let name = "2024-01-05 Test.html";
        store.write(name, "original").unwrap();
        let target = dir.path().join(name);

        // fully staged but never committed
        let staged = stage(dir.path(), b"replacement").unwrap();
        assert_eq!(fs::read_to_string(staged.path()).unwrap(), "replacement");
        assert_eq!(store.read(name).unwrap(), "original");
        drop(staged);

        assert_eq!(store.read(name).unwrap(), "original");
        assert_eq!(temp_files(dir.path()), 0);

        commit(stage(dir.path(), b"replacement").unwrap(), &target).unwrap();
        assert_eq!(store.read(name).unwrap(), "replacement");
        assert_eq!(temp_files(dir.path()), 0);
    }

    #[test]
    fn failed_commit_keeps_prior_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let name = "2024-01-05 Test.html";
        store.write(name, "original").unwrap();

        // renaming onto a non-empty directory fails after staging succeeded
        let blocker = dir.path().join("occupied");
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("inner"), "x").unwrap();
        let staged = stage(dir.path(), b"replacement").unwrap();
        assert!(matches!(
            commit(staged, &blocker),
            Err(StoryError::Storage(_))
        ));

        assert_eq!(store.read(name).unwrap(), "original");
        assert_eq!(temp_files(dir.path()), 0);
    }

    #[test]
    fn failed_write_to_blocked_key_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());

        let blocked = "2024-01-06 Blocked.html";
        fs::create_dir(dir.path().join(blocked)).unwrap();
        fs::write(dir.path().join(blocked).join("inner"), "x").unwrap();
        assert!(matches!(
            store.write(blocked, "new"),
            Err(StoryError::Storage(_))
        ));
        assert_eq!(temp_files(dir.path()), 0);
    }

    // other unix filesystems may refuse non UTF-8 names outright
    #[cfg(target_os = "linux")]
    #[test]
    fn list_rejects_non_utf8_story_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let raw = OsStr::from_bytes(b"2024-01-05 \xff.html");
        fs::write(dir.path().join(raw), "x").unwrap();

        match store.list() {
            Err(StoryError::MalformedRecord { filename, .. }) => {
                assert!(filename.starts_with("2024-01-05 "));
                assert!(filename.ends_with(".html"));
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn filenames_cannot_escape_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("stories"));
        for bad in ["../escape.html", "a/b.html", "..", ""] {
            assert!(matches!(
                store.write(bad, "x"),
                Err(StoryError::MalformedRecord { .. })
            ));
        }
        assert!(!dir.path().join("escape.html").exists());
    }

    #[test]
    fn save_and_open_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let body = "<p>Once upon a time</p>\n";
        let doc = Document::new("Fairy Tale", day(2024, 3, 1), body).unwrap();

        let filename = store.save(&doc).unwrap();
        assert!(store.exists(&filename));

        let opened = store.open(&filename).unwrap();
        assert_eq!(opened.body, body);
        assert_eq!(opened.title(), "Fairy Tale");
        assert_eq!(opened.key, doc.key());
    }

    #[test]
    fn open_rejects_undecodable_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        store.write("untitled.html", "x").unwrap();
        assert!(matches!(
            store.open("untitled.html"),
            Err(StoryError::MalformedRecord { .. })
        ));
    }
}
