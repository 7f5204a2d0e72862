//! Filename codec: a story's record key is its filename.
//!
//! Format: `<YYYY-MM-DD> <title>.html`. The date prefix must be at the very
//! start of the name; when a title itself begins with something date-like,
//! the first date wins.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, StoryError};

/// Extension of every stored story.
pub const EXTENSION: &str = "html";

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_LEN: usize = 10;

/// The `(date, title)` pair that identifies a story in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub date: NaiveDate,
    pub title: String,
}

impl RecordKey {
    /// Build a key, trimming the title.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::InvalidTitle`] if the title is blank or contains
    /// a path separator.
    pub fn new(date: NaiveDate, title: &str) -> Result<Self> {
        let title = validate_title(title)?;
        Ok(Self {
            date,
            title: title.to_string(),
        })
    }

    #[must_use]
    pub fn filename(&self) -> String {
        encode(self.date, &self.title)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date.format(DATE_FORMAT), self.title)
    }
}

/// Check a user-supplied title and return it trimmed.
///
/// # Errors
///
/// Returns [`StoryError::InvalidTitle`] for blank titles and titles
/// containing `/`, `\` or a control character such as a newline.
pub fn validate_title(title: &str) -> Result<&str> {
    let trimmed = title.trim();
    let reason = if trimmed.is_empty() {
        Some("title must not be empty")
    } else if trimmed.contains(['/', '\\']) {
        Some("title must not contain a path separator")
    } else if trimmed.chars().any(char::is_control) {
        Some("title must not contain control characters")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(StoryError::InvalidTitle {
            title: title.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(trimmed),
    }
}

/// Encode a record key as a filename.
#[must_use]
pub fn encode(date: NaiveDate, title: &str) -> String {
    format!("{} {title}.{EXTENSION}", date.format(DATE_FORMAT))
}

/// Decode a filename into its record key.
///
/// # Errors
///
/// Returns [`StoryError::MalformedRecord`] if the name lacks the `.html`
/// extension, does not start with a valid `YYYY-MM-DD ` date, or has an
/// empty title.
pub fn decode(filename: &str) -> Result<RecordKey> {
    let stem = filename
        .strip_suffix(EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .ok_or_else(|| StoryError::malformed(filename, format!("expected .{EXTENSION} extension")))?;

    let date_part = stem
        .get(..DATE_LEN)
        .filter(|d| is_date_shaped(d))
        .ok_or_else(|| StoryError::malformed(filename, "missing YYYY-MM-DD date prefix"))?;

    let rest = &stem[DATE_LEN..];
    let title = rest
        .strip_prefix(' ')
        .ok_or_else(|| StoryError::malformed(filename, "date prefix must be followed by a space"))?
        .trim();

    let date = NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .map_err(|e| StoryError::malformed(filename, format!("invalid date '{date_part}': {e}")))?;

    if title.is_empty() {
        return Err(StoryError::malformed(filename, "empty title"));
    }

    Ok(RecordKey {
        date,
        title: title.to_string(),
    })
}

fn is_date_shaped(s: &str) -> bool {
    s.bytes().enumerate().all(|(i, b)| match i {
        4 | 7 => b == b'-',
        _ => b.is_ascii_digit(),
    })
}
