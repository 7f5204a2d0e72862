//! Document type and its stored markup.
//!
//! A stored story is an `<h1>` heading carrying the display title, a single
//! newline, then the editor's markup:
//!
//! ```html
//! <h1>A Winter's Tale</h1>
//! <p>It was cold.</p>
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::codec::{self, RecordKey};
use crate::error::Result;
use crate::wordcount::count_words;

const HEADING_OPEN: &str = "<h1>";
const HEADING_CLOSE: &str = "</h1>";

/// A story being written or saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub created: NaiveDate,
    /// Editor markup, without the title heading.
    pub body: String,
}

impl Document {
    /// # Errors
    ///
    /// Returns [`crate::StoryError::InvalidTitle`] if the title is blank or
    /// contains a path separator.
    pub fn new(title: &str, created: NaiveDate, body: impl Into<String>) -> Result<Self> {
        let key = RecordKey::new(created, title)?;
        Ok(Self {
            title: key.title,
            created,
            body: body.into(),
        })
    }

    #[must_use]
    pub fn key(&self) -> RecordKey {
        RecordKey {
            date: self.created,
            title: self.title.clone(),
        }
    }

    #[must_use]
    pub fn filename(&self) -> String {
        codec::encode(self.created, &self.title)
    }

    /// Words in the body, as shown against the goal while editing.
    #[must_use]
    pub fn word_count(&self) -> usize {
        count_words(&self.body)
    }

    /// Render the stored form: title heading followed by the body.
    #[must_use]
    pub fn render(&self) -> String {
        let title = escape(&self.title);
        let mut out = String::with_capacity(
            HEADING_OPEN.len() + title.len() + HEADING_CLOSE.len() + 1 + self.body.len(),
        );
        out.push_str(HEADING_OPEN);
        out.push_str(&title);
        out.push_str(HEADING_CLOSE);
        out.push('\n');
        out.push_str(&self.body);
        out
    }
}

/// A story read back from the store.
///
/// The catalog title comes from the filename and the display title from the
/// heading; they are kept side by side and never reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenedDocument {
    pub key: RecordKey,
    pub display_title: Option<String>,
    pub body: String,
}

impl OpenedDocument {
    /// # Errors
    ///
    /// Returns [`crate::StoryError::MalformedRecord`] if `filename` does not
    /// decode.
    pub fn parse(filename: &str, content: &str) -> Result<Self> {
        let key = codec::decode(filename)?;
        let (display_title, body) = split_heading(content);
        Ok(Self {
            key,
            display_title: display_title.map(unescape),
            body: body.to_string(),
        })
    }

    /// The title to show in the editor: the heading if present, else the
    /// catalog title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.display_title.as_deref().unwrap_or(&self.key.title)
    }
}

/// Split stored content into the heading text (if the content starts with
/// one) and the body that follows it. One newline after the heading belongs
/// to the heading.
#[must_use]
pub fn split_heading(content: &str) -> (Option<&str>, &str) {
    content
        .strip_prefix(HEADING_OPEN)
        .and_then(|rest| {
            rest.find(HEADING_CLOSE).map(|end| {
                let body = &rest[end + HEADING_CLOSE.len()..];
                (Some(&rest[..end]), body.strip_prefix('\n').unwrap_or(body))
            })
        })
        .unwrap_or((None, content))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoryError;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    #[test]
    fn render_prefixes_heading() {
        let doc = Document::new("Test", day(), "<p>one two</p>").unwrap();
        assert_eq!(doc.render(), "<h1>Test</h1>\n<p>one two</p>");
        assert_eq!(doc.filename(), "2024-01-05 Test.html");
    }

    #[test]
    fn new_rejects_invalid_title() {
        let err = Document::new("a/b", day(), "").unwrap_err();
        assert!(matches!(err, StoryError::InvalidTitle { .. }));
    }

    #[test]
    fn opened_document_roundtrips_body_bytes() {
        let body = "\n<p>First  line</p>\r\n<p>Ünïcödé &amp; more</p>\n\n";
        let doc = Document::new("Fish & <Chips>", day(), body).unwrap();
        let opened = OpenedDocument::parse(&doc.filename(), &doc.render()).unwrap();

        assert_eq!(opened.body, body);
        assert_eq!(opened.display_title.as_deref(), Some("Fish & <Chips>"));
        assert_eq!(opened.key, doc.key());
    }

    #[test]
    fn display_and_catalog_titles_are_independent() {
        let opened = OpenedDocument::parse("2024-01-05 Draft.html", "<h1>Final Title</h1>body").unwrap();
        assert_eq!(opened.key.title, "Draft");
        assert_eq!(opened.title(), "Final Title");
    }

    #[test]
    fn content_without_heading_is_all_body() {
        let opened = OpenedDocument::parse("2024-01-05 Plain.html", "just text").unwrap();
        assert_eq!(opened.display_title, None);
        assert_eq!(opened.title(), "Plain");
        assert_eq!(opened.body, "just text");

        assert_eq!(split_heading("<h1>unterminated"), (None, "<h1>unterminated"));
    }

    #[test]
    fn word_count_uses_body_only() {
        let doc = Document::new("Five Word Title Goes Here", day(), "one two three").unwrap();
        assert_eq!(doc.word_count(), 3);
    }
}
