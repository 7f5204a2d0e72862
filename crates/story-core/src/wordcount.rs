//! Whitespace-delimited word counting.

/// Count the whitespace-separated tokens in `text`.
///
/// Any Unicode whitespace separates tokens, and runs of whitespace count as
/// a single separator, so leading, trailing, and doubled whitespace never
/// produce empty tokens.
#[must_use]
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
