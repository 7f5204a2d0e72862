//! Live word counting for an editor buffer.
//!
//! Text changes go through a [`ChangeDebouncer`]; when it fires the buffer is
//! recounted and a new count is published only if it differs from the last
//! one, so edits that leave the token count unchanged cause no UI churn.

use std::time::{Duration, Instant};

use crate::debounce::ChangeDebouncer;
use crate::wordcount::count_words;

/// Remembers the last published count and reports only changes.
#[derive(Debug, Clone, Default)]
pub struct WordCountTracker {
    published: usize,
}

impl WordCountTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently published count (0 before any change).
    #[must_use]
    pub fn published(&self) -> usize {
        self.published
    }

    /// Recount `text`, returning the new count only when it changed.
    pub fn recount(&mut self, text: &str) -> Option<usize> {
        let count = count_words(text);
        if count == self.published {
            None
        } else {
            self.published = count;
            Some(count)
        }
    }
}

/// A [`WordCountTracker`] fed through a [`ChangeDebouncer`].
#[derive(Debug, Clone, Default)]
pub struct DebouncedWordCount {
    debouncer: ChangeDebouncer,
    tracker: WordCountTracker,
}

impl DebouncedWordCount {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            debouncer: ChangeDebouncer::new(interval),
            tracker: WordCountTracker::new(),
        }
    }

    pub fn text_changed(&mut self, now: Instant) {
        self.debouncer.notify(now);
    }

    /// Check the timer at `now`; on fire, recount `text` and return the new
    /// count if it differs from the last published one.
    pub fn poll(&mut self, now: Instant, text: &str) -> Option<usize> {
        if self.debouncer.poll(now) {
            self.tracker.recount(text)
        } else {
            None
        }
    }

    /// Discard any pending recount, e.g. when the editor closes.
    pub fn cancel(&mut self) {
        self.debouncer.cancel();
    }

    #[must_use]
    pub fn published(&self) -> usize {
        self.tracker.published()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn tracker_reports_only_changes() {
        let mut tracker = WordCountTracker::new();
        assert_eq!(tracker.recount(""), None);
        assert_eq!(tracker.recount("one two"), Some(2));
        assert_eq!(tracker.recount("one two "), None);
        assert_eq!(tracker.recount("one tw"), None);
        assert_eq!(tracker.recount("one"), Some(1));
        assert_eq!(tracker.published(), 1);
    }

    #[test]
    fn debounced_count_waits_for_quiet() {
        let t0 = Instant::now();
        let mut live = DebouncedWordCount::new(ms(100));
        let mut text = String::new();

        for (i, ch) in "hello world".chars().enumerate() {
            text.push(ch);
            let now = t0 + ms(i as u64 * 10);
            live.text_changed(now);
            assert_eq!(live.poll(now, &text), None);
        }

        // last keystroke at 100ms
        assert_eq!(live.poll(t0 + ms(199), &text), None);
        assert_eq!(live.poll(t0 + ms(200), &text), Some(2));
        assert_eq!(live.published(), 2);
    }

    #[test]
    fn retyping_a_deleted_character_publishes_nothing() {
        let t0 = Instant::now();
        let mut live = DebouncedWordCount::new(ms(100));

        live.text_changed(t0);
        assert_eq!(live.poll(t0 + ms(100), "a story"), Some(2));

        live.text_changed(t0 + ms(200));
        assert_eq!(live.poll(t0 + ms(300), "a stor"), None);
        live.text_changed(t0 + ms(400));
        assert_eq!(live.poll(t0 + ms(500), "a story"), None);
    }

    #[test]
    fn cancel_drops_pending_recount() {
        let t0 = Instant::now();
        let mut live = DebouncedWordCount::default();
        live.text_changed(t0);
        live.cancel();
        assert_eq!(live.poll(t0 + ms(1_000), "some words here"), None);
        assert_eq!(live.published(), 0);
    }
}
