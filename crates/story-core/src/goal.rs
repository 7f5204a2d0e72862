//! Word-count goal comparison.

use std::cmp::Ordering;
use std::fmt;

/// Goal used when none is configured.
pub const DEFAULT_GOAL: usize = 100;

/// Where a word count stands relative to the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoalStatus {
    Under,
    Met,
    Over,
}

impl GoalStatus {
    #[must_use]
    pub fn compare(count: usize, goal: usize) -> Self {
        match count.cmp(&goal) {
            Ordering::Less => Self::Under,
            Ordering::Equal => Self::Met,
            Ordering::Greater => Self::Over,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Under => "under",
            Self::Met => "met",
            Self::Over => "over",
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The text shown next to the editor: `Word count: N, Goal: G`.
#[must_use]
pub fn count_label(count: usize, goal: usize) -> String {
    format!("Word count: {count}, Goal: {goal}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_against_goal() {
        assert_eq!(GoalStatus::compare(0, DEFAULT_GOAL), GoalStatus::Under);
        assert_eq!(GoalStatus::compare(100, 100), GoalStatus::Met);
        assert_eq!(GoalStatus::compare(101, 100), GoalStatus::Over);
    }

    #[test]
    fn label_matches_editor_format() {
        assert_eq!(count_label(42, 100), "Word count: 42, Goal: 100");
        assert_eq!(GoalStatus::Over.to_string(), "over");
    }
}
