//! Topic include/exclude filtering.

use std::collections::HashSet;

/// Pure predicate over topic names.
///
/// A topic passes iff the include set is empty or contains it, AND the
/// exclude set does not contain it. Exclude always wins, even when a topic
/// appears in both sets.
#[derive(Debug, Clone, Default)]
pub struct TopicFilter {
    include: HashSet<String>,
    exclude: HashSet<String>,
}

impl TopicFilter {
    /// Build a filter from merged include and exclude topic lists.
    ///
    /// Duplicates are collapsed; ordering within a list is irrelevant.
    pub fn new<I, E>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = String>,
        E: IntoIterator<Item = String>,
    {
        TopicFilter {
            include: include.into_iter().collect(),
            exclude: exclude.into_iter().collect(),
        }
    }

    /// Filter that passes every topic.
    pub fn pass_all() -> Self {
        TopicFilter::default()
    }

    /// Whether `topic` passes the filter.
    pub fn passes(&self, topic: &str) -> bool {
        if !self.include.is_empty() && !self.include.contains(topic) {
            return false;
        }
        !self.exclude.contains(topic)
    }

    /// Whether the filter has any include or exclude entries.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_empty_filter_passes_everything() {
        let filter = TopicFilter::pass_all();
        assert!(filter.passes("/a"));
        assert!(filter.passes(""));
    }

    #[test]
    fn test_include_only() {
        let filter = TopicFilter::new(topics(&["/a", "/b"]), topics(&[]));
        assert!(filter.passes("/a"));
        assert!(filter.passes("/b"));
        assert!(!filter.passes("/c"));
    }

    #[test]
    fn test_exclude_only() {
        let filter = TopicFilter::new(topics(&[]), topics(&["/b"]));
        assert!(filter.passes("/a"));
        assert!(!filter.passes("/b"));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let filter = TopicFilter::new(topics(&["/a"]), topics(&["/a"]));
        assert!(!filter.passes("/a"));
    }

    #[test]
    fn test_include_and_exclude_combined() {
        let filter = TopicFilter::new(topics(&["/a", "/b"]), topics(&["/b"]));
        assert!(filter.passes("/a"));
        assert!(!filter.passes("/b"));
        assert!(!filter.passes("/c"));
    }
}
