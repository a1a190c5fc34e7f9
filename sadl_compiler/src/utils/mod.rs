//! Shared utilities for the SADL scanner, parser and diagnostics.

pub mod span;

pub use span::{Position, SourceMap, Span};

/// Merge two comments with a single space. Each part is trimmed and empty
/// parts are skipped.
pub fn merge_comment(first: &str, second: &str) -> String {
    match (first.trim(), second.trim()) {
        ("", second) => second.to_string(),
        (first, "") => first.to_string(),
        (first, second) => format!("{} {}", first, second),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_comment() {
        assert_eq!(merge_comment("", "one"), "one");
        assert_eq!(merge_comment("one", "two"), "one two");
        assert_eq!(merge_comment("one", ""), "one");
        assert_eq!(merge_comment("", ""), "");
        assert_eq!(merge_comment(" one", " two"), "one two");
        assert_eq!(merge_comment("one ", "   "), "one");
    }
}
