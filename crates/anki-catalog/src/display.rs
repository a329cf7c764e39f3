//! Helpers for the moderation list columns.

use serde::Serialize;

/// Marker of a fenced code block inside a Markdown answer.
pub const CODE_FENCE: &str = "```";

/// Placeholder shown when a card has no category.
pub const NO_CATEGORY: &str = "No category";

/// Separator of the tag column in the moderation list.
pub const TAG_LIST_SEPARATOR: &str = " | ";

/// Short summary of an answer for the moderation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BriefInfo {
    /// Length in characters, not bytes.
    pub answer_length: usize,
    /// Same test as the `has_code` list filter.
    pub has_code: bool,
}

/// Summarise an answer: its length and whether it holds a code block.
pub fn brief_info(answer: &str) -> BriefInfo {
    BriefInfo {
        answer_length: answer.chars().count(),
        has_code: has_code(answer),
    }
}

/// Whether the answer contains a fenced code block. Inline code does not count.
pub fn has_code(answer: &str) -> bool {
    answer.contains(CODE_FENCE)
}

/// Drop the Markdown markers that clutter a one-line question preview.
pub fn plain_question(question: &str) -> String {
    question
        .replace("##", "")
        .replace('`', "")
        .replace("**", "")
        .replace('*', "")
}

/// Tag names for the moderation list, e.g. `rust | async`.
pub fn tag_list<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names.into_iter().collect::<Vec<_>>().join(TAG_LIST_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_question() {
        assert_eq!(plain_question("## What is `Box<T>`?"), " What is Box<T>?");
        assert_eq!(plain_question("**bold** and *em*"), "bold and em");
    }

    #[test]
    fn test_brief_info() {
        let info = brief_info("Use:\n```rust\nlet x = 1;\n```");
        assert!(info.has_code);
        assert_eq!(info.answer_length, 27);
        assert!(!brief_info("plain").has_code);
    }

    #[test]
    fn test_inline_code_is_not_a_code_block() {
        assert!(!brief_info("call `len()`").has_code);
        assert!(!brief_info("a ``literal `tick` `` span").has_code);
    }

    #[test]
    fn test_tag_list() {
        assert_eq!(tag_list(["rust", "async"]), "rust | async");
        assert_eq!(tag_list(Vec::<&str>::new()), "");
    }
}
