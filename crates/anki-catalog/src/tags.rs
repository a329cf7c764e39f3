//! The free-text tag field of the card form.

/// Longest tag name the `"Tags"."Name"` column accepts.
pub const MAX_TAG_LENGTH: usize = 50;

/// Split the comma-separated tag field of the card form.
///
/// Pieces are trimmed, empty pieces are dropped and exact duplicates collapse
/// onto their first occurrence. Matching is case-sensitive: `Rust` and `rust`
/// are two different tags.
pub fn parse_tag_names(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for piece in raw.split(',') {
        let name = piece.trim();
        if name.is_empty() || names.iter().any(|n| n == name) {
            continue;
        }
        names.push(name.to_owned());
    }
    names
}

/// Names that would not fit the tag column, in input order.
pub fn overlong_tags(names: &[String]) -> Vec<&str> {
    names
        .iter()
        .filter(|n| n.chars().count() > MAX_TAG_LENGTH)
        .map(String::as_str)
        .collect()
}
