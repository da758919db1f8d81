use std::collections::HashSet;

/// Number of whitespace-delimited tokens.
///
/// Every strategy reports its word count through this function, so the count
/// always matches the text it came with.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Collapses runs of whitespace into single spaces and trims the ends
pub fn normalize_segment(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Joins fragments with a separator, optionally dropping exact repeats.
///
/// The first occurrence of a repeated fragment keeps its position.
pub fn join_fragments(fragments: Vec<String>, separator: &str, dedupe: bool) -> String {
    if !dedupe {
        return fragments.join(separator);
    }

    let mut seen = HashSet::new();
    fragments
        .into_iter()
        .filter(|fragment| seen.insert(fragment.clone()))
        .collect::<Vec<_>>()
        .join(separator)
}
