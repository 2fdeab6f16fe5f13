/// Joins text nodes into one line of readable text.
///
/// Each node is trimmed, nodes that become empty are dropped, the rest are
/// joined with a single space, and any remaining run of whitespace (including
/// line breaks inside a node) collapses to one space.
pub fn join_text_nodes<I, S>(nodes: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = nodes
        .into_iter()
        .filter_map(|node| {
            let trimmed = node.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ");

    normalize_whitespace_in_segment(&joined)
}

/// Normalizes whitespace within a single line or paragraph
pub fn normalize_whitespace_in_segment(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Wraps inline or block code in triple backticks
pub fn fence_code(code: &str) -> String {
    format!("```{}```", code)
}
