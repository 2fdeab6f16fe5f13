use crate::parsers::text;

#[test]
fn test_join_text_nodes() {
    assert_eq!(text::join_text_nodes(["Hello", "  world  \n"]), "Hello world");
    assert_eq!(text::join_text_nodes(["", "   ", "\n"]), "");
    assert_eq!(text::join_text_nodes(Vec::<String>::new()), "");
}

#[test]
fn test_inner_whitespace_collapses() {
    assert_eq!(
        text::join_text_nodes(["Line 1\nLine 2", "\tTabbed   out "]),
        "Line 1 Line 2 Tabbed out"
    );
}

#[test]
fn test_join_is_idempotent() {
    let once = text::join_text_nodes(["  Some  ", "text\n\nhere. "]);
    assert_eq!(text::join_text_nodes([once.as_str()]), once);
}

#[test]
fn test_normalize_whitespace_in_segment() {
    assert_eq!(
        text::normalize_whitespace_in_segment("Hello   world!"),
        "Hello world!"
    );
    assert_eq!(
        text::normalize_whitespace_in_segment("  Trim  me  "),
        "Trim me"
    );
    assert_eq!(text::normalize_whitespace_in_segment(""), "");
    assert_eq!(text::normalize_whitespace_in_segment("   "), "");
}

#[test]
fn test_fence_code() {
    assert_eq!(text::fence_code("useState"), "```useState```");
}
