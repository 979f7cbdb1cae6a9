//! Line-oriented comment removal over a raw token stream.

use emerge_core::config::CommentKeywords;

/// Rebuild source from raw tokens and drop comment lines.
///
/// Tokens are joined with single spaces and split back into lines. A single
/// flag tracks whether we are inside a block comment:
///
/// - a line containing the block-start marker opens the block and is dropped,
/// - otherwise a line containing the block-stop marker closes it and is dropped,
/// - lines inside a block are dropped,
/// - lines whose trimmed text starts with the line-comment marker are dropped.
///
/// Known limitations: a block comment opening and closing on one line drops
/// the whole line (and leaves the flag set), and code sharing a line with a
/// block marker is lost.
pub fn filter_source_tokens_without_comments(
    tokens: &[String],
    keywords: &CommentKeywords,
) -> String {
    filter_source_without_comments(&tokens.join(" "), keywords)
}

/// Same filter applied to already-assembled source text.
pub fn filter_source_without_comments(source: &str, keywords: &CommentKeywords) -> String {
    let mut kept = Vec::new();
    let mut active_block_comment = false;

    for line in source.lines() {
        if line.contains(keywords.start_block_comment.as_str()) {
            active_block_comment = true;
            continue;
        }
        if line.contains(keywords.stop_block_comment.as_str()) {
            active_block_comment = false;
            continue;
        }
        if line.trim().starts_with(keywords.line_comment.as_str()) {
            continue;
        }
        if !active_block_comment {
            kept.push(line);
        }
    }

    kept.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::scan_tokens;

    fn filter(source: &str) -> Vec<String> {
        filter_source_tokens_without_comments(&scan_tokens(source), &CommentKeywords::c_style())
            .lines()
            .map(|l| l.trim().to_string())
            .collect()
    }

    #[test]
    fn test_line_comment_dropped() {
        let out = filter("int a;\n   // note\nint b;");
        assert_eq!(out, ["int a;", "int b;"]);
    }

    #[test]
    fn test_block_comment_dropped_inclusive() {
        let out = filter("a\n/* start\ninside\nend */\nb");
        assert_eq!(out, ["a", "b"]);
    }

    #[test]
    fn test_trailing_line_comment_kept() {
        // only lines that start with the marker are removed
        let out = filter("x = 1; // trailing");
        assert_eq!(out, ["x = 1; // trailing"]);
    }

    #[test]
    fn test_single_line_block_comment_swallows_following_lines() {
        let out = filter("a\n/* one-liner */\nb\n*/\nc");
        assert_eq!(out, ["a", "c"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let keywords = CommentKeywords::c_style();
        for source in [
            "int a;\n// note\nint b;",
            "a\n/* start\ninside\nend */\nb",
            "class A {\n  /* inline */\n  x;\n}\n*/\ny = 1; // trailing",
            "/**\n * doc\n */\nclass B { }\n   // tail",
            "",
        ] {
            let once = filter_source_tokens_without_comments(&scan_tokens(source), &keywords);
            let twice = filter_source_without_comments(&once, &keywords);
            assert_eq!(twice, once, "filtering twice changed {source:?}");
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(filter("").is_empty());
    }
}
