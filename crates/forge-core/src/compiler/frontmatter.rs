//! Leading YAML frontmatter detection and removal.
//!
//! Only a block that opens on the very first line is recognised. The block
//! is not parsed; it is dropped wholesale.

pub const DELIMITER: &str = "---";

/// Return `content` without its leading frontmatter block.
///
/// An opening delimiter with no closing delimiter is not frontmatter and
/// leaves the document unchanged.
pub fn strip_frontmatter(content: &str) -> &str {
    match frontmatter_end(content) {
        Some(end) => &content[end..],
        None => content,
    }
}

/// Byte offset just past the closing delimiter line, if the document opens
/// with a complete frontmatter block.
fn frontmatter_end(content: &str) -> Option<usize> {
    let body = content.strip_prefix('\u{FEFF}').unwrap_or(content);
    let bom = content.len() - body.len();

    let mut lines = body.split_inclusive('\n');
    let first = lines.next()?;
    if !first.ends_with('\n') || !is_delimiter(first) {
        return None;
    }

    let mut offset = bom + first.len();
    for line in lines {
        offset += line.len();
        if is_delimiter(line) {
            return Some(offset);
        }
    }
    None
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_block() {
        let content = "---\ntitle: Test\n---\n# Header";
        assert_eq!(strip_frontmatter(content), "# Header");
    }

    #[test]
    fn no_frontmatter_is_unchanged() {
        assert_eq!(strip_frontmatter("# Header"), "# Header");
        assert_eq!(strip_frontmatter(""), "");
    }

    #[test]
    fn unclosed_block_is_unchanged() {
        let content = "---\ntitle: Test\n# Header\n";
        assert_eq!(strip_frontmatter(content), content);
        assert_eq!(frontmatter_end(content), None);
    }

    #[test]
    fn later_delimiters_are_untouched() {
        let content = "# Header\n---\nnot: frontmatter\n---\nbody";
        assert_eq!(strip_frontmatter(content), content);
    }

    #[test]
    fn thematic_break_in_body_survives() {
        let content = "---\na: 1\n---\nintro\n\n---\n\noutro\n";
        assert_eq!(strip_frontmatter(content), "intro\n\n---\n\noutro\n");
    }

    #[test]
    fn crlf_and_trailing_spaces_accepted() {
        let content = "---  \r\ntitle: x\r\n---\r\nbody\r\n";
        assert_eq!(strip_frontmatter(content), "body\r\n");
    }

    #[test]
    fn empty_block_and_eof_close() {
        assert_eq!(strip_frontmatter("---\n---\nbody"), "body");
        assert_eq!(strip_frontmatter("---\nkey: v\n---"), "");
    }

    #[test]
    fn byte_order_mark_is_tolerated() {
        assert_eq!(strip_frontmatter("\u{FEFF}---\nk: v\n---\nbody"), "body");
    }

    #[test]
    fn opening_line_must_be_exact() {
        assert_eq!(strip_frontmatter("----\nk: v\n---\nbody"), "----\nk: v\n---\nbody");
        assert_eq!(strip_frontmatter("---"), "---");
    }

    #[test]
    fn stripping_is_idempotent() {
        for doc in [
            "---\ntitle: Test\n---\n# Header\n",
            "# Plain\n---\nrule\n",
            "---\nunterminated\n",
            "",
        ] {
            let once = strip_frontmatter(doc);
            assert_eq!(strip_frontmatter(once), once, "doc: {doc:?}");
        }
    }

    #[test]
    fn only_the_first_of_stacked_blocks_is_stripped() {
        let doc = "---\na: 1\n---\n---\nb: 2\n---\nbody";
        let once = strip_frontmatter(doc);
        assert_eq!(once, "---\nb: 2\n---\nbody");
        assert_eq!(strip_frontmatter(once), "body");
    }
}
