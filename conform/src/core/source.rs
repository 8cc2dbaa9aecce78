//! Lightweight source-text scanning for script entries.
//!
//! This is not a parser. It knows just enough about string literals to keep
//! comment markers and braces inside strings from confusing the rule checks.
//! Regex literals and `${}` nesting inside template strings are not tracked.

/// Remove `/* */` and `//` comments, keeping everything else verbatim.
///
/// Block comments become a single space so tokens on either side stay apart.
/// Line comments are dropped up to (not including) the newline. String and
/// template literal contents are kept, including any comment markers in them.
pub fn strip_comments(source: &str) -> String {
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut copied_from = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => {
                i = skip_string(bytes, i);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                out.push_str(&source[copied_from..i]);
                out.push(' ');
                i = match find(bytes, i + 2, b"*/") {
                    Some(end) => end + 2,
                    None => bytes.len(),
                };
                copied_from = i;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                out.push_str(&source[copied_from..i]);
                i = find(bytes, i + 2, b"\n").unwrap_or(bytes.len());
                copied_from = i;
            }
            _ => i += 1,
        }
    }
    out.push_str(&source[copied_from..]);
    out
}

/// Index of the delimiter closing the one at `open`, balancing nested pairs.
///
/// `text[open]` must be `(`, `[` or `{`. Delimiters inside string literals are
/// ignored. Returns `None` when the text ends before the pair is closed.
pub fn matching_close(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let (opener, closer) = match bytes.get(open)? {
        b'(' => (b'(', b')'),
        b'[' => (b'[', b']'),
        b'{' => (b'{', b'}'),
        _ => return None,
    };

    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => {
                i = skip_string(bytes, i);
                continue;
            }
            byte if byte == opener => depth += 1,
            byte if byte == closer => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Curly-brace nesting depth at byte offset `pos`.
pub fn brace_depth_at(text: &str, pos: usize) -> usize {
    let bytes = text.as_bytes();
    let end = pos.min(bytes.len());
    let mut depth = 0usize;
    let mut i = 0;
    while i < end {
        match bytes[i] {
            b'\'' | b'"' | b'`' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        i += 1;
    }
    depth
}

/// End of an expression statement starting at `start`.
///
/// Stops at the first `;` or newline outside of brackets and strings, or at an
/// unmatched closing bracket. Returns the exclusive end offset.
pub fn statement_end(text: &str, start: usize) -> usize {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => {
                if depth == 0 {
                    return i;
                }
                depth -= 1;
            }
            b';' | b'\n' if depth == 0 => return i,
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

/// Offset of the `{` opening a function body that follows a parameter list.
///
/// `from` is just past the closing `)`. An optional `: Type` return annotation
/// is skipped, including object, tuple and function types such as
/// `: { a: number }` or `: () => void`. Returns `None` when the signature is
/// not followed by a block, as with an overload declaration ending in `;`.
pub fn body_open(text: &str, from: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = from + text.get(from..)?.find(|ch: char| !ch.is_whitespace())?;
    match bytes[i] {
        b'{' => return Some(i),
        b':' => i += 1,
        _ => return None,
    }

    let mut depth = 0usize;
    let mut seen_type = false;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => {
                i = skip_string(bytes, i);
                seen_type = true;
                continue;
            }
            b'{' if depth == 0 && seen_type => return Some(i),
            b'>' if bytes[i - 1] == b'=' => {}
            b'(' | b'[' | b'<' | b'{' => depth += 1,
            b')' | b']' | b'>' | b'}' => {
                if depth == 0 {
                    return None;
                }
                depth -= 1;
            }
            b';' if depth == 0 => return None,
            _ => {}
        }
        if !bytes[i].is_ascii_whitespace() {
            seen_type = true;
        }
        i += 1;
    }
    None
}

/// Offset just past the string literal opened at `start`.
///
/// Single and double quoted strings also end at an unescaped newline, which
/// keeps a stray quote from swallowing the rest of the file.
fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' if quote != b'`' => return i,
            byte if byte == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_and_block_comments() {
        let source = "a(); // for (;;)\n/* while (x) */b();";
        assert_eq!(strip_comments(source), "a(); \n b();");
    }

    #[test]
    fn keeps_comment_markers_inside_strings() {
        let source = r#"const url = "http://example.com"; // tail"#;
        assert_eq!(
            strip_comments(source),
            r#"const url = "http://example.com"; "#
        );
    }

    #[test]
    fn keeps_string_contents() {
        let source = "console.log('for (x)'); /* gone */";
        assert_eq!(strip_comments(source), "console.log('for (x)');  ");
    }

    #[test]
    fn unterminated_block_comment_runs_to_end() {
        assert_eq!(strip_comments("a /* open"), "a  ");
    }

    #[test]
    fn matching_close_handles_nesting() {
        let text = "function f() { if (a) { b({}); } return 1; } tail";
        let open = text.find('{').expect("brace");
        let close = matching_close(text, open).expect("close");
        assert_eq!(&text[close + 1..], " tail");
    }

    #[test]
    fn matching_close_ignores_braces_in_strings() {
        let text = r#"{ s = "}"; t = '{'; }x"#;
        let close = matching_close(text, 0).expect("close");
        assert_eq!(&text[close..], "}x");
    }

    #[test]
    fn matching_close_reports_unbalanced() {
        assert_eq!(matching_close("{ {", 0), None);
        assert_eq!(matching_close("abc", 0), None);
    }

    #[test]
    fn brace_depth_counts_open_blocks() {
        let text = "a { b { c } d } e";
        assert_eq!(brace_depth_at(text, text.find('a').expect("a")), 0);
        assert_eq!(brace_depth_at(text, text.find('c').expect("c")), 2);
        assert_eq!(brace_depth_at(text, text.find('d').expect("d")), 1);
        assert_eq!(brace_depth_at(text, text.find('e').expect("e")), 0);
    }

    #[test]
    fn body_open_skips_return_annotations() {
        fn body_of(text: &str) -> Option<&str> {
            body_open(text, 0).map(|open| &text[open..])
        }
        assert_eq!(body_of(" { x }"), Some("{ x }"));
        assert_eq!(body_of(": number { x }"), Some("{ x }"));
        assert_eq!(body_of(": Map<string, number[]> { x }"), Some("{ x }"));
        assert_eq!(body_of(": { a: number } { x }"), Some("{ x }"));
        assert_eq!(body_of(": () => void { x }"), Some("{ x }"));
    }

    #[test]
    fn body_open_rejects_signatures_without_block() {
        assert_eq!(body_open(": number;\nfunction g() {}", 0), None);
        assert_eq!(body_open(" => x", 0), None);
        assert_eq!(body_open("", 0), None);
    }

    #[test]
    fn statement_end_stops_at_terminators() {
        let text = "n ? f(n; 1) : 0; next";
        assert_eq!(&text[..statement_end(text, 0)], "n ? f(n; 1) : 0");
        let text = "g(x)\nh()";
        assert_eq!(&text[..statement_end(text, 0)], "g(x)");
        assert_eq!(statement_end("tail", 0), 4);
    }
}
