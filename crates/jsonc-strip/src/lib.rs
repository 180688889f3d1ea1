//! JSONC preprocessing shared by the issue catalogue build and schema loading.
//!
//! Supports:
//! - `//` line comments
//! - `/* ... */` block comments
//! - trailing commas before `}` or `]`
//! - string literal preservation (including escapes)

use std::iter::Peekable;
use std::str::Chars;

/// Strip comments and trailing commas from JSONC input, producing plain JSON.
///
/// Line comments keep their terminating newline so line numbers in
/// `serde_json` errors still point at the original document.
#[must_use]
pub fn strip_jsonc(input: &str) -> String {
    remove_trailing_commas(&strip_comments(input))
}

/// Strip `//` and `/* */` comments, leaving everything else untouched.
#[must_use]
pub fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => copy_string(&mut chars, &mut out),
            '/' if chars.peek() == Some(&'/') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Remove commas whose next significant character closes an object or array.
///
/// Expects comment-free input.
#[must_use]
pub fn remove_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    // Whitespace seen after a comma that may turn out to be trailing.
    let mut pending: Option<String> = None;

    while let Some(c) = chars.next() {
        if let Some(buffered) = pending.as_mut() {
            if c.is_whitespace() {
                buffered.push(c);
                continue;
            }
            let buffered = pending.take().unwrap_or_default();
            if c == '}' || c == ']' {
                // Drop the comma but keep the layout.
                out.push_str(&buffered[1..]);
            } else {
                out.push_str(&buffered);
            }
        }
        match c {
            '"' => copy_string(&mut chars, &mut out),
            ',' => pending = Some(String::from(",")),
            _ => out.push(c),
        }
    }
    if let Some(buffered) = pending {
        out.push_str(&buffered);
    }
    out
}

/// Copy the rest of a string literal (opening quote already consumed).
fn copy_string(chars: &mut Peekable<Chars<'_>>, out: &mut String) {
    out.push('"');
    while let Some(c) = chars.next() {
        out.push(c);
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '"' => return,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{remove_trailing_commas, strip_comments, strip_jsonc};

    #[test]
    fn strips_line_and_block_comments() {
        let input = r#"
{
  // comment
  "a": 1, /* inline */ "b": 2
}
"#;
        let stripped = strip_jsonc(input);
        assert!(!stripped.contains("comment"));
        assert!(!stripped.contains("inline"));
        assert!(stripped.contains("\"a\": 1"));
        assert!(stripped.contains("\"b\": 2"));
    }

    #[test]
    fn preserves_comment_like_text_in_strings() {
        let input = r#"{ "url": "http://example.com/*x*/", "note":"//keep" }"#;
        let stripped = strip_jsonc(input);
        assert!(stripped.contains("http://example.com/*x*/"));
        assert!(stripped.contains("\"note\":\"//keep\""));
    }

    #[test]
    fn keeps_line_count() {
        let input = "{\n// one\n/* two\nthree */\n\"a\": 1\n}";
        assert_eq!(strip_comments(input).lines().count(), input.lines().count());
    }

    #[test]
    fn removes_trailing_commas() {
        let input = "{ \"tags\": [1, 2, ], \"x\": {\"y\": 1,\n} ,\n}";
        let stripped = strip_jsonc(input);
        let value: serde_json::Value = serde_json::from_str(&stripped).unwrap_or_default();
        assert_eq!(value["tags"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["x"]["y"], 1);
    }

    #[test]
    fn keeps_commas_inside_strings() {
        let input = r#"["a,]", "b\",}"]"#;
        assert_eq!(remove_trailing_commas(input), input);
    }

    #[test]
    fn trailing_comma_after_comment() {
        let input = "[1, // last\n]";
        assert_eq!(strip_jsonc(input).replace(char::is_whitespace, ""), "[1]");
    }
}
