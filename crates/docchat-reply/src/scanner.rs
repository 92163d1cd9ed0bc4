//! JSON object boundary scanner.
//!
//! Finds the span of the first complete top-level JSON object in a chunk of
//! mixed prose/JSON text.  Tracks brace depth and skips quoted strings and
//! escape sequences, so nested objects and braces inside string literals do
//! not truncate the span the way first-`{` / last-`}` index arithmetic does.

use std::ops::Range;

/// Outcome of scanning for one JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ObjectScan {
    /// No `{` anywhere in the text.
    Absent,
    /// An opening `{` with no matching close before the end of the text.
    Unterminated,
    /// Byte range of the object, `{` and `}` inclusive.
    Found(Range<usize>),
}

pub(crate) fn scan_object(text: &str) -> ObjectScan {
    let bytes = text.as_bytes();
    let start = match bytes.iter().position(|&b| b == b'{') {
        Some(ix) => ix,
        None => return ObjectScan::Absent,
    };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (ix, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return ObjectScan::Found(start..ix + 1);
                }
            }
            _ => {}
        }
    }

    ObjectScan::Unterminated
}
