//! `(-got +want)` diffs for failure messages.
//!
//! Each line of a diff is tab-indented and tagged: `-: ` for the got side,
//! `+: ` for the want side and three spaces for lines both sides share.

use difference::{Changeset, Difference};

use crate::value::Value;

const REMOVED: &str = "-: ";
const ADDED: &str = "+: ";
const SHARED: &str = "   ";

/// Diffs two texts line by line.
///
/// Single-line texts on both sides always produce exactly one removed and one
/// added line.
pub fn unified(old: &str, new: &str) -> String {
    let mut out = String::new();
    if !old.contains('\n') && !new.contains('\n') {
        push_lines(&mut out, REMOVED, old);
        push_lines(&mut out, ADDED, new);
        return out;
    }
    let changeset = Changeset::new(old, new, "\n");
    for diff in &changeset.diffs {
        match diff {
            Difference::Same(chunk) => push_lines(&mut out, SHARED, chunk),
            Difference::Rem(chunk) => push_lines(&mut out, REMOVED, chunk),
            Difference::Add(chunk) => push_lines(&mut out, ADDED, chunk),
        }
    }
    out
}

/// Diffs the compact forms of two values.
pub fn compact(got: &Value, want: &Value) -> String {
    unified(&format!("{:?}", got), &format!("{:?}", want))
}

/// Diffs the indented forms of two values.
pub fn pretty(got: &Value, want: &Value) -> String {
    unified(&format!("{:#?}", got), &format!("{:#?}", want))
}

/// Diffs a subject text against the pattern it failed to match.
pub fn text_pattern(text: &str, pattern: &str) -> String {
    unified(&format!("{:?}", text), &format!("{:?}", pattern))
}

fn push_lines(out: &mut String, marker: &str, chunk: &str) {
    for line in chunk.split('\n') {
        out.push('\t');
        out.push_str(marker);
        out.push_str(line);
        out.push('\n');
    }
}
