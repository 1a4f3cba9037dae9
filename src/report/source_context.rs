//! The `sources:` block of a report.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;
use unicode_width::UnicodeWidthStr;

use super::{prefixed, Invocation, PREFIX};

/// Padding between the line-number column and the source text.
const CELL_PADDING: usize = 2;

/// Writes the invocation header and a window of source lines around it.
///
/// Failures to read the source never abort the report; they are written as
/// placeholders in place of the listing.
pub(crate) fn write_invocation(
    out: &mut String,
    invocation: Option<&Invocation>,
    context_lines: usize,
) {
    out.push_str("sources:\n");
    let Some(invocation) = invocation else {
        out.push_str(&prefixed(PREFIX, "<invocation not available>"));
        return;
    };
    let file_name = invocation
        .file()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| invocation.file().display().to_string());
    let line = invocation.line();
    out.push_str(&prefixed(PREFIX, &format!("{}:{}:", file_name, line)));

    let file = match File::open(invocation.file()) {
        Ok(file) => file,
        Err(err) => {
            debug!("cannot open {}: {}", invocation.file().display(), err);
            out.push_str(&prefixed(&listing_prefix(), &format!("<cannot open source file: {}>", err)));
            return;
        }
    };
    write_listing(out, BufReader::new(file), invocation.file(), line, context_lines);
}

fn listing_prefix() -> String {
    PREFIX.repeat(2)
}

/// Writes the lines of `reader` within `context_lines` of `line`.
///
/// Lines are decoded lossily, so stray bytes outside the window never stop
/// the listing. A read error flushes the rows gathered so far and then
/// writes a placeholder.
fn write_listing<R: BufRead>(
    out: &mut String,
    mut reader: R,
    source: &Path,
    line: usize,
    context_lines: usize,
) {
    let prefix = listing_prefix();
    let first = line.saturating_sub(context_lines);
    let last = line.saturating_add(context_lines);
    let mut rows = Vec::new();
    let mut found = false;
    let mut buf = Vec::new();
    let mut current = 0;
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                debug!("cannot scan {}: {}", source.display(), err);
                write_rows(out, &rows);
                out.push_str(&prefixed(&prefix, &format!("<cannot scan source file: {}>", err)));
                return;
            }
        }
        current += 1;
        if current > last {
            break;
        }
        if current < first {
            continue;
        }
        let text = String::from_utf8_lossy(&buf);
        let text = text.strip_suffix('\n').unwrap_or(&text);
        let text = text.strip_suffix('\r').unwrap_or(text);
        let mut label = format!("{}{}", prefix, current);
        if current == line {
            found = true;
            label.push('!');
        }
        rows.push((label, text.to_string()));
    }
    write_rows(out, &rows);
    if !found {
        debug!("line {} not found in {}", line, source.display());
        out.push_str(&prefixed(&prefix, "<cannot find source lines>"));
    }
}

/// Writes labelled rows with the labels padded to a common column.
fn write_rows(out: &mut String, rows: &[(String, String)]) {
    let width = rows
        .iter()
        .map(|(label, _)| label.width())
        .max()
        .unwrap_or(0)
        + CELL_PADDING;
    for (label, text) in rows {
        out.push_str(label);
        out.push_str(&" ".repeat(width - label.width()));
        out.push_str(text);
        out.push('\n');
    }
}
