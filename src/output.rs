//! Terminal emission of rendered reports.
//!
//! Rendering stays plain text; colour is applied line by line on the way out:
//! block keys in yellow, removed diff lines in red, added diff lines in green.

use std::io::{self, Write};

use termcolor::{Color, ColorSpec, StandardStream, WriteColor};

use crate::report::ReportConfig;

/// Opens stderr with the colour choice of `config`.
pub fn stderr_stream(config: &ReportConfig) -> StandardStream {
    StandardStream::stderr(config.color_choice())
}

/// Writes a rendered report to `stream`.
pub fn emit_report<W: WriteColor>(stream: &mut W, report: &str) -> io::Result<()> {
    for line in report.split_inclusive('\n') {
        let body = line.strip_suffix('\n').unwrap_or(line);
        match line_color(body) {
            Some(spec) => {
                stream.set_color(&spec)?;
                stream.write_all(body.as_bytes())?;
                stream.reset()?;
            }
            None => stream.write_all(body.as_bytes())?,
        }
        if body.len() < line.len() {
            stream.write_all(b"\n")?;
        }
    }
    stream.flush()
}

fn line_color(line: &str) -> Option<ColorSpec> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("-: ") {
        return Some(ColorSpec::new().set_fg(Some(Color::Red)).clone());
    }
    if trimmed.starts_with("+: ") {
        return Some(ColorSpec::new().set_fg(Some(Color::Green)).clone());
    }
    if is_key(line) {
        return Some(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true).clone());
    }
    None
}

/// Block keys sit at column zero and end with a colon.
fn is_key(line: &str) -> bool {
    !line.is_empty() && !line.starts_with(' ') && line.ends_with(':')
}
