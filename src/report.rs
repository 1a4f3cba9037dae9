//! Failure reports.
//!
//! A report is plain text in a fixed order: a leading blank line, the
//! comment, the error block and the sources block.
//!
//! ```text
//! comment:
//!   <comment>
//! error:
//!   <error text>
//! check:
//!   <checker name>
//! <note key>:
//!   <note value>
//! got:
//!   <got dump>
//! want:
//!   <same as "got">
//! sources:
//!   report_tests.rs:42:
//!     41   ...
//!     42!  ...
//! ```

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::iter;
use std::panic::Location;
use std::path::{Path, PathBuf};

use termcolor::ColorChoice;

use crate::checkers::{Checker, Notes};
use crate::errors::CheckError;
use crate::output;
use crate::value::Value;

mod source_context;

/// Indentation for every nested block.
pub const PREFIX: &str = "  ";

/// Lines of source shown on each side of the failing line.
pub const CONTEXT_LINES: usize = 3;

/// Free text shown above the failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comment(String);

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Comment {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Comment {
    fn from(text: String) -> Self {
        Self(text)
    }
}

/// The source location of the assertion that produced a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    file: PathBuf,
    line: usize,
}

impl Invocation {
    /// Captures the location of the caller.
    ///
    /// Assertion entry points that want their own caller reported instead
    /// should be marked `#[track_caller]` as well.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self {
            file: PathBuf::from(location.file()),
            line: location.line() as usize,
        }
    }

    pub fn from_parts(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn line(&self) -> usize {
        self.line
    }
}

/// Configuration for rendering and emitting reports.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub context_lines: usize,
    pub use_colors: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            context_lines: CONTEXT_LINES,
            use_colors: atty::is(atty::Stream::Stderr),
        }
    }
}

impl ReportConfig {
    pub fn color_choice(&self) -> ColorChoice {
        if self.use_colors {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        }
    }
}

/// Everything needed to describe one failed check.
pub struct Report<'a> {
    checker: &'a dyn Checker,
    got: &'a Value,
    args: &'a [Value],
    error: &'a CheckError,
    comment: Option<&'a Comment>,
    notes: Option<&'a Notes>,
    invocation: Option<&'a Invocation>,
}

impl<'a> Report<'a> {
    pub fn new(
        checker: &'a dyn Checker,
        got: &'a Value,
        args: &'a [Value],
        error: &'a CheckError,
    ) -> Self {
        Self {
            checker,
            got,
            args,
            error,
            comment: None,
            notes: None,
            invocation: None,
        }
    }

    pub fn comment(mut self, comment: &'a Comment) -> Self {
        self.comment = Some(comment);
        self
    }

    pub fn notes(mut self, notes: &'a Notes) -> Self {
        self.notes = Some(notes);
        self
    }

    pub fn invocation(mut self, invocation: &'a Invocation) -> Self {
        self.invocation = Some(invocation);
        self
    }

    pub fn render(&self, config: &ReportConfig) -> String {
        let mut out = String::from("\n");
        self.write_comment(&mut out);
        self.write_error(&mut out);
        source_context::write_invocation(&mut out, self.invocation, config.context_lines);
        out
    }

    pub fn write_to<W: io::Write>(&self, writer: &mut W, config: &ReportConfig) -> io::Result<()> {
        writer.write_all(self.render(config).as_bytes())
    }

    /// Writes the report to stderr, coloured when the config allows it.
    pub fn eprint(&self, config: &ReportConfig) -> io::Result<()> {
        let mut stream = output::stderr_stream(config);
        output::emit_report(&mut stream, &self.render(config))
    }

    fn write_comment(&self, out: &mut String) {
        if let Some(comment) = self.comment.filter(|c| !c.is_empty()) {
            out.push_str("comment:\n");
            out.push_str(&prefixed(PREFIX, comment.as_str()));
        }
    }

    fn write_error(&self, out: &mut String) {
        let mut show_error = true;
        if self.error.is_bad_check() {
            // Malformed checks only show the message and the notes.
            let message = self.error.to_string();
            out.push_str(message.strip_suffix('\n').unwrap_or(&message));
            out.push('\n');
            show_error = false;
        }
        if self.error.is_silent() {
            show_error = false;
        }

        let mut dumps = Dumps::default();
        let (name, arg_names) = self.checker.info();
        if show_error {
            out.push_str("error:\n");
            out.push_str(&prefixed(PREFIX, &self.error.to_string()));
            out.push_str("check:\n");
            out.push_str(&prefixed(PREFIX, &name));
        }

        if let Some(notes) = self.notes {
            for (key, value) in notes.iter() {
                dumps.write_pair(out, key, value);
            }
        }
        if !show_error {
            return;
        }

        for (i, value) in iter::once(self.got).chain(self.args).enumerate() {
            let key = arg_names
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("arg{}", i));
            dumps.write_pair(out, &key, &format!("{:#?}", value));
        }
    }
}

/// Renders a failure report with the default configuration.
pub fn render(
    checker: &dyn Checker,
    got: &Value,
    args: &[Value],
    comment: &Comment,
    notes: &Notes,
    error: &CheckError,
    invocation: Option<&Invocation>,
) -> String {
    let mut report = Report::new(checker, got, args, error)
        .comment(comment)
        .notes(notes);
    if let Some(invocation) = invocation {
        report = report.invocation(invocation);
    }
    report.render(&ReportConfig::default())
}

/// Writes a failure report with the default configuration to `writer`.
#[allow(clippy::too_many_arguments)]
pub fn write_report<W: io::Write>(
    writer: &mut W,
    checker: &dyn Checker,
    got: &Value,
    args: &[Value],
    comment: &Comment,
    notes: &Notes,
    error: &CheckError,
    invocation: Option<&Invocation>,
) -> io::Result<()> {
    let text = render(checker, got, args, comment, notes, error, invocation);
    writer.write_all(text.as_bytes())
}

/// Tracks dumped texts so a repeated dump is written as a back-reference.
#[derive(Default)]
struct Dumps {
    seen: HashMap<String, String>,
}

impl Dumps {
    fn write_pair(&mut self, out: &mut String, key: &str, value: &str) {
        out.push_str(key);
        out.push_str(":\n");
        if let Some(previous) = self.seen.get(value) {
            out.push_str(&prefixed(PREFIX, &format!("<same as {:?}>", previous)));
            return;
        }
        self.seen.insert(value.to_string(), key.to_string());
        out.push_str(&prefixed(PREFIX, value));
    }
}

/// Prefixes every line of `text`, dropping a single trailing empty line, and
/// terminates each line with a newline.
pub(crate) fn prefixed(prefix: &str, text: &str) -> String {
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.len() > 1 && lines.last() == Some(&"") {
        lines.pop();
    }
    let mut out = String::new();
    for line in lines {
        out.push_str(prefix);
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod prefix_tests {
    use super::*;

    #[test]
    fn test_prefixed_trims_one_trailing_line() {
        assert_eq!(prefixed(PREFIX, "a\nb\n"), "  a\n  b\n");
        assert_eq!(prefixed(PREFIX, "a\n\n"), "  a\n  \n");
        assert_eq!(prefixed(PREFIX, ""), "  \n");
        assert_eq!(prefixed(PREFIX, "one"), "  one\n");
    }
}
