//! Failure report rendering: block order, dedup of value dumps and the
//! sources block.

use std::fs;

use predicates::prelude::*;
use predicates::str::contains;
use verdict::checkers::Notes;
use verdict::value::Value;
use verdict::{
    evaluate, render, write_report, CheckError, Checker, Comment, Invocation, Report,
    ReportConfig, DEEP_EQUALS, EQUALS, MATCHES,
};

const NO_SOURCES: &str = "sources:\n  <invocation not available>\n";

fn plain_config(context_lines: usize) -> ReportConfig {
    ReportConfig {
        context_lines,
        use_colors: false,
    }
}

fn fixture(lines: usize) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.rs");
    let body: String = (1..=lines).map(|i| format!("line {}\n", i)).collect();
    fs::write(&path, body).unwrap();
    (dir, path)
}

#[track_caller]
fn capture() -> Invocation {
    Invocation::caller()
}

#[cfg(test)]
mod error_block_tests {
    use super::*;

    #[test]
    fn test_full_failure_report() {
        let got = Value::from("42");
        let args = [Value::from("47")];
        let (result, notes) = evaluate(&EQUALS, &got, &args);
        let err = result.unwrap_err();
        let text = render(
            &EQUALS,
            &got,
            &args,
            &Comment::new("answer check"),
            &notes,
            &err,
            None,
        );
        let expected = String::from("\n")
            + "comment:\n  answer check\n"
            + "error:\n  not equal:\n  (-got +want)\n  \t-: \"42\"\n  \t+: \"47\"\n"
            + "check:\n  equals\n"
            + "got:\n  \"42\"\n"
            + "want:\n  \"47\"\n"
            + NO_SOURCES;
        assert_eq!(text, expected);
    }

    #[test]
    fn test_empty_comment_is_omitted() {
        let err = CheckError::failure("nope");
        let text = render(
            &EQUALS,
            &Value::from(1),
            &[Value::from(2)],
            &Comment::default(),
            &Notes::new(),
            &err,
            None,
        );
        assert!(text.starts_with("\nerror:\n  nope\n"), "{}", text);
        assert!(!text.contains("comment:"));
    }

    #[test]
    fn test_bad_check_hides_the_value_dump() {
        let got = Value::from(1);
        let (result, notes) = evaluate(&EQUALS, &got, &[]);
        let err = result.unwrap_err();
        let text = render(&EQUALS, &got, &[], &Comment::default(), &notes, &err, None);
        assert_eq!(
            text,
            format!(
                "\ninvalid number of arguments provided to checker: got 0, want 1\n{}",
                NO_SOURCES
            )
        );
    }

    #[test]
    fn test_bad_check_keeps_notes() {
        let got = Value::from("voyages");
        let args = [Value::from("(")];
        let (result, notes) = evaluate(&MATCHES, &got, &args);
        let err = result.unwrap_err();
        let text = render(&MATCHES, &got, &args, &Comment::default(), &notes, &err, None);
        assert!(text.starts_with(
            "\ncannot compile regular expression \"(\": error parsing regexp: missing closing ): `(`\nregexp error:\n"
        ));
        assert!(!text.contains("check:"));
        assert!(!text.contains("got value:"));
        assert!(text.ends_with(NO_SOURCES));
    }

    #[test]
    fn test_silent_failure_shows_only_notes() {
        let mut notes = Notes::new();
        notes.push("info", "hello");
        let text = render(
            &EQUALS,
            &Value::from(1),
            &[Value::from(2)],
            &Comment::new("shown"),
            &notes,
            &CheckError::silent(),
            None,
        );
        assert_eq!(
            text,
            format!("\ncomment:\n  shown\ninfo:\n  hello\n{}", NO_SOURCES)
        );
    }

    #[test]
    fn test_notes_precede_the_values() {
        let mut notes = Notes::new();
        notes.push("hint", "line one\nline two\n");
        let err = CheckError::failure("custom");
        let text = render(
            &EQUALS,
            &Value::from(1),
            &[Value::from(2)],
            &Comment::default(),
            &notes,
            &err,
            None,
        );
        assert!(
            text.contains("check:\n  equals\nhint:\n  line one\n  line two\ngot:\n  1\nwant:\n  2\n"),
            "{}",
            text
        );
    }
}

#[cfg(test)]
mod dedup_tests {
    use super::*;

    #[test]
    fn test_identical_dumps_are_referenced() {
        let err = CheckError::failure("custom");
        let text = render(
            &EQUALS,
            &Value::from(42),
            &[Value::from(42)],
            &Comment::default(),
            &Notes::new(),
            &err,
            None,
        );
        assert!(
            text.contains("got:\n  42\nwant:\n  <same as \"got\">\n"),
            "{}",
            text
        );
    }

    #[test]
    fn test_dedup_compares_rendered_text_against_notes() {
        let mut notes = Notes::new();
        notes.push("expected", "[\n    1,\n    2,\n]");
        let got = Value::list([1, 2]);
        let err = CheckError::failure("custom");
        let text = render(&DEEP_EQUALS, &got, &[Value::list([2, 1])], &Comment::default(), &notes, &err, None);
        assert!(text.contains("got:\n  <same as \"expected\">\n"), "{}", text);
        assert!(text.contains("want:\n  [\n      2,\n      1,\n  ]\n"), "{}", text);
    }

    #[test]
    fn test_same_type_different_values_are_both_dumped() {
        let err = CheckError::failure("custom");
        let text = render(
            &EQUALS,
            &Value::from("a"),
            &[Value::from("b")],
            &Comment::default(),
            &Notes::new(),
            &err,
            None,
        );
        assert!(!text.contains("<same as"), "{}", text);
    }
}

#[cfg(test)]
mod sources_tests {
    use super::*;

    #[test]
    fn test_context_window_marks_the_failing_line() {
        let (_dir, path) = fixture(10);
        let invocation = Invocation::from_parts(&path, 5);
        let err = CheckError::failure("nope");
        let got = Value::from(1);
        let args = [Value::from(2)];
        let text = Report::new(&EQUALS, &got, &args, &err)
            .invocation(&invocation)
            .render(&plain_config(3));
        let expected = "sources:\n  fixture.rs:5:\n"
            .to_string()
            + "    2   line 2\n"
            + "    3   line 3\n"
            + "    4   line 4\n"
            + "    5!  line 5\n"
            + "    6   line 6\n"
            + "    7   line 7\n"
            + "    8   line 8\n";
        assert!(text.ends_with(&expected), "{}", text);
    }

    #[test]
    fn test_context_window_is_configurable() {
        let (_dir, path) = fixture(12);
        let invocation = Invocation::from_parts(&path, 10);
        let err = CheckError::failure("nope");
        let got = Value::from(1);
        let args = [Value::from(2)];
        let text = Report::new(&EQUALS, &got, &args, &err)
            .invocation(&invocation)
            .render(&plain_config(1));
        let expected = "sources:\n  fixture.rs:10:\n"
            .to_string()
            + "    9    line 9\n"
            + "    10!  line 10\n"
            + "    11   line 11\n";
        assert!(text.ends_with(&expected), "{}", text);
    }

    #[test]
    fn test_window_clips_at_the_start_of_file() {
        let (_dir, path) = fixture(3);
        let invocation = Invocation::from_parts(&path, 1);
        let err = CheckError::failure("nope");
        let got = Value::from(1);
        let args = [Value::from(2)];
        let text = Report::new(&EQUALS, &got, &args, &err)
            .invocation(&invocation)
            .render(&plain_config(3));
        assert!(
            text.ends_with("    1!  line 1\n    2   line 2\n    3   line 3\n"),
            "{}",
            text
        );
    }

    #[test]
    fn test_line_beyond_end_of_file() {
        let (_dir, path) = fixture(3);
        let invocation = Invocation::from_parts(&path, 20);
        let err = CheckError::failure("nope");
        let got = Value::from(1);
        let args = [Value::from(2)];
        let text = Report::new(&EQUALS, &got, &args, &err)
            .invocation(&invocation)
            .render(&plain_config(3));
        assert!(
            text.ends_with("sources:\n  fixture.rs:20:\n    <cannot find source lines>\n"),
            "{}",
            text
        );
    }

    #[test]
    fn test_missing_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let invocation = Invocation::from_parts(dir.path().join("missing.rs"), 3);
        let err = CheckError::failure("nope");
        let got = Value::from(1);
        let args = [Value::from(2)];
        let text = Report::new(&EQUALS, &got, &args, &err)
            .invocation(&invocation)
            .render(&plain_config(3));
        assert!(contains("sources:\n  missing.rs:3:\n    <cannot open source file: ").eval(&text));
        assert!(text.ends_with(">\n"), "{}", text);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_unreadable_source_is_a_scan_error() {
        let dir = tempfile::tempdir().unwrap();
        let invocation = Invocation::from_parts(dir.path(), 3);
        let err = CheckError::failure("nope");
        let got = Value::from(1);
        let args = [Value::from(2)];
        let text = Report::new(&EQUALS, &got, &args, &err)
            .invocation(&invocation)
            .render(&plain_config(3));
        let name = dir.path().file_name().unwrap().to_string_lossy().into_owned();
        let expected = format!(
            "sources:\n  {}:3:\n    <cannot scan source file: Is a directory (os error 21)>\n",
            name
        );
        assert!(text.ends_with(&expected), "{}", text);
        assert!(!text.contains("cannot find source lines"), "{}", text);
    }

    #[test]
    fn test_invalid_utf8_before_the_window_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bytes.rs");
        fs::write(&path, b"\xff\xfe\nline 2\nline 3\nline 4\n").unwrap();
        let invocation = Invocation::from_parts(&path, 3);
        let err = CheckError::failure("nope");
        let got = Value::from(1);
        let args = [Value::from(2)];
        let text = Report::new(&EQUALS, &got, &args, &err)
            .invocation(&invocation)
            .render(&plain_config(1));
        assert!(
            text.ends_with("sources:\n  bytes.rs:3:\n    2   line 2\n    3!  line 3\n    4   line 4\n"),
            "{}",
            text
        );
    }

    #[test]
    fn test_sources_header_always_present() {
        let err = CheckError::bad_check("broken\n");
        let got = Value::Nil;
        let text = Report::new(&EQUALS, &got, &[], &err).render(&plain_config(3));
        assert!(contains("sources:\n").and(contains("<invocation not available>")).eval(&text));
    }

    #[test]
    fn test_caller_location_points_at_this_file() {
        let expected_line = line!() + 1;
        let invocation = capture();
        assert_eq!(invocation.line(), expected_line as usize);
        assert!(invocation.file().ends_with("report_tests.rs"));

        let err = CheckError::failure("nope");
        let got = Value::from(1);
        let args = [Value::from(2)];
        let text = Report::new(&EQUALS, &got, &args, &err)
            .invocation(&invocation)
            .render(&plain_config(0));
        let marker = format!("    {}!  ", expected_line);
        assert!(
            text.contains(&format!("{}        let invocation = capture();\n", marker)),
            "{}",
            text
        );
    }
}

#[cfg(test)]
mod writer_tests {
    use super::*;

    #[test]
    fn test_write_report_matches_render() {
        let got = Value::from("voyages");
        let args = [Value::from("these are the voyages")];
        let (result, notes) = evaluate(&MATCHES, &got, &args);
        let err = result.unwrap_err();
        let comment = Comment::from("matching");
        let mut out = Vec::new();
        write_report(&mut out, &MATCHES, &got, &args, &comment, &notes, &err, None).unwrap();
        let rendered = render(&MATCHES, &got, &args, &comment, &notes, &err, None);
        assert_eq!(String::from_utf8(out).unwrap(), rendered);
        assert!(rendered.contains("got value:\n  \"voyages\"\nregexp:\n  \"these are the voyages\"\n"));
    }

    #[test]
    fn test_report_uses_negated_checker_name() {
        let checker = verdict::not(&EQUALS);
        let got = Value::from(42);
        let args = [Value::from(42)];
        let (result, notes) = evaluate(&checker, &got, &args);
        let err = result.unwrap_err();
        let mut out = Vec::new();
        Report::new(&checker, &got, &args, &err)
            .notes(&notes)
            .write_to(&mut out, &plain_config(3))
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("error:\n  both values equal 42, but should not\ncheck:\n  not(equals)\n"));
        assert!(text.contains("got:\n  42\nwant:\n  <same as \"got\">\n"));
        assert_eq!(checker.arity(), 1);
    }
}
