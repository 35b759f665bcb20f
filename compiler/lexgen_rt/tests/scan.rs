//! Scanning through real modules, when `flex` and `cc` are installed.

#![allow(clippy::unwrap_used, reason = "tests panic on unexpected state")]

use std::io::Write;
use std::sync::Arc;

use lexgen_build::{BuildCache, BuildConfig, SystemToolchain};
use lexgen_rt::{RuntimeError, ScannerModule, Token};
use lexgen_rules::{compile, PatternSpec};
use pretty_assertions::assert_eq;

struct Fixture {
    _scratch: tempfile::TempDir,
    module: Arc<ScannerModule>,
}

fn build(specs: &[PatternSpec]) -> Option<Fixture> {
    let config = BuildConfig::from_env();
    let toolchain = SystemToolchain::new(&config);
    if !toolchain.detect().is_complete() {
        eprintln!("skipping: flex or cc not installed");
        return None;
    }
    let scratch = tempfile::tempdir().unwrap();
    let cache = BuildCache::open(config.with_scratch_dir(scratch.path())).unwrap();
    let rules = compile(specs).unwrap();
    let artifact = cache.get_or_build(&rules, &toolchain).unwrap();
    Some(Fixture {
        _scratch: scratch,
        module: ScannerModule::load(&artifact).unwrap(),
    })
}

fn whitespace() -> Option<Fixture> {
    build(&[
        PatternSpec::emitting("token", r"[^\s]+"),
        PatternSpec::emitting("line_end", r"[\r\n]"),
    ])
}

fn texts(tokens: impl IntoIterator<Item = Result<Token, RuntimeError>>) -> Vec<String> {
    tokens.into_iter().map(|token| token.unwrap().text).collect()
}

const INPUT: &str = "This is a line.\nAnd this is another.";
const EXPECTED: [&str; 9] = [
    "This", "is", "a", "line.", "\n", "And", "this", "is", "another.",
];

#[test]
fn whitespace_rules_split_words_and_line_ends() {
    let Some(fixture) = whitespace() else { return };

    let tokens: Vec<Token> = fixture
        .module
        .scan_string(INPUT)
        .unwrap()
        .map(Result::unwrap)
        .collect();

    assert_eq!(tokens.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(), EXPECTED);
    assert_eq!(tokens[4].kind, "line_end");
    assert!(tokens.iter().filter(|t| t.text != "\n").all(|t| t.is("token")));
}

#[test]
fn stream_stays_finished() {
    let Some(fixture) = whitespace() else { return };
    let mut stream = fixture.module.scan_string("one").unwrap();

    assert_eq!(stream.next().unwrap().unwrap(), Token::new("token", "one"));
    assert!(stream.next().is_none());
    assert!(stream.is_finished());
    assert!(stream.next().is_none());
}

#[test]
fn empty_input_yields_nothing() {
    let Some(fixture) = whitespace() else { return };
    assert_eq!(fixture.module.scan_string("").unwrap().count(), 0);
}

#[test]
fn streams_over_one_module_are_independent() {
    let Some(fixture) = whitespace() else { return };
    let mut first = fixture.module.scan_string("a b").unwrap();
    let mut second = fixture.module.scan_string("x y").unwrap();

    assert_eq!(first.next().unwrap().unwrap().text, "a");
    assert_eq!(second.next().unwrap().unwrap().text, "x");
    assert_eq!(first.next().unwrap().unwrap().text, "b");
    assert_eq!(second.next().unwrap().unwrap().text, "y");
}

#[test]
fn streams_run_on_many_threads() {
    let Some(fixture) = whitespace() else { return };

    std::thread::scope(|s| {
        for _ in 0..4 {
            let stream = fixture.module.scan_string(INPUT).unwrap();
            s.spawn(move || assert_eq!(texts(stream), EXPECTED));
        }
    });
}

#[test]
fn early_release_is_allowed() {
    let Some(fixture) = whitespace() else { return };
    let mut stream = fixture.module.scan_string(INPUT).unwrap();
    stream.next();
    stream.release();

    let stream = fixture.module.scan_string("again").unwrap();
    drop(stream);
}

#[test]
fn input_need_not_outlive_stream() {
    let Some(fixture) = whitespace() else { return };
    let stream = {
        let input = String::from("short lived");
        fixture.module.scan_string(&input).unwrap()
    };
    assert_eq!(texts(stream), ["short", "lived"]);
}

#[test]
fn files_are_scanned_by_path() {
    let Some(fixture) = whitespace() else { return };
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(INPUT.as_bytes()).unwrap();
    file.flush().unwrap();

    assert_eq!(texts(fixture.module.scan_path(file.path()).unwrap()), EXPECTED);
}

#[cfg(unix)]
#[test]
fn descriptor_is_duplicated() {
    use lexgen_rt::FileMode;

    let Some(fixture) = whitespace() else { return };
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(INPUT.as_bytes()).unwrap();
    std::io::Seek::rewind(&mut file).unwrap();

    let stream = fixture.module.scan_file(&file, FileMode::Text).unwrap();
    drop(file);

    assert_eq!(texts(stream), EXPECTED);
}

#[test]
fn unmatched_input_is_skipped() {
    let Some(fixture) = build(&[PatternSpec::emitting("number", "[0-9]+")]) else {
        return;
    };
    assert_eq!(
        texts(fixture.module.scan_string("a1 bb22 ccc333").unwrap()),
        ["1", "22", "333"]
    );
}

#[test]
fn named_groups_emit_their_own_kinds() {
    let Some(fixture) = build(&[PatternSpec::definition(
        "date",
        "(?P<year>[0-9]{4})-(?P<month>[0-9]{2})",
    )]) else {
        return;
    };

    let tokens: Vec<Token> = fixture
        .module
        .scan_string("2024-05")
        .unwrap()
        .map(Result::unwrap)
        .collect();

    assert_eq!(
        tokens,
        [Token::new("_date_year", "2024"), Token::new("_date_month", "05")]
    );
}

#[test]
fn invalid_utf8_is_reported_and_skippable() {
    let Some(fixture) = whitespace() else { return };
    let mut stream = fixture.module.scan_string(b"\xff\xfe ok").unwrap();

    assert!(matches!(
        stream.next(),
        Some(Err(RuntimeError::InvalidUtf8 { what: "text", .. }))
    ));
    assert_eq!(stream.next().unwrap().unwrap().text, "ok");
}
