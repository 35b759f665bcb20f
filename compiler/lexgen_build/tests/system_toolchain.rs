//! Builds with the real generator and compiler, when both are installed.

#![allow(clippy::unwrap_used, reason = "tests panic on unexpected state")]

use lexgen_build::{BuildCache, BuildConfig, BuildError, SystemToolchain};
use lexgen_rules::{compile, PatternSpec};

fn toolchain() -> Option<SystemToolchain> {
    let toolchain = SystemToolchain::new(&BuildConfig::from_env());
    if toolchain.detect().is_complete() {
        Some(toolchain)
    } else {
        eprintln!("skipping: flex or cc not installed");
        None
    }
}

#[test]
fn builds_a_loadable_module_once() {
    let Some(toolchain) = toolchain() else { return };
    let dir = tempfile::tempdir().unwrap();
    let cache = BuildCache::open(BuildConfig::from_env().with_scratch_dir(dir.path())).unwrap();
    let rules = compile(&[
        PatternSpec::emitting("token", r"[^\s]+"),
        PatternSpec::emitting("line_end", r"[\r\n]"),
    ])
    .unwrap();

    let artifact = cache.get_or_build(&rules, &toolchain).unwrap();
    assert!(artifact.module_path().is_file());
    assert!(!artifact.source_paths().grammar.exists());
    assert!(!artifact.source_paths().c_source.exists());
    assert_eq!(cache.count().unwrap(), 1);
}

#[test]
fn grammar_errors_surface_as_tool_failures() {
    let Some(toolchain) = toolchain() else { return };
    let dir = tempfile::tempdir().unwrap();
    let cache = BuildCache::open(BuildConfig::from_env().with_scratch_dir(dir.path())).unwrap();
    // Unbalanced bracket: flex rejects the rule.
    let rules = compile(&[PatternSpec::emitting("broken", "[a-z")]).unwrap();

    let err = cache.get_or_build(&rules, &toolchain).unwrap_err();

    assert!(matches!(err, BuildError::ToolFailed { .. }), "{err}");
    assert_eq!(cache.count().unwrap(), 0);
}

#[test]
fn missing_generator_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = BuildConfig::new()
        .with_scratch_dir(dir.path())
        .with_generator("lexgen-no-such-flex");
    let toolchain = SystemToolchain::new(&config);
    let cache = BuildCache::open(config).unwrap();
    let rules = compile(&[PatternSpec::emitting("word", "[a-z]+")]).unwrap();

    let err = cache.get_or_build(&rules, &toolchain).unwrap_err();

    assert!(matches!(err, BuildError::ToolNotFound { .. }));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}
