//! Facade behaviour that needs no native toolchain.

#![allow(clippy::unwrap_used, reason = "tests panic on unexpected state")]

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lexgen::lexgen_build::BuildError;
use lexgen::lexgen_rules::ValidationError;
use lexgen::{BuildConfig, Error, Lexgen, PatternSpec, Toolchain};

/// Counts compilations; produces placeholder files.
#[derive(Clone, Default)]
struct Placeholder {
    compiled: Arc<AtomicUsize>,
}

impl Toolchain for Placeholder {
    fn generate(&self, grammar: &Path, _workdir: &Path) -> Result<(), BuildError> {
        fs::write(grammar.with_extension("c"), "").unwrap();
        fs::write(grammar.with_extension("h"), "").unwrap();
        Ok(())
    }

    fn compile(&self, _c_source: &Path, module: &Path) -> Result<(), BuildError> {
        self.compiled.fetch_add(1, Ordering::SeqCst);
        fs::write(module, "").unwrap();
        Ok(())
    }
}

fn open(dir: &Path, toolchain: Placeholder) -> Lexgen {
    Lexgen::with_toolchain(BuildConfig::new().with_scratch_dir(dir), toolchain).unwrap()
}

#[test]
fn validation_errors_surface_before_any_build() {
    let dir = tempfile::tempdir().unwrap();
    let toolchain = Placeholder::default();
    let lexgen = open(dir.path(), toolchain.clone());

    let err = lexgen
        .compile(&[
            PatternSpec::emitting("word", "[a-z]+"),
            PatternSpec::emitting("word", "[A-Z]+"),
        ])
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Validation(ValidationError::DuplicateName { .. })
    ));
    assert_eq!(toolchain.compiled.load(Ordering::SeqCst), 0);
}

#[test]
fn artifacts_are_built_once_per_rule_set() {
    let dir = tempfile::tempdir().unwrap();
    let toolchain = Placeholder::default();
    let lexgen = open(dir.path(), toolchain.clone());
    let rules = lexgen.rule_set(&lexgen::whitespace::rules()).unwrap();

    let first = lexgen.artifact(&rules).unwrap();
    let second = lexgen.artifact(&rules).unwrap();

    assert_eq!(first, second);
    assert_eq!(toolchain.compiled.load(Ordering::SeqCst), 1);
}

#[test]
fn unloadable_module_is_a_runtime_error() {
    let dir = tempfile::tempdir().unwrap();
    let lexgen = open(dir.path(), Placeholder::default());

    let err = lexgen.compile(&lexgen::whitespace::rules()).unwrap_err();

    assert!(matches!(err, Error::Runtime(_)), "{err}");
}

#[test]
fn missing_rule_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = lexgen::RuleFile::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}
