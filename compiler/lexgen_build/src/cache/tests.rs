use std::sync::atomic::{AtomicUsize, Ordering};

use lexgen_rules::{compile, PatternSpec};
use pretty_assertions::assert_eq;

use super::*;

/// Writes placeholder files where the real tools would, counting calls.
#[derive(Default)]
struct FakeToolchain {
    generated: AtomicUsize,
    compiled: AtomicUsize,
    fail_generate: bool,
    fail_compile: bool,
}

impl FakeToolchain {
    fn failing_generate() -> Self {
        Self {
            fail_generate: true,
            ..Self::default()
        }
    }

    fn failing_compile() -> Self {
        Self {
            fail_compile: true,
            ..Self::default()
        }
    }

    fn generated(&self) -> usize {
        self.generated.load(Ordering::SeqCst)
    }

    fn compiled(&self) -> usize {
        self.compiled.load(Ordering::SeqCst)
    }
}

fn failure(tool: &str) -> BuildError {
    BuildError::ToolFailed {
        tool: tool.to_string(),
        exit_code: Some(1),
        stderr: String::new(),
        command: tool.to_string(),
    }
}

impl Toolchain for FakeToolchain {
    fn generate(&self, grammar: &Path, workdir: &Path) -> Result<(), BuildError> {
        self.generated.fetch_add(1, Ordering::SeqCst);
        assert!(grammar.is_absolute(), "tools run in the scratch directory");
        assert!(grammar.is_file(), "grammar written before generating");
        assert_eq!(grammar.parent(), Some(workdir));
        fs::write(grammar.with_extension("c"), "/* c */").unwrap();
        fs::write(grammar.with_extension("h"), "/* h */").unwrap();
        if self.fail_generate {
            return Err(failure("flex"));
        }
        Ok(())
    }

    fn compile(&self, c_source: &Path, module: &Path) -> Result<(), BuildError> {
        self.compiled.fetch_add(1, Ordering::SeqCst);
        assert!(module.is_absolute());
        assert!(c_source.is_file(), "C source generated before compiling");
        fs::write(module, b"module").unwrap();
        if self.fail_compile {
            return Err(failure("cc"));
        }
        Ok(())
    }
}

fn whitespace_rules() -> RuleSet {
    compile(&[
        PatternSpec::emitting("token", r"[^\s]+"),
        PatternSpec::emitting("line_end", r"[\r\n]"),
    ])
    .unwrap()
}

fn open_cache(dir: &Path) -> BuildCache {
    BuildCache::open(BuildConfig::new().with_scratch_dir(dir)).unwrap()
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

// === Hits and misses ===

#[test]
fn second_build_is_a_hit() {
    let dir = tempfile::tempdir().unwrap();
    let cache = open_cache(dir.path());
    let toolchain = FakeToolchain::default();
    let rules = whitespace_rules();

    let first = cache.get_or_build(&rules, &toolchain).unwrap();
    let second = cache.get_or_build(&rules, &toolchain).unwrap();

    assert_eq!(first, second);
    assert_eq!(toolchain.generated(), 1);
    assert_eq!(toolchain.compiled(), 1);
}

#[test]
fn relative_scratch_directory_builds_with_absolute_paths() {
    let root = tempfile::tempdir_in(".").unwrap();
    let cache = open_cache(&root.path().join("scratch"));
    assert!(cache.scratch_dir().is_absolute());

    let toolchain = FakeToolchain::default();
    let artifact = cache.get_or_build(&whitespace_rules(), &toolchain).unwrap();

    assert!(artifact.module_path().is_absolute());
    assert!(artifact.module_path().is_file());
    assert_eq!(toolchain.generated(), 1);
}

#[test]
fn hit_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let cache = open_cache(dir.path());
    let toolchain = FakeToolchain::default();
    let rules = whitespace_rules();

    let artifact = cache.get_or_build(&rules, &toolchain).unwrap();
    let before = fs::metadata(artifact.module_path()).unwrap().modified().unwrap();
    let names = file_names(dir.path());

    cache.get_or_build(&rules, &toolchain).unwrap();

    assert_eq!(file_names(dir.path()), names);
    let after = fs::metadata(artifact.module_path()).unwrap().modified().unwrap();
    assert_eq!(before, after);
}

#[test]
fn equal_rule_lists_share_one_artifact_across_caches() {
    let dir = tempfile::tempdir().unwrap();
    let toolchain = FakeToolchain::default();

    let first = open_cache(dir.path())
        .get_or_build(&whitespace_rules(), &toolchain)
        .unwrap();
    let second = open_cache(dir.path())
        .get_or_build(&whitespace_rules(), &toolchain)
        .unwrap();

    assert_eq!(first.module_path(), second.module_path());
    assert_eq!(toolchain.compiled(), 1);
}

#[test]
fn different_rule_lists_build_separately() {
    let dir = tempfile::tempdir().unwrap();
    let cache = open_cache(dir.path());
    let toolchain = FakeToolchain::default();
    let other = compile(&[PatternSpec::emitting("word", "[a-z]+")]).unwrap();

    let a = cache.get_or_build(&whitespace_rules(), &toolchain).unwrap();
    let b = cache.get_or_build(&other, &toolchain).unwrap();

    assert_ne!(a.module_path(), b.module_path());
    assert_eq!(toolchain.compiled(), 2);
    assert_eq!(cache.count().unwrap(), 2);
}

#[test]
fn concurrent_first_builds_collapse_into_one() {
    let dir = tempfile::tempdir().unwrap();
    let cache = open_cache(dir.path());
    let toolchain = FakeToolchain::default();
    let rules = whitespace_rules();

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| cache.get_or_build(&rules, &toolchain).unwrap());
        }
    });

    assert_eq!(toolchain.compiled(), 1);
}

// === Layout ===

#[test]
fn artifact_is_named_by_hash_and_intermediates_are_removed() {
    let dir = tempfile::tempdir().unwrap();
    let cache = open_cache(dir.path());
    let rules = whitespace_rules();

    let artifact = cache.get_or_build(&rules, &FakeToolchain::default()).unwrap();

    let module = format!("{}_scanner.{}", rules.content_hash(), module_extension());
    assert_eq!(artifact.hash(), rules.content_hash());
    assert_eq!(artifact.module_path(), dir.path().join(&module));
    assert_eq!(file_names(dir.path()), [module, VERSION_FILE.to_string()]);
    assert!(!artifact.source_paths().grammar.exists());
    assert!(!artifact.source_paths().c_source.exists());
    assert!(!artifact.source_paths().c_header.exists());
}

#[test]
fn contains_tracks_registration() {
    let dir = tempfile::tempdir().unwrap();
    let cache = open_cache(dir.path());
    let rules = whitespace_rules();

    assert!(!cache.contains(rules.content_hash()));
    cache.get_or_build(&rules, &FakeToolchain::default()).unwrap();
    assert!(cache.contains(rules.content_hash()));
}

// === Failures ===

#[test]
fn failed_generation_registers_nothing_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let cache = open_cache(dir.path());
    let rules = whitespace_rules();
    let toolchain = FakeToolchain::failing_generate();

    let err = cache.get_or_build(&rules, &toolchain).unwrap_err();

    assert!(matches!(err, BuildError::ToolFailed { ref tool, .. } if tool == "flex"));
    assert_eq!(toolchain.compiled(), 0);
    assert!(!cache.contains(rules.content_hash()));
    assert_eq!(file_names(dir.path()), [VERSION_FILE]);
}

#[test]
fn failed_compilation_registers_nothing_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let cache = open_cache(dir.path());
    let rules = whitespace_rules();

    let err = cache
        .get_or_build(&rules, &FakeToolchain::failing_compile())
        .unwrap_err();

    assert!(matches!(err, BuildError::ToolFailed { ref tool, .. } if tool == "cc"));
    assert!(!cache.contains(rules.content_hash()));
    assert_eq!(file_names(dir.path()), [VERSION_FILE]);
}

#[test]
fn failed_build_is_retried_on_next_call() {
    let dir = tempfile::tempdir().unwrap();
    let cache = open_cache(dir.path());
    let rules = whitespace_rules();

    cache
        .get_or_build(&rules, &FakeToolchain::failing_compile())
        .unwrap_err();
    let toolchain = FakeToolchain::default();
    cache.get_or_build(&rules, &toolchain).unwrap();

    assert_eq!(toolchain.compiled(), 1);
}

// === Maintenance ===

#[test]
fn clear_removes_only_lexgen_files() {
    let dir = tempfile::tempdir().unwrap();
    let cache = open_cache(dir.path());
    cache
        .get_or_build(&whitespace_rules(), &FakeToolchain::default())
        .unwrap();
    fs::write(dir.path().join("notes.txt"), "keep").unwrap();
    fs::write(dir.path().join("0123456789abcdef_scanner.l"), "stale").unwrap();

    cache.clear().unwrap();

    assert_eq!(cache.count().unwrap(), 0);
    assert_eq!(file_names(dir.path()), ["notes.txt", VERSION_FILE]);
}

#[test]
fn version_change_discards_modules() {
    let dir = tempfile::tempdir().unwrap();
    let rules = whitespace_rules();
    open_cache(dir.path())
        .get_or_build(&rules, &FakeToolchain::default())
        .unwrap();

    let reopened =
        BuildCache::open(BuildConfig::new().with_scratch_dir(dir.path()).with_version("next"))
            .unwrap();

    assert!(!reopened.contains(rules.content_hash()));
    assert!(reopened.validate().unwrap());
    assert_eq!(
        fs::read_to_string(dir.path().join(VERSION_FILE)).unwrap(),
        "next"
    );
}

#[test]
fn same_version_keeps_modules() {
    let dir = tempfile::tempdir().unwrap();
    let rules = whitespace_rules();
    open_cache(dir.path())
        .get_or_build(&rules, &FakeToolchain::default())
        .unwrap();

    assert!(open_cache(dir.path()).contains(rules.content_hash()));
}

#[test]
fn scratch_file_names_are_recognised() {
    assert!(is_scratch_file("0123456789abcdef_scanner.so"));
    assert!(is_scratch_file("0123456789abcdef_scanner.1234.tmp.so"));
    assert!(!is_scratch_file("version"));
    assert!(!is_scratch_file("short_scanner.so"));
    assert!(!is_scratch_file("0123456789abcdeg_scanner.so"));
}
