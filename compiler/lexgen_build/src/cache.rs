//! Content-addressed store of built scanner modules.
//!
//! Every artifact lives in the scratch directory under the name
//! `{h}_scanner.{ext}`, where `h` is the rule set's content hash. A build
//! writes `{h}_scanner.l`, lets the generator produce `{h}_scanner.c` and
//! `{h}_scanner.h`, compiles the module under a temporary name and renames it
//! into place. The rename is the registration step: a module file either is
//! complete or absent, so a hit never sees a half-written library, even when
//! several processes share the scratch directory.
//!
//! The grammar, C source and header are deleted after every attempt,
//! successful or not.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lexgen_emit::GrammarFiles;
use lexgen_rules::{ContentHash, RuleSet};

use crate::inflight::InFlight;
use crate::toolchain::{module_extension, Toolchain};
use crate::{scratch, BuildConfig, BuildError};

const VERSION_FILE: &str = "version";

/// Paths of the intermediate files of one build.
///
/// They only exist while the build runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub grammar: PathBuf,
    pub c_source: PathBuf,
    pub c_header: PathBuf,
}

/// A built scanner module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    hash: ContentHash,
    source_paths: SourcePaths,
    module_path: PathBuf,
}

impl BuildArtifact {
    fn new(dir: &Path, hash: ContentHash) -> Self {
        let files = GrammarFiles::for_hash(hash);
        Self {
            hash,
            source_paths: SourcePaths {
                grammar: dir.join(&files.grammar),
                c_source: dir.join(&files.c_source),
                c_header: dir.join(&files.c_header),
            },
            module_path: dir.join(files.module(module_extension())),
        }
    }

    pub fn hash(&self) -> ContentHash {
        self.hash
    }

    pub fn source_paths(&self) -> &SourcePaths {
        &self.source_paths
    }

    /// The loadable module.
    pub fn module_path(&self) -> &Path {
        &self.module_path
    }
}

/// The scratch directory and the builds it holds.
#[derive(Debug)]
pub struct BuildCache {
    config: BuildConfig,
    dir: PathBuf,
    in_flight: InFlight,
}

impl BuildCache {
    /// Resolve and prepare the scratch directory.
    ///
    /// Modules left by a different version are removed: the native tail of
    /// the grammar is part of this crate, not of the content hash.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn open(config: BuildConfig) -> Result<Self, BuildError> {
        let dir = scratch::resolve(config.scratch_dir.as_deref())?;
        let cache = Self {
            config,
            dir,
            in_flight: InFlight::default(),
        };

        if !cache.validate()? {
            tracing::debug!(dir = %cache.dir.display(), "scratch version changed, clearing");
            cache.clear()?;
            cache.write_version()?;
        }
        tracing::debug!(dir = %cache.dir.display(), "opened build cache");
        Ok(cache)
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Return the module for `rules`, building it first if needed.
    ///
    /// A hit performs no writes and no toolchain calls. Concurrent callers
    /// with the same rule set wait for a single build.
    #[tracing::instrument(level = "debug", skip_all, fields(hash = %rules.content_hash()))]
    pub fn get_or_build(
        &self,
        rules: &RuleSet,
        toolchain: &dyn Toolchain,
    ) -> Result<BuildArtifact, BuildError> {
        let hash = rules.content_hash();
        if let Some(artifact) = self.artifact(hash) {
            tracing::debug!("cache hit");
            return Ok(artifact);
        }

        self.in_flight.run(hash, || {
            // Another thread may have finished the build while we waited.
            if let Some(artifact) = self.artifact(hash) {
                tracing::debug!("built concurrently");
                return Ok(artifact);
            }
            tracing::debug!("cache miss");
            self.build(rules, toolchain)
        })
    }

    /// The registered artifact for `hash`, if any.
    pub fn artifact(&self, hash: ContentHash) -> Option<BuildArtifact> {
        let artifact = BuildArtifact::new(&self.dir, hash);
        artifact.module_path.is_file().then_some(artifact)
    }

    pub fn contains(&self, hash: ContentHash) -> bool {
        self.artifact(hash).is_some()
    }

    /// Number of registered modules.
    pub fn count(&self) -> Result<usize, BuildError> {
        Ok(self.entries()?.filter(|name| is_module(name)).count())
    }

    /// Remove every module and any intermediates left by an interrupted
    /// build. Files lexgen did not create are left alone.
    pub fn clear(&self) -> Result<(), BuildError> {
        for name in self.entries()? {
            let path = self.dir.join(&name);
            remove_if_present(&path).map_err(BuildError::io(&path))?;
        }
        Ok(())
    }

    /// Check the version file against the configured version.
    pub fn validate(&self) -> Result<bool, BuildError> {
        let path = self.dir.join(VERSION_FILE);
        match fs::read_to_string(&path) {
            Ok(version) => Ok(version.trim() == self.config.version),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BuildError::io(path)(e)),
        }
    }

    fn write_version(&self) -> Result<(), BuildError> {
        let path = self.dir.join(VERSION_FILE);
        fs::write(&path, &self.config.version).map_err(BuildError::io(path))
    }

    /// Names of the scratch files this cache owns.
    fn entries(&self) -> Result<impl Iterator<Item = String>, BuildError> {
        let entries = fs::read_dir(&self.dir).map_err(BuildError::io(&self.dir))?;
        Ok(entries
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| is_scratch_file(name)))
    }

    fn build(
        &self,
        rules: &RuleSet,
        toolchain: &dyn Toolchain,
    ) -> Result<BuildArtifact, BuildError> {
        let grammar = lexgen_emit::render(rules);
        let artifact = BuildArtifact::new(&self.dir, grammar.hash());
        let staging = self.dir.join(format!(
            "{}.{}.tmp.{}",
            grammar.files().module_stem,
            std::process::id(),
            module_extension()
        ));

        let sources = &artifact.source_paths;
        let _attempt = Attempt {
            paths: [
                sources.grammar.clone(),
                sources.c_source.clone(),
                sources.c_header.clone(),
                staging.clone(),
            ],
        };

        fs::write(&sources.grammar, grammar.as_str())
            .map_err(BuildError::io(&sources.grammar))?;
        toolchain.generate(&sources.grammar, &self.dir)?;
        toolchain.compile(&sources.c_source, &staging)?;
        fs::rename(&staging, &artifact.module_path)
            .map_err(BuildError::io(&artifact.module_path))?;

        tracing::debug!(module = %artifact.module_path.display(), "registered module");
        Ok(artifact)
    }
}

/// Files written by one build attempt, removed when the attempt ends.
struct Attempt {
    paths: [PathBuf; 4],
}

impl Drop for Attempt {
    fn drop(&mut self) {
        for path in &self.paths {
            if let Err(e) = remove_if_present(path) {
                tracing::warn!(path = %path.display(), error = %e, "could not remove build file");
            }
        }
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// `{16 hex digits}_scanner.` followed by anything.
fn is_scratch_file(name: &str) -> bool {
    name.split_once("_scanner.")
        .is_some_and(|(stem, _)| stem.len() == 16 && ContentHash::from_hex(stem).is_some())
}

fn is_module(name: &str) -> bool {
    !name.contains(".tmp.")
        && Path::new(name)
            .extension()
            .is_some_and(|ext| ext == module_extension())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests panic on unexpected state")]
mod tests;
