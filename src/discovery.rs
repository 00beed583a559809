// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Background discovery of step declarations.
//!
//! A [`DeclarationSource`] walks some source tree and reports the
//! [`Container`]s it finds. A [`Processor`] feeds them into a shared
//! [`StepIndex`], on a dedicated thread if needed, while readers keep looking
//! steps up.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
    thread::{self, JoinHandle},
};

use crate::{
    error::{Error, Result},
    step::Container,
    StepIndex,
};

/// Name of the thread spawned by [`Processor::spawn()`].
pub const THREAD_NAME: &str = "step-discovery";

/// Glob of the steps manifests found by a [`ManifestSource`] in a directory.
pub const MANIFEST_GLOB: &str = "*.steps.json";

/// Walker of a source tree reporting the [`Container`]s declaring steps.
pub trait DeclarationSource {
    /// Returns all the [`Container`]s of this source.
    ///
    /// A part of the source which cannot be read is reported as an [`Err`]
    /// item without stopping the rest of it.
    fn containers(self) -> Box<dyn Iterator<Item = Result<Container>> + Send>;
}

impl DeclarationSource for Vec<Container> {
    fn containers(self) -> Box<dyn Iterator<Item = Result<Container>> + Send> {
        Box::new(self.into_iter().map(Ok))
    }
}

/// [`DeclarationSource`] reading JSON manifests, each holding an array of
/// [`Container`]s.
#[derive(Clone, Debug)]
pub struct ManifestSource {
    /// Manifest file, or directory to find [`MANIFEST_GLOB`] files in.
    path: PathBuf,
}

impl ManifestSource {
    /// Creates a new [`ManifestSource`] reading the manifest file at the given
    /// `path`, or every [`MANIFEST_GLOB`] file under the given directory.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path this [`ManifestSource`] reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lists the manifest files to read, in path order.
    fn manifests(&self) -> Result<Vec<PathBuf>> {
        if !self.path.is_dir() {
            return Ok(vec![self.path.clone()]);
        }

        let walker = globwalk::GlobWalkerBuilder::new(&self.path, MANIFEST_GLOB)
            .case_insensitive(true)
            .build()?;
        let mut paths = walker
            .filter_map(|entry| {
                entry
                    .map_err(|e| {
                        tracing::warn!(error = %e, "skipping unreadable entry");
                    })
                    .ok()
            })
            .map(globwalk::DirEntry::into_path)
            .collect::<Vec<_>>();
        paths.sort();
        Ok(paths)
    }
}

/// Reads the [`Container`]s of a single manifest file.
///
/// # Errors
///
/// If the file cannot be read or decoded.
pub fn read_manifest(path: &Path) -> Result<Vec<Container>> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|source| Error::Manifest {
        path: path.to_path_buf(),
        source,
    })
}

impl DeclarationSource for ManifestSource {
    fn containers(self) -> Box<dyn Iterator<Item = Result<Container>> + Send> {
        match self.manifests() {
            Ok(paths) => Box::new(paths.into_iter().flat_map(|path| {
                match read_manifest(&path) {
                    Ok(containers) => {
                        tracing::debug!(
                            path = %path.display(),
                            containers = containers.len(),
                            "read steps manifest",
                        );
                        containers.into_iter().map(Ok).collect::<Vec<_>>()
                    }
                    Err(e) => vec![Err(e)],
                }
            })),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }
}

/// Outcome of a [`Processor`] run.
#[derive(Debug, Default)]
pub struct Summary {
    /// Number of reprocessed [`Container`]s.
    pub containers: usize,

    /// Number of [`StepDefinition`]s the reprocessed [`Container`]s have now.
    ///
    /// [`StepDefinition`]: crate::StepDefinition
    pub definitions: usize,

    /// Number of malformed declarations skipped.
    pub skipped: usize,

    /// Parts of the source which couldn't be read.
    pub failures: Vec<Error>,
}

/// Feeder of a shared [`StepIndex`] with the [`Container`]s of a
/// [`DeclarationSource`].
#[derive(Clone, Debug)]
pub struct Processor {
    /// Fed [`StepIndex`].
    index: Arc<StepIndex>,
}

impl Processor {
    /// Creates a new [`Processor`] feeding the given [`StepIndex`].
    #[must_use]
    pub const fn new(index: Arc<StepIndex>) -> Self {
        Self { index }
    }

    /// Returns the fed [`StepIndex`].
    #[must_use]
    pub const fn index(&self) -> &Arc<StepIndex> {
        &self.index
    }

    /// Reprocesses every [`Container`] of the given `source` on the current
    /// thread.
    ///
    /// Unreadable parts of the `source` are logged and skipped, leaving the
    /// [`Container`]s they hold untouched in the [`StepIndex`].
    pub fn run(&self, source: impl DeclarationSource) -> Summary {
        tracing::info!("discovering step definitions");

        let mut summary = Summary::default();
        for container in source.containers() {
            match container {
                Ok(container) => {
                    let reprocessed = self.index.reprocess(&container);
                    summary.containers += 1;
                    summary.definitions += reprocessed.added;
                    summary.skipped += reprocessed.skipped.len();
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to read step declarations");
                    summary.failures.push(e);
                }
            }
        }

        tracing::info!(
            containers = summary.containers,
            definitions = summary.definitions,
            skipped = summary.skipped,
            failures = summary.failures.len(),
            "discovered step definitions",
        );
        summary
    }

    /// Same as [`Processor::run()`], but on a dedicated background thread.
    ///
    /// # Errors
    ///
    /// If the thread cannot be spawned.
    pub fn spawn<S>(&self, source: S) -> io::Result<JoinHandle<Summary>>
    where
        S: DeclarationSource + Send + 'static,
    {
        let this = self.clone();
        thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || this.run(source))
    }

    /// Removes all the [`StepDefinition`]s of the given `container`, as when
    /// its source is deleted.
    ///
    /// [`StepDefinition`]: crate::StepDefinition
    pub fn forget(&self, container: &str) {
        _ = self
            .index
            .reprocess_literals(container, std::iter::empty::<crate::step::Declaration>());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{Declaration, Location, Point};

    fn container(name: &str, patterns: &[&str]) -> Container {
        patterns.iter().enumerate().fold(Container::new(name), |c, (i, p)| {
            let line = u32::try_from(i).unwrap() + 1;
            c.declaration(
                Declaration::new("Cuke4Nuke.Framework.GivenAttribute", format!("\"{p}\""))
                    .at(Location::new("Steps.cs", Point::new(line, 1), Point::new(line, 9)))
                    .owned_by(format!("{name}.M{i}")),
            )
        })
    }

    #[test]
    fn run_reprocesses_every_container() {
        let processor = Processor::new(Arc::new(StepIndex::new()));

        let summary = processor.run(vec![
            container("A", &["a", "b"]),
            container("B", &["c"]),
        ]);

        assert_eq!(summary.containers, 2);
        assert_eq!(summary.definitions, 3);
        assert!(summary.failures.is_empty());
        assert_eq!(processor.index().len(), 3);
    }

    #[test]
    fn spawned_worker_publishes_to_shared_index() {
        let index = Arc::new(StepIndex::new());
        let processor = Processor::new(Arc::clone(&index));

        let handle = processor.spawn(vec![container("A", &["a"])]).unwrap();
        assert_eq!(handle.thread().name(), Some(THREAD_NAME));
        let summary = handle.join().unwrap();

        assert_eq!(summary.definitions, 1);
        assert!(index.has_match("a"));
    }

    #[test]
    fn forget_removes_container() {
        let processor = Processor::new(Arc::new(StepIndex::new()));
        _ = processor.run(vec![container("A", &["a"]), container("B", &["b"])]);

        processor.forget("A");

        assert!(!processor.index().has_match("a"));
        assert!(processor.index().has_match("b"));
    }

    #[test]
    fn missing_manifest_is_failure() {
        let processor = Processor::new(Arc::new(StepIndex::new()));

        let summary = processor.run(ManifestSource::new("does/not/exist.steps.json"));

        assert_eq!(summary.failures.len(), 1);
        assert!(matches!(summary.failures[0], Error::Io(_)));
        assert!(processor.index().is_empty());
    }
}
