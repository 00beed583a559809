// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Concurrently refreshed index of [`StepDefinition`]s.
//!
//! A single [`StepIndex`] is shared between a background discovery worker,
//! replacing the [`StepDefinition`]s of whole containers, and any number of
//! readers looking step texts up. Every operation runs under one exclusive
//! lock, and readers always receive snapshots, so the lock is never held
//! while a caller iterates.

mod builder;

use std::{
    borrow::Borrow,
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use gherkin::StepType;
use lazy_regex::regex_is_match;

pub use self::builder::Builder;
use crate::step::{
    AmbiguousMatchError, ConstantResolver, Container, Declaration,
    DeclarationError, Matcher, NoConstants, StepDefinition, StepMarkers,
};

/// Summary of a single container being reprocessed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Reprocessed {
    /// Fully-qualified name of the reprocessed container.
    pub container: String,

    /// Number of [`StepDefinition`]s the container had before.
    pub removed: usize,

    /// Number of [`StepDefinition`]s the container has now.
    pub added: usize,

    /// Malformed declarations which were skipped.
    pub skipped: Vec<DeclarationError>,
}

/// Index state guarded by the lock of a [`StepIndex`].
#[derive(Debug, Default)]
struct Entries {
    /// Current generation of [`StepDefinition`]s of every container.
    by_container: HashMap<String, Vec<Arc<StepDefinition>>>,

    /// All the [`StepDefinition`]s, flattened and ordered by pattern.
    ordered: Vec<Arc<StepDefinition>>,
}

impl Entries {
    /// Replaces the [`StepDefinition`]s of the given `container` with the
    /// `fresh` ones, returning the number of removed ones.
    fn replace(
        &mut self,
        container: &str,
        fresh: Vec<Arc<StepDefinition>>,
    ) -> usize {
        self.ordered.retain(|d| d.container() != container);
        self.ordered.extend(fresh.iter().cloned());
        self.ordered.sort_by(|a, b| {
            a.pattern()
                .cmp(b.pattern())
                .then_with(|| a.container().cmp(b.container()))
                .then_with(|| a.location().cmp(b.location()))
        });

        let old = if fresh.is_empty() {
            self.by_container.remove(container)
        } else {
            self.by_container.insert(container.to_owned(), fresh)
        };
        old.map_or(0, |old| old.len())
    }
}

/// Container-keyed collection of [`StepDefinition`]s, safe to share between
/// threads.
#[derive(Debug)]
pub struct StepIndex {
    /// Indexed [`StepDefinition`]s.
    entries: Mutex<Entries>,

    /// Declaration kinds recognized as step definitions.
    markers: StepMarkers,

    /// Matching relation of step patterns and step texts.
    matcher: Box<dyn Matcher>,
}

impl Default for StepIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl StepIndex {
    /// Creates a new empty [`StepIndex`] with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Builder::default().build()
    }

    /// Starts configuring a new [`StepIndex`].
    #[must_use]
    pub fn builder() -> Builder {
        Builder::default()
    }

    fn with_config(markers: StepMarkers, matcher: Box<dyn Matcher>) -> Self {
        Self {
            entries: Mutex::new(Entries::default()),
            markers,
            matcher,
        }
    }

    /// Returns the recognized [`StepMarkers`].
    #[must_use]
    pub const fn markers(&self) -> &StepMarkers {
        &self.markers
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        // Entries are swapped wholesale under the lock, so a panicking
        // holder can't leave them half-written.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reprocesses the given [`Container`], replacing all its previously
    /// indexed [`StepDefinition`]s.
    pub fn reprocess(&self, container: &Container) -> Reprocessed {
        self.reprocess_container(
            &container.name,
            &container.declarations,
            container.constants.as_slice(),
        )
    }

    /// Replaces all the [`StepDefinition`]s of the `container` with the ones
    /// built from its recognized `declarations`.
    ///
    /// Declaration values naming a constant are resolved with the given
    /// `constants`. Malformed declarations are skipped and logged without
    /// affecting the other ones. Reprocessing with no qualifying declarations
    /// clears the `container`.
    ///
    /// The replacement is atomic: readers observe either the old or the new
    /// generation of the `container`, never a mix or an intermediate empty
    /// state.
    pub fn reprocess_container<I, D, R>(
        &self,
        container: &str,
        declarations: I,
        constants: R,
    ) -> Reprocessed
    where
        I: IntoIterator<Item = D>,
        D: Borrow<Declaration>,
        R: ConstantResolver,
    {
        let mut skipped = Vec::new();
        let fresh = declarations
            .into_iter()
            .filter_map(|decl| {
                self.build(container, decl.borrow(), &constants)
                    .unwrap_or_else(|e| {
                        tracing::warn!(
                            container,
                            error = %e,
                            "skipping malformed step declaration",
                        );
                        skipped.push(e);
                        None
                    })
            })
            .map(Arc::new)
            .collect::<Vec<_>>();
        let added = fresh.len();

        let removed = self.lock().replace(container, fresh);

        tracing::debug!(container, removed, added, "reprocessed steps");
        Reprocessed {
            container: container.to_owned(),
            removed,
            added,
            skipped,
        }
    }

    /// Same as [`StepIndex::reprocess_container()`], but without any constants
    /// to resolve.
    pub fn reprocess_literals<I, D>(
        &self,
        container: &str,
        declarations: I,
    ) -> Reprocessed
    where
        I: IntoIterator<Item = D>,
        D: Borrow<Declaration>,
    {
        self.reprocess_container(container, declarations, NoConstants)
    }

    /// Builds a [`StepDefinition`] out of the given [`Declaration`], if it's
    /// recognized as a step one.
    fn build(
        &self,
        container: &str,
        decl: &Declaration,
        constants: &impl ConstantResolver,
    ) -> Result<Option<StepDefinition>, DeclarationError> {
        let Some(kind) = self.markers.step_type(&decl.kind) else {
            return Ok(None);
        };
        let location = decl.location.clone().ok_or_else(|| {
            DeclarationError::MissingLocation { value: decl.value.clone() }
        })?;
        let owner = decl.owner.as_deref().ok_or_else(|| {
            DeclarationError::MissingOwner { value: decl.value.clone() }
        })?;

        let value = if looks_like_identifier(&decl.value) {
            constants.resolve(&decl.value).ok_or_else(|| {
                DeclarationError::UnresolvedConstant { name: decl.value.clone() }
            })?
        } else {
            decl.value.as_str()
        };

        Ok(Some(StepDefinition::new(
            crate::step::unescape(value),
            container,
            kind,
            location,
            owner,
            self.matcher.as_ref(),
        )))
    }

    /// Removes all the [`StepDefinition`]s of all containers.
    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.by_container.clear();
        entries.ordered.clear();
        drop(entries);

        tracing::debug!("cleared all steps");
    }

    /// Returns all the [`StepDefinition`]s matching the given step `text`,
    /// ordered by pattern.
    #[must_use]
    pub fn find_matches(&self, text: &str) -> Vec<Arc<StepDefinition>> {
        self.lock()
            .ordered
            .iter()
            .filter(|d| d.is_match(text))
            .cloned()
            .collect()
    }

    /// Returns all the [`StepDefinition`]s of the given `kind` matching the
    /// given step `text`, ordered by pattern.
    #[must_use]
    pub fn find_matches_of(
        &self,
        kind: StepType,
        text: &str,
    ) -> Vec<Arc<StepDefinition>> {
        self.lock()
            .ordered
            .iter()
            .filter(|d| d.kind() == kind && d.is_match(text))
            .cloned()
            .collect()
    }

    /// Returns the single [`StepDefinition`] matching the given step `text`,
    /// if any.
    ///
    /// # Errors
    ///
    /// If the `text` matches multiple [`StepDefinition`]s.
    pub fn find_unique(
        &self,
        text: &str,
    ) -> Result<Option<Arc<StepDefinition>>, AmbiguousMatchError> {
        let mut matches = self.find_matches(text);
        match matches.len() {
            0 | 1 => Ok(matches.pop()),
            _ => Err(AmbiguousMatchError {
                text: text.to_owned(),
                possible_matches: matches,
            }),
        }
    }

    /// Indicates whether any [`StepDefinition`] matches the given step `text`.
    #[must_use]
    pub fn has_match(&self, text: &str) -> bool {
        self.lock().ordered.iter().any(|d| d.is_match(text))
    }

    /// Returns a snapshot of all the [`StepDefinition`]s, ordered by pattern.
    #[must_use]
    pub fn all_definitions(&self) -> Vec<Arc<StepDefinition>> {
        self.lock().ordered.clone()
    }

    /// Returns a snapshot of the [`StepDefinition`]s of the given `container`,
    /// in declaration order.
    #[must_use]
    pub fn definitions_of(&self, container: &str) -> Vec<Arc<StepDefinition>> {
        self.lock()
            .by_container
            .get(container)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the total number of indexed [`StepDefinition`]s.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().ordered.len()
    }

    /// Indicates whether no [`StepDefinition`] is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().ordered.is_empty()
    }
}

/// Checks whether the given raw declaration `value` names a constant rather
/// than holding a literal.
fn looks_like_identifier(value: &str) -> bool {
    regex_is_match!(r"^[A-Za-z_][A-Za-z0-9_.]*$", value)
}
