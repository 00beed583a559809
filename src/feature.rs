// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Step coverage of [`gherkin::Feature`]s by a [`StepIndex`].

use std::{
    collections::HashMap,
    mem,
    path::{Path, PathBuf},
    sync::Arc,
};

use derive_more::with_trait::{Display, Error};
use gherkin::GherkinEnv;
use lazy_regex::regex;
use sealed::sealed;

use crate::{error::Result, step::AmbiguousMatchError, StepDefinition, StepIndex};

/// Helper methods to operate on [`gherkin::Feature`]s.
#[sealed]
pub trait Ext: Sized {
    /// Expands [`Scenario Outline`][1] [`Examples`][2].
    ///
    /// Every row of every [`Examples`][2] table becomes a separate scenario
    /// with its `<placeholder>`s substituted in the scenario name, step
    /// texts, doc strings and step tables. The [`Examples`][2] tags are added
    /// to the expanded scenario, and its position is the one of the row.
    ///
    /// # Errors
    ///
    /// If a placeholder names no column of its [`Examples`][2] table.
    ///
    /// [1]: https://cucumber.io/docs/gherkin/reference#scenario-outline
    /// [2]: https://cucumber.io/docs/gherkin/reference#examples
    fn expand_examples(self) -> Result<Self, ExpandExamplesError>;

    /// Counts all the [`Feature`]'s [`Step`]s, including the ones of
    /// [`Background`]s and [`Rule`]s.
    ///
    /// [`Background`]: gherkin::Background
    /// [`Feature`]: gherkin::Feature
    /// [`Rule`]: gherkin::Rule
    /// [`Step`]: gherkin::Step
    #[must_use]
    fn count_steps(&self) -> usize;

    /// Iterates over all the [`Feature`]'s [`Step`]s in document order,
    /// along with the name of the scenario (or background) owning them.
    ///
    /// [`Feature`]: gherkin::Feature
    /// [`Step`]: gherkin::Step
    fn steps(&self) -> Box<dyn Iterator<Item = (&str, &gherkin::Step)> + '_>;
}

#[sealed]
impl Ext for gherkin::Feature {
    fn expand_examples(mut self) -> Result<Self, ExpandExamplesError> {
        let path = self.path.clone();
        let expand = |scenarios: Vec<gherkin::Scenario>| {
            scenarios.into_iter().try_fold(Vec::new(), |mut out, s| {
                out.extend(expand_scenario(s, path.as_deref())?);
                Ok::<_, ExpandExamplesError>(out)
            })
        };

        for r in &mut self.rules {
            r.scenarios = expand(mem::take(&mut r.scenarios))?;
        }
        self.scenarios = expand(mem::take(&mut self.scenarios))?;

        Ok(self)
    }

    fn count_steps(&self) -> usize {
        self.steps().count()
    }

    fn steps(&self) -> Box<dyn Iterator<Item = (&str, &gherkin::Step)> + '_> {
        Box::new(
            background_steps(self.background.as_ref())
                .chain(scenario_steps(&self.scenarios))
                .chain(self.rules.iter().flat_map(|r| {
                    background_steps(r.background.as_ref())
                        .chain(scenario_steps(&r.scenarios))
                })),
        )
    }
}

/// Iterates over the steps of the given [`gherkin::Background`], if any.
fn background_steps<'a>(
    background: Option<&'a gherkin::Background>,
) -> impl Iterator<Item = (&'a str, &'a gherkin::Step)> {
    background
        .into_iter()
        .flat_map(|b| b.steps.iter().map(move |s| (b.name.as_str(), s)))
}

/// Iterates over the steps of the given [`gherkin::Scenario`]s.
fn scenario_steps(
    scenarios: &[gherkin::Scenario],
) -> impl Iterator<Item = (&str, &gherkin::Step)> {
    scenarios
        .iter()
        .flat_map(|sc| sc.steps.iter().map(move |s| (sc.name.as_str(), s)))
}

/// Expands the given `scenario` into one scenario per row of its
/// [`Examples`], or returns it as is if it has none.
///
/// [`Examples`]: gherkin::Examples
fn expand_scenario(
    scenario: gherkin::Scenario,
    path: Option<&Path>,
) -> Result<Vec<gherkin::Scenario>, ExpandExamplesError> {
    if scenario.examples.is_empty() {
        return Ok(vec![scenario]);
    }

    let mut expanded = Vec::new();
    for examples in &scenario.examples {
        let Some(table) = &examples.table else {
            continue;
        };
        let Some((header, rows)) = table.rows.split_first() else {
            continue;
        };

        for (i, row) in rows.iter().enumerate() {
            let values = header
                .iter()
                .map(String::as_str)
                .zip(row.iter().map(String::as_str))
                .collect::<HashMap<_, _>>();
            let fill = |text: &str, pos| substitute(text, &values, pos, path);

            let mut out = scenario.clone();
            out.examples.clear();
            out.position = table.position;
            out.position.line += i + 1;
            out.tags.extend(examples.tags.iter().cloned());
            out.name = fill(&out.name, out.position)?;

            for step in &mut out.steps {
                let pos = step.position;
                step.value = fill(&step.value, pos)?;
                if let Some(doc) = &mut step.docstring {
                    *doc = fill(doc.as_str(), pos)?;
                }
                for cell in step.table.iter_mut().flat_map(|t| &mut t.rows).flatten() {
                    *cell = fill(cell.as_str(), pos)?;
                }
            }
            expanded.push(out);
        }
    }
    Ok(expanded)
}

/// Substitutes every `<placeholder>` in the given `text` with its value.
fn substitute(
    text: &str,
    values: &HashMap<&str, &str>,
    pos: gherkin::LineCol,
    path: Option<&Path>,
) -> Result<String, ExpandExamplesError> {
    let template = regex!(r"<([^>\s]+)>");

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in template.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = values.get(name.as_str()).ok_or_else(|| ExpandExamplesError {
            pos,
            name: name.as_str().to_owned(),
            path: path.map(Path::to_path_buf),
        })?;
        out.push_str(&text[last..whole.start()]);
        out.push_str(value);
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

/// Error of [`Scenario Outline`][1] expansion encountering an unknown
/// placeholder.
///
/// [1]: https://cucumber.io/docs/gherkin/reference#scenario-outline
#[derive(Clone, Debug, Display, Error)]
#[display(
    "Failed to resolve <{name}> at {}:{}:{}",
    path.as_deref().map(Path::display).map(|p| p.to_string()).unwrap_or_default(),
    pos.line,
    pos.col
)]
pub struct ExpandExamplesError {
    /// Position of the unknown placeholder.
    pub pos: gherkin::LineCol,

    /// Name of the unknown placeholder.
    #[error(not(source))]
    pub name: String,

    /// [`Path`] to the `.feature` file, if present.
    pub path: Option<PathBuf>,
}

/// Outcome of looking a single step up in a [`StepIndex`].
#[derive(Clone, Debug)]
pub enum Outcome {
    /// Step matches exactly one [`StepDefinition`].
    Matched(Arc<StepDefinition>),

    /// Step matches no [`StepDefinition`].
    Undefined,

    /// Step matches multiple [`StepDefinition`]s.
    Ambiguous(AmbiguousMatchError),
}

impl Outcome {
    /// Indicates whether this [`Outcome`] is a [`Outcome::Matched`] one.
    #[must_use]
    pub const fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// Coverage of a single [`gherkin::Step`] by a [`StepIndex`].
#[derive(Clone, Debug)]
pub struct StepReport {
    /// Path to the `.feature` file, if known.
    pub path: Option<PathBuf>,

    /// Name of the scenario (or background) owning the step.
    pub scenario: String,

    /// Checked step.
    pub step: gherkin::Step,

    /// Lookup outcome.
    pub outcome: Outcome,
}

impl StepReport {
    /// Returns the `path:line:column` of the checked step.
    #[must_use]
    pub fn location(&self) -> String {
        format!(
            "{}:{}:{}",
            self.path
                .as_deref()
                .map(Path::display)
                .map(|p| p.to_string())
                .unwrap_or_default(),
            self.step.position.line,
            self.step.position.col,
        )
    }
}

/// Checks every step of the given [`gherkin::Feature`] against the given
/// [`StepIndex`].
///
/// A step is looked up among the [`StepDefinition`]s of its own kind first,
/// and among all of them if none of its kind matches. Steps of a
/// [`Scenario Outline`][1] are checked as they're written, so expand them with
/// [`Ext::expand_examples()`] first (as [`parse()`] does).
///
/// [1]: https://cucumber.io/docs/gherkin/reference#scenario-outline
#[must_use]
pub fn check(feature: &gherkin::Feature, index: &StepIndex) -> Vec<StepReport> {
    feature
        .steps()
        .map(|(scenario, step)| {
            let mut matches = index.find_matches_of(step.ty, &step.value);
            if matches.is_empty() {
                matches = index.find_matches(&step.value);
            }
            let outcome = match matches.len() {
                0 => Outcome::Undefined,
                1 => matches.pop().map_or(Outcome::Undefined, Outcome::Matched),
                _ => Outcome::Ambiguous(AmbiguousMatchError {
                    text: step.value.clone(),
                    possible_matches: matches,
                }),
            };
            StepReport {
                path: feature.path.clone(),
                scenario: scenario.to_owned(),
                step: step.clone(),
                outcome,
            }
        })
        .collect()
}

/// Parses the `.feature` file at the given `path`, or every `.feature` file
/// (case-insensitively) under the given directory, in path order.
///
/// [`Scenario Outline`][1]s of the parsed [`gherkin::Feature`]s are already
/// expanded.
///
/// # Errors
///
/// If any file cannot be read, parsed or expanded.
///
/// [1]: https://cucumber.io/docs/gherkin/reference#scenario-outline
pub fn parse(path: impl AsRef<Path>) -> Result<Vec<gherkin::Feature>> {
    let path = path.as_ref().canonicalize()?;

    let paths = if path.is_file() {
        vec![path]
    } else {
        let walker = globwalk::GlobWalkerBuilder::new(&path, "*.feature")
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
        paths
    };

    paths
        .iter()
        .map(|p| -> Result<gherkin::Feature> {
            let feature = gherkin::Feature::parse_path(p, GherkinEnv::default())?;
            tracing::debug!(path = %p.display(), "parsed feature");
            Ok(feature.expand_examples()?)
        })
        .collect()
}
