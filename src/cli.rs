// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Command line host of a [`LineScanner`] and a [`StepIndex`].
//!
//! Plays the role of an editor: loads step manifests on a background
//! [`Processor`] at startup, and then either paints a `.feature` file token by
//! token, checks feature files for undefined or ambiguous steps, or lists the
//! discovered step definitions.

use std::{
    borrow::Cow,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use console::Style;
use gherkin::StepType;
use itertools::Itertools as _;
use smart_default::SmartDefault;

use crate::{
    discovery::{ManifestSource, Processor, Summary},
    error::Result,
    feature::{self, Outcome},
    scanner::{State, TokenColor, TokenInfo},
    step::{matcher, StepMarkers},
    LineScanner, StepIndex,
};

pub use clap::Parser;

/// Root CLI (command line interface) of the `cucumber-lens` binary.
#[derive(clap::Parser, Clone, Debug)]
#[command(
    name = "cucumber-lens",
    about = "Paint Gherkin features and look their steps up",
    long_about = "Paint Gherkin features and look their steps up in step \
                  definitions discovered from steps manifests"
)]
pub struct Opts {
    /// Verbosity of logging to stderr.
    ///
    /// `-v` logs discovery progress, `-vv` reprocessed containers, `-vvv`
    /// every scanned token.
    #[arg(short, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Coloring policy for a console output.
    #[arg(
        long,
        value_name = "auto|always|never",
        default_value = "auto",
        global = true
    )]
    pub color: Coloring,

    /// Steps manifest (JSON array of containers) to load, or directory to
    /// load every `*.steps.json` manifest from.
    #[arg(long = "steps", value_name = "PATH", global = true)]
    pub steps: Vec<PathBuf>,

    /// Relation of step patterns and step texts.
    #[arg(
        long,
        value_name = "literal|regex|expression",
        default_value = "regex",
        global = true
    )]
    pub matcher: matcher::Kind,

    /// Additional declaration kind recognized as a step marker.
    #[arg(
        long = "marker",
        value_name = "KIND=given|when|then",
        value_parser = parse_marker,
        global = true
    )]
    pub markers: Vec<(String, StepType)>,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Commands of the `cucumber-lens` binary.
#[derive(clap::Subcommand, Clone, Debug)]
pub enum Command {
    /// Print every token of a `.feature` file, highlighting recognized steps.
    Scan {
        /// `.feature` file to scan.
        file: PathBuf,
    },

    /// Check `.feature` files for undefined and ambiguous steps.
    Check {
        /// `.feature` file, or directory to check every `.feature` file in.
        path: PathBuf,
    },

    /// List the discovered step definitions.
    Steps,
}

/// Possible policies of a [`console`] output coloring.
#[derive(Clone, Copy, Debug, Eq, PartialEq, SmartDefault)]
pub enum Coloring {
    /// Letting [`console::colors_enabled()`] to decide, whether output should
    /// be colored.
    #[default]
    Auto,

    /// Forcing of a colored output.
    Always,

    /// Forcing of a non-colored output.
    Never,
}

impl FromStr for Coloring {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err("possible options: auto, always, never"),
        }
    }
}

/// Parses a `KIND=given|when|then` step marker.
fn parse_marker(s: &str) -> Result<(String, StepType), String> {
    let (kind, ty) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected `KIND=given|when|then`, got `{s}`"))?;
    let ty = match ty.to_ascii_lowercase().as_str() {
        "given" => StepType::Given,
        "when" => StepType::When,
        "then" => StepType::Then,
        _ => return Err(format!("unknown step kind `{ty}`")),
    };
    if kind.is_empty() {
        return Err("empty marker kind".into());
    }
    Ok((kind.to_owned(), ty))
}

/// [`Style`]s for terminal output.
#[derive(Clone, Debug)]
pub struct Styles {
    /// [`Style`] for rendering matched and recognized steps.
    pub ok: Style,

    /// [`Style`] for rendering ambiguous steps.
    pub skipped: Style,

    /// [`Style`] for rendering errors and undefined steps.
    pub err: Style,

    /// [`Style`] for rendering keywords.
    pub header: Style,

    /// [`Style`] for rendering __bold__.
    pub bold: Style,

    /// Indicates whether the terminal was detected.
    pub is_present: bool,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            ok: Style::new().green(),
            skipped: Style::new().cyan(),
            err: Style::new().red(),
            header: Style::new().blue(),
            bold: Style::new().bold(),
            is_present: console::user_attended() && console::colors_enabled(),
        }
    }
}

impl Styles {
    /// Creates new [`Styles`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the given [`Coloring`] policy to these [`Styles`].
    pub fn apply_coloring(&mut self, color: Coloring) {
        match color {
            Coloring::Auto => {}
            Coloring::Always => self.is_present = true,
            Coloring::Never => self.is_present = false,
        }
    }

    /// Colors `input` with the given `style` if terminal is present.
    fn paint<'a>(&self, style: &Style, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        if self.is_present {
            style.clone().force_styling(true).apply_to(input.into()).to_string().into()
        } else {
            input.into()
        }
    }

    /// Colors `input` with [`Styles::ok`] if terminal is present.
    #[must_use]
    pub fn ok<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.paint(&self.ok, input)
    }

    /// Colors `input` with [`Styles::skipped`] if terminal is present.
    #[must_use]
    pub fn skipped<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.paint(&self.skipped, input)
    }

    /// Colors `input` with [`Styles::err`] if terminal is present.
    #[must_use]
    pub fn err<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.paint(&self.err, input)
    }

    /// Colors `input` with [`Styles::header`] if terminal is present.
    #[must_use]
    pub fn header<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.paint(&self.header, input)
    }

    /// Makes `input` __bold__ if terminal is present.
    #[must_use]
    pub fn bold<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.paint(&self.bold, input)
    }
}

impl Opts {
    /// Builds an empty [`StepIndex`] configured by these [`Opts`].
    #[must_use]
    pub fn step_index(&self) -> StepIndex {
        let mut markers = StepMarkers::default();
        markers.extend(self.markers.iter().cloned());
        StepIndex::builder()
            .markers(markers)
            .matcher_kind(self.matcher)
            .build()
    }

    /// Returns [`Styles`] of these [`Opts`].
    #[must_use]
    pub fn styles(&self) -> Styles {
        let mut styles = Styles::new();
        styles.apply_coloring(self.color);
        styles
    }
}

/// Loads the step manifests of the given [`Opts`] into a new [`StepIndex`],
/// each one on its own background [`Processor`] thread.
///
/// Unreadable manifests are reported to the `out`put without failing.
///
/// # Errors
///
/// If a background thread cannot be spawned or writing to the `out`put fails.
pub fn load_steps(opts: &Opts, out: &mut impl Write) -> Result<Arc<StepIndex>> {
    let index = Arc::new(opts.step_index());
    let processor = Processor::new(Arc::clone(&index));

    let handles = opts
        .steps
        .iter()
        .map(|path| processor.spawn(ManifestSource::new(path.clone())))
        .collect::<io::Result<Vec<_>>>()?;

    let styles = opts.styles();
    for handle in handles {
        let summary = handle.join().unwrap_or_else(|_| {
            tracing::error!("step discovery worker panicked");
            Summary::default()
        });
        for failure in &summary.failures {
            writeln!(out, "{}", styles.err(format!("warning: {failure}")))?;
        }
    }
    Ok(index)
}

/// Runs the [`Command`] of the given [`Opts`], writing to the `out`put.
///
/// Returns `false` if the [`Command`] found problems.
///
/// # Errors
///
/// If any file cannot be read or parsed, or writing to the `out`put fails.
pub fn run(opts: &Opts, out: &mut impl Write) -> Result<bool> {
    let index = load_steps(opts, out)?;
    let styles = opts.styles();

    match &opts.command {
        Command::Scan { file } => scan(file, index, &styles, out).map(|()| true),
        Command::Check { path } => check(path, &index, &styles, out),
        Command::Steps => list(&index, &styles, out).map(|()| true),
    }
}

/// Prints every token of the given `.feature` `file`, one per line.
fn scan(
    file: &Path,
    index: Arc<StepIndex>,
    styles: &Styles,
    out: &mut impl Write,
) -> Result<()> {
    let text = fs::read_to_string(file)?;

    let mut scanner = LineScanner::new();
    scanner.attach_step_index(index);
    let mut state = State::default();
    let mut offset = 0;

    for (n, line) in text.lines().enumerate() {
        let chars = line.chars().collect::<Vec<_>>();
        for info in scanner.scan_line(line, offset, &mut state) {
            let token = chars
                .get(info.start_index - offset..=info.end_index - offset)
                .map(|cs| cs.iter().collect::<String>())
                .unwrap_or_default();
            writeln!(out, "{}", describe(n + 1, offset, &info, &token, styles))?;
        }
        offset += chars.len() + 1;
    }
    Ok(())
}

/// Describes a single scanned token as
/// `line:start-end type color [triggers] text`.
fn describe(
    line: usize,
    offset: usize,
    info: &TokenInfo,
    token: &str,
    styles: &Styles,
) -> String {
    let triggers = if info.trigger.is_empty() {
        String::new()
    } else {
        format!(
            " [{}]",
            info.trigger.iter_names().map(|(name, _)| name).join("|"),
        )
    };
    let text = match info.color {
        TokenColor::RecognizedStep => styles.ok(token),
        TokenColor::Keyword => styles.header(token),
        _ => token.into(),
    };
    format!(
        "{line}:{}-{} {} {}{triggers} {text}",
        info.start_index - offset,
        info.end_index - offset,
        info.ty,
        info.color,
    )
}

/// Prints undefined and ambiguous steps of the `.feature` files at the given
/// `path`.
fn check(
    path: &Path,
    index: &StepIndex,
    styles: &Styles,
    out: &mut impl Write,
) -> Result<bool> {
    let (mut total, mut undefined, mut ambiguous) = (0, 0, 0);

    for feature in feature::parse(path)? {
        for report in feature::check(&feature, index) {
            total += 1;
            let step = format!("{}{}", report.step.keyword, report.step.value);
            match &report.outcome {
                Outcome::Matched(_) => continue,
                Outcome::Undefined => {
                    undefined += 1;
                    writeln!(
                        out,
                        "{} {}: {}",
                        styles.err("undefined"),
                        report.location(),
                        styles.bold(step),
                    )?;
                }
                Outcome::Ambiguous(e) => {
                    ambiguous += 1;
                    writeln!(
                        out,
                        "{} {}: {}",
                        styles.skipped("ambiguous"),
                        report.location(),
                        e,
                    )?;
                }
            }
        }
    }

    writeln!(
        out,
        "{total} steps ({} matched, {undefined} undefined, {ambiguous} ambiguous)",
        total - undefined - ambiguous,
    )?;
    Ok(undefined == 0 && ambiguous == 0)
}

/// Prints all the discovered step definitions, ordered by pattern.
fn list(index: &StepIndex, styles: &Styles, out: &mut impl Write) -> Result<()> {
    for def in index.all_definitions() {
        writeln!(
            out,
            "{} {:?} {} --> {}",
            styles.bold(def.pattern()),
            def.kind(),
            def.container(),
            def.location(),
        )?;
    }
    Ok(())
}
