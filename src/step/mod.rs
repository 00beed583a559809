// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Definitions of [`StepDefinition`]s and everything they're built from.
//!
//! - [`declaration`]: flat descriptors reported by a source-tree walker
//! - [`definition`]: immutable [`StepDefinition`]s and value unescaping
//! - [`error`]: malformed declarations and ambiguous matches
//! - [`location`]: source spans of declarations
//! - [`markers`]: recognized step-marker kinds
//! - [`matcher`]: pluggable matching relation of patterns and step texts
//! - [`regex`]: hashable regex wrapper

pub mod declaration;
pub mod definition;
pub mod error;
pub mod location;
pub mod markers;
pub mod matcher;
pub mod regex;

pub use declaration::{Constant, ConstantResolver, Container, Declaration, NoConstants};
pub use definition::{unescape, StepDefinition};
pub use error::{AmbiguousMatchError, DeclarationError};
pub use location::{Location, Point};
pub use markers::StepMarkers;
pub use matcher::{Matcher, Pattern};
pub use regex::HashableRegex;
