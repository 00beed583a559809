// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Editor assistance for [Gherkin] feature files.
//!
//! - [`LineScanner`] colors a document one line at a time, carrying an opaque
//!   [`scanner::State`] between lines, and highlights step texts matching a
//!   known [`StepDefinition`].
//! - [`StepIndex`] holds the [`StepDefinition`]s of every source container,
//!   replaced wholesale whenever a container is reprocessed, and answers
//!   lookups concurrently with that.
//! - [`discovery::Processor`] feeds a [`StepIndex`] on a background thread.
//! - [`feature::check()`] reports steps of [`gherkin::Feature`]s which match
//!   no or several [`StepDefinition`]s.
//!
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![deny(nonstandard_style, trivial_casts, trivial_numeric_casts)]
#![forbid(non_ascii_idents, unsafe_code)]
#![warn(
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::expect_used,
    clippy::missing_const_for_fn,
    clippy::unwrap_used,
    rustdoc::all,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_results
)]

pub mod cli;
pub mod discovery;
pub mod error;
pub mod feature;
pub mod index;
pub mod scanner;
pub mod step;
pub mod tracing;

pub use gherkin;

#[doc(inline)]
pub use self::{
    error::{Error, Result},
    index::{Reprocessed, StepIndex},
    scanner::LineScanner,
    step::{unescape, StepDefinition},
};
