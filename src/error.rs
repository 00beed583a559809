// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors of the fallible edges of this crate.
//!
//! Scanning, unescaping and (re)indexing never fail: malformed declarations
//! are reported as [`DeclarationError`]s inside a [`Reprocessed`] summary
//! instead. Only reading things from the outside world does.
//!
//! [`DeclarationError`]: crate::step::DeclarationError
//! [`Reprocessed`]: crate::index::Reprocessed

use std::{io, path::PathBuf};

use derive_more::{Display, Error, From};

use crate::feature::ExpandExamplesError;

/// Top-level error of reading step declarations and feature files.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// I/O error of reading a file.
    #[display("I/O operation failed: {_0}")]
    Io(io::Error),

    /// Error of parsing a `.feature` file.
    #[display("Failed to parse feature file: {_0}")]
    Parse(gherkin::ParseFileError),

    /// Error of decoding a steps manifest.
    #[display("Failed to decode steps manifest `{}`: {source}", path.display())]
    #[from(ignore)]
    Manifest {
        /// Path to the malformed manifest.
        path: PathBuf,

        /// Decoding error.
        source: serde_json::Error,
    },

    /// Error of setting up a directory walk.
    #[display("Failed to walk directory: {_0}")]
    Walk(globwalk::GlobError),

    /// Error of expanding a `Scenario Outline`.
    #[display("{_0}")]
    Expand(ExpandExamplesError),
}

/// Alias of a [`Result`](std::result::Result) with this crate's [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn manifest_error_names_path_and_keeps_source() {
        let source = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err = Error::Manifest { path: "steps/login.steps.json".into(), source };

        assert!(err.to_string().starts_with(
            "Failed to decode steps manifest `steps/login.steps.json`: ",
        ));
        assert!(err.source().is_some());
    }

    #[test]
    fn converts_io_errors() {
        let err = Error::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.to_string(), "I/O operation failed: gone");
    }
}
