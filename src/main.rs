// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `cucumber-lens` binary.

use std::{io, process::ExitCode};

use cucumber_lens::cli::{self, Opts, Parser as _};

fn main() -> ExitCode {
    let opts = Opts::parse();
    _ = cucumber_lens::tracing::init(opts.verbose);

    match cli::run(&opts, &mut io::stdout().lock()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{}", opts.styles().err(format!("error: {e}")));
            ExitCode::from(2)
        }
    }
}
