// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`tracing`] integration layer.

use std::io;

use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _,
    Layer as _,
};

/// Returns the [`LevelFilter`] of the given `verbosity` (the number of `-v`
/// flags).
#[must_use]
pub const fn level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Initializes global [`Subscriber`] writing to [`io::stderr()`] events of
/// the given `verbosity` and above.
///
/// Returns `false` if a global [`Subscriber`] is already set, leaving it
/// intact.
///
/// [`Subscriber`]: tracing::Subscriber
pub fn init(verbosity: u8) -> bool {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);
    tracing_subscriber::registry()
        .with(level(verbosity).and_then(layer))
        .try_init()
        .is_ok()
}
