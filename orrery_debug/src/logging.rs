// Copyright 2026 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Logging bootstrap.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "orrery_core=info,orrery_render=info";

/// Installs a global `fmt` subscriber filtered by `RUST_LOG`, falling back
/// to [`DEFAULT_FILTER`].
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_logging() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
