//! Logger setup for applications and tests embedding the collision crate
//!
//! The crate only emits through the `log` facade: heightmap rebuilds at
//! `debug`, shape reassignment at `trace`, misuse of ray-only shapes at
//! `error`. Hosts may install any logger; these helpers install `env_logger`.

use env_logger::{Builder, Env};

/// Filter applied when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "collision3d=info";

fn builder() -> Builder {
    Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
}

/// Install `env_logger`, honoring `RUST_LOG`
///
/// Does nothing if a logger is already installed.
pub fn init() {
    if builder().try_init().is_err() {
        log::debug!("Logger already installed");
    }
}

/// Install a test-captured logger; repeated calls are no-ops
pub fn init_for_tests() {
    let _ = builder().is_test(true).try_init();
}
