//! ## Logging Configuration
//!
//! Logging is set up automatically at program startup using the `ctor` crate.
//! It is controlled by the `DEBUG_SOMMELIER` environment variable:
//!
//! - **Disabled** (default): unset, empty, `"0"` or `"false"`.
//! - **Enabled**: any other value installs a `tracing-subscriber` formatter with a maximum
//!   level of `DEBUG`.
//!
//! ```sh
//! export DEBUG_SOMMELIER=true
//! ```

use ctor::ctor;
use tracing::{debug, Level};

/// Environment variable that switches debug logging on.
pub const DEBUG_ENV_VAR: &str = "DEBUG_SOMMELIER";

/// Returns true if the given value of [`DEBUG_ENV_VAR`] enables logging.
pub(crate) fn logging_enabled(value: Option<&str>) -> bool {
    value.is_some_and(|v| !(v == "0" || v == "false" || v.is_empty()))
}

/// Installs the `DEBUG` formatter. Returns false if a global subscriber was already set.
pub(crate) fn install_debug_subscriber() -> bool {
    match tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .try_init()
    {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "Debug subscriber not installed");
            false
        }
    }
}

#[ctor]
fn set_debug_level() {
    let value = std::env::var(DEBUG_ENV_VAR).ok();
    if logging_enabled(value.as_deref()) {
        install_debug_subscriber();
    }
}
