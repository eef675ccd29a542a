//! Tracing subscriber setup for binaries and tests embedding storyboard.

use std::env;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_FILTER_ENV: &str = "STORYBOARD_LOG";
/// Environment variable selecting `compact` (default) or `json` output.
pub const LOG_FORMAT_ENV: &str = "STORYBOARD_LOG_FORMAT";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Single-line human-readable events.
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name, falling back to [`LogFormat::Compact`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Compact
        }
    }
}

/// Installs the global subscriber configured from `STORYBOARD_LOG` and
/// `STORYBOARD_LOG_FORMAT`.
///
/// Returns `false` when a global subscriber was already installed.
#[must_use]
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new("storyboard=info,warn"));
    let format = env::var(LOG_FORMAT_ENV)
        .map(|name| LogFormat::from_name(&name))
        .unwrap_or_default();

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_ansi(false))
            .try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
    };
    installed.is_ok()
}
