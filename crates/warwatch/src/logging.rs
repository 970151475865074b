//! Structured logging init (spec SPEC_FULL §10.3), grounded on the
//! teacher's `init_logger` but built on `tracing-subscriber` instead of
//! `env_logger` since the orchestrator emits structured fields
//! (`war_id`, `phase`, `api_calls`) that a plain `log` formatter can't
//! render usefully.

use tracing_subscriber::EnvFilter;

pub fn init(default_level: tracing::Level, override_directive: Option<&str>) {
    let filter = override_directive
        .and_then(|s| EnvFilter::try_new(s).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default_level.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
