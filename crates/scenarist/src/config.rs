//! Process-level runtime configuration.
//!
//! Exposes the `fail_fast` flag controlling whether a run stops scheduling
//! new scenarios after the first failure. The flag is read from the
//! `SCENARIST_FAIL_FAST` environment variable unless an in-process override
//! is set; [`RunConfig`](crate::RunConfig) can also pin it per run.

use std::sync::atomic::{AtomicU8, Ordering};

const OVERRIDE_UNSET: u8 = 0;
const OVERRIDE_FALSE: u8 = 1;
const OVERRIDE_TRUE: u8 = 2;

static FAIL_FAST_OVERRIDE: AtomicU8 = AtomicU8::new(OVERRIDE_UNSET);

fn parse_env_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "Yes" | "on" | "ON" | "On" => Some(true),
        "0" | "false" | "FALSE" | "False" | "no" | "NO" | "No" | "off" | "OFF" | "Off" => {
            Some(false)
        }
        _ => None,
    }
}

fn env_fail_fast() -> Option<bool> {
    std::env::var("SCENARIST_FAIL_FAST")
        .ok()
        .as_deref()
        .and_then(parse_env_bool)
}

fn override_state() -> Option<bool> {
    match FAIL_FAST_OVERRIDE.load(Ordering::Relaxed) {
        OVERRIDE_FALSE => Some(false),
        OVERRIDE_TRUE => Some(true),
        _ => None,
    }
}

/// Determine whether runs should stop scheduling after the first failure.
#[must_use]
pub fn fail_fast() -> bool {
    override_state().or_else(env_fail_fast).unwrap_or(false)
}

/// Override the `fail_fast` flag for the current process.
///
/// Call [`clear_fail_fast_override`] to restore environment-driven behaviour.
pub fn set_fail_fast(enabled: bool) {
    let value = if enabled { OVERRIDE_TRUE } else { OVERRIDE_FALSE };
    FAIL_FAST_OVERRIDE.store(value, Ordering::Relaxed);
}

/// Remove any in-process override for the `fail_fast` flag.
pub fn clear_fail_fast_override() {
    FAIL_FAST_OVERRIDE.store(OVERRIDE_UNSET, Ordering::Relaxed);
}
