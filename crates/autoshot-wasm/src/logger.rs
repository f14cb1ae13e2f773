//! Console logging and timing helpers.

use log::{Level, LevelFilter};

/// Route `log` output to the browser console and install the panic hook.
///
/// Only the first call installs the logger; every call sets the level.
pub(crate) fn install(level: Level) {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        if let Err(err) = console_log::init_with_level(level) {
            log::debug!("Console logger already installed: {}", err);
        }
    }
    log::set_max_level(level.to_level_filter());
}

/// Change the level of an installed logger.
pub(crate) fn set_level(filter: LevelFilter) {
    log::set_max_level(filter);
}

/// Parse a level name from JavaScript (`"debug"`, `"warn"`, ...).
pub(crate) fn parse_level(name: &str) -> Option<LevelFilter> {
    name.trim().parse().ok()
}

/// Milliseconds from a monotonic clock where one exists, for timing logs.
#[cfg(target_arch = "wasm32")]
pub(crate) fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or_else(js_sys::Date::now)
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
