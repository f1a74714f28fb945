//! Internal logging helpers for structured keyhold events.

/// Single logging target for keyhold.
pub(crate) const LOG_TARGET: &str = "keyhold";

macro_rules! keyhold_log {
    ($level:expr, $event:expr, $fmt:expr $(, $args:expr)* $(,)?) => {{
        if log::log_enabled!(target: crate::logging::LOG_TARGET, $level) {
            log::log!(
                target: crate::logging::LOG_TARGET,
                $level,
                "event={} {}",
                $event,
                format_args!($fmt $(, $args)*)
            );
        }
    }};
}

pub(crate) use keyhold_log;

/// Render a byte key for log lines: printable ASCII verbatim, everything else escaped.
pub(crate) fn display_key(key: &[u8]) -> String {
    key.escape_ascii().to_string()
}
