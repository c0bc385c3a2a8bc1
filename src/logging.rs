//! Logging macros that set target to "gss_negotiate" for all log calls.
//!
//! Without an explicit target, tracing uses the full module path
//! (e.g., "gss_negotiate::context"), creating overly verbose logger names for
//! hosts that map log targets onto their own logger hierarchies. These macros
//! ensure all logs from this crate use a single "gss_negotiate" target.

macro_rules! trace {
    ($($arg:tt)*) => { ::tracing::trace!(target: "gss_negotiate", $($arg)*) };
}

macro_rules! debug {
    ($($arg:tt)*) => { ::tracing::debug!(target: "gss_negotiate", $($arg)*) };
}

macro_rules! error {
    ($($arg:tt)*) => { ::tracing::error!(target: "gss_negotiate", $($arg)*) };
}
