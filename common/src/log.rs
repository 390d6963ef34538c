//! Thin wrappers over the `tracing` macros.
//!
//! `success!` is an info-level event on a dedicated target so the terminal formatter
//! can render it differently from plain progress messages.

/// Target used by [`success!`](crate::success).
pub const SUCCESS_TARGET: &str = "nmapcsv::success";

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::tracing::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "nmapcsv::success", $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::tracing::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::tracing::error!($($arg)*)
    };
}
