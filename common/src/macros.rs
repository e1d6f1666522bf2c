//! Status-line macros.
//!
//! These route through `tracing` with dedicated targets so the CLI formatter can
//! give them their own prefix, and so they interleave cleanly with the spinner.

/// Target used for positive status lines (`[+]`).
pub const SUCCESS_TARGET: &str = "probr::success";

/// Target used for raw, pre-formatted terminal output.
pub const PRINT_TARGET: &str = "probr::print";

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::__tracing::info!(target: "probr::success", $($arg)*)
    };
}
