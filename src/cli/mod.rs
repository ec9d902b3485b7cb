//! CLI command handling
//!
//! - `args` - Argument parsing structures
//! - `router` - Authentication, configuration and report dispatch

pub mod args;
pub mod router;

pub use args::{Cli, Commands};
pub use router::{execute_command, run_report};

/// Log filter for a `-v` count.
pub fn get_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace,hyper=debug,reqwest=debug",
    }
}
