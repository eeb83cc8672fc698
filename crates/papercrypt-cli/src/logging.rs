//! Diagnostic logging to stderr.
//!
//! `PAPERCRYPT_LOG` takes `EnvFilter` directives; otherwise `-v` selects
//! debug and `-vv` trace. Document content and passphrases are never logged.

use tracing_subscriber::EnvFilter;

use crate::constants::env_vars;

pub fn init(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_env(env_vars::LOG)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
