//! Input, output and parsing helper functions for the CLI.
//!
//! This module provides utilities for:
//! - Passphrase prompting and input reading (`input`)
//! - Output destinations and careful file writes (`output`)
//! - Date and input-kind parsing (`parsing`)

mod input;
mod output;
mod parsing;

// Re-export public API
pub use input::{prompt_new_passphrase, prompt_passphrase, read_input};
pub use output::Destination;
pub use parsing::{looks_like_json, parse_datetime};
