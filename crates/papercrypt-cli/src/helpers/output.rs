//! Output destination handling.

use std::io::{self, Write};
use std::path::Path;

use papercrypt_core::fs::write_file_carefully;

/// Where a command's result goes.
pub enum Destination<'a> {
    Stdout,
    File { path: &'a Path, force: bool },
}

impl<'a> Destination<'a> {
    /// `None` or `-` means stdout.
    pub fn from_arg(path: Option<&'a str>, force: bool) -> Self {
        match path {
            None | Some("-") => Destination::Stdout,
            Some(path) => Destination::File {
                path: Path::new(path),
                force,
            },
        }
    }

    /// Fail early, before any prompt or encryption, if the file exists and
    /// `--force` was not given.
    pub fn check_writable(&self) -> anyhow::Result<()> {
        if let Destination::File { path, force } = self {
            if path.exists() && !force {
                return Err(papercrypt_core::PaperCryptError::AlreadyExists(
                    path.display().to_string(),
                )
                .into());
            }
        }
        Ok(())
    }

    pub fn write(&self, contents: &[u8]) -> anyhow::Result<()> {
        match self {
            Destination::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(contents)
                    .and_then(|_| stdout.flush())
                    .map_err(|e| anyhow::anyhow!("Failed to write to stdout: {}", e))
            }
            Destination::File { path, force } => {
                write_file_carefully(path, contents, *force)?;
                Ok(())
            }
        }
    }

    pub fn is_stdout(&self) -> bool {
        matches!(self, Destination::Stdout)
    }

    /// Human-readable target for status messages.
    pub fn describe(&self) -> String {
        match self {
            Destination::Stdout => "stdout".to_string(),
            Destination::File { path, .. } => path.display().to_string(),
        }
    }
}
