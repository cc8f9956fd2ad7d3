//! Output of the rendered documents
//!
//! Normal runs write `user-data` and `network-config` into the output
//! directory, each ending in exactly one newline. Both destinations are
//! checked first (absent or a regular file), then both files are written
//! under temporary names and only renamed into place once both writes
//! succeeded, so a failed run never leaves one new file next to one stale
//! one.
//!
//! Dry runs print both documents to stdout, each after a `=== <name>` line.

use crate::config::ResolvedConfiguration;
use crate::error::{ProvisionError, Result};
use crate::questions::fields;
use crate::render::RenderedDocuments;
use crate::secrets::expand_home;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const USER_DATA_FILE: &str = "user-data";
pub const NETWORK_CONFIG_FILE: &str = "network-config";

/// Where the documents go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Print with delimiters (dry run)
    Stdout,
    /// Write both files into this directory
    Directory(PathBuf),
}

impl OutputTarget {
    pub fn from_config(config: &ResolvedConfiguration) -> Self {
        if config.flag(fields::DRY_RUN) {
            return Self::Stdout;
        }
        let dir = config.non_empty_text(fields::OUTPUT_DIR).unwrap_or(".");
        Self::Directory(expand_home(dir))
    }
}

/// Dry-run text: both documents, each preceded by its delimiter line.
pub fn dry_run_text(docs: &RenderedDocuments) -> String {
    format!(
        "=== {USER_DATA_FILE}\n{}\n=== {NETWORK_CONFIG_FILE}\n{}\n",
        docs.user_data, docs.network_config
    )
}

/// Send `docs` to `target`; `stdout` receives dry-run output.
pub fn emit(docs: &RenderedDocuments, target: &OutputTarget, stdout: &mut dyn Write) -> Result<()> {
    match target {
        OutputTarget::Stdout => stdout
            .write_all(dry_run_text(docs).as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|source| ProvisionError::OutputWrite {
                path: PathBuf::from("<stdout>"),
                source,
            }),
        OutputTarget::Directory(dir) => write_documents(docs, dir).map(|_| ()),
    }
}

/// Write both documents into `dir` and return the final paths.
pub fn write_documents(docs: &RenderedDocuments, dir: &Path) -> Result<Vec<PathBuf>> {
    let files = [
        (USER_DATA_FILE, docs.user_data.as_str()),
        (NETWORK_CONFIG_FILE, docs.network_config.as_str()),
    ];

    // a destination that cannot be replaced must fail before anything moves
    for (name, _) in files {
        check_destination(&dir.join(name))?;
    }

    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(files.len());
    for (name, contents) in files {
        let target = dir.join(name);
        let partial = dir.join(format!(".{name}.partial"));
        if let Err(source) = fs::write(&partial, format!("{contents}\n")) {
            discard(&staged);
            let _ = fs::remove_file(&partial);
            return Err(ProvisionError::OutputWrite {
                path: target,
                source,
            });
        }
        staged.push((partial, target));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (index, (partial, target)) in staged.iter().enumerate() {
        if let Err(source) = fs::rename(partial, target) {
            discard(&staged[index..]);
            return Err(ProvisionError::OutputWrite {
                path: target.clone(),
                source,
            });
        }
        tracing::info!(path = %target.display(), "Wrote document");
        written.push(target.clone());
    }
    Ok(written)
}

/// `path` must be absent or a regular file.
fn check_destination(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(ProvisionError::OutputWrite {
            path: path.to_path_buf(),
            source: io::Error::other("destination exists and is not a regular file"),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ProvisionError::OutputWrite {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (partial, _) in staged {
        let _ = fs::remove_file(partial);
    }
}
