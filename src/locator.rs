use std::path::{Path, PathBuf};

use tracing::{debug, trace};

/// Environment folder names, in priority order.
pub const ENV_FOLDERS: &[&str] = &[".venv", "venv", "env"];

/// Interpreter locations relative to an environment folder. The Windows
/// layout is checked before the Unix one.
const INTERPRETER_PATHS: &[&[&str]] = &[&["Scripts", "python.exe"], &["bin", "python"]];

/// Where to look for an environment.
#[derive(Debug, Clone)]
pub struct SearchScope {
    pub start_dir: PathBuf,
    pub include_ancestors: bool,
}

impl SearchScope {
    pub fn new(start_dir: impl Into<PathBuf>, include_ancestors: bool) -> Self {
        Self {
            start_dir: start_dir.into(),
            include_ancestors,
        }
    }

    /// Directories to examine, nearest first.
    pub fn directories(&self) -> Vec<&Path> {
        if self.include_ancestors {
            self.start_dir.ancestors().collect()
        } else {
            vec![self.start_dir.as_path()]
        }
    }
}

/// Returns the interpreter of the first environment found in `scope`.
///
/// Directories are searched nearest first; within a directory the folder
/// names in [`ENV_FOLDERS`] are tried in order.
pub fn locate(scope: &SearchScope) -> Option<PathBuf> {
    for dir in scope.directories() {
        if let Some(python) = interpreter_in_dir(dir) {
            debug!("found interpreter at {}", python.display());
            return Some(python);
        }
    }
    None
}

fn interpreter_in_dir(dir: &Path) -> Option<PathBuf> {
    for folder in ENV_FOLDERS {
        for components in INTERPRETER_PATHS {
            let candidate = components
                .iter()
                .fold(dir.join(folder), |path, part| path.join(part));
            trace!("probing {}", candidate.display());
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Returns the name of the first environment folder that exists as a
/// directory in `dir`.
pub fn existing_env_folder(dir: &Path) -> Option<&'static str> {
    ENV_FOLDERS
        .iter()
        .copied()
        .find(|folder| dir.join(folder).is_dir())
}
