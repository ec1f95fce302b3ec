use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::execution::ProcessLauncher;
use crate::locator::{existing_env_folder, locate, SearchScope};

/// Folder created by [`setup`].
pub const NEW_ENV_FOLDER: &str = ".venv";

/// Dependency manifest names, in priority order.
pub const MANIFEST_NAMES: &[&str] = &[
    "requirements.txt",
    "req.txt",
    "requirements-dev.txt",
    "requirements-test.txt",
    "dev-requirements.txt",
    "reqs.txt",
    "pip-requirements.txt",
    "requirements.pip",
];

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Virtual environment '{0}' already exists")]
    AlreadyExists(String),

    #[error("No Python interpreter found to create the virtual environment")]
    HostPythonNotFound,

    #[error("Failed to create virtual environment (exit code {code:?}): {stderr}")]
    CreationFailed { code: Option<i32>, stderr: String },

    #[error("Virtual environment was created but no interpreter was found in {0}")]
    InterpreterNotFound(PathBuf),

    #[error("Failed to launch {}", program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// What happened to the dependency manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    NoManifest,
    Installed {
        manifest: PathBuf,
    },
    Failed {
        manifest: PathBuf,
        code: Option<i32>,
        stderr: String,
    },
}

#[derive(Debug)]
pub struct SetupReport {
    pub interpreter: PathBuf,
    pub install: InstallOutcome,
}

/// Returns the first manifest from [`MANIFEST_NAMES`] present in `dir`.
pub fn find_manifest(dir: &Path) -> Option<PathBuf> {
    MANIFEST_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Creates `.venv` in `current_dir` with `host_python` and installs the
/// dependencies from the first manifest found there.
///
/// An existing environment is reported before a missing `host_python`.
///
/// Installation failures are reported in the returned
/// [`InstallOutcome`] rather than as an error.
pub fn setup(
    current_dir: &Path,
    host_python: Option<&Path>,
    launcher: &dyn ProcessLauncher,
) -> Result<SetupReport, SetupError> {
    if let Some(folder) = existing_env_folder(current_dir) {
        return Err(SetupError::AlreadyExists(folder.to_string()));
    }
    let host_python = host_python.ok_or(SetupError::HostPythonNotFound)?;

    let env_dir = current_dir.join(NEW_ENV_FOLDER);
    info!("creating virtual environment at {}", env_dir.display());
    let args = [OsString::from("-m"), "venv".into(), env_dir.clone().into()];
    let output = launcher
        .output(host_python, &args)
        .map_err(|source| SetupError::Launch {
            program: host_python.to_path_buf(),
            source,
        })?;
    if !output.success() {
        return Err(SetupError::CreationFailed {
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        });
    }

    let interpreter = locate(&SearchScope::new(current_dir, false))
        .ok_or_else(|| SetupError::InterpreterNotFound(env_dir.clone()))?;
    debug!("new interpreter: {}", interpreter.display());

    let install = match find_manifest(current_dir) {
        Some(manifest) => install_requirements(launcher, &interpreter, manifest),
        None => InstallOutcome::NoManifest,
    };

    Ok(SetupReport {
        interpreter,
        install,
    })
}

fn install_requirements(
    launcher: &dyn ProcessLauncher,
    interpreter: &Path,
    manifest: PathBuf,
) -> InstallOutcome {
    info!("installing dependencies from {}", manifest.display());
    let args = [
        OsString::from("-m"),
        "pip".into(),
        "install".into(),
        "-r".into(),
        manifest.clone().into(),
    ];
    match launcher.output(interpreter, &args) {
        Ok(output) if output.success() => {
            debug!("pip output:\n{}", output.stdout.trim_end());
            InstallOutcome::Installed { manifest }
        }
        Ok(output) => {
            warn!("pip exited with {:?}", output.code);
            InstallOutcome::Failed {
                manifest,
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            }
        }
        Err(err) => {
            warn!("failed to launch pip: {:#}", err);
            InstallOutcome::Failed {
                manifest,
                code: None,
                stderr: format!("{:#}", err),
            }
        }
    }
}
