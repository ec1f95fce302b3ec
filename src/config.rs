use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".localpython.toml";

/// Environment variable naming the interpreter used to create environments.
pub const PYTHON_ENV_VAR: &str = "LOCALPYTHON_PYTHON";

/// Interpreters tried on `PATH` when none is configured.
const DEFAULT_HOST_PYTHONS: &[&str] = &["python3", "python"];

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub search_parent: bool,
    #[serde(default)]
    pub python: Option<String>,
}

impl Settings {
    /// Loads settings for a project rooted at `dir`, falling back to the
    /// configuration in `home_dir`.
    pub fn load(dir: &Path, home_dir: Option<&Path>) -> Result<Self, ConfigError> {
        match Self::get_config_path(dir, home_dir) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("search_parent", false)?
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .build()?;

        s.try_deserialize()
    }

    fn get_config_path(dir: &Path, home_dir: Option<&Path>) -> Option<PathBuf> {
        // First check the project directory
        let local_config = dir.join(CONFIG_FILE_NAME);
        if local_config.exists() {
            return Some(local_config);
        }

        // Fall back to home directory
        home_dir.map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// Returns the interpreter used to create new environments.
    ///
    /// Priority order:
    /// 1. Environment variable LOCALPYTHON_PYTHON
    /// 2. Config file setting
    /// 3. python3, then python, on PATH
    pub fn host_python(&self) -> Option<PathBuf> {
        let configured = std::env::var(PYTHON_ENV_VAR)
            .ok()
            .filter(|value| !value.is_empty())
            .or_else(|| self.python.clone());

        match configured {
            Some(name) => resolve_program(&name),
            None => DEFAULT_HOST_PYTHONS
                .iter()
                .find_map(|name| resolve_program(name)),
        }
    }
}

fn resolve_program(name: &str) -> Option<PathBuf> {
    let path = Path::new(name);
    if path.components().count() > 1 || path.is_absolute() {
        return path.exists().then(|| path.to_path_buf());
    }
    which::which(name).ok()
}
