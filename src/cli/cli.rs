use clap::Parser;
use std::path::{Path, PathBuf};

use crate::error::CliError;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "localpython")]
#[command(author = "Oliver Steele <steele@osteele.com>")]
#[command(about = "Run Python scripts using the local virtual environment (without activation)", long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
#[command(after_help = "Examples:
  localpython script.py
  localpython -p script.py --your-script-arg
  localpython --which
  localpython --setup")]
pub struct Cli {
    /// Search for venv in parent directories
    #[arg(short = 'p', long = "search-parent")]
    pub search_parent: bool,

    /// Show path to venv Python interpreter
    #[arg(long)]
    pub which: bool,

    /// Create .venv and install dependencies from a requirements file
    #[arg(long)]
    pub setup: bool,

    /// Start in a specific directory instead of current directory
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Show localpython version
    #[arg(long)]
    pub version: bool,

    /// Show this help message
    #[arg(long)]
    pub help: bool,

    /// Python script to run, followed by its arguments
    #[arg(
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "SCRIPT [ARGS]"
    )]
    pub command: Vec<String>,
}

/// Flags recognized anywhere in the script's argument list.
const SEARCH_PARENT_FLAGS: &[&str] = &["-p", "--search-parent"];

/// The top-level action selected by the command line.
#[derive(Debug, PartialEq, Eq)]
pub enum Mode<'a> {
    Help,
    Version,
    Which,
    Setup,
    Run { script: &'a str, args: Vec<String> },
}

impl Cli {
    /// Selects the action, checking flags in priority order.
    pub fn mode(&self) -> Result<Mode<'_>, CliError> {
        if self.help || self.is_empty() {
            Ok(Mode::Help)
        } else if self.version {
            Ok(Mode::Version)
        } else if self.which {
            Ok(Mode::Which)
        } else if self.setup {
            Ok(Mode::Setup)
        } else {
            let (script, rest) = self
                .command
                .split_first()
                .ok_or(CliError::NoScriptProvided)?;
            let args = rest
                .iter()
                .filter(|arg| !SEARCH_PARENT_FLAGS.contains(&arg.as_str()))
                .cloned()
                .collect();
            Ok(Mode::Run {
                script: script.as_str(),
                args,
            })
        }
    }

    /// True if `-p`/`--search-parent` appears before or after the script.
    pub fn searches_parents(&self) -> bool {
        self.search_parent
            || self
                .command
                .iter()
                .skip(1)
                .any(|arg| SEARCH_PARENT_FLAGS.contains(&arg.as_str()))
    }

    /// True when nothing but logging options were given.
    fn is_empty(&self) -> bool {
        !self.search_parent
            && !self.which
            && !self.setup
            && !self.version
            && self.dir.is_none()
            && self.command.is_empty()
    }

    /// The directory operations start from, resolved against `cwd`.
    pub fn start_dir(&self, cwd: &Path) -> PathBuf {
        match &self.dir {
            Some(dir) => cwd.join(dir),
            None => cwd.to_path_buf(),
        }
    }
}
