use anyhow::{Context, Result};
use clap::CommandFactory;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli::{Cli, Mode, VERSION};
use crate::config::Settings;
use crate::error::CliError;
use crate::execution::{run_script, ProcessLauncher};
use crate::locator::{locate, SearchScope};
use crate::setup::{setup, InstallOutcome, NEW_ENV_FOLDER};

impl Cli {
    /// Runs the selected action from `cwd` and returns the process exit code.
    ///
    /// `home_dir` is where the fallback configuration file is looked up.
    pub fn execute(
        &self,
        cwd: &Path,
        home_dir: Option<&Path>,
        launcher: &dyn ProcessLauncher,
    ) -> Result<i32> {
        let mode = match self.mode() {
            Ok(mode) => mode,
            Err(err) => {
                eprintln!("Error: {}\n", err);
                print_help()?;
                return Ok(1);
            }
        };

        match mode {
            Mode::Help => {
                print_help()?;
                Ok(0)
            }
            Mode::Version => {
                println!("localpython v{}", VERSION);
                Ok(0)
            }
            Mode::Which => {
                let python = self.find_interpreter(cwd, home_dir)?;
                println!("{}", python.display());
                Ok(0)
            }
            Mode::Setup => self.handle_setup(cwd, home_dir, launcher),
            Mode::Run { script, args } => {
                let python = self.find_interpreter(cwd, home_dir)?;
                debug!("running {} with {}", script, python.display());
                run_script(launcher, &python, script, &args)
            }
        }
    }

    fn settings(&self, cwd: &Path, home_dir: Option<&Path>) -> Result<Settings> {
        let start_dir = self.start_dir(cwd);
        Settings::load(&start_dir, home_dir).context("Failed to load configuration")
    }

    fn find_interpreter(&self, cwd: &Path, home_dir: Option<&Path>) -> Result<PathBuf> {
        let settings = self.settings(cwd, home_dir)?;
        let scope = SearchScope::new(
            self.start_dir(cwd),
            self.searches_parents() || settings.search_parent,
        );
        debug!(
            "searching for a virtual environment from {} (ancestors: {})",
            scope.start_dir.display(),
            scope.include_ancestors
        );

        locate(&scope).ok_or_else(|| {
            if scope.include_ancestors {
                CliError::NoEnvironmentFoundInParents.into()
            } else {
                CliError::NoEnvironmentFound.into()
            }
        })
    }

    fn handle_setup(
        &self,
        cwd: &Path,
        home_dir: Option<&Path>,
        launcher: &dyn ProcessLauncher,
    ) -> Result<i32> {
        let settings = self.settings(cwd, home_dir)?;
        let start_dir = self.start_dir(cwd);
        let host_python = settings.host_python();
        debug!("host interpreter: {:?}", host_python);

        let report = setup(&start_dir, host_python.as_deref(), launcher)?;
        println!(
            "Created virtual environment in {}",
            start_dir.join(NEW_ENV_FOLDER).display()
        );
        println!("Interpreter: {}", report.interpreter.display());

        match report.install {
            InstallOutcome::NoManifest => {
                println!("No requirements file found; no dependencies installed.");
            }
            InstallOutcome::Installed { manifest } => {
                println!("Installed dependencies from {}", manifest.display());
            }
            InstallOutcome::Failed {
                manifest,
                code,
                stderr,
            } => {
                eprintln!(
                    "Warning: failed to install dependencies from {} (exit code {:?})",
                    manifest.display(),
                    code
                );
                if !stderr.is_empty() {
                    eprintln!("{}", stderr);
                }
            }
        }
        Ok(0)
    }
}

fn print_help() -> Result<()> {
    Cli::command().print_help()?;
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::MockProcessLauncher;
    use crate::tests::venv_dir_mocks::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("localpython").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_missing_environment_does_not_spawn() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let project = TestProject::new(temp_dir.path());

        // Any call on the mock would panic.
        let launcher = MockProcessLauncher::new();
        let err = parse(&["missing.py"])
            .execute(&project.dir, Some(temp_dir.path()), &launcher)
            .unwrap_err();

        assert_eq!(err.to_string(), "No virtual environment found.");
    }

    #[test]
    fn test_run_uses_located_interpreter() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let project = TestProject::new(temp_dir.path());
        let python = project.create_unix_env("venv").unwrap();

        let mut launcher = MockProcessLauncher::new();
        launcher
            .expect_status()
            .withf(move |program, args| {
                program == python.as_path()
                    && args.to_vec() == vec![std::ffi::OsString::from("app.py"), "x".into()]
            })
            .times(1)
            .returning(|_, _| Ok(3));

        let code = parse(&["app.py", "x"])
            .execute(&project.dir, Some(temp_dir.path()), &launcher)
            .unwrap();
        assert_eq!(code, 3);
    }

    #[test]
    fn test_run_with_search_parent() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let parent = TestProject::new(temp_dir.path());
        let python = parent.create_unix_env(".venv").unwrap();
        let child = TestProject::new(&temp_dir.path().join("scripts"));

        let mut launcher = MockProcessLauncher::new();
        launcher
            .expect_status()
            .withf(move |program, _| program == python.as_path())
            .times(1)
            .returning(|_, _| Ok(0));

        let err = parse(&["job.py"])
            .execute(&child.dir, Some(temp_dir.path()), &launcher)
            .unwrap_err();
        assert_eq!(err.to_string(), "No virtual environment found.");

        let code = parse(&["-p", "job.py"])
            .execute(&child.dir, Some(temp_dir.path()), &launcher)
            .unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn test_config_enables_search_parent() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let parent = TestProject::new(temp_dir.path());
        parent.create_unix_env("env").unwrap();
        let child = TestProject::new(&temp_dir.path().join("scripts"));
        child
            .create_file(crate::config::CONFIG_FILE_NAME, "search_parent = true\n")
            .unwrap();

        let launcher = MockProcessLauncher::new();
        let code = parse(&["--which"])
            .execute(&child.dir, Some(temp_dir.path()), &launcher)
            .unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn test_missing_script_exits_with_failure() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let launcher = MockProcessLauncher::new();

        let code = parse(&["-p"])
            .execute(temp_dir.path(), Some(temp_dir.path()), &launcher)
            .unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn test_setup_refuses_existing_environment() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let project = TestProject::new(temp_dir.path());
        project.create_unix_env("venv").unwrap();

        let launcher = MockProcessLauncher::new();
        let err = parse(&["--setup"])
            .execute(&project.dir, Some(temp_dir.path()), &launcher)
            .unwrap_err();

        assert_eq!(err.to_string(), "Virtual environment 'venv' already exists");
        assert!(!project.dir.join(".venv").exists());
    }

    #[test]
    fn test_search_parent_after_script_reaches_parent_environment() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let parent = TestProject::new(temp_dir.path());
        let python = parent.create_unix_env("venv").unwrap();
        let child = TestProject::new(&temp_dir.path().join("scripts"));

        let mut launcher = MockProcessLauncher::new();
        launcher
            .expect_status()
            .withf(move |program, args| {
                program == python.as_path()
                    && args.to_vec()
                        == vec![
                            std::ffi::OsString::from("script.py"),
                            "-v".into(),
                            "a".into(),
                        ]
            })
            .times(2)
            .returning(|_, _| Ok(0));

        for argv in [
            &["script.py", "-v", "a", "-p"][..],
            &["script.py", "-v", "--search-parent", "a"][..],
        ] {
            let code = parse(argv)
                .execute(&child.dir, Some(temp_dir.path()), &launcher)
                .unwrap();
            assert_eq!(code, 0);
        }
    }

    #[test]
    fn test_home_config_is_read_from_given_home() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let parent = TestProject::new(temp_dir.path());
        parent.create_unix_env(".venv").unwrap();
        let child = TestProject::new(&temp_dir.path().join("scripts"));
        let home = TestProject::new(&temp_dir.path().join("home"));
        home.create_file(crate::config::CONFIG_FILE_NAME, "search_parent = true\n")
            .unwrap();
        let launcher = MockProcessLauncher::new();

        let code = parse(&["--which"])
            .execute(&child.dir, Some(home.dir.as_path()), &launcher)
            .unwrap();
        assert_eq!(code, 0);

        let err = parse(&["--which"])
            .execute(&child.dir, None, &launcher)
            .unwrap_err();
        assert_eq!(err.to_string(), "No virtual environment found.");
    }
}
