#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

/// A `localpython` command running in `dir`, isolated from the user's
/// home directory configuration.
pub fn localpython(dir: &Path) -> Result<Command> {
    let mut cmd = Command::cargo_bin("localpython")?;
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("USERPROFILE", dir)
        .env_remove("LOCALPYTHON_PYTHON")
        .env_remove("RUST_LOG");
    Ok(cmd)
}

pub fn create_file(path: &Path, content: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(path.to_path_buf())
}

/// Creates `<dir>/<folder>/bin/python` holding `content`.
pub fn create_unix_env(dir: &Path, folder: &str, content: &str) -> Result<PathBuf> {
    let python = create_file(&dir.join(folder).join("bin").join("python"), content)?;
    make_executable(&python)?;
    Ok(python)
}

#[cfg(unix)]
pub fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// A stand-in host interpreter. `-m venv <dir>` copies itself to
/// `<dir>/bin/python`; any other invocation records its arguments in
/// `pip-args.txt` next to the environment and exits with `pip_exit`.
pub fn fake_host_python(pip_exit: i32) -> String {
    format!(
        r#"#!/bin/sh
if [ "$2" = "venv" ]; then
  mkdir -p "$3/bin"
  cp "$0" "$3/bin/python"
  exit 0
fi
echo "$@" > "$(dirname "$0")/../../pip-args.txt"
echo "pip failed for $5" >&2
exit {}
"#,
        pip_exit
    )
}
