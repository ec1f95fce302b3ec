use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("No virtual environment found.")]
    NoEnvironmentFound,

    #[error("No virtual environment found in current or parent directories.")]
    NoEnvironmentFoundInParents,

    #[error("No script provided.")]
    NoScriptProvided,
}
