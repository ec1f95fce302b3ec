#[allow(clippy::module_inception)]
mod cli;
mod commands;

pub use cli::{Cli, Mode, VERSION};
