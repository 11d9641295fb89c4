pub mod output;
mod shell;

pub use shell::{Shell, ShellControl};

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use crate::config::{Config, ConfigManager};
use crate::errors::CliError;

const USAGE: &str = "Usage: signup_cli [--config <path>]";

/// Parsed command-line options for the shell binary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub config_path: Option<PathBuf>,
    pub show_help: bool,
}

impl CliOptions {
    pub fn parse<I, S>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = Self::default();
        let mut args = args.into_iter().map(Into::<String>::into);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args.next().ok_or_else(|| {
                        CliError::InvalidArguments(format!("`{arg}` needs a path. {USAGE}"))
                    })?;
                    options.config_path = Some(PathBuf::from(path));
                }
                "--help" | "-h" => options.show_help = true,
                other => {
                    return Err(CliError::InvalidArguments(format!(
                        "unexpected argument `{other}`. {USAGE}"
                    )))
                }
            }
        }
        Ok(options)
    }
}

/// Runs the shell on stdin/stdout with the given options.
pub fn run_cli(options: CliOptions) -> Result<(), CliError> {
    if options.show_help {
        println!("{USAGE}");
        return Ok(());
    }

    let manager = match options.config_path {
        Some(path) => Some(ConfigManager::new(path)),
        None => ConfigManager::default_location().ok(),
    };
    let config = match &manager {
        Some(manager) => manager.load()?,
        None => Config::default(),
    };
    tracing::debug!(?config, "loaded shell preferences");

    let mut shell = Shell::new(config, io::stdout());
    if let Some(manager) = manager {
        shell = shell.with_config_manager(manager);
    }
    let stdin = io::stdin();
    if stdin.is_terminal() {
        shell.run_interactive()
    } else {
        shell.run(stdin.lock())
    }
}
