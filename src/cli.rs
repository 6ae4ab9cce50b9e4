//! Command-line interface components.

use crate::config::ConverterConfig;
use crate::constants::{
    COMMAND_CSVTOJSON, COMMAND_EXIT, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SETTLE_ATTEMPTS,
    DEFAULT_SETTLE_DELAY_MS,
};
use crate::error::ConverterError;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "csvtojson")]
#[command(about = "Watch a directory for CSV person records and convert them to JSON")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Directory watched for incoming CSV files (arms the watcher at startup)
    #[arg(value_name = "WATCH_DIR")]
    pub watch_dir: Option<PathBuf>,

    /// Directory receiving the JSON documents
    #[arg(value_name = "JSON_DIR")]
    pub json_dir: Option<PathBuf>,

    /// Directory receiving the error reports
    #[arg(value_name = "ERROR_DIR")]
    pub error_dir: Option<PathBuf>,

    /// Interval between directory scans in milliseconds
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,

    /// Attempts made to reach a just-detected file
    #[arg(long, default_value_t = DEFAULT_SETTLE_ATTEMPTS)]
    pub settle_attempts: u32,

    /// Delay between settle attempts in milliseconds
    #[arg(long, default_value_t = DEFAULT_SETTLE_DELAY_MS)]
    pub settle_delay_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    /// Configuration carrying the timing options; directories are filled in on arming
    pub fn base_config(&self) -> ConverterConfig {
        ConverterConfig::default()
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_settle_attempts(self.settle_attempts)
            .with_settle_delay(Duration::from_millis(self.settle_delay_ms))
    }

    /// Start command built from the positional directories, if any were given
    pub fn initial_command(&self) -> Option<Result<Command, CommandError>> {
        let given: Vec<PathBuf> = [&self.watch_dir, &self.json_dir, &self.error_dir]
            .into_iter()
            .flatten()
            .cloned()
            .collect();

        match given.as_slice() {
            [] => None,
            [watch_dir, json_dir, error_dir] => Some(Ok(Command::Start {
                watch_dir: watch_dir.clone(),
                json_dir: json_dir.clone(),
                error_dir: error_dir.clone(),
            })),
            partial => Some(Err(CommandError::MissingArguments {
                found: partial.len(),
            })),
        }
    }
}

/// Install the tracing subscriber
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("csvtojson={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Console command failures; reported to the operator, never fatal
#[derive(Error, Debug)]
pub enum CommandError {
    #[error(
        "csvtojson expects 3 directories (watch, JSON output, error output), got {found}"
    )]
    MissingArguments { found: usize },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl From<ConverterError> for CommandError {
    fn from(error: ConverterError) -> Self {
        match error {
            ConverterError::DirectoryNotFound { path } => Self::DirectoryNotFound { path },
            other => Self::Configuration {
                message: other.to_string(),
            },
        }
    }
}

/// One line typed at the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Arm (or re-arm) the watcher on three directories
    Start {
        watch_dir: PathBuf,
        json_dir: PathBuf,
        error_dir: PathBuf,
    },
    Exit,
    Empty,
    Unknown(String),
}

impl Command {
    /// Parse a console line; words after the third directory are ignored
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            return Ok(Command::Empty);
        };

        match name {
            COMMAND_CSVTOJSON => {
                let dirs: Vec<&str> = parts.take(3).collect();
                match dirs.as_slice() {
                    [watch_dir, json_dir, error_dir] => Ok(Command::Start {
                        watch_dir: PathBuf::from(watch_dir),
                        json_dir: PathBuf::from(json_dir),
                        error_dir: PathBuf::from(error_dir),
                    }),
                    _ => Err(CommandError::MissingArguments { found: dirs.len() }),
                }
            }
            COMMAND_EXIT => Ok(Command::Exit),
            other => Ok(Command::Unknown(other.to_string())),
        }
    }
}

/// Make `path` absolute against the working directory and require a directory there
pub fn resolve_directory(path: &Path) -> Result<PathBuf, CommandError> {
    let absolute = std::path::absolute(path).map_err(|e| CommandError::Configuration {
        message: format!("Cannot resolve '{}': {}", path.display(), e),
    })?;

    if !absolute.is_dir() {
        return Err(CommandError::DirectoryNotFound { path: absolute });
    }
    Ok(absolute)
}

/// Interactive console driving the watcher
pub mod console {
    use super::*;
    use crate::constants::{CONSOLE_PROMPT, USAGE_HINT, WELCOME_MESSAGE};
    use crate::models::ProcessingStats;
    use crate::processor::{FileProcessor, SessionState};
    use crate::watcher::DirectoryWatcher;
    use anyhow::{Context, Result};
    use colored::*;
    use std::io::{self, Write};
    use std::ops::ControlFlow;
    use std::sync::Arc;
    use tokio::io::{AsyncBufRead, AsyncBufReadExt};
    use tokio::task::JoinHandle;
    use tracing::info;

    /// Console state: the armed watcher and the session shared across re-arms
    pub struct Console {
        base_config: ConverterConfig,
        session: Arc<SessionState>,
        watcher: Option<JoinHandle<()>>,
    }

    impl Console {
        pub fn new(base_config: ConverterConfig) -> Self {
            Self {
                base_config,
                session: Arc::new(SessionState::new()),
                watcher: None,
            }
        }

        /// Welcome line and usage hint shown before the first prompt
        pub fn banner() -> String {
            format!("{}\n{}", WELCOME_MESSAGE, USAGE_HINT)
        }

        pub fn print_banner() {
            println!("{}", WELCOME_MESSAGE.bright_white().bold());
            println!("{}", USAGE_HINT);
        }

        pub fn session(&self) -> &Arc<SessionState> {
            &self.session
        }

        pub fn is_armed(&self) -> bool {
            self.watcher.is_some()
        }

        /// Execute one command; `Break` asks the console to stop
        pub fn execute(
            &mut self,
            command: Command,
        ) -> std::result::Result<ControlFlow<()>, CommandError> {
            match command {
                Command::Start {
                    watch_dir,
                    json_dir,
                    error_dir,
                } => {
                    self.arm(&watch_dir, &json_dir, &error_dir)?;
                    Ok(ControlFlow::Continue(()))
                }
                Command::Exit => Ok(ControlFlow::Break(())),
                Command::Empty => Ok(ControlFlow::Continue(())),
                Command::Unknown(name) => {
                    debug!("Unknown console command '{}'", name);
                    println!("Unknown command");
                    Ok(ControlFlow::Continue(()))
                }
            }
        }

        /// Validate the directories and replace any running watcher
        pub fn arm(
            &mut self,
            watch_dir: &Path,
            json_dir: &Path,
            error_dir: &Path,
        ) -> std::result::Result<(), CommandError> {
            let config = ConverterConfig {
                watch_dir: resolve_directory(watch_dir)?,
                json_output_dir: resolve_directory(json_dir)?,
                error_output_dir: resolve_directory(error_dir)?,
                ..self.base_config.clone()
            };
            config.validate()?;

            let watcher =
                DirectoryWatcher::new(FileProcessor::new(config.clone(), self.session.clone()))?;

            if self.disarm() {
                info!("Replacing the previous watcher");
            }
            self.watcher = Some(watcher.spawn());

            println!(
                "{} {}",
                "Watching".bright_green(),
                config.watch_dir.display()
            );
            Ok(())
        }

        /// Stop the running watcher; returns whether one was running
        pub fn disarm(&mut self) -> bool {
            match self.watcher.take() {
                Some(handle) => {
                    handle.abort();
                    true
                }
                None => false,
            }
        }

        /// Read commands until `exit` or end of input
        pub async fn run<R>(&mut self, input: R) -> Result<()>
        where
            R: AsyncBufRead + Unpin,
        {
            let mut lines = input.lines();

            loop {
                prompt()?;
                let Some(line) = lines
                    .next_line()
                    .await
                    .context("Failed to read console input")?
                else {
                    println!();
                    break;
                };

                match Command::parse(&line).and_then(|command| self.execute(command)) {
                    Ok(ControlFlow::Break(())) => break,
                    Ok(ControlFlow::Continue(())) => {}
                    Err(e) => eprintln!("{} {}", "Command failed:".bright_red().bold(), e),
                }
            }

            self.shutdown();
            Ok(())
        }

        /// Disarm and print the session statistics
        pub fn shutdown(&mut self) {
            self.disarm();
            println!("Exiting application...");
            print_stats(&self.session.stats());
        }
    }

    impl Drop for Console {
        fn drop(&mut self) {
            self.disarm();
        }
    }

    fn prompt() -> Result<()> {
        print!("{}", CONSOLE_PROMPT);
        io::stdout().flush().context("Failed to flush stdout")
    }

    fn print_stats(stats: &ProcessingStats) {
        println!("{}", "Session summary".bright_white().bold());
        println!("  Files processed: {}", stats.files_processed);
        println!("  Files rejected:  {}", stats.files_rejected);
        if stats.files_failed > 0 {
            println!(
                "  Files failed:    {}",
                stats.files_failed.to_string().bright_red()
            );
        } else {
            println!("  Files failed:    0");
        }
        println!("  Rows converted:  {}", stats.total_rows);
        println!("  Field issues:    {}", stats.total_issues);
    }
}
