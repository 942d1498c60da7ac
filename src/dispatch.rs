//! @acp:module "Dispatcher"
//! @acp:summary "Global argument parsing, mode selection and exit status mapping"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Top-level dispatcher
//!
//! Parses the driver's global arguments, resolves the requested command,
//! and runs it in one of three modes:
//!
//! - spawned job: the driver was re-invoked from inside a job; parse and
//!   run the command directly
//! - preview (`--dry`, `--show`): build the job set, render it, check
//!   output files, execute nothing
//! - execute: hand the tool and arguments to the engine
//!
//! Every failure comes back as a [`DispatchError`]; [`Dispatcher::run`] is
//! the single place that turns them into messages and exit codes.

use std::io::Write;
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches, Parser};
use console::style;

use crate::command::{tool_id, AdaptedCommand, Descriptor, Implementation};
use crate::engine::{JobEngine, SPAWNED_JOB_ENV};
use crate::error::{DispatchError, RegistryError};
use crate::logging::{self, LogLevel};
use crate::production;
use crate::registry::Registry;
use crate::VERSION;

/// The gemtools driver executes different sub-commands and pipelines.
#[derive(Parser, Debug)]
#[command(name = "gemtools")]
#[command(disable_version_flag = true)]
struct Cli {
    /// Set the log level
    #[arg(long, value_enum, value_name = "LOG")]
    loglevel: Option<LogLevel>,

    /// Show an overview of the execution
    #[arg(long)]
    dry: bool,

    /// Show the command line that will be executed
    #[arg(long)]
    show: bool,

    /// Show version information
    #[arg(short = 'v', long)]
    version: bool,

    /// The sub-command followed by its arguments
    #[arg(
        value_name = "CMD",
        num_args = 1..,
        trailing_var_arg = true,
        required_unless_present = "version"
    )]
    invocation: Vec<String>,
}

/// Parsed global invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub log_level: Option<LogLevel>,
    pub dry: bool,
    pub show: bool,
    pub version: bool,
    pub command: Option<String>,
    /// Tokens owned by the resolved command
    pub args: Vec<String>,
}

impl From<Cli> for Invocation {
    fn from(cli: Cli) -> Self {
        let mut tokens = cli.invocation.into_iter();
        Self {
            log_level: cli.loglevel,
            dry: cli.dry,
            show: cli.show,
            version: cli.version,
            command: tokens.next(),
            args: tokens.collect(),
        }
    }
}

/// Whether this process is a job spawned by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecContext {
    pub spawned: bool,
}

impl ExecContext {
    pub fn top_level() -> Self {
        Self { spawned: false }
    }

    pub fn spawned() -> Self {
        Self { spawned: true }
    }

    /// Read [`SPAWNED_JOB_ENV`] from the environment
    pub fn from_env() -> Self {
        let spawned = std::env::var(SPAWNED_JOB_ENV)
            .map(|v| is_truthy(&v))
            .unwrap_or(false);
        Self { spawned }
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no"
    )
}

/// `--loglevel` given before the command, if the invocation parses at all
///
/// Lets the binary install logging before commands are registered.
pub fn requested_log_level(argv: &[String]) -> Option<LogLevel> {
    Cli::try_parse_from(argv).ok().and_then(|cli| cli.loglevel)
}

/// `-h`/`--help` among the command's own tokens (before any `--`)
fn wants_help(args: &[String]) -> bool {
    args.iter()
        .take_while(|a| a.as_str() != "--")
        .any(|a| a == "-h" || a == "--help")
}

/// Owns the registry and the engine for one process
pub struct Dispatcher<E: JobEngine> {
    registry: Registry,
    engine: E,
    default_log_level: Option<LogLevel>,
}

impl<E: JobEngine> Dispatcher<E> {
    /// Dispatcher with an empty registry
    pub fn new(engine: E) -> Self {
        Self {
            registry: Registry::new(),
            engine,
            default_log_level: None,
        }
    }

    /// Dispatcher with every built-in command registered
    pub fn with_builtins(engine: E) -> Result<Self, RegistryError> {
        let mut dispatcher = Self::new(engine);
        production::register_all(&mut dispatcher.registry, &mut dispatcher.engine)?;
        Ok(dispatcher)
    }

    /// Log level applied when `--loglevel` is absent
    pub fn with_default_log_level(mut self, level: LogLevel) -> Self {
        self.default_log_level = Some(level);
        self
    }

    pub fn register(
        &mut self,
        descriptor: Descriptor,
        implementation: Implementation,
    ) -> Result<Arc<AdaptedCommand>, RegistryError> {
        self.registry
            .register(&mut self.engine, descriptor, implementation)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn cli(&self) -> clap::Command {
        Cli::command().after_help(self.registry.listing())
    }

    /// Top-level help including the command listing
    pub fn help(&self) -> String {
        self.cli().render_help().to_string()
    }

    /// Parse the process argument vector (program name first)
    pub fn parse(&self, argv: &[String]) -> Result<Invocation, clap::Error> {
        let matches = self.cli().try_get_matches_from(argv)?;
        let cli = Cli::from_arg_matches(&matches)?;
        Ok(cli.into())
    }

    /// Resolve and run one invocation
    pub fn dispatch(
        &self,
        argv: &[String],
        ctx: ExecContext,
        out: &mut dyn Write,
    ) -> Result<(), DispatchError> {
        let invocation = match self.parse(argv) {
            Ok(invocation) => invocation,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                write!(out, "{}", e)?;
                return Ok(());
            }
            Err(e) => return Err(DispatchError::Parse(e.to_string().trim_end().to_string())),
        };

        if invocation.version {
            writeln!(out, "GEMTools version {}", VERSION)?;
            return Ok(());
        }

        if let Some(level) = invocation.log_level.or(self.default_log_level) {
            logging::init(level);
        }

        let command = invocation
            .command
            .clone()
            .ok_or_else(|| DispatchError::Parse("No command given".to_string()))?;
        if !self.registry.contains(&command) {
            return Err(DispatchError::CommandNotFound(command));
        }

        let mut tool = self.engine.find_tool(&tool_id(&command))?;
        tracing::debug!(command = %command, tool = %tool.id(), spawned = ctx.spawned, "resolved command");

        if ctx.spawned {
            tool.parse_args(&invocation.args)?;
            tool.run()?;
            return Ok(());
        }

        if wants_help(&invocation.args) {
            write!(out, "{}", tool.help())?;
            return Ok(());
        }

        if invocation.dry || invocation.show {
            let jobs = self.engine.create_jobs(&mut tool, &invocation.args)?;
            if invocation.dry {
                self.engine.render_dry_run(&jobs, tool.options(), out)?;
            }
            if invocation.show {
                self.engine.render_command_lines(&jobs, out)?;
            }
            self.engine
                .check_output_consistency(&jobs)
                .map_err(|e| DispatchError::Validation(e.to_string()))?;
            return Ok(());
        }

        self.engine.run(&mut tool, &invocation.args, false, out)?;
        Ok(())
    }

    /// Dispatch and map the outcome to an exit status
    ///
    /// Recognized failures are reported on `err` and yield 1. `Fatal`
    /// failures are returned untouched.
    pub fn run(
        &self,
        argv: &[String],
        ctx: ExecContext,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> anyhow::Result<i32> {
        match self.dispatch(argv, ctx, out) {
            Ok(()) => Ok(0),
            Err(DispatchError::Fatal(e)) => Err(e),
            Err(e) => {
                report(&e, err)?;
                Ok(1)
            }
        }
    }
}

fn report(error: &DispatchError, err: &mut dyn Write) -> std::io::Result<()> {
    match error {
        DispatchError::Interrupted => Ok(()),
        DispatchError::CommandNotFound(_) => {
            writeln!(err, "{}", error)?;
            writeln!(err, "See gemtools --help for a list of commands")
        }
        DispatchError::Validation(detail) => {
            writeln!(err, "{}\n", style("Validation error!").red().for_stderr())?;
            writeln!(err, "{}", detail)
        }
        _ => writeln!(err, "{}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LocalEngine;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn dispatcher() -> Dispatcher<LocalEngine> {
        Dispatcher::with_builtins(LocalEngine::new()).unwrap()
    }

    #[test]
    fn test_parse_splits_command_and_args() {
        let inv = dispatcher()
            .parse(&argv(&["gemtools", "--dry", "filter", "--input", "a.fq"]))
            .unwrap();
        assert!(inv.dry);
        assert!(!inv.show);
        assert_eq!(inv.command.as_deref(), Some("filter"));
        assert_eq!(inv.args, argv(&["--input", "a.fq"]));
    }

    #[test]
    fn test_flags_after_command_belong_to_command() {
        let inv = dispatcher()
            .parse(&argv(&["gemtools", "filter", "--dry", "--loglevel", "debug"]))
            .unwrap();
        assert!(!inv.dry);
        assert_eq!(inv.log_level, None);
        assert_eq!(inv.args, argv(&["--dry", "--loglevel", "debug"]));
    }

    #[test]
    fn test_parse_log_level() {
        let inv = dispatcher()
            .parse(&argv(&["gemtools", "--loglevel", "info", "count"]))
            .unwrap();
        assert_eq!(inv.log_level, Some(LogLevel::Info));
    }

    #[test]
    fn test_missing_command_is_parse_failure() {
        let err = dispatcher()
            .dispatch(&argv(&["gemtools"]), ExecContext::top_level(), &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, DispatchError::Parse(_)));
    }

    #[test]
    fn test_help_lists_commands() {
        let help = dispatcher().help();
        assert!(help.contains("The following sub-commands are available:"));
        assert!(help.contains("count  Count FASTA/FASTQ records"));
        assert!(help.contains("--dry"));
    }

    #[test]
    fn test_requested_log_level_reads_global_flag_only() {
        assert_eq!(
            requested_log_level(&argv(&["gemtools", "--loglevel", "debug", "count"])),
            Some(LogLevel::Debug)
        );
        assert_eq!(
            requested_log_level(&argv(&["gemtools", "count", "--loglevel", "debug"])),
            None
        );
        assert_eq!(requested_log_level(&argv(&["gemtools", "--loglevel", "loud"])), None);
    }

    #[test]
    fn test_wants_help() {
        assert!(wants_help(&argv(&["--input", "a", "-h"])));
        assert!(!wants_help(&argv(&["--", "--help"])));
        assert!(!wants_help(&argv(&["--input", "help"])));
    }

    #[test]
    fn test_truthy_values() {
        assert!(is_truthy("1"));
        assert!(is_truthy("yes"));
        assert!(!is_truthy(""));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("False"));
    }
}
