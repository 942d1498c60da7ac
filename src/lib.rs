#![forbid(unsafe_code)]

//! @acp:module "GEMTools Library"
//! @acp:summary "Command registration and dispatch for the GEMTools driver"
//! @acp:domain cli
//! @acp:layer api
//! @acp:stability stable
//!
//! # GEMTools
//!
//! Command registration and dispatch for the GEMTools driver.
//!
//! Commands are written either as plain functions or as types implementing
//! [`Command`]. Both are registered into a [`Registry`], which forwards each
//! one to a [`JobEngine`] as a namespaced tool. The [`Dispatcher`] resolves
//! a command name at runtime and previews (`--dry`, `--show`) or executes
//! the resulting job set.
//!
//! ## Example
//!
//! ```rust,no_run
//! use gemtools::{Args, CommandError, Descriptor, Dispatcher, ExecContext, Implementation, LocalEngine};
//!
//! fn hello(_args: &Args) -> Result<(), CommandError> {
//!     println!("hello");
//!     Ok(())
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut dispatcher = Dispatcher::new(LocalEngine::new());
//!     dispatcher.register(Descriptor::new("hello"), Implementation::function(hello, "Say hello"))?;
//!
//!     let argv: Vec<String> = std::env::args().collect();
//!     let code = dispatcher.run(&argv, ExecContext::from_env(), &mut std::io::stdout(), &mut std::io::stderr())?;
//!     std::process::exit(code);
//! }
//! ```

pub mod command;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod interrupt;
pub mod logging;
pub mod production;
pub mod registry;

// Re-exports
pub use command::{
    tool_id, AdaptedCommand, Args, Command, Descriptor, FunctionCommand, Implementation,
    OptionDecl, OptionKind, PipelineStep, Value,
};
pub use config::Config;
pub use dispatch::{Dispatcher, ExecContext, Invocation};
pub use engine::{ExecutionStrategy, Job, JobEngine, JobSet, LocalEngine, Options, Tool, ToolDefinition};
pub use error::{CommandError, ConfigError, DispatchError, EngineError, RegistryError};
pub use logging::LogLevel;
pub use registry::Registry;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
