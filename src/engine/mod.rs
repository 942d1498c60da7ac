//! @acp:module "Job Engine"
//! @acp:summary "Contract between the dispatcher and a job engine"
//! @acp:domain cli
//! @acp:layer api
//!
//! Job engine
//!
//! The dispatcher reaches the engine only through [`JobEngine`]: register a
//! tool, find a tool, create jobs, render previews, check outputs, run.
//! [`LocalEngine`] is the bundled implementation.

pub mod job;
pub mod local;
pub mod render;
pub mod tool;

use std::io::Write;

use crate::error::Result;

pub use job::{check_output_consistency, create_jobs, Job, JobSet, MAX_PIPELINE_DEPTH};
pub use local::{ExecutionStrategy, LocalEngine, SPAWNED_JOB_ENV};
pub use tool::{ArgparseHook, HelpHook, OptionSlot, Options, Tool, ToolDefinition, ValidateHook};

/// Contract between the dispatcher and a job engine
pub trait JobEngine {
    /// Register (or replace) a tool definition
    fn register_tool(&mut self, definition: ToolDefinition) -> Result<()>;

    /// Fresh instance of a registered tool; parser error when unknown
    fn find_tool(&self, id: &str) -> Result<Tool>;

    /// Parse, validate and expand a tool into its job set
    fn create_jobs(&self, tool: &mut Tool, args: &[String]) -> Result<JobSet>;

    /// Execution overview for `--dry`
    fn render_dry_run(&self, jobs: &JobSet, options: &Options, out: &mut dyn Write) -> Result<()>;

    /// Literal command lines for `--show`
    fn render_command_lines(&self, jobs: &JobSet, out: &mut dyn Write) -> Result<()>;

    /// Fail on conflicting output files
    fn check_output_consistency(&self, jobs: &JobSet) -> Result<()>;

    /// Build, validate and execute the job set end to end
    fn run(&self, tool: &mut Tool, args: &[String], silent: bool, out: &mut dyn Write) -> Result<()>;
}
