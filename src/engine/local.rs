//! @acp:module "Local Engine"
//! @acp:summary "Sequential in-process and subprocess job execution"
//! @acp:domain cli
//! @acp:layer service
//!
//! In-process job engine
//!
//! Keeps tool definitions in memory and runs job sets sequentially, either
//! by calling each command directly or by re-invoking the driver binary
//! with [`SPAWNED_JOB_ENV`] set.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command as Process;
use std::sync::Arc;

use console::style;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::interrupt;

use super::job::{self, Job, JobSet};
use super::render;
use super::tool::{Options, Tool, ToolDefinition};
use super::JobEngine;

/// Set in the environment of spawned job processes
pub const SPAWNED_JOB_ENV: &str = "_GT_EXEC";

/// How jobs are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionStrategy {
    /// Call the command's `run` in this process
    #[default]
    InProcess,
    /// Re-invoke the driver once per job
    Subprocess,
}

/// Engine holding tool definitions in memory
pub struct LocalEngine {
    tools: HashMap<String, Arc<ToolDefinition>>,
    program: String,
    strategy: ExecutionStrategy,
}

impl LocalEngine {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            program: "gemtools".to_string(),
            strategy: ExecutionStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Program name printed on rendered command lines
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Registered definition for a tool id
    pub fn definition(&self, id: &str) -> Option<&ToolDefinition> {
        self.tools.get(id).map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    fn execute(&self, job: &Job) -> Result<()> {
        match self.strategy {
            ExecutionStrategy::InProcess => job.run_in_process(),
            ExecutionStrategy::Subprocess => self.spawn(job),
        }
    }

    fn spawn(&self, job: &Job) -> Result<()> {
        let exe: PathBuf = std::env::current_exe()?;
        tracing::debug!(job = %job.name, exe = %exe.display(), "spawning job");

        let status = Process::new(&exe)
            .env(SPAWNED_JOB_ENV, "1")
            .arg(&job.name)
            .args(&job.command_line)
            .status()?;

        if interrupt::is_interrupted() {
            return Err(EngineError::Interrupted);
        }
        if !status.success() {
            return Err(EngineError::JobFailed {
                job: job.name.clone(),
                reason: format!("process exited with {}", status),
            });
        }
        Ok(())
    }
}

impl Default for LocalEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl JobEngine for LocalEngine {
    fn register_tool(&mut self, definition: ToolDefinition) -> Result<()> {
        tracing::debug!(tool = %definition.id, "registering tool");
        self.tools.insert(definition.id.clone(), Arc::new(definition));
        Ok(())
    }

    fn find_tool(&self, id: &str) -> Result<Tool> {
        self.tools
            .get(id)
            .map(|definition| Tool::new(definition.clone()))
            .ok_or_else(|| EngineError::UnknownTool(id.to_string()))
    }

    fn create_jobs(&self, tool: &mut Tool, args: &[String]) -> Result<JobSet> {
        job::create_jobs(tool, args, &|id: &str| self.find_tool(id))
    }

    fn render_dry_run(&self, jobs: &JobSet, options: &Options, out: &mut dyn Write) -> Result<()> {
        render::render_dry_run(jobs, options, out)?;
        Ok(())
    }

    fn render_command_lines(&self, jobs: &JobSet, out: &mut dyn Write) -> Result<()> {
        render::render_command_lines(jobs, &self.program, out)?;
        Ok(())
    }

    fn check_output_consistency(&self, jobs: &JobSet) -> Result<()> {
        job::check_output_consistency(jobs)
    }

    fn run(&self, tool: &mut Tool, args: &[String], silent: bool, out: &mut dyn Write) -> Result<()> {
        let jobs = self.create_jobs(tool, args)?;
        self.check_output_consistency(&jobs)?;

        for job in jobs.iter() {
            if interrupt::is_interrupted() {
                return Err(EngineError::Interrupted);
            }
            if !silent {
                writeln!(
                    out,
                    "{} Running {} ({}/{})",
                    style("→").cyan(),
                    job.name,
                    job.id + 1,
                    jobs.len()
                )?;
            }
            tracing::debug!(job = %job.name, strategy = ?self.strategy, "executing job");
            self.execute(job)?;
        }

        if !silent {
            writeln!(out, "{} {} job(s) completed", style("✓").green(), jobs.len())?;
        }
        Ok(())
    }
}
