//! @acp:module "Jobs"
//! @acp:summary "Job sets, pipeline expansion and output consistency"
//! @acp:domain cli
//! @acp:layer logic
//!
//! Jobs and job sets
//!
//! A job is a tool bound to concrete arguments. Pipeline tools are expanded
//! into the jobs of their steps; plain tools become a single job.

use std::collections::HashMap;
use std::sync::Arc;

use crate::command::{tool_id, Args, Command};
use crate::error::{EngineError, Result};

use super::tool::Tool;

/// Pipelines nested deeper than this are rejected
pub const MAX_PIPELINE_DEPTH: usize = 16;

/// One argument-bound unit of work
#[derive(Clone)]
pub struct Job {
    /// Position in the job set
    pub id: usize,
    /// Command name
    pub name: String,
    pub tool_id: String,
    /// Option snapshot the command runs with
    pub args: Args,
    /// Argument tokens reproducing `args` on a command line
    pub command_line: Vec<String>,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    /// Ids of earlier jobs producing this job's inputs
    pub dependencies: Vec<usize>,
    entrypoint: Arc<dyn Command>,
}

impl Job {
    /// Bind a parsed and validated tool into a job
    pub fn from_tool(id: usize, tool: &Tool) -> Self {
        Self {
            id,
            name: tool.name().to_string(),
            tool_id: tool.id().to_string(),
            args: tool.options().to_args(),
            command_line: tool.options().to_tokens(),
            inputs: tool.input_files(),
            outputs: tool.output_files(),
            dependencies: Vec::new(),
            entrypoint: tool.definition().entrypoint.clone(),
        }
    }

    /// Run the job's command in this process
    pub fn run_in_process(&self) -> Result<()> {
        self.entrypoint.run(&self.args).map_err(EngineError::from)
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("command_line", &self.command_line)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Jobs created for one invocation, in execution order
#[derive(Debug, Clone, Default)]
pub struct JobSet {
    jobs: Vec<Job>,
}

impl JobSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job for `tool`, wiring dependencies on earlier jobs
    pub fn push(&mut self, tool: &Tool) -> &Job {
        let mut job = Job::from_tool(self.jobs.len(), tool);
        job.dependencies = self
            .jobs
            .iter()
            .filter(|earlier| job.inputs.iter().any(|i| earlier.outputs.contains(i)))
            .map(|earlier| earlier.id)
            .collect();
        self.jobs.push(job);
        &self.jobs[self.jobs.len() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    pub fn get(&self, id: usize) -> Option<&Job> {
        self.jobs.get(id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Build the job set for a tool from argument tokens
///
/// `find` resolves the tools named by pipeline steps.
pub fn create_jobs<F>(tool: &mut Tool, tokens: &[String], find: &F) -> Result<JobSet>
where
    F: Fn(&str) -> Result<Tool>,
{
    tool.parse_args(tokens)?;
    let mut jobs = JobSet::new();
    expand(tool, find, &mut jobs, 0)?;
    tracing::debug!(tool = tool.id(), jobs = jobs.len(), "created job set");
    Ok(jobs)
}

fn expand<F>(tool: &Tool, find: &F, jobs: &mut JobSet, depth: usize) -> Result<()>
where
    F: Fn(&str) -> Result<Tool>,
{
    if !tool.is_pipeline() {
        jobs.push(tool);
        return Ok(());
    }

    if depth >= MAX_PIPELINE_DEPTH {
        return Err(EngineError::Validation {
            tool: tool.name().to_string(),
            message: format!("pipeline nesting exceeds {} levels", MAX_PIPELINE_DEPTH),
        });
    }

    let steps = tool
        .definition()
        .entrypoint
        .pipeline(&tool.options().to_args())?;
    for step in steps {
        let mut sub = find(&tool_id(&step.command))?;
        sub.parse_args(&step.args)?;
        expand(&sub, find, jobs, depth + 1)?;
    }
    Ok(())
}

/// Fail when two jobs write the same file, or a job reads what it writes
pub fn check_output_consistency(jobs: &JobSet) -> Result<()> {
    let mut producers: HashMap<&str, &Job> = HashMap::new();
    for job in jobs.iter() {
        for output in &job.outputs {
            if job.inputs.contains(output) {
                return Err(EngineError::SelfReference {
                    job: job.name.clone(),
                    path: output.clone(),
                });
            }
            if let Some(first) = producers.insert(output.as_str(), job) {
                return Err(EngineError::OutputConflict {
                    path: output.clone(),
                    first: first.name.clone(),
                    second: job.name.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{AdaptedCommand, Implementation, OptionDecl};
    use crate::engine::{Options, ToolDefinition};
    use crate::error::CommandError;

    fn noop(_args: &Args) -> std::result::Result<(), CommandError> {
        Ok(())
    }

    fn tool(name: &str) -> Tool {
        let adapted = Arc::new(AdaptedCommand::adapt(Implementation::function(noop, "")));
        let validate = adapted.clone();
        Tool::new(Arc::new(ToolDefinition {
            id: tool_id(name),
            name: name.into(),
            inputs: Some(vec![OptionDecl::new("input")]),
            outputs: Some(vec![OptionDecl::new("output")]),
            add_outputs: None,
            pipeline: None,
            validate: Arc::new(move |opts: &mut Options| validate.validate_options(opts)),
            help: Arc::new(|_: &Tool| String::new()),
            argparse: None,
            entrypoint: adapted,
        }))
    }

    fn bound(name: &str, input: &str, output: &str) -> Tool {
        let mut t = tool(name);
        let tokens: Vec<String> = ["--input", input, "--output", output]
            .iter()
            .map(|s| s.to_string())
            .collect();
        t.parse_args(&tokens).unwrap();
        t
    }

    #[test]
    fn test_push_wires_dependencies() {
        let mut jobs = JobSet::new();
        jobs.push(&bound("filter", "reads.fq", "filtered.fq"));
        jobs.push(&bound("count", "filtered.fq", "counts.txt"));

        assert_eq!(jobs.len(), 2);
        assert!(jobs.get(0).unwrap().dependencies.is_empty());
        assert_eq!(jobs.get(1).unwrap().dependencies, vec![0]);
        assert_eq!(jobs.get(1).unwrap().tool_id, "gemtools_count");
    }

    #[test]
    fn test_duplicate_outputs_conflict() {
        let mut jobs = JobSet::new();
        jobs.push(&bound("filter", "a.fq", "out.fq"));
        jobs.push(&bound("filter", "b.fq", "out.fq"));

        let err = check_output_consistency(&jobs).unwrap_err();
        assert!(matches!(err, EngineError::OutputConflict { ref path, .. } if path == "out.fq"));
    }

    #[test]
    fn test_input_equal_to_output_conflicts() {
        let mut jobs = JobSet::new();
        jobs.push(&bound("filter", "same.fq", "same.fq"));
        assert!(matches!(
            check_output_consistency(&jobs),
            Err(EngineError::SelfReference { .. })
        ));
    }

    #[test]
    fn test_consistent_set_passes() {
        let mut jobs = JobSet::new();
        jobs.push(&bound("filter", "reads.fq", "filtered.fq"));
        jobs.push(&bound("count", "filtered.fq", "counts.txt"));
        assert!(check_output_consistency(&jobs).is_ok());
    }

    #[test]
    fn test_plain_tool_creates_one_job() {
        let mut t = tool("count");
        let tokens = vec!["--input".to_string(), "reads.fq".to_string()];
        let jobs = create_jobs(&mut t, &tokens, &|id: &str| {
            Err(EngineError::UnknownTool(id.to_string()))
        })
        .unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs.get(0).unwrap().command_line, tokens);
    }
}
