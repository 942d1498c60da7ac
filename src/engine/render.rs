//! @acp:module "Preview Rendering"
//! @acp:summary "Dry-run overview and command line rendering"
//! @acp:domain cli
//! @acp:layer output
//!
//! Preview rendering
//!
//! `--dry` prints an execution overview, `--show` the command lines that
//! would run. Neither executes anything.

use std::io::Write;

use console::style;

use super::job::JobSet;
use super::tool::Options;

/// Execution overview: one block per job, then the tool's options
pub fn render_dry_run(jobs: &JobSet, options: &Options, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "{}", style(format!("Jobs ({})", jobs.len())).bold())?;
    writeln!(out)?;

    for job in jobs.iter() {
        writeln!(out, "{:>4}  {}", job.id + 1, style(&job.name).cyan())?;
        if !job.inputs.is_empty() {
            writeln!(out, "        inputs:  {}", job.inputs.join(", "))?;
        }
        if !job.outputs.is_empty() {
            writeln!(out, "        outputs: {}", job.outputs.join(", "))?;
        }
        if !job.dependencies.is_empty() {
            let after: Vec<String> = job.dependencies.iter().map(|d| (d + 1).to_string()).collect();
            writeln!(out, "        after:   {}", after.join(", "))?;
        }
    }

    if options.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "{}", style("Options").bold())?;
    writeln!(out)?;

    let width = options
        .iter()
        .map(|o| o.switch.as_deref().unwrap_or(&o.name).len())
        .max()
        .unwrap_or(0);
    for option in options.iter() {
        let label = option.switch.as_deref().unwrap_or(&option.name);
        let value = if option.value.is_empty() {
            style("<not set>".to_string()).dim()
        } else {
            style(option.value.to_string())
        };
        writeln!(out, "    {:<width$}  {}", label, value, width = width)?;
    }
    Ok(())
}

/// One shell-quoted command line per job
pub fn render_command_lines(jobs: &JobSet, program: &str, out: &mut dyn Write) -> std::io::Result<()> {
    for job in jobs.iter() {
        writeln!(
            out,
            "{}",
            style(format!("#### Job {} - {}", job.id + 1, job.name)).bold()
        )?;
        let line: Vec<&str> = [program, job.name.as_str()]
            .into_iter()
            .chain(job.command_line.iter().map(String::as_str))
            .collect();
        writeln!(out, "{}", shell_words::join(line))?;
        writeln!(out)?;
    }
    Ok(())
}
