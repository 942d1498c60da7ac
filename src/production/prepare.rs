//! @acp:module "Prepare Command"
//! @acp:summary "Filter then count pipeline"
//! @acp:domain cli
//! @acp:layer handler
//!
//! `prepare` - filter then count (pipeline)

use clap::Arg;

use crate::command::{Args, Command, Descriptor, Implementation, OptionDecl, PipelineStep};
use crate::error::CommandError;

pub fn descriptor() -> Descriptor {
    Descriptor::new("prepare")
        .title("Filter reads and count the survivors")
        .description("Runs 'filter' followed by 'count' on the filtered reads.")
        .inputs(vec![OptionDecl::new("input")])
        .outputs(vec![OptionDecl::new("counts")])
        .pipeline(true)
}

pub fn implementation() -> Implementation {
    Implementation::object(Prepare)
}

pub struct Prepare;

impl Command for Prepare {
    fn run(&self, _args: &Args) -> Result<(), CommandError> {
        Err(CommandError::message(
            "'prepare' is a pipeline and only runs through its steps",
        ))
    }

    fn register(&self, parser: clap::Command) -> clap::Command {
        parser
            .arg(
                Arg::new("input")
                    .short('i')
                    .long("input")
                    .required(true)
                    .help("Input FASTA/FASTQ file"),
            )
            .arg(
                Arg::new("counts")
                    .short('c')
                    .long("counts")
                    .help("Record count file (default: <input>.counts)"),
            )
            .arg(
                Arg::new("min_length")
                    .short('m')
                    .long("min-length")
                    .default_value("1")
                    .help("Minimum sequence length"),
            )
    }

    fn validate(&self, args: &mut Args) -> Result<(), CommandError> {
        if args.get_str("counts").is_none() {
            let counts = format!("{}.counts", args.require("input")?);
            args.set("counts", counts);
        }
        Ok(())
    }

    fn pipeline(&self, args: &Args) -> Result<Vec<PipelineStep>, CommandError> {
        let input = args.require("input")?;
        let counts = args.require("counts")?;
        let min_length = args.get_str("min_length").unwrap_or("1");
        let filtered = format!("{}.filtered", input);

        Ok(vec![
            PipelineStep::new(
                "filter",
                ["--input", input, "--output", filtered.as_str(), "--min-length", min_length],
            ),
            PipelineStep::new("count", ["--input", filtered.as_str(), "--output", counts]),
        ])
    }
}
