//! @acp:module "Count Command"
//! @acp:summary "Count FASTA/FASTQ records"
//! @acp:domain cli
//! @acp:layer handler
//!
//! `count` - record counting (function style)

use crate::command::{Args, Descriptor, Implementation, OptionDecl};
use crate::error::CommandError;
use crate::interrupt;

use super::reads::RecordReader;

const DOC: &str = "Count the records of a FASTA or FASTQ file and write the total to --output.";

pub fn descriptor() -> Descriptor {
    Descriptor::new("count")
        .title("Count FASTA/FASTQ records")
        .description("Counts sequence records.")
        .inputs(vec![OptionDecl::new("input")
            .help("Input FASTA/FASTQ file")
            .required()])
        .outputs(vec![OptionDecl::new("output")
            .help("File receiving the record count")
            .required()])
}

pub fn implementation() -> Implementation {
    Implementation::function(count, DOC)
}

fn count(args: &Args) -> Result<(), CommandError> {
    let input = args.require("input")?;
    let output = args.require("output")?;

    let mut total: u64 = 0;
    for record in RecordReader::open(input)? {
        if interrupt::is_interrupted() {
            return Err(CommandError::Interrupted);
        }
        record?;
        total += 1;
    }

    std::fs::write(output, format!("{}\n", total))?;
    tracing::info!(input, records = total, "counted records");
    Ok(())
}
