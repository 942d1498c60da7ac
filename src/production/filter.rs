//! @acp:module "Filter Command"
//! @acp:summary "Drop sequence records below a minimum length"
//! @acp:domain cli
//! @acp:layer handler
//!
//! `filter` - length filtering (object style)

use std::fs::File;
use std::io::{BufWriter, Write};

use clap::{value_parser, Arg};

use crate::command::{Args, Command, Descriptor, Implementation, OptionDecl};
use crate::error::CommandError;
use crate::interrupt;

use super::reads::RecordReader;

pub fn descriptor() -> Descriptor {
    Descriptor::new("filter")
        .title("Filter records by length")
        .description("Drops sequence records shorter than --min-length.")
        .inputs(vec![OptionDecl::new("input")])
        .outputs(vec![OptionDecl::new("output")])
}

pub fn implementation() -> Implementation {
    Implementation::object(Filter)
}

/// Keeps records whose sequence is at least `--min-length` long
pub struct Filter;

impl Filter {
    fn min_length(args: &Args) -> Result<usize, CommandError> {
        let raw = args.get_str("min_length").unwrap_or("1");
        let value: usize = raw
            .parse()
            .map_err(|_| CommandError::invalid("--min-length", format!("'{}' is not a number", raw)))?;
        if value == 0 {
            return Err(CommandError::invalid("--min-length", "must be positive"));
        }
        Ok(value)
    }
}

impl Command for Filter {
    fn run(&self, args: &Args) -> Result<(), CommandError> {
        let input = args.require("input")?;
        let output = args.require("output")?;
        let min_length = Self::min_length(args)?;

        let mut out = BufWriter::new(File::create(output)?);
        let (mut kept, mut dropped) = (0u64, 0u64);
        for record in RecordReader::open(input)? {
            if interrupt::is_interrupted() {
                return Err(CommandError::Interrupted);
            }
            let record = record?;
            if record.len() >= min_length {
                record.write_to(&mut out)?;
                kept += 1;
            } else {
                dropped += 1;
            }
        }
        out.flush()?;

        tracing::info!(input, kept, dropped, "filtered records");
        Ok(())
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
                Arg::new("output")
                    .short('o')
                    .long("output")
                    .help("Output file (default: <input>.filtered)"),
            )
            .arg(
                Arg::new("min_length")
                    .short('m')
                    .long("min-length")
                    .value_parser(value_parser!(usize))
                    .default_value("1")
                    .help("Minimum sequence length"),
            )
    }

    fn validate(&self, args: &mut Args) -> Result<(), CommandError> {
        Self::min_length(args)?;
        if args.get_str("output").is_none() {
            let input = args.require("input")?;
            let output = format!("{}.filtered", input);
            args.set("output", output);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_derives_output() {
        let mut args: Args = [("input", "reads.fq"), ("min_length", "10")].into_iter().collect();
        Filter.validate(&mut args).unwrap();
        assert_eq!(args.get_str("output"), Some("reads.fq.filtered"));
    }

    #[test]
    fn test_validate_rejects_zero_length() {
        let mut args: Args = [("input", "reads.fq"), ("min_length", "0")].into_iter().collect();
        let err = Filter.validate(&mut args).unwrap_err();
        assert!(err.to_string().contains("must be positive"));
    }

    #[test]
    fn test_run_keeps_long_records() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("reads.fa");
        let output = temp.path().join("long.fa");
        std::fs::write(&input, ">short\nAC\n>long\nACGTACGT\n").unwrap();

        let args: Args = [
            ("input", input.to_string_lossy().to_string()),
            ("output", output.to_string_lossy().to_string()),
            ("min_length", "4".to_string()),
        ]
        .into_iter()
        .collect();
        Filter.run(&args).unwrap();

        assert_eq!(std::fs::read_to_string(&output).unwrap(), ">long\nACGTACGT\n");
    }

    #[test]
    fn test_min_length_is_parsed_by_clap() {
        let parser = Filter.register(clap::Command::new("filter").no_binary_name(true));
        let err = parser
            .clone()
            .try_get_matches_from(["-i", "reads.fq", "-m", "ten"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

        let matches = parser.try_get_matches_from(["-i", "reads.fq"]).unwrap();
        assert_eq!(matches.get_one::<usize>("min_length"), Some(&1));
    }
}
