//! @acp:module "Sequence Records"
//! @acp:summary "Streaming FASTA/FASTQ reader"
//! @acp:domain cli
//! @acp:layer data
//!
//! FASTA/FASTQ records
//!
//! Minimal streaming reader used by the built-in commands. FASTQ records are
//! four lines (`@`, sequence, `+`, quality); FASTA records start with `>` and
//! may wrap their sequence across lines.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Write};
use std::path::Path;

use crate::error::CommandError;

/// One sequence record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Header line without its leading marker
    pub header: String,
    pub sequence: String,
    /// Present for FASTQ records
    pub quality: Option<String>,
}

impl Record {
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        match &self.quality {
            Some(quality) => writeln!(out, "@{}\n{}\n+\n{}", self.header, self.sequence, quality),
            None => writeln!(out, ">{}\n{}", self.header, self.sequence),
        }
    }
}

/// Streaming record reader
pub struct RecordReader<R: BufRead> {
    lines: Lines<R>,
    pending: Option<String>,
    line_no: usize,
}

impl RecordReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CommandError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            CommandError::message(format!("Unable to open '{}': {}", path.display(), e))
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            pending: None,
            line_no: 0,
        }
    }

    /// Next line; blank lines are skipped only when `skip_blank` is set
    fn next_line(&mut self, skip_blank: bool) -> Result<Option<String>, CommandError> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(line));
        }
        loop {
            match self.lines.next() {
                None => return Ok(None),
                Some(line) => {
                    self.line_no += 1;
                    let line = line?.trim_end().to_string();
                    if !skip_blank || !line.is_empty() {
                        return Ok(Some(line));
                    }
                }
            }
        }
    }

    fn malformed(&self, what: &str) -> CommandError {
        CommandError::message(format!("Malformed record at line {}: {}", self.line_no, what))
    }

    fn read_record(&mut self) -> Result<Option<Record>, CommandError> {
        let Some(header) = self.next_line(true)? else {
            return Ok(None);
        };

        if let Some(name) = header.strip_prefix('@') {
            // FASTQ lines are positional; an empty sequence is a blank line
            let sequence = self
                .next_line(false)?
                .ok_or_else(|| self.malformed("missing sequence"))?;
            let separator = self
                .next_line(false)?
                .ok_or_else(|| self.malformed("missing '+' separator"))?;
            if !separator.starts_with('+') {
                return Err(self.malformed("expected '+' separator"));
            }
            let quality = self
                .next_line(false)?
                .ok_or_else(|| self.malformed("missing quality"))?;
            if quality.len() != sequence.len() {
                return Err(self.malformed("quality length differs from sequence length"));
            }
            return Ok(Some(Record {
                header: name.to_string(),
                sequence,
                quality: Some(quality),
            }));
        }

        if let Some(name) = header.strip_prefix('>') {
            let mut sequence = String::new();
            while let Some(line) = self.next_line(true)? {
                if line.starts_with('>') {
                    self.pending = Some(line);
                    break;
                }
                sequence.push_str(&line);
            }
            return Ok(Some(Record {
                header: name.to_string(),
                sequence,
                quality: None,
            }));
        }

        Err(self.malformed("expected '@' or '>' header"))
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Record, CommandError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}
