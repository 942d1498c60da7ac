//! @acp:module "Commands"
//! @acp:summary "Command trait, argument snapshots and implementation styles"
//! @acp:domain cli
//! @acp:layer types
//!
//! Commands
//!
//! A command can be written two ways: as a plain function over parsed
//! arguments, or as a type implementing [`Command`] that also declares its
//! own argument schema and validation. [`Implementation`] is the tagged
//! union of both; the [`adapter`] turns either into one [`AdaptedCommand`].

pub mod adapter;
pub mod descriptor;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::CommandError;

pub use adapter::AdaptedCommand;
pub use descriptor::{tool_id, Descriptor, OptionDecl, OptionKind, TOOL_PREFIX};

/// A single resolved argument value
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Unset,
    Flag(bool),
    Text(String),
    List(Vec<String>),
}

impl Value {
    /// True when there is nothing worth writing back into an option
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Unset => true,
            Value::Flag(_) => false,
            Value::Text(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// File-like values carried by this argument
    pub fn values(&self) -> Vec<String> {
        match self {
            Value::Text(s) if !s.is_empty() => vec![s.clone()],
            Value::List(items) => items.clone(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unset => write!(f, ""),
            Value::Flag(b) => write!(f, "{}", b),
            Value::Text(s) => write!(f, "{}", s),
            Value::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Flag(b)
    }
}

/// Dictionary snapshot of a tool's parsed options
///
/// This is what commands see: validation may rewrite entries, and the
/// engine copies the non-empty ones back into its live option state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Args {
    values: BTreeMap<String, Value>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> &Value {
        static UNSET: Value = Value::Unset;
        self.values.get(name).unwrap_or(&UNSET)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).as_str().filter(|s| !s.is_empty())
    }

    pub fn get_flag(&self, name: &str) -> bool {
        matches!(self.get(name), Value::Flag(true))
    }

    /// Required text argument, as a command error when absent
    pub fn require(&self, name: &str) -> Result<&str, CommandError> {
        self.get_str(name)
            .ok_or_else(|| CommandError::MissingArgument(name.to_string()))
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Args {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Args::new();
        for (k, v) in iter {
            args.set(k, v);
        }
        args
    }
}

/// One step of a pipeline: another registered command and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStep {
    pub command: String,
    pub args: Vec<String>,
}

impl PipelineStep {
    pub fn new<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Full command interface
pub trait Command: Send + Sync {
    /// Perform the work
    fn run(&self, args: &Args) -> Result<(), CommandError>;

    /// Declare the command's own argument schema
    fn register(&self, parser: clap::Command) -> clap::Command {
        parser
    }

    /// Reject inconsistent arguments; may fill in derived values
    fn validate(&self, args: &mut Args) -> Result<(), CommandError> {
        let _ = args;
        Ok(())
    }

    /// Long-form help shown above the generated option help
    fn description(&self) -> Option<&str> {
        None
    }

    /// Steps this command expands into when registered as a pipeline
    fn pipeline(&self, args: &Args) -> Result<Vec<PipelineStep>, CommandError> {
        let _ = args;
        Ok(Vec::new())
    }
}

/// Signature of a function-style command
pub type CommandFn = fn(&Args) -> Result<(), CommandError>;

/// A bare function plus its own documentation text
#[derive(Clone, Copy)]
pub struct FunctionCommand {
    pub run: CommandFn,
    pub doc: &'static str,
}

impl FunctionCommand {
    pub fn new(run: CommandFn, doc: &'static str) -> Self {
        Self { run, doc }
    }
}

impl fmt::Debug for FunctionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionCommand")
            .field("doc", &self.doc)
            .finish_non_exhaustive()
    }
}

/// The two ways of authoring a command
#[derive(Clone)]
pub enum Implementation {
    Function(FunctionCommand),
    Object(Arc<dyn Command>),
}

impl Implementation {
    pub fn function(run: CommandFn, doc: &'static str) -> Self {
        Implementation::Function(FunctionCommand::new(run, doc))
    }

    pub fn object<C: Command + 'static>(command: C) -> Self {
        Implementation::Object(Arc::new(command))
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Implementation::Function(func) => f.debug_tuple("Function").field(func).finish(),
            Implementation::Object(_) => f.write_str("Object(..)"),
        }
    }
}
