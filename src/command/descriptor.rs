//! @acp:module "Command Descriptors"
//! @acp:summary "Immutable command metadata and engine tool identifiers"
//! @acp:domain cli
//! @acp:layer model
//!
//! Command descriptors
//!
//! Immutable metadata for one command: its name, catalog title, help text,
//! declared inputs and outputs, and whether it expands into a pipeline.

use serde::{Deserialize, Serialize};

/// Namespace prepended to every command name to form its engine tool id
pub const TOOL_PREFIX: &str = "gemtools_";

/// Map a command name to the engine tool identifier
///
/// `-` becomes `_`, so `pipeline-report` is `gemtools_pipeline_report`.
pub fn tool_id(name: &str) -> String {
    format!("{}{}", TOOL_PREFIX, name.replace('-', "_"))
}

/// How an option takes values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptionKind {
    #[default]
    Single,
    Multiple,
    Flag,
    /// Repeatable switch; the value is the number of occurrences
    Count,
}

/// A declared input or output option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDecl {
    pub name: String,

    #[serde(default)]
    pub kind: OptionKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(default)]
    pub required: bool,
}

impl OptionDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: OptionKind::Single,
            help: None,
            default: None,
            required: false,
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.kind = OptionKind::Multiple;
        self
    }
}

/// Metadata describing one registrable command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<OptionDecl>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<OptionDecl>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_outputs: Option<Vec<OptionDecl>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<bool>,
}

impl Descriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: None,
            inputs: None,
            outputs: None,
            add_outputs: None,
            pipeline: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn inputs(mut self, inputs: Vec<OptionDecl>) -> Self {
        self.inputs = Some(inputs);
        self
    }

    pub fn outputs(mut self, outputs: Vec<OptionDecl>) -> Self {
        self.outputs = Some(outputs);
        self
    }

    pub fn add_outputs(mut self, add_outputs: Vec<OptionDecl>) -> Self {
        self.add_outputs = Some(add_outputs);
        self
    }

    pub fn pipeline(mut self, pipeline: bool) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Engine tool identifier for this command
    pub fn tool_id(&self) -> String {
        tool_id(&self.name)
    }

    pub fn is_pipeline(&self) -> bool {
        self.pipeline.unwrap_or(false)
    }
}
