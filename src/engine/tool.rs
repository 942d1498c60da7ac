//! @acp:module "Tools"
//! @acp:summary "Tool definitions, argument models and live option state"
//! @acp:domain cli
//! @acp:layer model
//!
//! Tools and their argument model
//!
//! A [`ToolDefinition`] is what the registry hands to the engine. A [`Tool`]
//! is one live instance of a definition with its own [`Options`]; every
//! lookup through the engine produces a fresh one.

use std::fmt;
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::parser::MatchesError;
use clap::{Arg, ArgAction, ArgMatches};

use crate::command::{Args, Command, OptionDecl, OptionKind, Value};
use crate::error::{CommandError, EngineError, Result};

/// Validation hook; runs against the live options after parsing
pub type ValidateHook = Arc<dyn Fn(&mut Options) -> std::result::Result<(), CommandError> + Send + Sync>;

/// Help hook; renders the complete help text for a tool
pub type HelpHook = Arc<dyn Fn(&Tool) -> String + Send + Sync>;

/// Argument registration hook for commands with their own schema
pub type ArgparseHook = Arc<dyn Fn(clap::Command) -> clap::Command + Send + Sync>;

/// Everything the engine knows about one registered tool
#[derive(Clone)]
pub struct ToolDefinition {
    /// Namespaced engine identifier
    pub id: String,
    /// Command name as typed on the driver's command line
    pub name: String,
    pub inputs: Option<Vec<OptionDecl>>,
    pub outputs: Option<Vec<OptionDecl>>,
    pub add_outputs: Option<Vec<OptionDecl>>,
    pub pipeline: Option<bool>,
    pub validate: ValidateHook,
    pub help: HelpHook,
    /// `None` selects the generic argument model
    pub argparse: Option<ArgparseHook>,
    /// The runnable command
    pub entrypoint: Arc<dyn Command>,
}

impl ToolDefinition {
    pub fn is_pipeline(&self) -> bool {
        self.pipeline.unwrap_or(false)
    }

    /// Declared inputs, outputs and additional outputs, in that order
    pub fn declared(&self) -> impl Iterator<Item = &OptionDecl> {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .chain(self.add_outputs.iter())
            .flatten()
    }

    fn declared_outputs(&self) -> impl Iterator<Item = &OptionDecl> {
        self.outputs.iter().chain(self.add_outputs.iter()).flatten()
    }

    /// Build the argument parser for this tool
    pub fn parser(&self) -> clap::Command {
        let mut base = clap::Command::new(self.name.clone())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true);
        if let Some(about) = self.entrypoint.description() {
            base = base.about(about.to_string());
        }

        match &self.argparse {
            Some(register) => register(base),
            None => self.generic_parser(base),
        }
    }

    /// One `--<name>` option per declared input and output
    fn generic_parser(&self, mut parser: clap::Command) -> clap::Command {
        let mut seen = Vec::new();
        for decl in self.declared() {
            if seen.contains(&decl.name.as_str()) {
                continue;
            }
            seen.push(decl.name.as_str());

            let mut arg = Arg::new(decl.name.clone()).long(decl.name.clone());
            arg = match decl.kind {
                OptionKind::Single => arg.action(ArgAction::Set).num_args(1),
                OptionKind::Multiple => arg.action(ArgAction::Append).num_args(1..),
                OptionKind::Flag => arg.action(ArgAction::SetTrue),
                OptionKind::Count => arg.action(ArgAction::Count),
            };
            if let Some(help) = &decl.help {
                arg = arg.help(help.clone());
            }
            if let Some(default) = &decl.default {
                arg = arg.default_value(default.clone());
            }
            parser = parser.arg(arg);
        }
        parser
    }
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("add_outputs", &self.add_outputs)
            .field("pipeline", &self.pipeline)
            .field("argparse", &self.argparse.is_some())
            .finish_non_exhaustive()
    }
}

/// Live state of one option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSlot {
    pub name: String,
    /// `--long` or `-s` switch; `None` for positionals
    pub switch: Option<String>,
    pub kind: OptionKind,
    /// Flag whose switch turns it off (`ArgAction::SetFalse`)
    pub negated: bool,
    pub value: Value,
}

impl OptionSlot {
    pub fn new(name: impl Into<String>, switch: Option<String>, kind: OptionKind) -> Self {
        Self {
            name: name.into(),
            switch,
            kind,
            negated: false,
            value: Value::Unset,
        }
    }

    pub fn set(&mut self, value: Value) {
        self.value = value;
    }

    fn from_arg(arg: &Arg) -> Self {
        let action = arg.get_action();
        let kind = match action {
            ArgAction::SetTrue | ArgAction::SetFalse => OptionKind::Flag,
            ArgAction::Count => OptionKind::Count,
            ArgAction::Append => OptionKind::Multiple,
            _ => OptionKind::Single,
        };
        let switch = arg
            .get_long()
            .map(|long| format!("--{}", long))
            .or_else(|| arg.get_short().map(|short| format!("-{}", short)));
        let mut slot = Self::new(arg.get_id().as_str(), switch, kind);
        slot.negated = matches!(action, ArgAction::SetFalse);
        slot
    }

    /// Read this slot's value back from parsed matches
    ///
    /// Values are taken in their raw form so typed value parsers on the
    /// command's own arguments do not matter here.
    fn read(&self, matches: &ArgMatches) -> std::result::Result<Value, MatchesError> {
        let name = self.name.as_str();
        match self.kind {
            OptionKind::Flag => Ok(matches
                .try_get_one::<bool>(name)?
                .map_or(Value::Unset, |on| Value::Flag(*on))),
            OptionKind::Count => Ok(matches
                .try_get_one::<u8>(name)?
                .map_or(Value::Unset, |n| Value::Text(n.to_string()))),
            OptionKind::Single | OptionKind::Multiple => {
                let mut values: Vec<String> = matches
                    .try_get_raw(name)?
                    .map(|raw| raw.map(|v| v.to_string_lossy().into_owned()).collect())
                    .unwrap_or_default();
                Ok(match (self.kind, values.len()) {
                    (_, 0) => Value::Unset,
                    (OptionKind::Single, 1) => Value::Text(values.remove(0)),
                    _ => Value::List(values),
                })
            }
        }
    }

    /// Command line tokens reproducing this option's value
    fn tokens(&self) -> Vec<String> {
        match (&self.value, self.kind) {
            (Value::Flag(on), _) => {
                if *on != self.negated {
                    self.switch.iter().cloned().collect()
                } else {
                    Vec::new()
                }
            }
            (value, OptionKind::Count) => {
                let times = value.as_str().and_then(|n| n.parse().ok()).unwrap_or(0);
                self.switch.iter().cloned().cycle().take(times).collect()
            }
            (value, _) => match &self.switch {
                Some(switch) => value
                    .values()
                    .into_iter()
                    .flat_map(|v| [switch.clone(), v])
                    .collect(),
                None => value.values(),
            },
        }
    }
}

/// Ordered option state of a tool instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    slots: Vec<OptionSlot>,
}

impl Options {
    /// One slot per argument the parser declares
    pub fn from_parser(parser: &clap::Command) -> Self {
        Self {
            slots: parser.get_arguments().map(OptionSlot::from_arg).collect(),
        }
    }

    pub fn push(&mut self, slot: OptionSlot) {
        self.slots.push(slot);
    }

    pub fn get(&self, name: &str) -> Option<&OptionSlot> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut OptionSlot> {
        self.slots.iter_mut().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionSlot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Dictionary snapshot handed to commands
    pub fn to_args(&self) -> Args {
        self.slots
            .iter()
            .map(|s| (s.name.clone(), s.value.clone()))
            .collect()
    }

    /// Re-render the options as command line tokens
    ///
    /// Switches come first; positionals follow a `--` so a multi-value
    /// switch cannot swallow them.
    pub fn to_tokens(&self) -> Vec<String> {
        let (switched, positional): (Vec<_>, Vec<_>) =
            self.slots.iter().partition(|s| s.switch.is_some());
        let mut tokens: Vec<String> = switched.into_iter().flat_map(OptionSlot::tokens).collect();
        let trailing: Vec<String> = positional.into_iter().flat_map(OptionSlot::tokens).collect();
        if !trailing.is_empty() {
            tokens.push("--".to_string());
            tokens.extend(trailing);
        }
        tokens
    }

    fn apply_matches(&mut self, matches: &ArgMatches) -> Result<()> {
        for slot in &mut self.slots {
            slot.value = slot
                .read(matches)
                .map_err(|e| EngineError::Parser(format!("Option '{}': {}", slot.name, e)))?;
        }
        Ok(())
    }
}

/// One live instance of a registered tool
#[derive(Clone)]
pub struct Tool {
    definition: Arc<ToolDefinition>,
    options: Options,
}

impl Tool {
    pub fn new(definition: Arc<ToolDefinition>) -> Self {
        let options = Options::from_parser(&definition.parser());
        Self {
            definition,
            options,
        }
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub fn is_pipeline(&self) -> bool {
        self.definition.is_pipeline()
    }

    /// Parse argument tokens into the options, then validate
    pub fn parse_args(&mut self, tokens: &[String]) -> Result<()> {
        let matches = self
            .definition
            .parser()
            .try_get_matches_from(tokens)
            .map_err(|e| self.parse_failure(e))?;
        self.options.apply_matches(&matches)?;
        self.validate()
    }

    /// Run the validation hook, then enforce declared required options
    pub fn validate(&mut self) -> Result<()> {
        (self.definition.validate)(&mut self.options).map_err(|e| match e {
            CommandError::Interrupted => EngineError::Interrupted,
            other => self.validation_error(other.to_string()),
        })?;

        for decl in self.definition.declared().filter(|d| d.required) {
            let missing = self
                .options
                .get(&decl.name)
                .map_or(true, |slot| slot.value.is_empty());
            if missing {
                return Err(self.validation_error(format!("Option '--{}' is required", decl.name)));
            }
        }
        Ok(())
    }

    /// Execute the command directly with the current options
    pub fn run(&self) -> Result<()> {
        self.definition
            .entrypoint
            .run(&self.options.to_args())
            .map_err(EngineError::from)
    }

    /// Full help text as composed by the help hook
    pub fn help(&self) -> String {
        (self.definition.help)(self)
    }

    /// Generated option help for this tool's argument model
    pub fn option_help(&self) -> String {
        let mut parser = self.definition.parser();
        parser.render_help().to_string()
    }

    /// Files named by the declared inputs
    pub fn input_files(&self) -> Vec<String> {
        self.files(self.definition.inputs.iter().flatten())
    }

    /// Files named by the declared outputs and additional outputs
    pub fn output_files(&self) -> Vec<String> {
        self.files(self.definition.declared_outputs())
    }

    fn files<'a>(&self, decls: impl Iterator<Item = &'a OptionDecl>) -> Vec<String> {
        decls
            .filter_map(|decl| self.options.get(&decl.name))
            .flat_map(|slot| slot.value.values())
            .collect()
    }

    fn validation_error(&self, message: String) -> EngineError {
        EngineError::Validation {
            tool: self.definition.name.clone(),
            message,
        }
    }

    fn parse_failure(&self, err: clap::Error) -> EngineError {
        let message = err.to_string().trim_end().to_string();
        match err.kind() {
            ErrorKind::MissingRequiredArgument => self.validation_error(message),
            _ => EngineError::Parser(message),
        }
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("id", &self.definition.id)
            .field("options", &self.options)
            .finish()
    }
}
