//! @acp:module "Dual-Style Adapter"
//! @acp:summary "Normalizes function and object commands into one runnable shape"
//! @acp:domain cli
//! @acp:layer logic
//!
//! Dual-style adapter
//!
//! Wraps either a bare function or a full [`Command`] into one
//! [`AdaptedCommand`], so the registry only ever stores a single type.

use std::sync::Arc;

use crate::engine::Options;
use crate::error::CommandError;

use super::{Args, Command, FunctionCommand, Implementation, PipelineStep};

/// A function-style command presented as a [`Command`]
///
/// Registers no arguments of its own and accepts everything in `validate`;
/// its help text is the function's own documentation.
struct FunctionWrapper {
    func: FunctionCommand,
}

impl Command for FunctionWrapper {
    fn run(&self, args: &Args) -> Result<(), CommandError> {
        (self.func.run)(args)
    }

    fn description(&self) -> Option<&str> {
        Some(self.func.doc).filter(|doc| !doc.is_empty())
    }
}

/// Uniform command shape stored by the registry
pub struct AdaptedCommand {
    inner: Arc<dyn Command>,
    custom_arguments: bool,
}

impl std::fmt::Debug for AdaptedCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptedCommand")
            .field("custom_arguments", &self.custom_arguments)
            .finish_non_exhaustive()
    }
}

impl AdaptedCommand {
    /// Normalize either authoring style
    pub fn adapt(implementation: Implementation) -> Self {
        match implementation {
            Implementation::Function(func) => Self {
                inner: Arc::new(FunctionWrapper { func }),
                custom_arguments: false,
            },
            Implementation::Object(inner) => Self {
                inner,
                custom_arguments: true,
            },
        }
    }

    /// Whether the command declares its own argument schema
    ///
    /// Function-style commands leave argument handling to the engine's
    /// generic model built from declared inputs and outputs.
    pub fn has_custom_arguments(&self) -> bool {
        self.custom_arguments
    }

    /// Validation entry point handed to the engine
    ///
    /// Runs the command's own `validate` over a dictionary snapshot of the
    /// options, then writes every non-empty value back into the live
    /// options. Job creation reads the live options, so values the command
    /// derives during validation must land there.
    pub fn validate_options(&self, options: &mut Options) -> Result<(), CommandError> {
        if !self.custom_arguments {
            return Ok(());
        }

        let mut args = options.to_args();
        self.inner.validate(&mut args)?;

        for (name, value) in args.iter() {
            if value.is_empty() {
                continue;
            }
            if let Some(slot) = options.get_mut(name) {
                slot.set(value.clone());
            }
        }
        Ok(())
    }
}

impl Command for AdaptedCommand {
    fn run(&self, args: &Args) -> Result<(), CommandError> {
        self.inner.run(args)
    }

    fn register(&self, parser: clap::Command) -> clap::Command {
        self.inner.register(parser)
    }

    fn validate(&self, args: &mut Args) -> Result<(), CommandError> {
        self.inner.validate(args)
    }

    fn description(&self) -> Option<&str> {
        self.inner.description()
    }

    fn pipeline(&self, args: &Args) -> Result<Vec<PipelineStep>, CommandError> {
        self.inner.pipeline(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Value;
    use crate::engine::OptionSlot;
    use crate::command::OptionKind;

    fn noop(_args: &Args) -> Result<(), CommandError> {
        Ok(())
    }

    fn fail(_args: &Args) -> Result<(), CommandError> {
        Err(CommandError::message("function ran"))
    }

    struct Defaults;

    impl Command for Defaults {
        fn run(&self, _args: &Args) -> Result<(), CommandError> {
            Ok(())
        }

        fn register(&self, parser: clap::Command) -> clap::Command {
            parser.arg(clap::Arg::new("input").long("input"))
        }

        fn validate(&self, args: &mut Args) -> Result<(), CommandError> {
            let input = args.require("input")?.to_string();
            args.set("output", format!("{}.out", input));
            args.set("ignored", "not an option");
            Ok(())
        }
    }

    fn options() -> Options {
        let mut options = Options::default();
        options.push(OptionSlot::new("input", Some("--input".into()), OptionKind::Single));
        options.push(OptionSlot::new("output", Some("--output".into()), OptionKind::Single));
        options
    }

    #[test]
    fn test_function_variant_satisfies_command_contract() {
        let adapted = AdaptedCommand::adapt(Implementation::function(fail, "Counts records."));
        let mut args = Args::new();

        assert!(!adapted.has_custom_arguments());
        assert!(adapted.validate(&mut args).is_ok());
        let parser = adapted.register(clap::Command::new("count"));
        assert_eq!(parser.get_arguments().count(), 0);
        assert_eq!(adapted.run(&args).unwrap_err().to_string(), "function ran");
        assert_eq!(adapted.description(), Some("Counts records."));
    }

    #[test]
    fn test_function_variant_validation_is_a_noop() {
        let adapted = AdaptedCommand::adapt(Implementation::function(noop, ""));
        let mut opts = options();
        adapted.validate_options(&mut opts).unwrap();
        assert_eq!(opts.get("output").unwrap().value, Value::Unset);
        assert_eq!(adapted.description(), None);
    }

    #[test]
    fn test_object_variant_writes_back_validated_values() {
        let adapted = AdaptedCommand::adapt(Implementation::object(Defaults));
        let mut opts = options();
        opts.get_mut("input").unwrap().set(Value::from("reads.fq"));

        adapted.validate_options(&mut opts).unwrap();

        assert!(adapted.has_custom_arguments());
        assert_eq!(opts.get("output").unwrap().value, Value::from("reads.fq.out"));
        assert!(opts.get("ignored").is_none());
    }

    #[test]
    fn test_object_variant_validation_errors_propagate() {
        let adapted = AdaptedCommand::adapt(Implementation::object(Defaults));
        let mut opts = options();
        let err = adapted.validate_options(&mut opts).unwrap_err();
        assert!(matches!(err, CommandError::MissingArgument(name) if name == "input"));
    }
}
