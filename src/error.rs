//! @acp:module "Errors"
//! @acp:summary "Error types for commands, engine, registry and dispatch"
//! @acp:domain cli
//! @acp:layer types
//!
//! Error types
//!
//! One enum per layer. Commands fail with [`CommandError`], the job engine
//! with [`EngineError`], registration with [`RegistryError`]. The dispatcher
//! folds all of them into [`DispatchError`], the single taxonomy the
//! top-level funnel understands.

use thiserror::Error;

/// Failure raised by a command's own logic
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{0}")]
    Message(String),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("Missing value for '{0}'")]
    MissingArgument(String),

    #[error("Interrupted")]
    Interrupted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CommandError {
    pub fn message(msg: impl Into<String>) -> Self {
        CommandError::Message(msg.into())
    }

    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CommandError::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Failure reported by the job engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// Arguments could not be parsed against the tool's argument model
    #[error("{0}")]
    Parser(String),

    /// Arguments parsed but were rejected by validation
    #[error("{tool}: {message}")]
    Validation { tool: String, message: String },

    #[error("Tool not found: {0}")]
    UnknownTool(String),

    #[error("Output file '{path}' is produced by both '{first}' and '{second}'")]
    OutputConflict {
        path: String,
        first: String,
        second: String,
    },

    #[error("Job '{job}' uses '{path}' as both input and output")]
    SelfReference { job: String, path: String },

    #[error("Job '{job}' failed: {reason}")]
    JobFailed { job: String, reason: String },

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Interrupted")]
    Interrupted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure while registering a command
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid command name '{0}': expected letters, digits, '-' or '_'")]
    InvalidName(String),

    #[error("Command '{name}' collides with '{existing}' (both map to tool '{tool_id}')")]
    NameCollision {
        name: String,
        existing: String,
        tool_id: String,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Everything the top-level dispatcher can end with
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Malformed global invocation
    #[error("{0}")]
    Parse(String),

    #[error("gemtools command '{0}' not found!")]
    CommandNotFound(String),

    /// Output file consistency failure in preview mode
    #[error("{0}")]
    Validation(String),

    /// Per-command arguments rejected by the engine
    #[error("{0}")]
    ArgumentValidation(String),

    #[error("{0}")]
    Command(String),

    #[error("Interrupted")]
    Interrupted,

    /// Anything unexpected; never translated into a clean message
    #[error(transparent)]
    Fatal(#[from] anyhow::Error),
}

impl From<EngineError> for DispatchError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Parser(_) | EngineError::UnknownTool(_) => {
                DispatchError::Parse(err.to_string())
            }
            EngineError::Validation { .. } => DispatchError::ArgumentValidation(err.to_string()),
            EngineError::OutputConflict { .. } | EngineError::SelfReference { .. } => {
                DispatchError::Validation(err.to_string())
            }
            EngineError::Command(CommandError::Interrupted) | EngineError::Interrupted => {
                DispatchError::Interrupted
            }
            EngineError::Command(_) | EngineError::JobFailed { .. } => {
                DispatchError::Command(err.to_string())
            }
            EngineError::Io(e) => DispatchError::Fatal(e.into()),
        }
    }
}

impl From<std::io::Error> for DispatchError {
    fn from(err: std::io::Error) -> Self {
        DispatchError::Fatal(err.into())
    }
}

impl From<CommandError> for DispatchError {
    fn from(err: CommandError) -> Self {
        DispatchError::from(EngineError::from(err))
    }
}

/// Failure loading or saving the config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for engine operations
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_errors_map_to_dispatch_categories() {
        let parser = DispatchError::from(EngineError::Parser("bad".into()));
        assert!(matches!(parser, DispatchError::Parse(_)));

        let validation = DispatchError::from(EngineError::Validation {
            tool: "gemtools_count".into(),
            message: "missing".into(),
        });
        assert!(matches!(validation, DispatchError::ArgumentValidation(_)));

        let conflict = DispatchError::from(EngineError::OutputConflict {
            path: "out.txt".into(),
            first: "a".into(),
            second: "b".into(),
        });
        assert!(matches!(conflict, DispatchError::Validation(_)));

        let interrupted = DispatchError::from(CommandError::Interrupted);
        assert!(matches!(interrupted, DispatchError::Interrupted));
    }

    #[test]
    fn test_io_errors_are_fatal() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = DispatchError::from(EngineError::Io(io));
        assert!(matches!(err, DispatchError::Fatal(_)));
    }

    #[test]
    fn test_command_error_message_is_preserved() {
        let err = DispatchError::from(CommandError::message("index not found"));
        assert_eq!(err.to_string(), "index not found");
    }
}
