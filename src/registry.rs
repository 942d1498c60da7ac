//! @acp:module "Command Registry"
//! @acp:summary "Command name registration and forwarding to the engine"
//! @acp:domain cli
//! @acp:layer service
//!
//! Command registry
//!
//! Maps command names to their descriptors and adapted implementations, and
//! forwards every registration to the job engine as a namespaced tool.
//! Registering a name twice replaces the earlier entry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::command::{AdaptedCommand, Command, Descriptor, Implementation};
use crate::engine::{ArgparseHook, HelpHook, JobEngine, Options, Tool, ToolDefinition, ValidateHook};
use crate::error::RegistryError;

/// One registered command
pub struct Entry {
    pub descriptor: Descriptor,
    pub command: Arc<AdaptedCommand>,
}

/// Registered commands in registration order
#[derive(Default)]
pub struct Registry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command locally and as a tool with `engine`
    pub fn register<E: JobEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        descriptor: Descriptor,
        implementation: Implementation,
    ) -> Result<Arc<AdaptedCommand>, RegistryError> {
        self.check_name(&descriptor.name)?;

        let command = Arc::new(AdaptedCommand::adapt(implementation));
        engine.register_tool(tool_definition(&descriptor, &command))?;

        let entry = Entry {
            descriptor,
            command: command.clone(),
        };
        match self.index.get(&entry.descriptor.name) {
            Some(&pos) => {
                tracing::warn!(command = %entry.descriptor.name, "command registered twice, replacing");
                self.entries[pos] = entry;
            }
            None => {
                tracing::debug!(command = %entry.descriptor.name, "registered command");
                self.index.insert(entry.descriptor.name.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
        Ok(command)
    }

    /// Descriptor registered under `name`
    pub fn lookup(&self, name: &str) -> Option<&Descriptor> {
        self.entry(name).map(|e| &e.descriptor)
    }

    pub fn command(&self, name: &str) -> Option<Arc<AdaptedCommand>> {
        self.entry(name).map(|e| e.command.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Command catalog appended to the driver's help
    pub fn listing(&self) -> String {
        let mut listing = String::from("The following sub-commands are available:\n");
        for entry in &self.entries {
            let title = entry.descriptor.title.as_deref().unwrap_or("");
            listing.push_str(&format!("    {:>30}  {}\n", entry.descriptor.name, title));
        }
        listing
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.index.get(name).map(|&pos| &self.entries[pos])
    }

    fn check_name(&self, name: &str) -> Result<(), RegistryError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(RegistryError::InvalidName(name.to_string()));
        }

        let id = crate::command::tool_id(name);
        if let Some(existing) = self
            .entries
            .iter()
            .find(|e| e.descriptor.name != name && e.descriptor.tool_id() == id)
        {
            return Err(RegistryError::NameCollision {
                name: name.to_string(),
                existing: existing.descriptor.name.clone(),
                tool_id: id,
            });
        }
        Ok(())
    }
}

/// Translate a descriptor and its adapted command into an engine tool
fn tool_definition(descriptor: &Descriptor, command: &Arc<AdaptedCommand>) -> ToolDefinition {
    let validate: ValidateHook = {
        let command = command.clone();
        Arc::new(move |options: &mut Options| command.validate_options(options))
    };

    let help: HelpHook = {
        let description = descriptor.description.clone().unwrap_or_default();
        Arc::new(move |tool: &Tool| format!("{}\n{}", description, tool.option_help()))
    };

    let argparse: Option<ArgparseHook> = if command.has_custom_arguments() {
        let command = command.clone();
        Some(Arc::new(move |parser: clap::Command| command.register(parser)) as ArgparseHook)
    } else {
        None
    };

    ToolDefinition {
        id: descriptor.tool_id(),
        name: descriptor.name.clone(),
        inputs: descriptor.inputs.clone(),
        outputs: descriptor.outputs.clone(),
        add_outputs: descriptor.add_outputs.clone(),
        pipeline: descriptor.pipeline,
        validate,
        help,
        argparse,
        entrypoint: command.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Args, OptionDecl};
    use crate::engine::LocalEngine;
    use crate::error::CommandError;

    fn first(_args: &Args) -> Result<(), CommandError> {
        Err(CommandError::message("first"))
    }

    fn second(_args: &Args) -> Result<(), CommandError> {
        Err(CommandError::message("second"))
    }

    #[test]
    fn test_register_forwards_to_engine() {
        let mut engine = LocalEngine::new();
        let mut registry = Registry::new();
        let descriptor = Descriptor::new("gem-mapper")
            .title("Map reads")
            .inputs(vec![OptionDecl::new("index").required()])
            .pipeline(false);

        registry
            .register(&mut engine, descriptor.clone(), Implementation::function(first, ""))
            .unwrap();

        let definition = engine.definition("gemtools_gem_mapper").unwrap();
        assert_eq!(definition.name, "gem-mapper");
        assert_eq!(definition.inputs, descriptor.inputs);
        assert_eq!(definition.pipeline, Some(false));
        assert!(definition.argparse.is_none());
        assert_eq!(registry.lookup("gem-mapper"), Some(&descriptor));
    }

    #[test]
    fn test_last_registration_wins() {
        let mut engine = LocalEngine::new();
        let mut registry = Registry::new();
        registry
            .register(&mut engine, Descriptor::new("a"), Implementation::function(first, ""))
            .unwrap();
        registry
            .register(&mut engine, Descriptor::new("b"), Implementation::function(first, ""))
            .unwrap();
        registry
            .register(
                &mut engine,
                Descriptor::new("a").title("again"),
                Implementation::function(second, ""),
            )
            .unwrap();

        assert_eq!(registry.len(), 2);
        let names: Vec<&str> = registry.iter().map(|e| e.descriptor.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        let err = registry.command("a").unwrap().run(&Args::new()).unwrap_err();
        assert_eq!(err.to_string(), "second");
    }

    #[test]
    fn test_rejects_invalid_names() {
        let mut engine = LocalEngine::new();
        let mut registry = Registry::new();
        for name in ["", "has space", "dots.too"] {
            let err = registry
                .register(&mut engine, Descriptor::new(name), Implementation::function(first, ""))
                .unwrap_err();
            assert!(matches!(err, RegistryError::InvalidName(_)));
        }
        assert!(engine.is_empty());
    }

    #[test]
    fn test_rejects_namespace_collision() {
        let mut engine = LocalEngine::new();
        let mut registry = Registry::new();
        registry
            .register(&mut engine, Descriptor::new("split-reads"), Implementation::function(first, ""))
            .unwrap();
        let err = registry
            .register(&mut engine, Descriptor::new("split_reads"), Implementation::function(first, ""))
            .unwrap_err();
        assert!(matches!(err, RegistryError::NameCollision { ref existing, .. } if existing == "split-reads"));
    }

    #[test]
    fn test_listing_in_registration_order() {
        let mut engine = LocalEngine::new();
        let mut registry = Registry::new();
        registry
            .register(&mut engine, Descriptor::new("zeta").title("Last letter"), Implementation::function(first, ""))
            .unwrap();
        registry
            .register(&mut engine, Descriptor::new("alpha"), Implementation::function(first, ""))
            .unwrap();

        let listing = registry.listing();
        let zeta = listing.find("zeta").unwrap();
        let alpha = listing.find("alpha").unwrap();
        assert!(zeta < alpha);
        assert!(listing.contains("zeta  Last letter"));
    }

    #[test]
    fn test_help_combines_description_and_option_help() {
        let mut engine = LocalEngine::new();
        let mut registry = Registry::new();
        registry
            .register(
                &mut engine,
                Descriptor::new("count")
                    .description("Count records")
                    .inputs(vec![OptionDecl::new("input")]),
                Implementation::function(first, "Function docs"),
            )
            .unwrap();

        let tool = engine.find_tool("gemtools_count").unwrap();
        let help = tool.help();
        assert!(help.starts_with("Count records\n"));
        assert!(help.contains("Function docs"));
        assert!(help.contains("--input"));
    }
}
