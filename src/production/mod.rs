//! @acp:module "Built-in Commands"
//! @acp:summary "Registration of the commands shipped with the driver"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Built-in commands
//!
//! Every command the driver ships with is registered here, in the order
//! they appear in `gemtools --help`.

pub mod count;
pub mod filter;
pub mod prepare;
pub mod reads;

use crate::engine::JobEngine;
use crate::error::RegistryError;
use crate::registry::Registry;

/// Register all built-in commands
pub fn register_all<E: JobEngine + ?Sized>(
    registry: &mut Registry,
    engine: &mut E,
) -> Result<(), RegistryError> {
    registry.register(engine, count::descriptor(), count::implementation())?;
    registry.register(engine, filter::descriptor(), filter::implementation())?;
    registry.register(engine, prepare::descriptor(), prepare::implementation())?;
    Ok(())
}
