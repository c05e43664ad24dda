//! Programmatic overrides.
//!
//! Unlike the bulk adapters, a manual set names one specific setting, so a
//! path that resolves to nothing (or to a group) is an error rather than a
//! silent skip.

use crate::error::ConfigError;
use crate::registry::Registry;
use crate::value::Value;
use crate::Priority;

/// Sets the named setting at [`Priority::Explicit`], overriding every
/// other source.
pub fn set(
    registry: &mut Registry,
    path: &str,
    value: impl Into<Value>,
) -> Result<(), ConfigError> {
    match registry.submit(path, value.into(), Priority::Explicit)? {
        true => Ok(()),
        false => Err(ConfigError::NotFound(path.to_string())),
    }
}
