//! Explicit schema description for deriving setting groups.
//!
//! Instead of scanning an annotated structure at runtime, a caller lists
//! its fields: name, kind, textual default, usage line, and an optional
//! environment variable hint. One generic build step coerces the defaults
//! and produces a [`Group`] ready to register.

use crate::error::ConfigError;
use crate::node::{Group, Setting};
use crate::registry::Registry;
use crate::value::{Kind, Value};

/// One declared configuration field.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    kind: Kind,
    default: Option<String>,
    usage: Option<String>,
    env: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            usage: None,
            env: None,
        }
    }

    /// The default value, in the coercion engine's textual grammar.
    pub fn with_default(mut self, text: impl Into<String>) -> Self {
        self.default = Some(text.into());
        self
    }

    pub fn with_usage(mut self, text: impl Into<String>) -> Self {
        self.usage = Some(text.into());
        self
    }

    pub fn with_env(mut self, var: impl Into<String>) -> Self {
        self.env = Some(var.into());
        self
    }
}

/// Builder for a named group of settings.
///
/// ## Example
///
/// ```
/// use confstack::{Field, Kind, Registry, Schema};
///
/// let mut reg = Registry::new();
/// Schema::group("server")
///     .field(Field::new("bind", Kind::String)
///         .with_default(":80")
///         .with_usage("Address to bind server to (e.g. :80)"))
///     .field(Field::new("bar", Kind::Int).with_default("42"))
///     .register(&mut reg)?;
/// # Ok::<(), confstack::ConfigError>(())
/// ```
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
}

impl Schema {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Builds the group.
    ///
    /// Fields lacking both a usage string and a default are skipped
    /// entirely; they are not exposed as configuration. A default that
    /// fails to coerce aborts the build, as does a duplicate field name.
    pub fn build(self) -> Result<Group, ConfigError> {
        let mut group = Group::new(self.name);
        for field in self.fields {
            if field.default.is_none() && field.usage.is_none() {
                continue;
            }

            let mut setting = Setting::new(field.name.clone(), field.kind);
            if let Some(text) = field.default {
                setting = setting.with_default(Value::String(text)).map_err(|source| {
                    ConfigError::InvalidDefault {
                        name: field.name,
                        source,
                    }
                })?;
            }
            if let Some(text) = field.usage {
                setting = setting.with_usage(text);
            }
            if let Some(var) = field.env {
                setting = setting.with_env(var);
            }
            group.push(setting)?;
        }
        Ok(group)
    }

    /// Builds the group and registers it as a top-level node.
    pub fn register(self, registry: &mut Registry) -> Result<(), ConfigError> {
        registry.register(self.build()?);
        Ok(())
    }
}
