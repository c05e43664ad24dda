use std::path::PathBuf;
use thiserror::Error;

use crate::value::Kind;

/// A raw value could not be converted to a setting's declared kind.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoerceError {
    #[error("cannot parse {text:?} as an integer")]
    Int { text: String },

    #[error("cannot parse {text:?} as a duration: {reason}")]
    Duration { text: String, reason: &'static str },

    #[error("element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<CoerceError>,
    },

    #[error("no coercion path from {from} to {to}")]
    NoPath { from: &'static str, to: Kind },
}

/// Top-level error type for the confstack library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error(transparent)]
    Coerce(#[from] CoerceError),

    #[error("invalid default value for '{name}': {source}")]
    InvalidDefault {
        name: String,
        #[source]
        source: CoerceError,
    },

    #[error("duplicate name '{name}' in group '{group}'")]
    DuplicateName { group: String, name: String },

    #[error("no setting named '{0}'")]
    NotFound(String),

    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid command line: {0}")]
    Flag(#[from] clap::Error),
}
