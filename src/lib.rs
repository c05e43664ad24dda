//! Layered configuration with priority arbitration.
//!
//! Settings live in a tree of named nodes. Competing sources (compiled-in
//! defaults, config files, environment variables, command-line flags,
//! programmatic overrides) each submit raw values tagged with a fixed
//! priority; a write is accepted only when it outranks, or ties with,
//! whatever source set the value last. Raw values are coerced to each
//! setting's declared kind on the way in.

pub mod adapt;
mod coerce;
mod error;
mod loader;
mod node;
mod registry;
mod schema;
mod value;

pub use coerce::coerce;
pub use error::{CoerceError, ConfigError};
pub use loader::Loader;
pub use node::{Group, Node, Priority, Setting};
pub use registry::Registry;
pub use schema::{Field, Schema};
pub use value::{Kind, Value};
