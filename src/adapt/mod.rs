//! Source adapters.
//!
//! Each adapter walks the registry, finds the raw values its source has to
//! offer, and submits them tagged with the source's fixed priority. A
//! coercion failure is recorded against its path and the remaining nodes
//! are still processed; a name the source has nothing to say about is a
//! silent skip.

pub mod conf;
pub mod env;
pub mod flag;
pub mod manual;

use thiserror::Error;

use crate::error::CoerceError;

/// A coercion failure recorded while applying one source.
#[derive(Debug, Error)]
#[error("{path}: {source}")]
pub struct ApplyError {
    pub path: String,
    #[source]
    pub source: CoerceError,
}

/// Bookkeeping for one adapter pass over the registry.
///
/// `skipped` counts arbitration rejections and unmatched names; both are
/// normal outcomes, not failures.
#[derive(Debug, Default)]
pub struct Outcome {
    pub applied: usize,
    pub skipped: usize,
    pub errors: Vec<ApplyError>,
}

impl Outcome {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn merge(&mut self, other: Outcome) {
        self.applied += other.applied;
        self.skipped += other.skipped;
        self.errors.extend(other.errors);
    }

    pub(crate) fn record(&mut self, path: &str, result: Result<bool, CoerceError>) {
        match result {
            Ok(true) => {
                tracing::debug!(path, "value applied");
                self.applied += 1;
            }
            Ok(false) => {
                tracing::trace!(path, "value skipped");
                self.skipped += 1;
            }
            Err(source) => {
                tracing::warn!(path, error = %source, "cannot apply value");
                self.errors.push(ApplyError {
                    path: path.to_string(),
                    source,
                });
            }
        }
    }
}
