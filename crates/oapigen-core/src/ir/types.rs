use std::fmt;

use super::models::IrModel;
use super::services::IrService;
use crate::error::Diagnostic;

/// The extracted, emitter-ready view of a document.
#[derive(Debug, Clone)]
pub struct IrSpec {
    pub info: IrInfo,
    pub servers: Vec<IrServer>,
    /// Sorted by normalized name.
    pub services: Vec<IrService>,
    /// Sorted by raw schema name.
    pub models: Vec<IrModel>,
    /// Soft failures recorded while extracting; the entries above stay consistent.
    pub diagnostics: Vec<Diagnostic>,
}

impl IrSpec {
    /// Total number of methods across all services.
    pub fn method_count(&self) -> usize {
        self.services.iter().map(|s| s.methods.len()).sum()
    }
}

/// API metadata.
#[derive(Debug, Clone, Default)]
pub struct IrInfo {
    pub title: String,
    pub description: Option<String>,
    pub version: String,
}

/// A server URL.
#[derive(Debug, Clone)]
pub struct IrServer {
    pub url: String,
    pub description: Option<String>,
}

/// A name that is a valid, idiomatically cased Go identifier.
///
/// Only the normalizer creates these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    pub(crate) fn new(value: String) -> Self {
        Identifier(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
