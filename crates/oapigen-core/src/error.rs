use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors raised while turning raw bytes into a canonical document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot detect schema dialect, pass an explicit dialect (openapi or swagger)")]
    UnknownDialect,

    #[error("unknown dialect name: {0}")]
    UnknownDialectName(String),

    #[error("unsupported {dialect} version: {version}")]
    UnsupportedVersion { dialect: String, version: String },

    #[error("failed to upgrade legacy document at {location}: {reason}")]
    Upgrade { location: String, reason: String },
}

/// Fatal errors raised by the loader before any extraction happens.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("{} is a directory, not a schema file", .0.display())]
    IsDirectory(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
}

/// Why an element was left out of the IR.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagnosticKind {
    #[error("no target type for `{0}`")]
    UnmappedType(String),

    #[error("unresolved reference `{0}`")]
    UnresolvedRef(String),

    #[error("method `{0}` already generated, operation skipped")]
    DuplicateMethod(String),

    #[error("field `{0}` already generated, property skipped")]
    DuplicateProperty(String),

    #[error("parameter `{0}` already generated, parameter skipped")]
    DuplicateParameter(String),

    #[error("`{0}` has no identifier characters, skipped")]
    EmptyIdentifier(String),

    #[error("model `{0}` already generated, schema skipped")]
    DuplicateModel(String),

    #[error("service `{0}` declared more than once, tags merged")]
    DuplicateService(String),

    #[error("operation declares {0} tags, only zero or one are supported")]
    MultipleTags(usize),

    #[error("tag `{0}` is not declared at document level, attached to the default service")]
    UndeclaredTag(String),

    #[error("placeholder `{{{0}}}` has no matching path parameter, left as-is")]
    UnmatchedPlaceholder(String),

    #[error("path parameter `{0}` does not appear in the path template")]
    UnusedPathParameter(String),
}

/// A soft failure recorded during extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Where in the document the problem was found, e.g. `GET /pets/{id}` or `schemas.Pet.tags`.
    pub location: String,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.kind)
    }
}
