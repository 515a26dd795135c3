pub mod dialect;
pub mod legacy;
pub mod operation;
pub mod schema;
pub mod spec;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{LoadError, ParseError};
pub use dialect::{Dialect, Syntax};
use legacy::Swagger;
use spec::OpenApiSpec;

/// Read a document from disk and bring it into canonical form.
///
/// `hint` overrides dialect sniffing.
pub fn load(path: &Path, hint: Option<Dialect>) -> Result<OpenApiSpec, LoadError> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if metadata.is_dir() {
        return Err(LoadError::IsDirectory(path.to_path_buf()));
    }

    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let extension = path.extension().and_then(|ext| ext.to_str());
    let syntax = Syntax::guess(extension, &text);

    log::debug!("loading {} as {:?}", path.display(), syntax);
    parse_document(&text, syntax, hint).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse document text of a known syntax, upgrading legacy documents.
pub fn parse_document(
    text: &str,
    syntax: Syntax,
    hint: Option<Dialect>,
) -> Result<OpenApiSpec, ParseError> {
    let dialect = match hint {
        Some(dialect) => dialect,
        None => Dialect::detect(text).ok_or(ParseError::UnknownDialect)?,
    };
    log::debug!("document dialect: {dialect}");

    match dialect {
        Dialect::OpenApi => {
            let spec: OpenApiSpec = deserialize(text, syntax)?;
            validate_version(&spec)?;
            Ok(spec)
        }
        Dialect::Swagger => {
            let legacy: Swagger = deserialize(text, syntax)?;
            legacy.upgrade()
        }
    }
}

/// Parse an OpenAPI 3.x document from YAML.
pub fn from_yaml(input: &str) -> Result<OpenApiSpec, ParseError> {
    parse_document(input, Syntax::Yaml, Some(Dialect::OpenApi))
}

/// Parse an OpenAPI 3.x document from JSON.
pub fn from_json(input: &str) -> Result<OpenApiSpec, ParseError> {
    parse_document(input, Syntax::Json, Some(Dialect::OpenApi))
}

fn deserialize<T: DeserializeOwned>(text: &str, syntax: Syntax) -> Result<T, ParseError> {
    match syntax {
        Syntax::Json => Ok(serde_json::from_str(text)?),
        Syntax::Yaml => Ok(serde_yaml_ng::from_str(text)?),
    }
}

fn validate_version(spec: &OpenApiSpec) -> Result<(), ParseError> {
    if !spec.openapi.starts_with("3.") {
        return Err(ParseError::UnsupportedVersion {
            dialect: Dialect::OpenApi.to_string(),
            version: spec.openapi.clone(),
        });
    }
    Ok(())
}
