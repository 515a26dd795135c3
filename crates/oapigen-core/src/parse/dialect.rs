use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// The specification format a document is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Swagger 2.0, upgraded to the canonical form on load.
    Swagger,
    /// OpenAPI 3.x, the canonical form.
    #[serde(rename = "openapi")]
    OpenApi,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Swagger => "swagger",
            Dialect::OpenApi => "openapi",
        }
    }

    /// Sniff the dialect from marker tokens.
    ///
    /// Lines are scanned in order and the first one naming a dialect decides;
    /// `swagger` is checked before `openapi` on the same line.
    pub fn detect(text: &str) -> Option<Dialect> {
        text.lines().find_map(|line| {
            if line.contains(Dialect::Swagger.as_str()) {
                Some(Dialect::Swagger)
            } else if line.contains(Dialect::OpenApi.as_str()) {
                Some(Dialect::OpenApi)
            } else {
                None
            }
        })
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "swagger" => Ok(Dialect::Swagger),
            "openapi" => Ok(Dialect::OpenApi),
            _ => Err(ParseError::UnknownDialectName(s.to_string())),
        }
    }
}

/// Serialization syntax of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Json,
    Yaml,
}

impl Syntax {
    /// JSON when the extension says so or the text opens with `{`; YAML otherwise.
    pub fn guess(extension: Option<&str>, text: &str) -> Syntax {
        match extension {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Syntax::Json,
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Syntax::Yaml
            }
            _ if text.trim_start().starts_with('{') => Syntax::Json,
            _ => Syntax::Yaml,
        }
    }
}
