use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::parse::Dialect;

/// Top-level project configuration loaded from `.oapigen.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OapigenConfig {
    pub input: String,
    pub output: String,
    /// Go package name; derived from the API title when unset.
    pub package: Option<String>,
    /// Skip dialect sniffing.
    pub dialect: Option<Dialect>,
    /// Remove previously generated files from `output` before writing.
    pub clean: bool,
    /// Run `gofmt -w` on the output directory.
    pub gofmt: bool,
    pub tags: TagsConfig,
}

impl Default for OapigenConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: "client".to_string(),
            package: None,
            dialect: None,
            clean: false,
            gofmt: true,
            tags: TagsConfig::default(),
        }
    }
}

/// How tagged operations are grouped into services.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TagsConfig {
    pub attachment: TagAttachment,
}

/// Where an operation with a single tag is attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagAttachment {
    /// Every service declared at document level.
    #[default]
    AllServices,
    /// The service whose tag matches; undeclared tags go to the default service.
    ByName,
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".oapigen.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<OapigenConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# oapigen configuration
input: openapi.yaml
output: client
# package: petstore     # Go package name (defaults to the API title)
# dialect: openapi      # openapi | swagger (sniffed from the document when unset)
clean: false            # delete previously generated .go files before writing
gofmt: true             # run gofmt -w on the output when available

tags:
  attachment: all_services  # all_services | by_name
"#
}
