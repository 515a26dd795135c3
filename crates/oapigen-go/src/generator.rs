use std::collections::HashSet;

use oapigen_core::ir::IrSpec;
use oapigen_core::{CodeGenerator, GeneratedFile};

use crate::emitters;
use crate::go_types;
use crate::names::TypeNames;

/// Options for one generated Go package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoConfig {
    pub package: String,
}

impl GoConfig {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
        }
    }

    /// Use `package` when given, otherwise derive one from the API title.
    pub fn for_spec(ir: &IrSpec, package: Option<&str>) -> Self {
        match package {
            Some(package) => Self::new(package),
            None => Self::new(go_types::default_package(&ir.info.title)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GoError {
    #[error("`{0}` is not a valid Go package name (lower-case letters, digits and `_`, not a keyword)")]
    InvalidPackage(String),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Go HTTP client generator.
pub struct GoClientGenerator;

impl CodeGenerator for GoClientGenerator {
    type Config = GoConfig;
    type Error = GoError;

    fn generate(&self, ir: &IrSpec, config: &GoConfig) -> Result<Vec<GeneratedFile>, GoError> {
        let package = config.package.as_str();
        if !go_types::is_valid_package(package) {
            return Err(GoError::InvalidPackage(package.to_string()));
        }

        let env = emitters::environment()?;
        let types = TypeNames::new(ir);
        let mut paths = FilePaths::default();

        let mut files = vec![
            GeneratedFile {
                path: paths.claim("doc"),
                content: emitters::doc::emit_doc(&env, ir, package)?,
            },
            GeneratedFile {
                path: paths.claim("client"),
                content: emitters::client::emit_client(&env, ir, package)?,
            },
            GeneratedFile {
                path: paths.claim("utils"),
                content: emitters::utils::emit_utils(&env, package)?,
            },
        ];

        for service in &ir.services {
            let stem = format!("api_{}", go_types::file_stem(service.name.as_str()));
            files.push(GeneratedFile {
                path: paths.claim(&stem),
                content: emitters::api::emit_api(&env, service, &types, package)?,
            });
        }

        for model in &ir.models {
            let stem = format!("model_{}", go_types::file_stem(types.model(model.name.as_str())));
            files.push(GeneratedFile {
                path: paths.claim(&stem),
                content: emitters::models::emit_model(&env, model, &types, package)?,
            });
        }

        log::debug!(
            "package {package}: {} files for {} services and {} models",
            files.len(),
            ir.services.len(),
            ir.models.len()
        );
        Ok(files)
    }
}

/// Hands out `.go` file names, numbering stems that snake-case to the same thing.
#[derive(Default)]
struct FilePaths {
    seen: HashSet<String>,
}

impl FilePaths {
    fn claim(&mut self, stem: &str) -> String {
        let mut path = format!("{stem}.go");
        let mut n = 2;
        while !self.seen.insert(path.clone()) {
            path = format!("{stem}_{n}.go");
            n += 1;
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_paths_are_unique() {
        let mut paths = FilePaths::default();
        assert_eq!(paths.claim("model_api_key"), "model_api_key.go");
        assert_eq!(paths.claim("model_api_key"), "model_api_key_2.go");
        assert_eq!(paths.claim("model_api_key"), "model_api_key_3.go");
    }

    #[test]
    fn test_config_for_spec() {
        let mut ir = crate::emitters::fixtures::ir(crate::emitters::fixtures::PETSTORE);
        assert_eq!(GoConfig::for_spec(&ir, None).package, "swaggerpetstore");
        assert_eq!(GoConfig::for_spec(&ir, Some("pets")).package, "pets");
        ir.info.title = "9 Lives".to_string();
        assert_eq!(GoConfig::for_spec(&ir, None).package, "client");
    }
}
