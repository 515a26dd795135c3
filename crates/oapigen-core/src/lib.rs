//! Document loading and the language-neutral IR that generators render.

pub mod config;
pub mod error;
pub mod ir;
pub mod parse;
pub mod transform;

/// One rendered source file, with its path relative to the output directory.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// Renders an [`ir::IrSpec`] into the source files of one target language.
pub trait CodeGenerator {
    /// Target-specific settings such as the package name.
    type Config;
    type Error: std::error::Error;

    /// Every file of the client, in a stable order.
    fn generate(
        &self,
        ir: &ir::IrSpec,
        config: &Self::Config,
    ) -> Result<Vec<GeneratedFile>, Self::Error>;
}
