pub mod extractor;
pub mod name_normalizer;
pub mod type_mapper;

use crate::ir::IrSpec;
use crate::parse::spec::OpenApiSpec;

pub use extractor::{ExtractOptions, Extractor};

/// Extract the IR with default options.
pub fn transform(spec: &OpenApiSpec) -> IrSpec {
    transform_with_options(spec, &ExtractOptions::default())
}

/// Extract the IR with explicit grouping options.
pub fn transform_with_options(spec: &OpenApiSpec, options: &ExtractOptions) -> IrSpec {
    Extractor::with_options(spec, *options).into_ir()
}
