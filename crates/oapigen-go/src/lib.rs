pub mod emitters;
pub mod generator;
pub mod go_types;
pub mod names;

pub use generator::{GoClientGenerator, GoConfig, GoError};
pub use go_types::GENERATED_HEADER;
