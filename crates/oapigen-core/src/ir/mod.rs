pub mod models;
pub mod services;
pub mod types;

pub use models::*;
pub use services::*;
pub use types::{Identifier, IrInfo, IrServer, IrSpec};
