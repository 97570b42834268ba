pub mod calculations;
pub mod models;
pub mod reference;
pub mod registry;

pub use models::*;
pub use registry::FiscalRegistry;
