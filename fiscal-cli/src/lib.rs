pub mod app;
pub mod cli;
pub mod commands;
pub mod kpr_loader;
pub mod logging;
pub mod utils;

pub use cli::Cli;
pub use commands::run;
