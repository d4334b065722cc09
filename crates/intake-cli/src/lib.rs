//! CLI library components for the import wizard driver.

pub mod config;
pub mod logging;
pub mod replay;
pub mod script;
