//! Command implementations for the ormtour CLI

pub mod config;
pub mod migrate;
pub mod run;

// Re-export main dispatcher functions for flat access from main.rs
pub use config::run_config;
pub use migrate::run_migrate;
pub use run::run_tour;
