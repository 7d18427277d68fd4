// Frameworks layer: configuration, terminal presentation and runtime bootstrap.

pub mod cli;
pub mod config;
pub mod runtime;
