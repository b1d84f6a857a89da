// ABOUTME: Library root for lamdeploy - exposes the pipeline and its capabilities for testing.
// ABOUTME: The main binary is in main.rs.

pub mod cloud;
pub mod commands;
pub mod config;
pub mod confirm;
pub mod deploy;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod output;
pub mod types;
