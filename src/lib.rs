//! cloudpack library
//!
//! Client for a remote mobile app build service: submits Android and iOS
//! package builds with their signing material, lists build history and
//! downloads finished artifacts.

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
