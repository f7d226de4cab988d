//! Configuration module for the music library
//!
//! This module contains the service configuration and path management.

mod paths;
mod service_config;

pub use paths::Paths;
pub use service_config::ServiceConfig;
