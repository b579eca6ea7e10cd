//! Configuration management for the console engine
//!
//! This module contains the configuration system components:
//! - `types`: Enums used by the configuration
//! - `loader`: Configuration file loading, defaults and validation

pub mod loader;
pub mod types;


// Re-export commonly used types for convenience
pub use loader::ConsoleConfig;
pub use types::ColorMode;
