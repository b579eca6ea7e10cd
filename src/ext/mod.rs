//! Extension traits and helpers for built-in Rust types.
//!
//! Each extension trait lives in a file named after the type it extends:
//! - `path.rs` - Extensions for `std::path::Path` plus the path expansion used
//!   by the file picker
pub mod path;

pub use path::{expand_env, expand_path, generate_suggestions, PathExt};
