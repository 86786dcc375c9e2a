//! Cross-platform utilities supporting the update engine.
//!
//! - [`fs`] - directory creation, atomic writes, and tree removal
//! - [`paths`] - installation-directory and marker-file resolution
//! - [`platform`] - platform-specific defaults and command discovery

pub mod fs;
pub mod paths;
pub mod platform;
