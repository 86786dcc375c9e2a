//! Core types shared across the update engine.

pub mod error;

pub use error::UpkeepError;
