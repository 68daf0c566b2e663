//! Configuration management
//!
//! Player settings are read once at startup from a JSON file; command-line
//! flags may override individual fields afterwards.

pub mod settings;

pub use settings::PlayerConfig;
