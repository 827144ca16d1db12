//! Configuration module for labelbook
//!
//! Path resolution and user settings persistence.

pub mod paths;
pub mod settings;

pub use paths::LabelbookPaths;
pub use settings::Settings;
