//! Configuration management for campaign-ledger
//!
//! - **settings**: user settings file (data file location, log level)

pub mod settings;

pub use settings::Settings;
