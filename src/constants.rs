//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Settings file location
pub mod config {
    /// Directory under the platform config dir
    pub const APP_DIR: &str = "campaign-ledger";

    /// Settings file name
    pub const FILENAME: &str = "settings.json";
}

/// Campaign data file constants
pub mod data {
    /// Default data file, resolved against the working directory
    pub const DEFAULT_FILE_NAME: &str = "ttrpg_campaign_data.json";

    /// Schema version written by this build
    pub const SCHEMA_VERSION: u32 = 1;

    /// Version assumed for documents that predate the version field
    pub const LEGACY_SCHEMA_VERSION: u32 = 0;

    /// Indentation used for the pretty-printed document
    pub const INDENT: &[u8] = b"    ";

    /// Timestamp appended to copies of unusable data files
    pub const BACKUP_STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";
}

/// Identifier prefixes (kept byte-compatible with existing data files)
pub mod id_prefix {
    pub const GAME_EXPECTATIONS: &str = "ge";
    pub const TRAVEL_PLAN: &str = "tp";
    pub const TRAVEL_STAGE: &str = "ts";
    pub const NPC: &str = "npc";
    pub const SETTLEMENT: &str = "set";
    pub const JOURNAL: &str = "cj";
    pub const DM_CHARACTER: &str = "dmc";
    pub const CONFLICT: &str = "conf";
    pub const BASTION_FACILITY: &str = "bf";
    pub const BASTION: &str = "bas";

    /// Number of hex characters following the prefix
    pub const TOKEN_LEN: usize = 8;
}

/// Form validation limits
pub mod validation {
    /// Journal session numbers
    pub const MIN_SESSION_NUMBER: u32 = 1;
    pub const MAX_SESSION_NUMBER: u32 = 999;

    /// Player character level range
    pub const MIN_CHARACTER_LEVEL: u32 = 1;
    pub const MAX_CHARACTER_LEVEL: u32 = 20;

    /// Bastion level range (0 = not yet established)
    pub const MAX_BASTION_LEVEL: u32 = 20;

    /// Upper bound for a travel stage's time value
    pub const MAX_TRAVEL_TIME: u32 = 9999;

    /// ISO date format for journal session dates
    pub const SESSION_DATE_FORMAT: &str = "%Y-%m-%d";
}
