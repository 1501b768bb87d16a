//! Adbridge Core Library
//!
//! Core types, configuration and error handling shared by the directory
//! facade and the command-line tool.

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use config::AdbridgeConfig;
pub use error::{Error, Result};

/// Adbridge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Container used when no location is given for a new user
pub const DEFAULT_LOCATION: &str = "CN=Users,";

/// `userAccountControl` for an enabled normal account (0x200)
pub const UAC_ENABLED: u32 = 512;

/// `userAccountControl` for a disabled normal account (0x202)
pub const UAC_DISABLED: u32 = 514;

/// `userAccountControl` for an enabled account whose password never expires (0x10200)
pub const UAC_PASSWORD_NEVER_EXPIRES: u32 = 66048;
