//! Credential utilities for Adbridge

pub mod hash;
pub mod password;

pub use hash::*;
pub use password::*;
