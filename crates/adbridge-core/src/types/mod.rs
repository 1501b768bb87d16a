//! Core types for Adbridge

mod attribute;
mod request;
mod user;

pub use attribute::*;
pub use request::*;
pub use user::*;
