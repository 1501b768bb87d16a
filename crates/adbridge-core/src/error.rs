//! Error types for Adbridge

use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Validation Errors
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("A username must be passed in to create a user.")]
    MissingUserName,

    #[error("No password provided.")]
    MissingPassword,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // User Errors
    #[error("User does not exist.")]
    UserNotFound(String),

    #[error("User already exists: {0}")]
    AlreadyExists(String),

    #[error("Error creating user: {0}")]
    CreationFailed(String),

    // Directory Errors
    #[error("Failed to reach directory: {0}")]
    Connection(String),

    #[error("Directory operation failed with code {rc}: {message}")]
    Ldap { rc: u32, message: String },

    #[error("No such object: {0}")]
    NoSuchObject(String),

    #[error("Entry already exists: {0}")]
    EntryAlreadyExists(String),

    #[error("Invalid credentials: {detail}")]
    InvalidCredentials { detail: String },

    #[error("Account disabled or locked: {detail}")]
    AccountDisabled { detail: String },

    // Configuration Errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidEmail(_) => "InvalidEmail",
            Error::MissingUserName => "MissingUserName",
            Error::MissingPassword => "MissingPassword",
            Error::InvalidArgument(_) => "InvalidArgument",
            Error::UserNotFound(_) => "UserNotFound",
            Error::AlreadyExists(_) => "UserAlreadyExists",
            Error::CreationFailed(_) => "UserCreationError",
            Error::Connection(_) => "DirectoryUnavailable",
            Error::Ldap { .. } => "DirectoryError",
            Error::NoSuchObject(_) => "NoSuchObject",
            Error::EntryAlreadyExists(_) => "EntryAlreadyExists",
            Error::InvalidCredentials { .. } => "InvalidCredentialsError",
            Error::AccountDisabled { .. } => "AccountDisabledError",
            Error::Config(_) => "ConfigurationError",
            Error::Io(_) => "InternalError",
            Error::Other(_) => "InternalError",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Error::InvalidEmail(_)
            | Error::MissingUserName
            | Error::MissingPassword
            | Error::InvalidArgument(_)
            | Error::AlreadyExists(_) => 400,

            Error::InvalidCredentials { .. } | Error::AccountDisabled { .. } => 401,

            Error::UserNotFound(_) | Error::NoSuchObject(_) => 404,

            Error::EntryAlreadyExists(_) => 409,

            Error::CreationFailed(_) | Error::Connection(_) => 503,

            _ => 500,
        }
    }

    /// True when the directory rejected a bind rather than failing to serve it.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            Error::InvalidCredentials { .. } | Error::AccountDisabled { .. }
        )
    }

    /// Server diagnostic attached to an authentication rejection.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Error::InvalidCredentials { detail } | Error::AccountDisabled { detail } => {
                Some(detail)
            }
            _ => None,
        }
    }
}

/// Structured error returned to callers
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: bool,
    pub code: String,
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

impl From<&Error> for ErrorBody {
    fn from(err: &Error) -> Self {
        let resource = match err {
            Error::UserNotFound(name) | Error::AlreadyExists(name) => Some(name.clone()),
            Error::NoSuchObject(dn) | Error::EntryAlreadyExists(dn) => Some(dn.clone()),
            _ => None,
        };

        ErrorBody {
            error: true,
            code: err.code().to_string(),
            status: err.http_status(),
            message: err.to_string(),
            resource,
        }
    }
}

impl From<Error> for ErrorBody {
    fn from(err: Error) -> Self {
        ErrorBody::from(&err)
    }
}

impl ErrorBody {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"error":true,"code":"{}","status":{}}}"#,
                self.code, self.status
            )
        })
    }
}
