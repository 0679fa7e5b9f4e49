#![forbid(unsafe_code)]

use catadmin_core::{CategoryId, DraftError, HierarchyError, IdError, ProductId};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport: {0}")]
    Io(String),
    #[error("failed to read response body: {0}")]
    Body(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{method} {path} failed with status {status}: {message}")]
    Api {
        method: &'static str,
        path: String,
        status: u16,
        message: String,
    },
    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("not logged in; run `catadmin login` first")]
    NotLoggedIn,
    #[error("Session expired. Please login again.")]
    SessionExpired,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Your account has been locked. Please contact support.")]
    AccountLocked,
    #[error("Email already exists")]
    EmailTaken,
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error(transparent)]
    Id(#[from] IdError),
    #[error("unknown category {0}")]
    UnknownCategory(CategoryId),
    #[error("unknown product {0}")]
    UnknownProduct(ProductId),
    #[error("token store {}: {source}", .path.display())]
    TokenStore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("token store {} is unreadable: {source}", .path.display())]
    TokenStoreCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ConsoleError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "TRANSPORT",
            Self::Api { .. } => "API_ERROR",
            Self::Decode { .. } => "DECODE",
            Self::NotLoggedIn => "NOT_LOGGED_IN",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountLocked => "ACCOUNT_LOCKED",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Hierarchy(err) => err.code(),
            Self::Draft(err) => err.code(),
            Self::Id(err) => err.code(),
            Self::UnknownCategory(_) => "UNKNOWN_CATEGORY",
            Self::UnknownProduct(_) => "UNKNOWN_PRODUCT",
            Self::TokenStore { .. } => "TOKEN_STORE",
            Self::TokenStoreCorrupt { .. } => "TOKEN_STORE_CORRUPT",
            Self::Config(_) => "CONFIG",
        }
    }

    /// Rejected locally before anything was sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_)
                | Self::Hierarchy(_)
                | Self::Draft(_)
                | Self::Id(_)
                | Self::UnknownCategory(_)
                | Self::UnknownProduct(_)
        )
    }
}
