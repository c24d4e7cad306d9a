//! User directory abstraction.
//!
//! This module defines the `UserDirectory` trait the run pipeline reads users
//! from and sends disable requests to. Rally WSAPI is the production backend.

mod rally;

pub use rally::{mask_secret, normalize_base_url, RallyDirectory};

use async_trait::async_trait;
use dormant_common::RawUser;

/// Field values the directory accepted for a disable request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisableConfirmation {
    /// The `Disabled` value echoed back; anything but `true` is a failed update
    pub disabled: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Directory communication error: {0}")]
    Communication(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Directory API error: {0}")]
    Api(String),

    #[error("Update rejected: {0}")]
    Rejected(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid directory configuration: {0}")]
    Configuration(String),
}

/// Read-then-disable access to the accounts of a subscription.
///
/// Calls are made one at a time; implementations need not support
/// concurrent use beyond `Send + Sync`.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Short name for log lines (e.g., "rally").
    fn directory_type(&self) -> &'static str;

    /// Fetch every account in the subscription.
    async fn fetch_users(&self) -> Result<Vec<RawUser>, DirectoryError>;

    /// Request `Disabled = true` for one account and return what the
    /// directory accepted.
    async fn disable_user(&self, user_id: &str) -> Result<DisableConfirmation, DirectoryError>;
}
