pub mod mock_rally;

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use dormant_common::RawUser;

use crate::directory::{DirectoryError, DisableConfirmation, UserDirectory};

/// Build a raw user with test defaults: enabled, "Workspace User" permission,
/// username and email derived from the id.
pub fn raw_user(id: &str, created_at: &str, last_login_at: Option<&str>) -> RawUser {
    RawUser {
        id: id.to_string(),
        username: format!("user{}@example.com", id),
        email: format!("user{}@example.com", id),
        created_at: created_at.to_string(),
        last_login_at: last_login_at.map(String::from),
        subscription_permission: "Workspace User".to_string(),
        disabled: false,
    }
}

enum ScriptedFailure {
    Error(String),
    Unconfirmed,
}

/// In-memory [`UserDirectory`] that records every disable call.
///
/// Disables succeed unless scripted otherwise with [`MemoryDirectory::failing`]
/// or [`MemoryDirectory::unconfirmed`].
pub struct MemoryDirectory {
    users: Vec<RawUser>,
    fetch_error: Option<String>,
    failures: HashMap<String, ScriptedFailure>,
    disable_calls: Mutex<Vec<String>>,
}

impl MemoryDirectory {
    pub fn new(users: Vec<RawUser>) -> Self {
        Self {
            users,
            fetch_error: None,
            failures: HashMap::new(),
            disable_calls: Mutex::new(Vec::new()),
        }
    }

    /// Make `fetch_users` fail with a communication error.
    pub fn fetch_error(mut self, message: &str) -> Self {
        self.fetch_error = Some(message.to_string());
        self
    }

    /// Make disabling `user_id` fail with a rejected update.
    pub fn failing(mut self, user_id: &str, message: &str) -> Self {
        self.failures
            .insert(user_id.to_string(), ScriptedFailure::Error(message.to_string()));
        self
    }

    /// Make disabling `user_id` answer `Disabled = false`.
    pub fn unconfirmed(mut self, user_id: &str) -> Self {
        self.failures
            .insert(user_id.to_string(), ScriptedFailure::Unconfirmed);
        self
    }

    /// Ids passed to `disable_user`, in call order.
    pub fn disable_calls(&self) -> Vec<String> {
        self.disable_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    fn directory_type(&self) -> &'static str {
        "memory"
    }

    async fn fetch_users(&self) -> Result<Vec<RawUser>, DirectoryError> {
        match &self.fetch_error {
            Some(message) => Err(DirectoryError::Communication(message.clone())),
            None => Ok(self.users.clone()),
        }
    }

    async fn disable_user(&self, user_id: &str) -> Result<DisableConfirmation, DirectoryError> {
        if let Ok(mut calls) = self.disable_calls.lock() {
            calls.push(user_id.to_string());
        }

        match self.failures.get(user_id) {
            Some(ScriptedFailure::Error(message)) => Err(DirectoryError::Rejected(message.clone())),
            Some(ScriptedFailure::Unconfirmed) => Ok(DisableConfirmation { disabled: false }),
            None => Ok(DisableConfirmation { disabled: true }),
        }
    }
}
