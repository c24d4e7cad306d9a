//! Error types for a dormant run.

use dormant_common::UserRecord;

use crate::config::ConfigError;
use crate::directory::DirectoryError;
use crate::run::RunSummary;

/// Fatal conditions that end a run.
///
/// "Nothing to do" is not an error: it is a successful [`RunSummary`] with
/// no eligible users.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("The query for users returned nothing")]
    EmptyFetch,

    #[error("Failed to fetch users: {0}")]
    Fetch(#[source] DirectoryError),

    #[error("User {username} (id {id}) has an unparseable {field}: '{value}'")]
    InvalidDate {
        id: String,
        username: String,
        field: &'static str,
        value: String,
    },

    /// A disable attempt failed under the halt policy. The summary holds
    /// everything processed up to and including the failing user.
    #[error(
        "Could not disable user {} <{}> (id {}): {detail}",
        .user.username,
        .user.email,
        .user.id
    )]
    UpdateHalted {
        user: Box<UserRecord>,
        detail: String,
        summary: Box<RunSummary>,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

pub type Result<T> = std::result::Result<T, Error>;
