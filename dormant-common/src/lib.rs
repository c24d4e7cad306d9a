//! Dormant Common Types
//!
//! Shared types used by the directory clients, the selection pipeline and the
//! reporting layer.

pub mod mode;
pub mod outcome;
pub mod user;

pub use mode::{DisableMode, FailurePolicy, ParseModeError};
pub use outcome::{Outcome, OutcomeLog, OutcomeStatus};
pub use user::{RawUser, SubscriptionPermission, UserRecord};
