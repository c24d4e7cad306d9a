//! Selection pipeline.
//!
//! Raw users flow through four single-pass stages:
//! normalize → rank → select → execute.

mod eligibility;
mod executor;
mod normalize;
mod rank;

pub use eligibility::{classify, select, EligibilitySelection, EligibilityStats, Exclusion};
pub use executor::{execute, Execution, ExecutorOptions};
pub use normalize::{normalize, parse_calendar_date};
pub use rank::{rank, LastLogin, RankKey};
