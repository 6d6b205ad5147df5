//! Pure mapping from GitLab review data onto Azure DevOps payloads. No I/O.

mod discussion;
pub mod markdown;
mod pull_request;

pub use discussion::{translate_discussion, ThreadPlan};
pub use pull_request::translate_pull_request;
