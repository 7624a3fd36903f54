//! Task queue layer
//!
//! Trait-based access to the platform's low-level task submission.

pub mod command;
pub mod traits;

pub use command::CommandSubmitter;
pub use traits::{TaskRequest, TaskSubmitter, BIBUPLOAD_TASK};
