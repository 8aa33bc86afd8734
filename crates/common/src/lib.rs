//! Value types shared by every layer of the order desk.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{ParseRoleError, Role, SubmissionId};

/// `strftime` pattern used wherever a timestamp is shown to people.
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
