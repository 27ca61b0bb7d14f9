//! Preview domain module.
//!
//! Short-lived, per-draft preview sessions and the rules that govern
//! their expiry and teardown. The stateful registry lives in the
//! application layer; this module only holds values and policies.

mod close_reason;
mod errors;
mod session;

pub use close_reason::CloseReason;
pub use errors::{PreviewError, PreviewErrorKind};
pub use session::{ExpiryPolicy, PreviewSession, PreviewStats};
