//! Preview session service.
//!
//! - [`SessionRegistry`] - Session lifecycle, admission control, change
//!   notification and stats
//! - [`ExpirySweeper`] - Background task evicting stale sessions

mod registry;
mod sweeper;

pub use registry::{RegistrySettings, SessionRegistry, SignalReceiver, ViewerLease};
pub use sweeper::{ExpirySweeper, DEFAULT_SWEEP_INTERVAL};
