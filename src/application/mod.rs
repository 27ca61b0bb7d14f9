//! Application layer - Services orchestrating the domain and ports.

pub mod preview;

pub use preview::{ExpirySweeper, RegistrySettings, SessionRegistry};
