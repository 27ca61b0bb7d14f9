//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `preview` - Preview session records, expiry policy and errors

pub mod foundation;
pub mod preview;
