//! Draft Preview - Live preview sessions for unpublished articles
//!
//! Authors open a short-lived preview session for a draft, share its URL,
//! and every connected viewer is told to reload when the draft is saved.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
