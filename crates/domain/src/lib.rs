//! Shared types for the Synapse host: configuration, errors, messages and
//! structured trace events.

pub mod config;
pub mod error;
pub mod message;
pub mod trace;
