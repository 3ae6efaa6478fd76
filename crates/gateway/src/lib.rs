//! Synapse host: an HTTP front door that forwards chat turns to the
//! configured LLM provider and keeps per-session history.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod middleware;
pub mod runtime;
pub mod state;
pub mod tls;
