//! Core runtime: turns an inbound invocation into one model call with the
//! session's history, and persists the exchange.
//!
//! Entry point: [`invoke`].

pub mod pipeline;

pub use pipeline::{invoke, InvocationRequest, InvocationResult, SYSTEM_PROMPT};
