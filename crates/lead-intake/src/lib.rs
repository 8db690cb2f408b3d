//! Lead-request intake for a private mathematics tutoring service.
//!
//! The crate owns the canonical intake schema, the append-only lead store, the HTTP router that
//! exposes them, and a UI-agnostic model of the contact form that validates with the same
//! schema before anything reaches the network.

pub mod config;
pub mod error;
pub mod intake;
pub mod telemetry;
