#![deny(missing_docs)]

//! Core library for the learning topics HTTP service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Topic records and their in-memory store.
pub mod store;
