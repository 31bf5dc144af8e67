//! Portal Shell headless server.
//!
//! Runs one shell in a tokio task with in-memory frames and history, and
//! exposes it over HTTP so worlds (or tests) can play the part of frames.

pub mod actor;
pub mod config;
pub mod error;
pub mod headless;
pub mod routes;
pub mod state;
