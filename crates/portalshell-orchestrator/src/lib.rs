//! Portal Shell: multi-context portal orchestrator.
//!
//! Owns the set of child frames, decides which one is current, keeps the
//! navigation history in step, and routes control messages between frames.

pub mod application;
pub mod config;
pub mod domain;

pub use application::shell::{Shell, ShellEvent, ShellOutcome, ShellPorts};
pub use config::ShellConfig;
