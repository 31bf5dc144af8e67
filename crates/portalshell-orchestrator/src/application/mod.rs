//! Application layer: the shell context object and its protocol handlers.

pub mod history_sync;
pub mod negotiator;
pub mod router;
pub mod shell;
pub mod transition;
pub mod views;
