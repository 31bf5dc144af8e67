//! Portal Shell, embedded side.
//!
//! A world running inside a shell frame uses this crate to learn its role and
//! to send requests back to the shell. The same world running at top level
//! (not embedded) is its own shell and always gets `WindowRole::Shell`.

pub mod client;
pub mod error;
pub mod link;
pub mod role;

pub use client::ParentClient;
pub use error::EmbedError;
pub use link::ParentLink;
pub use role::{RoleAssignment, RoleListener, RoleQuery, WindowRole, role_channel};

#[cfg(test)]
mod testing;
