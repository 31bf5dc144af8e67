//! Navigable world addresses.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ShellError;

/// An absolute location a frame can display.
///
/// Addresses are compared by their serialized form, so `resolve` must be used
/// on anything a frame reports before looking it up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(Url);

impl Address {
    /// Parses an absolute address.
    ///
    /// # Errors
    ///
    /// Returns `ShellError::InvalidAddress` if `raw` is not an absolute URL.
    pub fn parse(raw: &str) -> Result<Self, ShellError> {
        Url::parse(raw)
            .map(Self)
            .map_err(|e| ShellError::InvalidAddress(format!("{raw}: {e}")))
    }

    /// Resolves `raw` relative to this address, the way a document resolves a
    /// link against its own location.
    ///
    /// # Errors
    ///
    /// Returns `ShellError::InvalidAddress` if `raw` cannot be joined.
    pub fn resolve(&self, raw: &str) -> Result<Self, ShellError> {
        self.0
            .join(raw)
            .map(Self)
            .map_err(|e| ShellError::InvalidAddress(format!("{raw}: {e}")))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}
