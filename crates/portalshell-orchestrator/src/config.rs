//! Shell configuration.

use std::time::Duration;

/// Default interval between role announcements.
pub const DEFAULT_NEGOTIATION_INTERVAL: Duration = Duration::from_millis(200);

/// Payload field that moves a frame's camera.
pub const CAMERA_MATRIX_FIELD: &str = "cameraMatrix";

/// Tunables for a `Shell`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Interval between repeated `window-type-query` announcements.
    pub negotiation_interval: Duration,
    /// Payload fields of `portal-update` that alter the receiving frame's
    /// view. Updates carrying any of them are not forwarded to the current
    /// frame.
    pub view_state_fields: Vec<String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            negotiation_interval: DEFAULT_NEGOTIATION_INTERVAL,
            view_state_fields: vec![CAMERA_MATRIX_FIELD.to_owned()],
        }
    }
}
