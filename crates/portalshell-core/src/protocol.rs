//! Inter-context message protocol.
//!
//! Every message is a JSON object tagged by a `kind` field. Inbound messages
//! travel from a frame to the shell, outbound ones from the shell to a frame.
//! `portal-update` travels both ways.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::address::Address;
use crate::error::ProtocolError;
use crate::ids::PortalId;

/// Kind tag of `window-type-query`.
pub const WINDOW_TYPE_QUERY_KIND: &str = "window-type-query";
/// Kind tag of `starting`.
pub const STARTING_KIND: &str = "starting";
/// Kind tag of `started`.
pub const STARTED_KIND: &str = "started";
/// Kind tag of `load-world`.
pub const LOAD_WORLD_KIND: &str = "load-world";
/// Kind tag of `portal-opened`.
pub const PORTAL_OPENED_KIND: &str = "portal-opened";
/// Kind tag of `portal-update`.
pub const PORTAL_UPDATE_KIND: &str = "portal-update";
/// Kind tag of `portal-enter`.
pub const PORTAL_ENTER_KIND: &str = "portal-enter";

const INBOUND_KINDS: [&str; 5] = [
    STARTING_KIND,
    STARTED_KIND,
    LOAD_WORLD_KIND,
    PORTAL_UPDATE_KIND,
    PORTAL_ENTER_KIND,
];

const OUTBOUND_KINDS: [&str; 3] = [WINDOW_TYPE_QUERY_KIND, PORTAL_OPENED_KIND, PORTAL_UPDATE_KIND];

/// Role assigned to a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    /// The frame currently shown and interactive.
    Primary,
    /// A frame loaded in the background.
    Secondary,
}

/// Opaque identity the primary frame should assume when it joins its world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityHint(pub Value);

/// Routed view-state update. Everything except `portalId` is opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalUpdate {
    /// The frame the update is addressed to.
    #[serde(rename = "portalId")]
    pub portal_id: PortalId,
    /// The payload forwarded to the target.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl PortalUpdate {
    /// Returns `true` if any of `fields` is present in the payload.
    #[must_use]
    pub fn touches_any(&self, fields: &[String]) -> bool {
        fields.iter().any(|f| self.payload.contains_key(f))
    }
}

/// Messages a frame sends to the shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum InboundMessage {
    /// Immediate reply to a `window-type-query`; retries continue.
    Starting,
    /// The frame has built its interactive presence; retries stop.
    Started,
    /// Open a world, or retarget an existing portal when `portal_id` is given.
    #[serde(rename_all = "camelCase")]
    LoadWorld {
        /// Address to load, possibly relative to the shell location.
        address: String,
        /// Existing portal to retarget in place.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        portal_id: Option<PortalId>,
    },
    /// View-state update for another frame.
    PortalUpdate(PortalUpdate),
    /// Request to make `portal_id` the current frame.
    #[serde(rename_all = "camelCase")]
    PortalEnter {
        /// The portal to enter.
        portal_id: PortalId,
        /// Identity the entered world should assume.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        identity_hint: Option<IdentityHint>,
    },
}

/// Messages the shell sends to a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OutboundMessage {
    /// Role announcement, repeated until the frame reports `started`.
    #[serde(rename_all = "camelCase")]
    WindowTypeQuery {
        /// The role assigned to the frame.
        window_type: WindowType,
        /// Identity to assume on join, primary only.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        identity_hint: Option<IdentityHint>,
    },
    /// Reply to `load-world` naming the frame that shows `address`.
    #[serde(rename_all = "camelCase")]
    PortalOpened {
        /// The frame now showing the world.
        portal_id: PortalId,
        /// The resolved address.
        address: Address,
    },
    /// Forwarded view-state update, with the routing field removed.
    PortalUpdate(Map<String, Value>),
}

/// Returns the `kind` tag of `raw`, or `None` for values that are not
/// protocol messages at all.
#[must_use]
pub fn kind_of(raw: &Value) -> Option<&str> {
    raw.get("kind").and_then(Value::as_str)
}

fn decode_known<T: DeserializeOwned>(
    raw: &Value,
    known: &[&str],
) -> Result<Option<T>, ProtocolError> {
    let Some(kind) = kind_of(raw) else {
        return Ok(None);
    };
    if !known.contains(&kind) {
        return Err(ProtocolError::UnknownKind(kind.to_owned()));
    }
    serde_json::from_value(raw.clone())
        .map(Some)
        .map_err(|e| ProtocolError::Malformed {
            kind: kind.to_owned(),
            reason: e.to_string(),
        })
}

impl InboundMessage {
    /// Decodes a raw value posted by a frame.
    ///
    /// Returns `Ok(None)` for values without a string `kind`, which belong to
    /// other traffic sharing the channel.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::UnknownKind` for unrecognized tags and
    /// `ProtocolError::Malformed` when the fields do not fit the kind.
    pub fn decode(raw: &Value) -> Result<Option<Self>, ProtocolError> {
        decode_known(raw, &INBOUND_KINDS)
    }

    /// Returns the wire tag of this message.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Starting => STARTING_KIND,
            Self::Started => STARTED_KIND,
            Self::LoadWorld { .. } => LOAD_WORLD_KIND,
            Self::PortalUpdate(_) => PORTAL_UPDATE_KIND,
            Self::PortalEnter { .. } => PORTAL_ENTER_KIND,
        }
    }

    /// Serializes the message to its wire form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(self).expect("InboundMessage serialization is infallible")
    }
}

impl OutboundMessage {
    /// Decodes a raw value posted by the shell.
    ///
    /// # Errors
    ///
    /// Same contract as [`InboundMessage::decode`].
    pub fn decode(raw: &Value) -> Result<Option<Self>, ProtocolError> {
        decode_known(raw, &OUTBOUND_KINDS)
    }

    /// Returns the wire tag of this message.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WindowTypeQuery { .. } => WINDOW_TYPE_QUERY_KIND,
            Self::PortalOpened { .. } => PORTAL_OPENED_KIND,
            Self::PortalUpdate(_) => PORTAL_UPDATE_KIND,
        }
    }

    /// Serializes the message to its wire form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(self).expect("OutboundMessage serialization is infallible")
    }
}

/// Record stored with each navigation history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// The frame that was current.
    pub portal_id: PortalId,
    /// That frame's address at the time.
    pub address: Address,
}

impl HistoryEntry {
    /// Reads the portal id out of a stored history state, tolerating states
    /// written by other code or by an earlier session.
    #[must_use]
    pub fn portal_id_of(state: Option<&Value>) -> Option<PortalId> {
        state?
            .get("portalId")
            .and_then(Value::as_str)
            .map(PortalId::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_load_world_with_optional_portal_id() {
        // Arrange
        let without = json!({ "kind": "load-world", "address": "/worldA" });
        let with = json!({ "kind": "load-world", "address": "/worldB", "portalId": "p1" });

        // Act
        let a = InboundMessage::decode(&without).unwrap().unwrap();
        let b = InboundMessage::decode(&with).unwrap().unwrap();

        // Assert
        assert_eq!(
            a,
            InboundMessage::LoadWorld {
                address: "/worldA".into(),
                portal_id: None
            }
        );
        assert_eq!(
            b,
            InboundMessage::LoadWorld {
                address: "/worldB".into(),
                portal_id: Some(PortalId::new("p1"))
            }
        );
    }

    #[test]
    fn test_decode_portal_update_keeps_opaque_payload_without_tag() {
        let raw = json!({
            "kind": "portal-update",
            "portalId": "p2",
            "cameraMatrix": [1, 0, 0, 1],
            "label": "garden"
        });

        let msg = InboundMessage::decode(&raw).unwrap().unwrap();

        match msg {
            InboundMessage::PortalUpdate(update) => {
                assert_eq!(update.portal_id, PortalId::new("p2"));
                assert_eq!(update.payload.len(), 2);
                assert!(!update.payload.contains_key("kind"));
                assert!(!update.payload.contains_key("portalId"));
                assert!(update.touches_any(&["cameraMatrix".to_owned()]));
            }
            other => panic!("expected PortalUpdate, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_ignores_values_without_kind() {
        assert_eq!(InboundMessage::decode(&json!({ "hello": 1 })).unwrap(), None);
        assert_eq!(InboundMessage::decode(&json!("text")).unwrap(), None);
        assert_eq!(InboundMessage::decode(&json!({ "kind": 5 })).unwrap(), None);
    }

    #[test]
    fn test_decode_rejects_unknown_kind() {
        let err = InboundMessage::decode(&json!({ "kind": "teleport" })).unwrap_err();

        assert_eq!(err, ProtocolError::UnknownKind("teleport".into()));
    }

    #[test]
    fn test_decode_rejects_outbound_kind_on_inbound_channel() {
        let raw = json!({ "kind": "window-type-query", "windowType": "primary" });

        let err = InboundMessage::decode(&raw).unwrap_err();

        assert_eq!(err, ProtocolError::UnknownKind("window-type-query".into()));
    }

    #[test]
    fn test_decode_reports_malformed_fields() {
        let err = InboundMessage::decode(&json!({ "kind": "portal-enter" })).unwrap_err();

        match err {
            ProtocolError::Malformed { kind, .. } => assert_eq!(kind, "portal-enter"),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_window_type_query_wire_shape() {
        let msg = OutboundMessage::WindowTypeQuery {
            window_type: WindowType::Primary,
            identity_hint: Some(IdentityHint(json!({ "name": "alice" }))),
        };

        assert_eq!(
            msg.to_value(),
            json!({
                "kind": "window-type-query",
                "windowType": "primary",
                "identityHint": { "name": "alice" }
            })
        );
    }

    #[test]
    fn test_forwarded_portal_update_wire_shape() {
        let mut payload = Map::new();
        payload.insert("cameraMatrix".into(), json!([1, 2, 3]));

        let msg = OutboundMessage::PortalUpdate(payload);

        assert_eq!(
            msg.to_value(),
            json!({ "kind": "portal-update", "cameraMatrix": [1, 2, 3] })
        );
    }

    #[test]
    fn test_history_portal_id_tolerates_foreign_state() {
        assert_eq!(
            HistoryEntry::portal_id_of(Some(&json!({ "portalId": "abc" }))),
            Some(PortalId::new("abc"))
        );
        assert_eq!(HistoryEntry::portal_id_of(Some(&json!({ "scroll": 4 }))), None);
        assert_eq!(HistoryEntry::portal_id_of(Some(&Value::Null)), None);
        assert_eq!(HistoryEntry::portal_id_of(None), None);
    }
}
