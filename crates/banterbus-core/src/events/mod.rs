//! Wire-level event types.
//!
//! Every frame on the socket is a JSON envelope `{ "event": <name>, "data":
//! <payload> }`. Inbound payloads decode into the structs in [`inbound`];
//! outbound payloads are built from the structs in [`outbound`], each of
//! which knows its event name.

pub mod inbound;
pub mod outbound;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

/// The JSON envelope carried on the socket in both directions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// An inbound event payload.
pub trait InboundEvent: DeserializeOwned {
    const NAME: &'static str;

    /// The room whose lock must be held while handling, when the payload
    /// alone identifies it. Rejoin resolves its room through the player
    /// record instead.
    fn room_scope(&self) -> Option<&str> {
        None
    }
}

/// An outbound event payload.
pub trait OutboundEvent: Serialize {
    const NAME: &'static str;
}

/// Avatar bytes cross the wire base64-encoded. Ingress also tolerates a raw
/// byte array, which some clients send.
pub mod avatar {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Encoded(String),
            Raw(Vec<u8>),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Encoded(s) => STANDARD
                .decode(s.as_bytes())
                .map_err(|e| D::Error::custom(format!("avatar is not valid base64: {e}"))),
            Wire::Raw(bytes) => Ok(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct WithAvatar {
        #[serde(deserialize_with = "avatar::deserialize")]
        avatar: Vec<u8>,
    }

    #[test]
    fn frame_without_data_decodes_to_null() {
        let frame: Frame = serde_json::from_str(r#"{"event":"CREATE_ROOM"}"#).unwrap();
        assert_eq!(frame.event, "CREATE_ROOM");
        assert!(frame.data.is_null());
    }

    #[test]
    fn avatar_decodes_base64_string() {
        let parsed: WithAvatar = serde_json::from_str(r#"{"avatar":"aGVsbG8="}"#).unwrap();
        assert_eq!(parsed.avatar, b"hello");
    }

    #[test]
    fn avatar_decodes_raw_byte_array() {
        let parsed: WithAvatar = serde_json::from_str(r#"{"avatar":[1,2,3]}"#).unwrap();
        assert_eq!(parsed.avatar, vec![1, 2, 3]);
    }

    #[test]
    fn avatar_rejects_invalid_base64() {
        let result: Result<WithAvatar, _> = serde_json::from_str(r#"{"avatar":"%%%"}"#);
        assert!(result.is_err());
    }
}
