use serde::{Deserialize, Serialize};

use crate::notification::Notification;

/// Server-to-client events on the push channel. The SSE event name is the
/// variant name; the data line is the payload JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HubMessage {
    ReceiveNotification(Notification),
}

impl HubMessage {
    pub const RECEIVE_NOTIFICATION: &'static str = "ReceiveNotification";

    pub fn event_name(&self) -> &'static str {
        match self {
            HubMessage::ReceiveNotification(_) => Self::RECEIVE_NOTIFICATION,
        }
    }

    pub fn payload_json(&self) -> serde_json::Result<String> {
        match self {
            HubMessage::ReceiveNotification(notification) => serde_json::to_string(notification),
        }
    }

    /// Decode one frame. Unknown events yield `Ok(None)`.
    pub fn from_frame(event: &str, data: &str) -> serde_json::Result<Option<Self>> {
        match event {
            Self::RECEIVE_NOTIFICATION => {
                serde_json::from_str(data).map(|n| Some(HubMessage::ReceiveNotification(n)))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_frame_roundtrip() {
        let message = HubMessage::ReceiveNotification(Notification {
            id: 5,
            user_id: 3,
            message: "Session completed".into(),
            is_read: false,
            created_at: Utc::now(),
        });

        let data = message.payload_json().unwrap();
        let decoded = HubMessage::from_frame(message.event_name(), &data).unwrap();
        match decoded {
            Some(HubMessage::ReceiveNotification(n)) => {
                assert_eq!(n.id, 5);
                assert_eq!(n.message, "Session completed");
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_event_ignored() {
        assert_eq!(HubMessage::from_frame("ping", "{}").unwrap(), None);
        assert!(HubMessage::from_frame("ReceiveNotification", "not json").is_err());
    }
}
