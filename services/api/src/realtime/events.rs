//! Events carried over the realtime gateway
//!
//! The wire names predate this service and are load-bearing for the web
//! client, so the serde renames pin them down exactly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events sent from the server to every connected client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerEvent {
    /// Connection acknowledged
    #[serde(rename = "server_ready")]
    ServerReady { message: String },

    /// A user went online or offline
    #[serde(rename = "status_update")]
    StatusUpdate {
        username: String,
        #[serde(rename = "isOnline")]
        is_online: bool,
    },

    /// A new community message was posted
    #[serde(rename = "message_response")]
    MessageResponse {
        id: Uuid,
        username: String,
        content: String,
        timestamp: DateTime<Utc>,
    },

    /// A friend request was sent
    #[serde(rename = "new-friend-request")]
    NewFriendRequest { requester: String, receiver: String },

    /// A friend request was accepted
    #[serde(rename = "new-friend")]
    NewFriend { requester: String, receiver: String },

    /// A friend request was declined
    #[serde(rename = "declined-friend")]
    DeclinedFriend { requester: String, receiver: String },

    /// A friendship was removed
    #[serde(rename = "removed-friend")]
    RemovedFriend { remover: String, removed: String },
}

/// Commands sent from a client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientCommand {
    /// Post a community message
    #[serde(rename = "message")]
    Message { message: String },

    /// Mark the session online
    #[serde(rename = "go-online")]
    GoOnline,

    /// Mark the session offline without closing the socket
    #[serde(rename = "go-offline")]
    GoOffline,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_update_keeps_its_wire_shape() {
        let event = ServerEvent::StatusUpdate {
            username: "alice".to_string(),
            is_online: true,
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "type": "status_update",
                "data": { "username": "alice", "isOnline": true }
            })
        );
    }

    #[test]
    fn friend_events_use_the_dashed_wire_names() {
        let event = ServerEvent::NewFriendRequest {
            requester: "alice".to_string(),
            receiver: "bob".to_string(),
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["type"], "new-friend-request");

        let event = ServerEvent::RemovedFriend {
            remover: "alice".to_string(),
            removed: "bob".to_string(),
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["type"], "removed-friend");
        assert_eq!(json["data"]["remover"], "alice");
    }

    #[test]
    fn client_commands_parse_from_the_wire() {
        let command: ClientCommand =
            serde_json::from_str(r#"{"type":"message","data":{"message":"hi all"}}"#)
                .expect("parse");
        assert_eq!(
            command,
            ClientCommand::Message {
                message: "hi all".to_string()
            }
        );

        let command: ClientCommand =
            serde_json::from_str(r#"{"type":"go-offline"}"#).expect("parse");
        assert_eq!(command, ClientCommand::GoOffline);
    }

    #[test]
    fn unknown_commands_are_rejected() {
        assert!(serde_json::from_str::<ClientCommand>(r#"{"type":"shout"}"#).is_err());
    }
}
