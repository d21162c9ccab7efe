use serde::{Deserialize, Serialize};

use crate::map::{FlatRoom, NodeType, Player, RoomSummary};

/// Messages pushed by the server. Unsolicited: a `RoomData` snapshot fully
/// supersedes any previous one, there is no request/response pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    RoomList { rooms: Vec<RoomSummary> },
    PlayerData { player: Player },
    /// `room: None` means the client has left its room.
    RoomData { room: Option<FlatRoom> },
}

/// Player intents sent to the authoritative server. The server validates
/// everything; a stale or illegal intent is simply ignored there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientIntent {
    CreateRoom { max_players: u32, private: bool },
    JoinRoom { room_id: String },
    StartRoom,
    Build { node: u32, building: NodeType },
    SendArmy { from: u32, to: u32, troops: u32 },
    /// `target: -1` clears the auto-send assignment.
    Assign { node: u32, target: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::NO_ASSIGN;

    #[test]
    fn intents_are_type_tagged() {
        let intent = ClientIntent::Build {
            node: 3,
            building: NodeType::Fort,
        };
        let json = serde_json::to_value(&intent).unwrap();
        assert_eq!(json["type"], "Build");
        assert_eq!(json["node"], 3);
        assert_eq!(json["building"], "Fort");
    }

    #[test]
    fn assign_clear_uses_sentinel() {
        let intent = ClientIntent::Assign {
            node: 1,
            target: NO_ASSIGN,
        };
        let json = serde_json::to_string(&intent).unwrap();
        let back: ClientIntent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, intent);
    }

    #[test]
    fn server_event_room_data_null_means_left_room() {
        let event: ServerEvent = serde_json::from_str(r#"{"type":"RoomData","room":null}"#).unwrap();
        assert_eq!(event, ServerEvent::RoomData { room: None });
    }
}
