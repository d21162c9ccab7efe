use serde::{Deserialize, Serialize};

use crate::team::Team;

/// Building occupying a node's single building slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    /// No building.
    Normal,
    /// Generates extra troops per second.
    Factory,
    /// Boosts production of adjacent factories.
    PowerPlant,
    /// Defensive bonus against incoming armies.
    Fort,
    /// Offensive bonus for outgoing armies.
    Artillery,
}

/// Sentinel in [`FlatNode::assign`] meaning "no auto-send target".
pub const NO_ASSIGN: i32 = -1;

/// One node of the map graph as transmitted over the wire. Node-to-node
/// relations are 0-based positions into the snapshot's own node array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatNode {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub adj: Vec<u32>,
    pub team: Team,
    pub troops: u32,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Index of the standing auto-send target, or negative for none.
    pub assign: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatMap {
    pub nodes: Vec<FlatNode>,
    /// Unordered node-index pairs; one entry per adjacency.
    pub edges: Vec<[u32; 2]>,
}

/// A troop group in transit between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatArmy {
    pub id: u32,
    pub from: u32,
    pub to: u32,
    pub troops: u32,
    /// Fractional progress from `from` to `to`, in [0, 1].
    pub distance: f64,
    pub team: Team,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatGame {
    pub map: FlatMap,
    pub armies: Vec<FlatArmy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub team: Team,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: String,
    pub name: String,
    pub n_players: u32,
    pub max_players: u32,
    pub n_spectators: u32,
}

/// Full room snapshot. `game` is absent while the room is waiting for
/// players; every push from the server replaces the previous room wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRoom {
    #[serde(default)]
    pub game: Option<FlatGame>,
    pub players: Vec<Player>,
    pub spectators: Vec<Player>,
    pub summary: RoomSummary,
}
