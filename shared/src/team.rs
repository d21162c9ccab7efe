use serde::{Deserialize, Serialize};

/// Owning side of a node, army, or player.
///
/// `Neutral` is overloaded the way the game protocol overloads it: on a node
/// it means "unowned", on an observer it means "spectator" and disables all
/// fog-of-war filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Neutral,
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Purple,
}

impl Team {
    pub fn is_neutral(self) -> bool {
        self == Team::Neutral
    }
}
