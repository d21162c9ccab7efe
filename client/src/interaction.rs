use nodewar_shared::{ClientIntent, NO_ASSIGN, NodeType, Team};

use crate::model::Room;

/// Troop counts for the small/large send orders.
const SEND_SMALL: u32 = 10;
const SEND_LARGE: u32 = 100;

/// Local pointer/selection state. Survives snapshot swaps, so nodes are
/// referenced by stable wire id and re-validated against the current live
/// model on every use; an id that no longer resolves (or whose owner
/// changed) makes the pending action silently inert rather than an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionState {
    pub hovered: Option<u32>,
    pub selected: Option<u32>,
    pub pointer_down: bool,
}

impl InteractionState {
    pub fn pointer_entered(&mut self, node: u32) {
        self.hovered = Some(node);
    }

    pub fn pointer_left(&mut self) {
        self.hovered = None;
    }

    pub fn pointer_released(&mut self) {
        self.pointer_down = false;
    }

    /// Pointer-down: select the hovered node when the local player owns it,
    /// otherwise clear the selection. Hover is orthogonal and untouched.
    pub fn pointer_pressed(&mut self, room: &Room, team: Team) {
        self.pointer_down = true;
        self.selected = None;
        if team.is_neutral() {
            return;
        }
        let (Some(hovered), Some(game)) = (self.hovered, room.game.as_ref()) else {
            return;
        };
        if let Some(id) = game.map.find(hovered)
            && game.map.node(id).team == team
        {
            self.selected = Some(hovered);
        }
    }

    /// Translate a key press into at most one outgoing intent.
    ///
    /// Only runs while a node is selected and still owned by the local
    /// player. Build keys clear the selection so the player can issue the
    /// next order; send/assign keys keep it for follow-up orders. A key
    /// whose precondition fails, or any unmapped key, changes nothing.
    pub fn key_pressed(&mut self, key: char, room: &Room, team: Team) -> Option<ClientIntent> {
        let selected = self.selected?;
        let game = room.game.as_ref()?;
        let sel = game.map.find(selected)?;
        if team.is_neutral() || game.map.node(sel).team != team {
            return None;
        }

        match key.to_ascii_uppercase() {
            'A' => self.build(selected, NodeType::Factory),
            'S' => self.build(selected, NodeType::PowerPlant),
            'Z' => self.build(selected, NodeType::Fort),
            'X' => self.build(selected, NodeType::Artillery),
            'Q' => self.send(selected, SEND_SMALL),
            'W' => self.send(selected, SEND_LARGE),
            'E' => {
                if self.hovered == Some(selected) {
                    return None;
                }
                Some(ClientIntent::Assign {
                    node: selected,
                    target: self.hovered.map_or(NO_ASSIGN, |h| h as i32),
                })
            }
            _ => None,
        }
    }

    fn build(&mut self, node: u32, building: NodeType) -> Option<ClientIntent> {
        self.selected = None;
        Some(ClientIntent::Build { node, building })
    }

    fn send(&self, from: u32, troops: u32) -> Option<ClientIntent> {
        let to = self.hovered.filter(|&h| h != from)?;
        Some(ClientIntent::SendArmy { from, to, troops })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::{flat_room, triangle};
    use crate::model::{Room, rehydrate};

    fn room() -> Room {
        rehydrate(flat_room(Some(triangle()))).unwrap()
    }

    fn selected(node: u32, hovered: Option<u32>) -> InteractionState {
        InteractionState {
            hovered,
            selected: Some(node),
            pointer_down: false,
        }
    }

    #[test]
    fn press_selects_owned_hovered_node() {
        let room = room();
        let mut ui = InteractionState::default();
        ui.pointer_entered(0);
        ui.pointer_pressed(&room, Team::Red);
        assert_eq!(ui.selected, Some(0));
        assert_eq!(ui.hovered, Some(0));
        assert!(ui.pointer_down);
    }

    #[test]
    fn press_on_foreign_or_empty_space_clears_selection() {
        let room = room();
        let mut ui = selected(0, Some(1));
        ui.pointer_pressed(&room, Team::Red);
        assert_eq!(ui.selected, None);

        let mut ui = selected(0, None);
        ui.pointer_pressed(&room, Team::Red);
        assert_eq!(ui.selected, None);
    }

    #[test]
    fn spectator_never_selects() {
        let room = room();
        let mut ui = InteractionState::default();
        ui.pointer_entered(0);
        ui.pointer_pressed(&room, Team::Neutral);
        assert_eq!(ui.selected, None);
    }

    #[test]
    fn build_key_emits_once_and_clears_selection() {
        let room = room();
        let mut ui = selected(0, None);
        let intent = ui.key_pressed('a', &room, Team::Red);
        assert_eq!(
            intent,
            Some(ClientIntent::Build {
                node: 0,
                building: NodeType::Factory,
            })
        );
        assert_eq!(ui.selected, None);
        // Nothing selected any more: the same key is now inert.
        assert_eq!(ui.key_pressed('a', &room, Team::Red), None);
    }

    #[test]
    fn key_without_selection_emits_nothing() {
        let room = room();
        let mut ui = InteractionState::default();
        assert_eq!(ui.key_pressed('A', &room, Team::Red), None);
    }

    #[test]
    fn send_requires_distinct_hover_target() {
        let room = room();

        let mut ui = selected(0, Some(0));
        assert_eq!(ui.key_pressed('Q', &room, Team::Red), None);
        assert_eq!(ui.selected, Some(0));

        let mut ui = selected(0, None);
        assert_eq!(ui.key_pressed('W', &room, Team::Red), None);
        assert_eq!(ui.selected, Some(0));

        let mut ui = selected(0, Some(2));
        assert_eq!(
            ui.key_pressed('Q', &room, Team::Red),
            Some(ClientIntent::SendArmy {
                from: 0,
                to: 2,
                troops: 10,
            })
        );
        // Send keeps the selection for follow-up orders.
        assert_eq!(ui.selected, Some(0));
    }

    #[test]
    fn assign_targets_hover_or_clears() {
        let room = room();

        let mut ui = selected(0, Some(1));
        assert_eq!(
            ui.key_pressed('E', &room, Team::Red),
            Some(ClientIntent::Assign { node: 0, target: 1 })
        );
        assert_eq!(ui.selected, Some(0));

        let mut ui = selected(0, None);
        assert_eq!(
            ui.key_pressed('E', &room, Team::Red),
            Some(ClientIntent::Assign {
                node: 0,
                target: -1,
            })
        );

        let mut ui = selected(0, Some(0));
        assert_eq!(ui.key_pressed('E', &room, Team::Red), None);
    }

    #[test]
    fn unmapped_key_is_a_no_op() {
        let room = room();
        let mut ui = selected(0, Some(1));
        assert_eq!(ui.key_pressed('P', &room, Team::Red), None);
        assert_eq!(ui.selected, Some(0));
        assert_eq!(ui.hovered, Some(1));
    }

    #[test]
    fn stale_selection_is_silently_inert() {
        let room = room();

        // Node id that no longer exists after a snapshot swap.
        let mut ui = selected(99, Some(1));
        assert_eq!(ui.key_pressed('A', &room, Team::Red), None);
        assert_eq!(ui.selected, Some(99));

        // Node exists but ownership was lost to another team.
        let mut ui = selected(1, Some(2));
        assert_eq!(ui.key_pressed('A', &room, Team::Red), None);
        assert_eq!(ui.selected, Some(1));
    }
}
