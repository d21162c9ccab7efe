use nodewar_shared::{NodeType, Team};

use crate::interaction::InteractionState;
use crate::model::{Army, Game};
use crate::visibility;

/// Node circle radius in map units.
pub const NODE_RADIUS: f64 = 2.0;
/// Army circle radius in map units.
pub const ARMY_RADIUS: f64 = 1.0;
/// Edge stroke width in map units.
pub const EDGE_WIDTH: f64 = 5.0 / 9.0;

/// One node, ready to draw. `team` is always the true owner (ownership is
/// never fogged); `troops` and `building` are `None` when fog of war hides
/// the node's detail, and the display layer must render them as unknown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeView {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub team: Team,
    pub troops: Option<u32>,
    pub building: Option<NodeType>,
    pub visible: bool,
    pub selectable: bool,
    pub hovered: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeView {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub visible: bool,
}

/// A visible army, already interpolated along its path. Armies hidden by
/// fog are dropped from the scene entirely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmyView {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub troops: u32,
    pub team: Team,
}

/// Display-technology-agnostic picture of one frame. A pure function of the
/// live model, the observer's team, and the local interaction state.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub armies: Vec<ArmyView>,
}

pub fn scene(game: &Game, observer: Team, ui: &InteractionState) -> Scene {
    let map = &game.map;

    let nodes = map
        .iter()
        .map(|(id, node)| {
            let visible = visibility::node_visible(map, id, observer);
            NodeView {
                id: node.id,
                x: node.x,
                y: node.y,
                team: node.team,
                troops: visible.then_some(node.troops),
                building: visible.then_some(node.building),
                visible,
                selectable: visibility::selectable(map, id, observer),
                hovered: ui.hovered == Some(node.id),
                selected: ui.selected == Some(node.id),
            }
        })
        .collect();

    let edges = map
        .edges()
        .iter()
        .map(|&(a, b)| {
            let (na, nb) = (map.node(a), map.node(b));
            EdgeView {
                x1: na.x,
                y1: na.y,
                x2: nb.x,
                y2: nb.y,
                visible: visibility::edge_visible(map, a, b, observer),
            }
        })
        .collect();

    let armies = game
        .armies
        .iter()
        .filter(|army| visibility::army_visible(map, army, observer))
        .map(|army| {
            let (x, y) = army_position(game, army);
            ArmyView {
                id: army.id,
                x,
                y,
                troops: army.troops,
                team: army.team,
            }
        })
        .collect();

    Scene {
        nodes,
        edges,
        armies,
    }
}

/// Armies travel visually from rim to rim, not center to center: progress 0
/// touches the source node's edge, progress 1 the destination's.
fn army_position(game: &Game, army: &Army) -> (f64, f64) {
    let from = game.map.node(army.from);
    let to = game.map.node(army.to);
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let dist = dx.hypot(dy);
    if dist <= 0.0 {
        return (from.x, from.y);
    }
    let rim = NODE_RADIUS + ARMY_RADIUS;
    let span = (dist - 2.0 * rim).max(0.0);
    let along = rim + army.distance.clamp(0.0, 1.0) * span;
    (from.x + dx / dist * along, from.y + dy / dist * along)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::{flat_room, triangle};
    use crate::model::rehydrate;
    use nodewar_shared::FlatArmy;

    fn game(flat: nodewar_shared::FlatGame) -> Game {
        rehydrate(flat_room(Some(flat))).unwrap().game.unwrap()
    }

    #[test]
    fn triangle_scene_for_red_observer() {
        // 3-node triangle, node 0 Red with 5 troops, nodes 1 and 2 Neutral.
        let scene = scene(&game(triangle()), Team::Red, &InteractionState::default());

        let n0 = &scene.nodes[0];
        assert!(n0.visible);
        assert_eq!(n0.troops, Some(5));
        assert_eq!(n0.team, Team::Red);
        assert!(n0.selectable);

        // Nodes 1 and 2 are one hop from Red territory: visible, true
        // (Neutral) ownership shown, but not selectable.
        for n in &scene.nodes[1..] {
            assert!(n.visible);
            assert_eq!(n.team, Team::Neutral);
            assert!(n.troops.is_some());
            assert!(!n.selectable);
        }

        // Edges touching Red-owned node 0 are visible; edge 1-2 is not.
        assert!(scene.edges[0].visible);
        assert!(scene.edges[1].visible);
        assert!(!scene.edges[2].visible);
    }

    #[test]
    fn fog_hides_troops_and_building_only() {
        // Path 0(Red) - 1 - 2: node 2 is beyond the one-hop radius.
        let mut flat = triangle();
        flat.map.nodes[0].adj = vec![1];
        flat.map.nodes[1].adj = vec![0, 2];
        flat.map.nodes[2].adj = vec![1];
        flat.map.edges = vec![[0, 1], [1, 2]];
        flat.map.nodes[2].team = Team::Blue;
        flat.map.nodes[2].node_type = nodewar_shared::NodeType::Fort;

        let scene = scene(&game(flat), Team::Red, &InteractionState::default());
        let n2 = &scene.nodes[2];
        assert!(!n2.visible);
        assert_eq!(n2.troops, None);
        assert_eq!(n2.building, None);
        // Position and ownership still flow through; the display layer
        // decides to paint fogged nodes neutral.
        assert_eq!(n2.team, Team::Blue);
        assert_eq!((n2.x, n2.y), (0.0, 10.0));
    }

    #[test]
    fn hidden_armies_are_dropped_from_the_scene() {
        let mut flat = triangle();
        flat.armies.push(FlatArmy {
            id: 0,
            from: 0,
            to: 1,
            troops: 10,
            distance: 0.5,
            team: Team::Red,
        });
        flat.armies.push(FlatArmy {
            id: 1,
            from: 1,
            to: 2,
            troops: 10,
            distance: 0.5,
            team: Team::Blue,
        });
        let scene = scene(&game(flat), Team::Red, &InteractionState::default());
        assert_eq!(scene.armies.len(), 1);
        assert_eq!(scene.armies[0].id, 0);
    }

    #[test]
    fn army_interpolates_between_node_rims() {
        let rim = NODE_RADIUS + ARMY_RADIUS;
        for (progress, expected_x) in [(0.0, rim), (1.0, 10.0 - rim), (0.5, 5.0)] {
            let mut flat = triangle();
            flat.armies.push(FlatArmy {
                id: 0,
                from: 0,
                to: 1,
                troops: 10,
                distance: progress,
                team: Team::Red,
            });
            let scene = scene(&game(flat), Team::Neutral, &InteractionState::default());
            let army = &scene.armies[0];
            assert!((army.x - expected_x).abs() < 1e-9, "progress {progress}");
            assert_eq!(army.y, 0.0);
        }
    }

    #[test]
    fn hover_and_selection_flags_follow_interaction_state() {
        let ui = InteractionState {
            hovered: Some(1),
            selected: Some(0),
            pointer_down: false,
        };
        let scene = scene(&game(triangle()), Team::Red, &ui);
        assert!(scene.nodes[0].selected);
        assert!(!scene.nodes[0].hovered);
        assert!(scene.nodes[1].hovered);
        assert!(!scene.nodes[1].selected);
    }
}
