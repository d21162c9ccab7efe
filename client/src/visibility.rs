use nodewar_shared::Team;

use crate::model::{Army, GameMap, NodeId};

/// Fog of war, node rule: a node is visible when the observer owns it or
/// owns at least one neighbor. One hop, no transitive propagation. A
/// Neutral observer is a spectator and sees everything.
pub fn node_visible(map: &GameMap, id: NodeId, observer: Team) -> bool {
    if observer.is_neutral() {
        return true;
    }
    let node = map.node(id);
    node.team == observer || node.adj.iter().any(|&adj| map.node(adj).team == observer)
}

/// Fog of war, edge rule: endpoint ownership only. Intentionally not the
/// one-hop radius rule used for nodes, so an edge between two foreign nodes
/// next to the observer's territory stays hidden even though both endpoints
/// render.
pub fn edge_visible(map: &GameMap, a: NodeId, b: NodeId, observer: Team) -> bool {
    observer.is_neutral() || map.node(a).team == observer || map.node(b).team == observer
}

/// Fog of war, army rule: visible when the observer owns either endpoint of
/// the army's path.
pub fn army_visible(map: &GameMap, army: &Army, observer: Team) -> bool {
    edge_visible(map, army.from, army.to, observer)
}

/// A node can only be picked up as an order source when the observer owns
/// it; spectators never select.
pub fn selectable(map: &GameMap, id: NodeId, observer: Team) -> bool {
    !observer.is_neutral() && map.node(id).team == observer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::{flat_room, triangle};
    use crate::model::{Game, rehydrate};
    use nodewar_shared::FlatArmy;

    fn game(flat: nodewar_shared::FlatGame) -> Game {
        rehydrate(flat_room(Some(flat))).unwrap().game.unwrap()
    }

    #[test]
    fn owned_and_one_hop_nodes_are_visible() {
        let game = game(triangle());
        let map = &game.map;
        for wire_id in 0..3 {
            let id = map.find(wire_id).unwrap();
            assert!(node_visible(map, id, Team::Red), "node {wire_id}");
        }
    }

    #[test]
    fn visibility_does_not_propagate_past_one_hop() {
        // Path 0(Red) - 1 - 2: node 2 is two hops from Red territory.
        let mut flat = triangle();
        flat.map.nodes[0].adj = vec![1];
        flat.map.nodes[1].adj = vec![0, 2];
        flat.map.nodes[2].adj = vec![1];
        flat.map.edges = vec![[0, 1], [1, 2]];
        let game = game(flat);
        let map = &game.map;

        assert!(node_visible(map, map.find(1).unwrap(), Team::Red));
        assert!(!node_visible(map, map.find(2).unwrap(), Team::Red));
    }

    #[test]
    fn one_hop_rule_ignores_neighbor_owner() {
        // If the observer owns A, every neighbor of A is visible no matter
        // who owns it.
        let mut flat = triangle();
        flat.map.nodes[1].team = Team::Blue;
        let game = game(flat);
        let map = &game.map;
        assert!(node_visible(map, map.find(1).unwrap(), Team::Red));
    }

    #[test]
    fn neutral_observer_sees_everything() {
        let mut flat = triangle();
        flat.armies.push(FlatArmy {
            id: 0,
            from: 1,
            to: 2,
            troops: 5,
            distance: 0.3,
            team: Team::Blue,
        });
        let game = game(flat);
        let map = &game.map;

        for (id, _) in map.iter() {
            assert!(node_visible(map, id, Team::Neutral));
        }
        for &(a, b) in map.edges() {
            assert!(edge_visible(map, a, b, Team::Neutral));
        }
        assert!(army_visible(map, &game.armies[0], Team::Neutral));
    }

    #[test]
    fn edge_rule_is_endpoint_ownership_not_radius() {
        let game = game(triangle());
        let map = &game.map;
        let (n0, n1, n2) = (
            map.find(0).unwrap(),
            map.find(1).unwrap(),
            map.find(2).unwrap(),
        );

        // Every edge touching Red-owned node 0 is visible.
        assert!(edge_visible(map, n0, n1, Team::Red));
        assert!(edge_visible(map, n0, n2, Team::Red));
        // The 1-2 edge has no Red endpoint, even though both nodes are
        // themselves visible under the one-hop node rule.
        assert!(!edge_visible(map, n1, n2, Team::Red));
    }

    #[test]
    fn army_visible_from_either_endpoint() {
        let mut flat = triangle();
        flat.armies.push(FlatArmy {
            id: 7,
            from: 0,
            to: 1,
            troops: 10,
            distance: 0.5,
            team: Team::Blue,
        });
        flat.armies.push(FlatArmy {
            id: 8,
            from: 1,
            to: 2,
            troops: 10,
            distance: 0.5,
            team: Team::Blue,
        });
        let game = game(flat);
        let map = &game.map;

        assert!(army_visible(map, &game.armies[0], Team::Red));
        assert!(!army_visible(map, &game.armies[1], Team::Red));
    }

    #[test]
    fn only_owned_nodes_are_selectable() {
        let game = game(triangle());
        let map = &game.map;
        assert!(selectable(map, map.find(0).unwrap(), Team::Red));
        assert!(!selectable(map, map.find(1).unwrap(), Team::Red));
        assert!(!selectable(map, map.find(0).unwrap(), Team::Neutral));
    }
}
