use std::collections::HashMap;

use nodewar_shared::{
    FlatArmy, FlatGame, FlatMap, FlatNode, FlatRoom, NO_ASSIGN, NodeType, Player, RoomSummary,
    SnapshotError, Team,
};

/// Handle into the node arena of one rehydrated snapshot.
///
/// Only [`rehydrate`] mints these, and only after bounds-checking, so every
/// `NodeId` held by a [`Room`] resolves in O(1) without a fallible lookup.
/// Handles are deliberately not the node's stable wire id: UI state that
/// outlives a snapshot stores wire ids and re-resolves them via
/// [`GameMap::find`] after each swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A territory vertex of the live object graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub team: Team,
    pub troops: u32,
    pub building: NodeType,
    pub adj: Vec<NodeId>,
    /// Standing auto-send target, if the owner set one.
    pub assign: Option<NodeId>,
}

/// A troop group travelling in a straight line between two distinct nodes.
/// The server owns its lifecycle; it disappears by being absent from the
/// next snapshot, never by client-side removal.
#[derive(Debug, Clone, PartialEq)]
pub struct Army {
    pub id: u32,
    pub from: NodeId,
    pub to: NodeId,
    pub troops: u32,
    pub distance: f64,
    pub team: Team,
}

/// Node arena plus the edge list, rebuilt wholesale on every snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct GameMap {
    nodes: Vec<Node>,
    edges: Vec<(NodeId, NodeId)>,
    by_id: HashMap<u32, NodeId>,
}

impl GameMap {
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    pub fn edges(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    /// Resolve a stable wire id against this snapshot. `None` means the node
    /// no longer exists and whatever referenced it has gone stale.
    pub fn find(&self, wire_id: u32) -> Option<NodeId> {
        self.by_id.get(&wire_id).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub map: GameMap,
    pub armies: Vec<Army>,
}

/// The live model root. Replaced, never patched, when the server pushes a
/// new snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub game: Option<Game>,
    pub players: Vec<Player>,
    pub spectators: Vec<Player>,
    pub summary: RoomSummary,
}

fn node_ref(index: u32, len: usize) -> Option<NodeId> {
    ((index as usize) < len).then_some(NodeId(index))
}

/// Rebuild the live object graph from a wire snapshot.
///
/// Two passes over the node array: the first allocates every node with its
/// scalar fields and empty relations, the second resolves adjacency and
/// assign indices against the completed arena (adjacency is symmetric, so
/// targets must already exist). Edges and armies resolve last. Any index
/// outside the node array rejects the entire snapshot.
pub fn rehydrate(flat: FlatRoom) -> Result<Room, SnapshotError> {
    let FlatRoom {
        game,
        players,
        spectators,
        summary,
    } = flat;
    let game = match game {
        Some(game) => Some(rehydrate_game(game)?),
        None => None,
    };
    Ok(Room {
        game,
        players,
        spectators,
        summary,
    })
}

fn rehydrate_game(flat: FlatGame) -> Result<Game, SnapshotError> {
    let len = flat.map.nodes.len();

    let mut nodes: Vec<Node> = flat
        .map
        .nodes
        .iter()
        .map(|f| Node {
            id: f.id,
            x: f.x,
            y: f.y,
            team: f.team,
            troops: f.troops,
            building: f.node_type,
            adj: Vec::with_capacity(f.adj.len()),
            assign: None,
        })
        .collect();

    for (pos, f) in flat.map.nodes.iter().enumerate() {
        for &adj in &f.adj {
            let target = node_ref(adj, len).ok_or(SnapshotError::AdjOutOfRange {
                node: f.id,
                index: adj,
                len,
            })?;
            nodes[pos].adj.push(target);
        }
        if f.assign >= 0 {
            let target =
                node_ref(f.assign as u32, len).ok_or(SnapshotError::AssignOutOfRange {
                    node: f.id,
                    index: f.assign,
                    len,
                })?;
            nodes[pos].assign = Some(target);
        }
    }

    let mut edges = Vec::with_capacity(flat.map.edges.len());
    for (pos, &[a, b]) in flat.map.edges.iter().enumerate() {
        let a = node_ref(a, len).ok_or(SnapshotError::EdgeOutOfRange {
            edge: pos,
            index: a,
            len,
        })?;
        let b = node_ref(b, len).ok_or(SnapshotError::EdgeOutOfRange {
            edge: pos,
            index: b,
            len,
        })?;
        edges.push((a, b));
    }

    let mut armies = Vec::with_capacity(flat.armies.len());
    for f in &flat.armies {
        let from = node_ref(f.from, len).ok_or(SnapshotError::ArmyOutOfRange {
            army: f.id,
            index: f.from,
            len,
        })?;
        let to = node_ref(f.to, len).ok_or(SnapshotError::ArmyOutOfRange {
            army: f.id,
            index: f.to,
            len,
        })?;
        if from == to {
            return Err(SnapshotError::ArmyDegenerate {
                army: f.id,
                index: f.from,
            });
        }
        armies.push(Army {
            id: f.id,
            from,
            to,
            troops: f.troops,
            distance: f.distance,
            team: f.team,
        });
    }

    let by_id = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id, NodeId(i as u32)))
        .collect();

    Ok(Game {
        map: GameMap {
            nodes,
            edges,
            by_id,
        },
        armies,
    })
}

/// Re-encode a live room into the wire representation. Inverse of
/// [`rehydrate`] up to adjacency ordering.
pub fn flatten(room: &Room) -> FlatRoom {
    FlatRoom {
        game: room.game.as_ref().map(|game| FlatGame {
            map: FlatMap {
                nodes: game
                    .map
                    .iter()
                    .map(|(_, n)| FlatNode {
                        id: n.id,
                        x: n.x,
                        y: n.y,
                        adj: n.adj.iter().map(|a| a.0).collect(),
                        team: n.team,
                        troops: n.troops,
                        node_type: n.building,
                        assign: n.assign.map_or(NO_ASSIGN, |a| a.0 as i32),
                    })
                    .collect(),
                edges: game.map.edges().iter().map(|&(a, b)| [a.0, b.0]).collect(),
            },
            armies: game
                .armies
                .iter()
                .map(|a| FlatArmy {
                    id: a.id,
                    from: a.from.0,
                    to: a.to.0,
                    troops: a.troops,
                    distance: a.distance,
                    team: a.team,
                })
                .collect(),
        }),
        players: room.players.clone(),
        spectators: room.spectators.clone(),
        summary: room.summary.clone(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::BTreeSet;

    pub fn summary() -> RoomSummary {
        RoomSummary {
            id: "room".into(),
            name: "Room".into(),
            n_players: 2,
            max_players: 2,
            n_spectators: 0,
        }
    }

    pub fn flat_node(id: u32, x: f64, y: f64, team: Team, troops: u32) -> FlatNode {
        FlatNode {
            id,
            x,
            y,
            adj: vec![],
            team,
            troops,
            node_type: NodeType::Normal,
            assign: NO_ASSIGN,
        }
    }

    pub fn flat_room(game: Option<FlatGame>) -> FlatRoom {
        FlatRoom {
            game,
            players: vec![
                Player {
                    id: 0,
                    name: "red".into(),
                    team: Team::Red,
                },
                Player {
                    id: 1,
                    name: "blue".into(),
                    team: Team::Blue,
                },
            ],
            spectators: vec![],
            summary: summary(),
        }
    }

    /// Triangle map: node 0 Red with 5 troops, nodes 1 and 2 Neutral,
    /// all three edges present. The fixture behind the fog-of-war tests.
    pub fn triangle() -> FlatGame {
        let mut nodes = vec![
            flat_node(0, 0.0, 0.0, Team::Red, 5),
            flat_node(1, 10.0, 0.0, Team::Neutral, 3),
            flat_node(2, 0.0, 10.0, Team::Neutral, 4),
        ];
        nodes[0].adj = vec![1, 2];
        nodes[1].adj = vec![0, 2];
        nodes[2].adj = vec![0, 1];
        FlatGame {
            map: FlatMap {
                nodes,
                edges: vec![[0, 1], [0, 2], [1, 2]],
            },
            armies: vec![],
        }
    }

    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            self.0 >> 33
        }
    }

    fn generated_map(n: u32, seed: u64) -> FlatGame {
        let mut rng = Lcg(seed);
        let mut nodes: Vec<FlatNode> = (0..n)
            .map(|id| {
                flat_node(
                    id,
                    (rng.next() % 100) as f64,
                    (rng.next() % 100) as f64,
                    Team::Neutral,
                    rng.next() as u32 % 50,
                )
            })
            .collect();
        let mut edges = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                if rng.next() % 3 == 0 {
                    nodes[i as usize].adj.push(j);
                    nodes[j as usize].adj.push(i);
                    edges.push([i, j]);
                }
            }
        }
        for i in 0..n {
            if rng.next() % 4 == 0 {
                let target = rng.next() as u32 % n;
                if target != i {
                    nodes[i as usize].assign = target as i32;
                }
            }
        }
        FlatGame {
            map: FlatMap { nodes, edges },
            armies: vec![],
        }
    }

    #[test]
    fn rehydrate_resolves_adjacency_and_assign() {
        let mut game = triangle();
        game.map.nodes[0].assign = 2;
        let room = rehydrate(flat_room(Some(game))).unwrap();
        let map = &room.game.unwrap().map;

        let n0 = map.find(0).unwrap();
        let node0 = map.node(n0);
        assert_eq!(node0.adj.len(), 2);
        assert_eq!(map.node(node0.adj[0]).id, 1);
        assert_eq!(map.node(node0.adj[1]).id, 2);
        assert_eq!(map.node(node0.assign.unwrap()).id, 2);
        assert_eq!(map.node(map.find(1).unwrap()).assign, None);
    }

    #[test]
    fn rehydrate_round_trips_generated_maps() {
        for seed in [1, 7, 42] {
            let flat = flat_room(Some(generated_map(17, seed)));
            let room = rehydrate(flat.clone()).unwrap();
            let back = flatten(&room);

            let orig = flat.game.as_ref().unwrap();
            let echo = back.game.as_ref().unwrap();
            assert_eq!(echo.map.nodes.len(), orig.map.nodes.len());
            for (a, b) in orig.map.nodes.iter().zip(&echo.map.nodes) {
                let orig_adj: BTreeSet<u32> = a.adj.iter().copied().collect();
                let echo_adj: BTreeSet<u32> = b.adj.iter().copied().collect();
                assert_eq!(orig_adj, echo_adj, "node {}", a.id);
                assert_eq!(a.assign.max(NO_ASSIGN), b.assign, "node {}", a.id);
            }
            assert_eq!(echo.map.edges, orig.map.edges);
        }
    }

    #[test]
    fn room_without_game_skips_rehydration() {
        let room = rehydrate(flat_room(None)).unwrap();
        assert!(room.game.is_none());
        assert_eq!(room.players.len(), 2);
    }

    #[test]
    fn out_of_range_adjacency_rejects_snapshot() {
        let mut game = triangle();
        game.map.nodes[1].adj.push(9);
        let err = rehydrate(flat_room(Some(game))).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::AdjOutOfRange {
                node: 1,
                index: 9,
                len: 3
            }
        );
    }

    #[test]
    fn out_of_range_assign_rejects_snapshot() {
        let mut game = triangle();
        game.map.nodes[2].assign = 3;
        let err = rehydrate(flat_room(Some(game))).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::AssignOutOfRange {
                node: 2,
                index: 3,
                len: 3
            }
        );
    }

    #[test]
    fn out_of_range_edge_rejects_snapshot() {
        let mut game = triangle();
        game.map.edges.push([2, 7]);
        let err = rehydrate(flat_room(Some(game))).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::EdgeOutOfRange {
                edge: 3,
                index: 7,
                len: 3
            }
        );
    }

    #[test]
    fn bad_army_rejects_snapshot() {
        let mut game = triangle();
        game.armies.push(FlatArmy {
            id: 0,
            from: 0,
            to: 5,
            troops: 10,
            distance: 0.5,
            team: Team::Red,
        });
        let err = rehydrate(flat_room(Some(game))).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::ArmyOutOfRange {
                army: 0,
                index: 5,
                len: 3
            }
        );

        let mut game = triangle();
        game.armies.push(FlatArmy {
            id: 1,
            from: 2,
            to: 2,
            troops: 10,
            distance: 0.0,
            team: Team::Red,
        });
        let err = rehydrate(flat_room(Some(game))).unwrap_err();
        assert_eq!(err, SnapshotError::ArmyDegenerate { army: 1, index: 2 });
    }
}
