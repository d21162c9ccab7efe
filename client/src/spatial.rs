use crate::model::GameMap;
use crate::view::NODE_RADIUS;

const GRID_COLS: usize = 50;
const GRID_ROWS: usize = 50;

/// A flat 2D spatial grid over map space for O(1) pointer-to-node
/// hit-testing. Rebuilt only when a snapshot replaces the live model.
pub struct SpatialGrid {
    cells: Vec<Vec<usize>>,
    ids: Vec<u32>,
    xs: Vec<f64>,
    ys: Vec<f64>,
    min_x: f64,
    min_y: f64,
    cell_w: f64,
    cell_h: f64,
}

impl SpatialGrid {
    pub fn empty() -> Self {
        Self {
            cells: Vec::new(),
            ids: Vec::new(),
            xs: Vec::new(),
            ys: Vec::new(),
            min_x: 0.0,
            min_y: 0.0,
            cell_w: 1.0,
            cell_h: 1.0,
        }
    }

    pub fn build(map: &GameMap) -> Self {
        if map.is_empty() {
            return Self::empty();
        }

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for (_, node) in map.iter() {
            min_x = min_x.min(node.x - NODE_RADIUS);
            min_y = min_y.min(node.y - NODE_RADIUS);
            max_x = max_x.max(node.x + NODE_RADIUS);
            max_y = max_y.max(node.y + NODE_RADIUS);
        }

        // Small padding to avoid edge issues
        min_x -= 1.0;
        min_y -= 1.0;
        max_x += 1.0;
        max_y += 1.0;

        let cell_w = (max_x - min_x) / GRID_COLS as f64;
        let cell_h = (max_y - min_y) / GRID_ROWS as f64;

        let mut cells = vec![Vec::new(); GRID_COLS * GRID_ROWS];
        let mut ids = Vec::with_capacity(map.len());
        let mut xs = Vec::with_capacity(map.len());
        let mut ys = Vec::with_capacity(map.len());

        for (idx, (_, node)) in map.iter().enumerate() {
            ids.push(node.id);
            xs.push(node.x);
            ys.push(node.y);

            // Insert into every cell the node circle's bounding box overlaps
            let l = node.x - NODE_RADIUS;
            let r = node.x + NODE_RADIUS;
            let t = node.y - NODE_RADIUS;
            let b = node.y + NODE_RADIUS;
            let col_start = ((l - min_x) / cell_w).floor().max(0.0) as usize;
            let col_end = ((r - min_x) / cell_w).ceil().min(GRID_COLS as f64) as usize;
            let row_start = ((t - min_y) / cell_h).floor().max(0.0) as usize;
            let row_end = ((b - min_y) / cell_h).ceil().min(GRID_ROWS as f64) as usize;

            for row in row_start..row_end {
                for col in col_start..col_end {
                    cells[row * GRID_COLS + col].push(idx);
                }
            }
        }

        Self {
            cells,
            ids,
            xs,
            ys,
            min_x,
            min_y,
            cell_w,
            cell_h,
        }
    }

    /// Wire id of the node under a map-space point, or `None`.
    pub fn find_at(&self, wx: f64, wy: f64) -> Option<u32> {
        if self.cells.is_empty() {
            return None;
        }

        let col = ((wx - self.min_x) / self.cell_w).floor() as isize;
        let row = ((wy - self.min_y) / self.cell_h).floor() as isize;
        if col < 0 || row < 0 || col >= GRID_COLS as isize || row >= GRID_ROWS as isize {
            return None;
        }

        let cell = &self.cells[row as usize * GRID_COLS + col as usize];
        for &idx in cell {
            let dx = wx - self.xs[idx];
            let dy = wy - self.ys[idx];
            if dx * dx + dy * dy <= NODE_RADIUS * NODE_RADIUS {
                return Some(self.ids[idx]);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rehydrate;
    use crate::model::tests::{flat_room, triangle};

    #[test]
    fn hits_node_circles_and_misses_gaps() {
        let room = rehydrate(flat_room(Some(triangle()))).unwrap();
        let grid = SpatialGrid::build(&room.game.unwrap().map);

        assert_eq!(grid.find_at(0.0, 0.0), Some(0));
        assert_eq!(grid.find_at(1.5, 0.0), Some(0));
        assert_eq!(grid.find_at(10.0, 0.5), Some(1));
        assert_eq!(grid.find_at(0.2, 9.0), Some(2));
        // Between nodes, inside the map bounds.
        assert_eq!(grid.find_at(5.0, 5.0), None);
        // Far outside the grid.
        assert_eq!(grid.find_at(500.0, -500.0), None);
    }

    #[test]
    fn empty_grid_never_hits() {
        assert_eq!(SpatialGrid::empty().find_at(0.0, 0.0), None);
    }
}
