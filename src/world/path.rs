//! Waypoint queries.
//!
//! Pathfinding proper is a collaborator concern; the engine only ever asks
//! "from here, toward there, where is the next cell?". [`SimplePlanner`] is
//! the shipped answer for open ground.

use std::fmt;

use crate::world::map::{Coord, Map};

/// Supplies the next waypoint on a path.
///
/// Implementations must be deterministic: the same query against the same
/// map always yields the same cell.
pub trait PathPlanner: Send {
    /// The next cell on the path from `from` toward `to`.
    ///
    /// Returns `from` itself when the two coincide. The result is always on
    /// the map and at most one king move away from `from`.
    fn next_step(&self, map: &Map, from: Coord, to: Coord) -> Coord;
}

impl fmt::Debug for dyn PathPlanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn PathPlanner")
    }
}

/// Straight-line planner for maps without obstacles.
///
/// Closes the larger axis gap first, one cell per query, so paths are
/// L-shaped and reproducible.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplePlanner;

impl PathPlanner for SimplePlanner {
    fn next_step(&self, map: &Map, from: Coord, to: Coord) -> Coord {
        let to = Coord::new(to.x.min(map.size() - 1), to.y.min(map.size() - 1));
        if from == to {
            return from;
        }

        let dx = from.x.abs_diff(to.x);
        let dy = from.y.abs_diff(to.y);
        let step_x = match to.x.cmp(&from.x) {
            std::cmp::Ordering::Greater => from.x + 1,
            std::cmp::Ordering::Less => from.x - 1,
            std::cmp::Ordering::Equal => from.x,
        };
        let step_y = match to.y.cmp(&from.y) {
            std::cmp::Ordering::Greater => from.y + 1,
            std::cmp::Ordering::Less => from.y - 1,
            std::cmp::Ordering::Equal => from.y,
        };

        if dx >= dy {
            Coord::new(step_x, from.y)
        } else {
            Coord::new(from.x, step_y)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> Map {
        Map::new(30).expect("nonzero size")
    }

    #[test]
    fn test_step_noop_at_destination() {
        let planner = SimplePlanner;
        let here = Coord::new(4, 4);
        assert_eq!(planner.next_step(&map(), here, here), here);
    }

    #[test]
    fn test_step_closes_larger_axis_first() {
        let planner = SimplePlanner;
        let from = Coord::new(0, 0);
        assert_eq!(planner.next_step(&map(), from, Coord::new(5, 2)), Coord::new(1, 0));
        assert_eq!(planner.next_step(&map(), from, Coord::new(2, 5)), Coord::new(0, 1));
    }

    #[test]
    fn test_path_reaches_destination() {
        let planner = SimplePlanner;
        let map = map();
        let mut pos = Coord::new(0, 0);
        let dest = Coord::new(7, 3);
        for _ in 0..10 {
            pos = planner.next_step(&map, pos, dest);
        }
        assert_eq!(pos, dest);
    }

    #[test]
    fn test_offmap_destination_is_clamped() {
        let planner = SimplePlanner;
        let map = map();
        let mut pos = Coord::new(28, 28);
        for _ in 0..4 {
            pos = planner.next_step(&map, pos, Coord::new(100, 100));
            assert!(map.contains(pos));
        }
        assert_eq!(pos, Coord::new(29, 29));
    }
}
