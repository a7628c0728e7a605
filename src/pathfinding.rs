use crate::GridMap;
use log::trace;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// A position on the grid
///
/// Field order matters: the derived `Ord` compares `x` then `y`, which is the
/// tie-break the planner relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// 4-connected neighbours in search order: left, right, up, down
    pub fn neighbors_4(&self) -> [Position; 4] {
        [
            Position::new(self.x - 1, self.y),
            Position::new(self.x + 1, self.y),
            Position::new(self.x, self.y - 1),
            Position::new(self.x, self.y + 1),
        ]
    }

    pub fn is_adjacent(&self, other: &Position) -> bool {
        manhattan(*self, *other) == 1
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Planned route from (excluding) the start cell to the goal (inclusive)
pub type Path = Vec<Position>;

/// Manhattan distance, the admissible heuristic for unit-cost 4-connected moves
pub fn manhattan(a: Position, b: Position) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

/// A frontier entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PathNode {
    priority: u32,
    position: Position,
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .priority
            .cmp(&self.priority)
            // Tie-breaker: smallest (x, y) pops first
            .then_with(|| other.position.cmp(&self.position))
    }
}

/// Shortest 4-connected path from `start` to `goal`.
///
/// Returns the cells after `start` up to and including `goal`, or an empty
/// path when the goal cannot be reached (or `start == goal`).
pub fn find_path(grid: &GridMap, start: Position, goal: Position) -> Path {
    if start == goal || !grid.in_bounds(start) || grid.is_blocked(goal) {
        return Vec::new();
    }

    let mut frontier = BinaryHeap::new();
    let mut came_from: HashMap<Position, Position> = HashMap::new();
    let mut cost_so_far: HashMap<Position, u32> = HashMap::new();

    frontier.push(PathNode {
        priority: 0,
        position: start,
    });
    cost_so_far.insert(start, 0);

    let mut expanded = 0usize;
    let mut reached = false;

    while let Some(node) = frontier.pop() {
        let current = node.position;
        let current_cost = cost_so_far[&current];

        if current == goal {
            reached = true;
            break;
        }

        // Stale entry: a cheaper route to this cell was pushed after it
        if node.priority > current_cost + manhattan(current, goal) {
            continue;
        }
        expanded += 1;

        for next in current.neighbors_4() {
            if grid.is_blocked(next) {
                continue;
            }
            let new_cost = current_cost + 1;
            let improves = match cost_so_far.get(&next) {
                Some(&cost) => new_cost < cost,
                None => true,
            };
            if improves {
                cost_so_far.insert(next, new_cost);
                came_from.insert(next, current);
                frontier.push(PathNode {
                    priority: new_cost + manhattan(next, goal),
                    position: next,
                });
            }
        }
    }

    trace!(
        "[find_path] {} -> {}: reached={} expanded={}",
        start,
        goal,
        reached,
        expanded
    );

    if !reached {
        return Vec::new();
    }
    reconstruct_path(&came_from, start, goal)
}

/// Walk predecessor links from `goal` back to `start` (exclusive)
fn reconstruct_path(came_from: &HashMap<Position, Position>, start: Position, goal: Position) -> Path {
    let mut path = Vec::new();
    let mut current = goal;
    while current != start {
        let Some(&prev) = came_from.get(&current) else {
            return Vec::new();
        };
        path.push(current);
        current = prev;
    }
    path.reverse();
    path
}

/// Format path for display
pub fn format_path(path: &[Position]) -> String {
    if path.is_empty() {
        return "No path".to_string();
    }

    path.iter()
        .map(|pos| pos.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
