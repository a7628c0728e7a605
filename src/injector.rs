//! Dynamic obstacle placement with reachability validation.
//!
//! Every placement is checked by replanning from the agent. A placement
//! that leaves the goal unreachable is rolled back before control returns,
//! so the agent always keeps a route it already had.

use crate::pathfinding::{find_path, Path, Position};
use crate::GridMap;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Result of a single injection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InjectionOutcome {
    /// Obstacle placed and kept
    Accepted { cell: Position },
    /// Obstacle placed, found to strand the agent, and removed again
    Reverted { cell: Position },
    /// No eligible cell; grid untouched
    Skipped,
}

impl InjectionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, InjectionOutcome::Accepted { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ObstacleInjector {
    goal: Position,
    /// Also revert off-path placements that sever the last route
    validate_off_path: bool,
}

impl ObstacleInjector {
    pub fn new(goal: Position, validate_off_path: bool) -> Self {
        ObstacleInjector {
            goal,
            validate_off_path,
        }
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    /// Place one obstacle, preferring a cell on `current_path`.
    ///
    /// Returns the path the caller should adopt together with what happened.
    /// On `Skipped` the returned path is `current_path` unchanged.
    pub fn inject<'a, R, I>(
        &self,
        grid: &mut GridMap,
        rng: &mut R,
        agent_pos: Position,
        current_path: I,
    ) -> (Path, InjectionOutcome)
    where
        R: Rng + ?Sized,
        I: IntoIterator<Item = &'a Position>,
    {
        let current: Path = current_path.into_iter().copied().collect();
        let on_path: Vec<Position> = current
            .iter()
            .copied()
            .filter(|&cell| self.is_eligible(grid, agent_pos, cell))
            .collect();

        if let Some(&cell) = on_path.choose(rng) {
            return self.place(grid, agent_pos, cell, true);
        }

        let mut excluding = vec![agent_pos, self.goal];
        excluding.extend_from_slice(grid.protected_cells());
        match grid.random_free_cell(rng, &excluding) {
            Some(cell) => self.place(grid, agent_pos, cell, self.validate_off_path),
            None => {
                debug!("[inject] no free cell available, skipping");
                (current, InjectionOutcome::Skipped)
            }
        }
    }

    /// Place an obstacle at a chosen cell, reverting if it strands the agent.
    ///
    /// Ineligible cells (agent, goal, protected, already blocked, out of
    /// bounds) are skipped and the current route is replanned unchanged.
    pub fn inject_at(&self, grid: &mut GridMap, agent_pos: Position, cell: Position) -> (Path, InjectionOutcome) {
        if !self.is_eligible(grid, agent_pos, cell) {
            debug!("[inject] {} is not eligible, skipping", cell);
            return (find_path(grid, agent_pos, self.goal), InjectionOutcome::Skipped);
        }
        self.place(grid, agent_pos, cell, true)
    }

    fn is_eligible(&self, grid: &GridMap, agent_pos: Position, cell: Position) -> bool {
        cell != agent_pos && cell != self.goal && !grid.is_protected(cell) && grid.is_free(cell)
    }

    fn place(&self, grid: &mut GridMap, agent_pos: Position, cell: Position, validate: bool) -> (Path, InjectionOutcome) {
        grid.set_blocked(cell);
        let path = find_path(grid, agent_pos, self.goal);

        if !path.is_empty() || !validate {
            debug!("[inject] accepted obstacle at {}, new path length {}", cell, path.len());
            return (path, InjectionOutcome::Accepted { cell });
        }

        grid.set_free(cell);
        let path = find_path(grid, agent_pos, self.goal);
        debug!("[inject] obstacle at {} would strand agent at {}, reverted", cell, agent_pos);
        (path, InjectionOutcome::Reverted { cell })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// 3x3 grid whose only route runs along the top row and down the right column
    fn corridor() -> GridMap {
        let mut grid = GridMap::with_blocked(
            3,
            3,
            &[Position::new(0, 1), Position::new(1, 1), Position::new(0, 2), Position::new(1, 2)],
        );
        grid.protect(Position::new(0, 0));
        grid.protect(Position::new(2, 2));
        grid
    }

    #[test]
    fn single_route_injection_is_reverted() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut grid = corridor();
        let injector = ObstacleInjector::new(Position::new(2, 2), true);
        let start = Position::new(0, 0);
        let before = find_path(&grid, start, injector.goal());
        let snapshot = grid.occupancy().to_vec();

        let (path, outcome) = injector.inject(&mut grid, &mut rng, start, &before);

        assert!(matches!(outcome, InjectionOutcome::Reverted { .. }));
        assert_eq!(path, before);
        assert_eq!(grid.occupancy(), snapshot.as_slice());
    }

    #[test]
    fn empty_path_falls_back_to_off_path_placement() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut grid = GridMap::new(4, 4);
        grid.protect(Position::new(0, 0));
        grid.protect(Position::new(3, 3));
        let injector = ObstacleInjector::new(Position::new(3, 3), true);

        let (path, outcome) = injector.inject(&mut grid, &mut rng, Position::new(0, 0), &Vec::new());

        assert!(outcome.is_accepted());
        assert_eq!(grid.blocked_count(), 1);
        assert_eq!(path.len(), 6);
    }

    #[test]
    fn saturated_grid_is_skipped() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut grid = GridMap::new(2, 1);
        grid.protect(Position::new(0, 0));
        grid.protect(Position::new(1, 0));
        let injector = ObstacleInjector::new(Position::new(1, 0), true);
        let current = vec![Position::new(1, 0)];

        let (path, outcome) = injector.inject(&mut grid, &mut rng, Position::new(0, 0), &current);

        assert_eq!(outcome, InjectionOutcome::Skipped);
        assert_eq!(path, current);
        assert_eq!(grid.revision(), 0);
    }

    #[test]
    fn unvalidated_off_path_placement_can_strand() {
        // Both free non-protected cells lie on the only route
        let mut grid = GridMap::with_blocked(3, 2, &[Position::new(0, 1), Position::new(1, 1)]);
        grid.protect(Position::new(0, 0));
        grid.protect(Position::new(2, 1));
        let mut rng = StdRng::seed_from_u64(9);

        let strict = ObstacleInjector::new(Position::new(2, 1), true);
        let mut strict_grid = grid.clone();
        let (path, outcome) = strict.inject(&mut strict_grid, &mut rng, Position::new(0, 0), &Vec::new());
        assert!(matches!(outcome, InjectionOutcome::Reverted { .. }));
        assert_eq!(path.len(), 3);

        let lax = ObstacleInjector::new(Position::new(2, 1), false);
        let (path, outcome) = lax.inject(&mut grid, &mut rng, Position::new(0, 0), &Vec::new());
        assert!(outcome.is_accepted());
        assert!(path.is_empty());
    }

    #[test]
    fn inject_at_rejects_agent_and_goal() {
        let mut grid = GridMap::new(3, 3);
        let injector = ObstacleInjector::new(Position::new(2, 2), true);
        let agent = Position::new(0, 0);

        let (_, outcome) = injector.inject_at(&mut grid, agent, agent);
        assert_eq!(outcome, InjectionOutcome::Skipped);
        let (path, outcome) = injector.inject_at(&mut grid, agent, Position::new(2, 2));
        assert_eq!(outcome, InjectionOutcome::Skipped);
        assert_eq!(path.len(), 4);
        assert_eq!(grid.blocked_count(), 0);
    }
}
