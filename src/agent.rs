use crate::pathfinding::Position;
use std::collections::VecDeque;

/// The agent walking the planned path one cell at a time
#[derive(Clone, Debug)]
pub struct Agent {
    /// Current cell; always a free cell of the grid
    pub position: Position,

    /// Cell the agent is trying to reach
    pub goal: Position,

    /// Number of cells moved so far
    pub steps_taken: usize,

    /// Cells previously occupied, oldest first
    pub trail: Vec<Position>,

    goal_reached: bool,
}

impl Agent {
    /// Create a new agent standing on `start`
    pub fn new(start: Position, goal: Position) -> Self {
        Agent {
            position: start,
            goal,
            steps_taken: 0,
            trail: Vec::new(),
            goal_reached: start == goal,
        }
    }

    pub fn is_goal_reached(&self) -> bool {
        self.goal_reached
    }

    /// Move onto the head of `path`.
    ///
    /// Returns true if the agent moved. Once the path is consumed with the
    /// agent standing on the goal, the goal-reached flag latches.
    pub fn step(&mut self, path: &mut VecDeque<Position>) -> bool {
        if self.goal_reached {
            return false;
        }

        let moved = match path.pop_front() {
            Some(next) => {
                self.trail.push(self.position);
                self.position = next;
                self.steps_taken += 1;
                true
            }
            None => false,
        };

        if path.is_empty() && self.position == self.goal {
            self.goal_reached = true;
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_walks_path_to_goal() {
        let goal = Position::new(2, 0);
        let mut agent = Agent::new(Position::new(0, 0), goal);
        let mut path: VecDeque<Position> = vec![Position::new(1, 0), goal].into();

        assert!(agent.step(&mut path));
        assert_eq!(agent.position, Position::new(1, 0));
        assert!(!agent.is_goal_reached());

        assert!(agent.step(&mut path));
        assert_eq!(agent.position, goal);
        assert!(agent.is_goal_reached());
        assert_eq!(agent.steps_taken, 2);
        assert_eq!(agent.trail, vec![Position::new(0, 0), Position::new(1, 0)]);
    }

    #[test]
    fn test_agent_stays_put_on_empty_path() {
        let mut agent = Agent::new(Position::new(0, 0), Position::new(3, 3));
        let mut path = VecDeque::new();

        assert!(!agent.step(&mut path));
        assert_eq!(agent.position, Position::new(0, 0));
        assert_eq!(agent.steps_taken, 0);
        assert!(!agent.is_goal_reached());
    }

    #[test]
    fn test_agent_ignores_steps_after_goal() {
        let goal = Position::new(1, 0);
        let mut agent = Agent::new(Position::new(0, 0), goal);
        let mut path: VecDeque<Position> = vec![goal].into();
        agent.step(&mut path);

        let mut extra: VecDeque<Position> = vec![Position::new(1, 1)].into();
        assert!(!agent.step(&mut extra));
        assert_eq!(agent.position, goal);
        assert_eq!(extra.len(), 1);
    }

    #[test]
    fn test_agent_starting_on_goal() {
        let agent = Agent::new(Position::new(4, 4), Position::new(4, 4));
        assert!(agent.is_goal_reached());
    }
}
