#![allow(dead_code)]

use dynpath::{GridMap, Position};
use std::collections::{HashSet, VecDeque};

/// Parse an ASCII layout: `#` blocked, `.` free, `S` start, `G` goal
pub fn parse_grid(layout: &str) -> (GridMap, Position, Position) {
    let lines: Vec<&str> = layout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let rows = lines.len() as i32;
    let cols = lines.first().map_or(0, |line| line.chars().count()) as i32;

    let mut grid = GridMap::new(cols, rows);
    let mut start = Position::new(0, 0);
    let mut goal = Position::new(cols - 1, rows - 1);

    for (y, line) in lines.iter().enumerate() {
        for (x, symbol) in line.chars().enumerate() {
            let pos = Position::new(x as i32, y as i32);
            match symbol {
                '#' => {
                    grid.set_blocked(pos);
                }
                'S' => start = pos,
                'G' => goal = pos,
                _ => {}
            }
        }
    }

    grid.protect(start);
    grid.protect(goal);
    (grid, start, goal)
}

/// Assert that `path` is a connected route of free cells from next-to-`start` to `goal`
pub fn assert_valid_path(grid: &GridMap, start: Position, goal: Position, path: &[Position]) {
    assert!(!path.is_empty(), "expected a path from {} to {}", start, goal);
    assert_eq!(path.last(), Some(&goal), "path must end at the goal");
    assert!(!path.contains(&start), "path must exclude the start cell");

    let mut previous = start;
    for &cell in path {
        assert!(
            previous.is_adjacent(&cell),
            "cells {} and {} are not 4-neighbours",
            previous,
            cell
        );
        assert!(grid.is_free(cell), "path crosses blocked cell {}", cell);
        previous = cell;
    }
}

/// Reference BFS distance, independent of the A* implementation
pub fn bfs_distance(grid: &GridMap, start: Position, goal: Position) -> Option<usize> {
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([(start, 0usize)]);
    while let Some((cell, dist)) = queue.pop_front() {
        if cell == goal {
            return Some(dist);
        }
        for next in cell.neighbors_4() {
            if grid.is_free(next) && seen.insert(next) {
                queue.push_back((next, dist + 1));
            }
        }
    }
    None
}

/// Visualize a path on a grid
pub fn visualize_path(grid: &GridMap, path: &[Position], start: Position, goal: Position) -> String {
    let mut result = String::new();
    for y in 0..grid.rows {
        for x in 0..grid.cols {
            let pos = Position::new(x, y);
            let symbol = if pos == start {
                'S'
            } else if pos == goal {
                'G'
            } else if path.contains(&pos) {
                '*'
            } else if grid.is_blocked(pos) {
                '█'
            } else {
                '.'
            };
            result.push(symbol);
        }
        result.push('\n');
    }
    result
}
