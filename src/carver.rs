use rand::seq::SliceRandom;
use rand::Rng;

use crate::maze::{Dir, Maze, Pos};

struct Frame {
    pos: Pos,
    dirs: [Dir; 4],
    next: usize,
}

impl Frame {
    fn enter(maze: &mut Maze, pos: Pos, rng: &mut impl Rng) -> Self {
        if let Some(cell) = maze.cell_mut(pos) {
            cell.visited = true;
        }
        let mut dirs = Dir::ALL;
        dirs.shuffle(rng);
        Frame { pos, dirs, next: 0 }
    }
}

/// Randomized depth-first carve starting at `start`.
///
/// Each cell tries its four directions in a freshly shuffled order and
/// descends into the first unvisited live neighbour before trying the rest,
/// so the open walls form a spanning tree over the live cells reachable from
/// `start`. Runs on an explicit stack; dead cells are never entered.
pub fn carve_from(maze: &mut Maze, start: Pos, rng: &mut impl Rng) {
    let carvable = maze.in_bounds(start) && !maze.is_dead(start);
    debug_assert!(carvable, "carve start {:?} is out of bounds or dead", start);
    if !carvable {
        return;
    }

    let mut stack = vec![Frame::enter(maze, start, rng)];
    while let Some(top) = stack.last_mut() {
        if top.next >= top.dirs.len() {
            stack.pop();
            continue;
        }
        let pos = top.pos;
        let dir = top.dirs[top.next];
        top.next += 1;

        let Some(next) = maze.neighbor(pos, dir) else {
            continue;
        };
        let carvable = maze.cell(next).map_or(false, |c| !c.visited && !c.dead);
        if carvable && maze.open_between(pos, dir) {
            stack.push(Frame::enter(maze, next, rng));
        }
    }
}
