use std::collections::VecDeque;

use log::trace;

use crate::maze::{Dir, Maze, Pos, Quadrant};

/// Substep at which the mover snaps onto the next cell.
pub const SNAP_THRESHOLD: f32 = 0.98;
pub const DEFAULT_MOVE_INCREMENT: f32 = 0.5;
pub const MIN_MOVE_INCREMENT: f32 = 0.1;
pub const MAX_MOVE_INCREMENT: f32 = 1.0;
pub const SPEED_STEP: f32 = 0.1;
const TRAIL_LENGTH: usize = 10;

/// Size of one maze cell in the renderer's units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockGeometry {
    pub width: f32,
    pub height: f32,
}

impl Default for BlockGeometry {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailNode {
    pub cell: Pos,
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug)]
pub struct Trail {
    nodes: VecDeque<TrailNode>,
    max_len: usize,
}

impl Trail {
    pub fn new(max_len: usize) -> Self {
        Self {
            nodes: VecDeque::with_capacity(max_len),
            max_len,
        }
    }

    pub fn push(&mut self, node: TrailNode) {
        while self.nodes.len() >= self.max_len.max(1) {
            self.nodes.pop_front();
        }
        self.nodes.push_back(node);
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TrailNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Pos,
    pub quadrant: Quadrant,
    /// Cells still to snap onto; the head is the cell being moved toward.
    pub path: VecDeque<Pos>,
    pub moving: bool,
    pub move_substep: f32,
    pub move_increment: f32,
    pub trail: Trail,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(Pos::new(0, 0))
    }
}

impl Player {
    pub fn new(pos: Pos) -> Self {
        Self {
            pos,
            quadrant: Quadrant::TopLeft,
            path: VecDeque::new(),
            moving: false,
            move_substep: 0.0,
            move_increment: DEFAULT_MOVE_INCREMENT,
            trail: Trail::new(TRAIL_LENGTH),
        }
    }

    /// Starts a corridor run in `dir`. Ignored (returns false) while already
    /// moving or when the wall in `dir` is closed.
    pub fn move_in_direction(&mut self, maze: &Maze, dir: Dir) -> bool {
        if self.moving || maze.has_wall(self.pos, dir) {
            return false;
        }
        match maze.neighbor(self.pos, dir) {
            Some(next) if !maze.is_dead(next) => {}
            _ => return false,
        }
        self.path = make_movement_path(maze, self.pos, dir).into();
        self.moving = true;
        self.move_substep = 0.0;
        true
    }

    /// Advances an active run by one tick. Returns the cell snapped onto,
    /// if any. The remaining path is checked against the live walls after
    /// each snap and dropped if a wall has appeared in the way.
    pub fn update_movement(&mut self, maze: &Maze, geometry: BlockGeometry) -> Option<Pos> {
        if !self.moving {
            return None;
        }
        self.move_substep += self.move_increment;
        if self.move_substep < SNAP_THRESHOLD {
            return None;
        }

        let Some(target) = self.path.pop_front() else {
            self.stop();
            return None;
        };
        self.pos = target;
        self.move_substep = (self.move_substep - 1.0).max(0.0);
        self.trail.push(TrailNode {
            cell: target,
            x: target.x as f32 * geometry.width + geometry.width / 2.0,
            y: target.y as f32 * geometry.height + geometry.height / 2.0,
        });

        match self.path.front() {
            None => self.stop(),
            Some(&next) => {
                let blocked = Dir::between(self.pos, next).map_or(true, |d| maze.has_wall(self.pos, d));
                if blocked {
                    trace!("movement from {:?} toward {:?} cut by a wall", self.pos, next);
                    self.stop();
                }
            }
        }
        Some(target)
    }

    fn stop(&mut self) {
        self.path.clear();
        self.moving = false;
        self.move_substep = 0.0;
    }

    pub fn draw_position(&self) -> (f32, f32) {
        let (x, y) = (self.pos.x as f32, self.pos.y as f32);
        match self.path.front() {
            Some(head) if self.moving => {
                let t = self.move_substep;
                (x * (1.0 - t) + head.x as f32 * t, y * (1.0 - t) + head.y as f32 * t)
            }
            _ => (x, y),
        }
    }

    pub fn adjust_speed(&mut self, faster: bool) {
        let delta = if faster { SPEED_STEP } else { -SPEED_STEP };
        self.move_increment =
            (self.move_increment + delta).clamp(MIN_MOVE_INCREMENT, MAX_MOVE_INCREMENT);
    }
}

/// Cells of the corridor run entered by stepping from `from` in `dir`,
/// starting with `from` itself.
///
/// From each entered cell the run continues only if exactly one exit other
/// than the way back is open; zero exits is a dead end and two or more is a
/// junction, and both end the run there.
pub fn make_movement_path(maze: &Maze, from: Pos, dir: Dir) -> Vec<Pos> {
    let mut path = vec![from];
    let Some(mut current) = maze.neighbor(from, dir) else {
        return path;
    };
    path.push(current);
    let mut arrived = dir;
    // seams add cycles, so a ring of plain corridor cells must still end
    let limit = maze.width * maze.height;

    while path.len() <= limit {
        let mut exits = maze
            .open_dirs(current)
            .into_iter()
            .filter(|&d| d != arrived.opposite());
        let (Some(only), None) = (exits.next(), exits.next()) else {
            break;
        };
        let Some(next) = maze.neighbor(current, only) else {
            break;
        };
        path.push(next);
        current = next;
        arrived = only;
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor_maze() -> Maze {
        let mut maze = Maze::with_dead_size(3, 3, 0);
        maze.open_between(Pos::new(0, 0), Dir::South);
        maze.open_between(Pos::new(0, 1), Dir::South);
        maze
    }

    fn run_to_rest(player: &mut Player, maze: &Maze) -> usize {
        let mut ticks = 0;
        while player.moving && ticks < 1000 {
            player.update_movement(maze, BlockGeometry::default());
            ticks += 1;
        }
        ticks
    }

    #[test]
    fn corridor_runs_to_dead_end() {
        let maze = corridor_maze();
        let mut player = Player::new(Pos::new(0, 0));
        assert!(player.move_in_direction(&maze, Dir::South));
        let path: Vec<Pos> = player.path.iter().copied().collect();
        assert_eq!(path, vec![Pos::new(0, 0), Pos::new(0, 1), Pos::new(0, 2)]);
        assert!(player.moving);
    }

    #[test]
    fn corridor_stops_at_junction() {
        let mut maze = corridor_maze();
        maze.open_between(Pos::new(0, 1), Dir::East);
        let mut player = Player::new(Pos::new(0, 0));
        assert!(player.move_in_direction(&maze, Dir::South));
        let path: Vec<Pos> = player.path.iter().copied().collect();
        assert_eq!(path, vec![Pos::new(0, 0), Pos::new(0, 1)]);
    }

    #[test]
    fn corridor_follows_bends() {
        let mut maze = Maze::with_dead_size(3, 3, 0);
        maze.open_between(Pos::new(0, 0), Dir::East);
        maze.open_between(Pos::new(1, 0), Dir::South);
        maze.open_between(Pos::new(1, 1), Dir::East);
        let path = make_movement_path(&maze, Pos::new(0, 0), Dir::East);
        assert_eq!(
            path,
            vec![Pos::new(0, 0), Pos::new(1, 0), Pos::new(1, 1), Pos::new(2, 1)]
        );
    }

    #[test]
    fn corridor_ring_terminates() {
        let mut maze = Maze::with_dead_size(2, 2, 0);
        maze.open_between(Pos::new(0, 0), Dir::East);
        maze.open_between(Pos::new(1, 0), Dir::South);
        maze.open_between(Pos::new(1, 1), Dir::West);
        maze.open_between(Pos::new(0, 1), Dir::North);
        let path = make_movement_path(&maze, Pos::new(0, 0), Dir::East);
        assert!(path.len() <= 5);
    }

    #[test]
    fn blocked_or_busy_moves_are_ignored() {
        let maze = corridor_maze();
        let mut player = Player::new(Pos::new(0, 0));
        assert!(!player.move_in_direction(&maze, Dir::East));
        assert!(!player.move_in_direction(&maze, Dir::North));
        assert!(!player.moving);
        assert!(player.path.is_empty());

        assert!(player.move_in_direction(&maze, Dir::South));
        let planned = player.path.clone();
        assert!(!player.move_in_direction(&maze, Dir::South));
        assert_eq!(player.path, planned);
    }

    #[test]
    fn movement_walks_whole_run() {
        let maze = corridor_maze();
        let mut player = Player::new(Pos::new(0, 0));
        player.move_in_direction(&maze, Dir::South);
        let ticks = run_to_rest(&mut player, &maze);
        assert_eq!(player.pos, Pos::new(0, 2));
        assert!(!player.moving);
        assert!(player.path.is_empty());
        // three snaps at two ticks each
        assert_eq!(ticks, 6);
        assert_eq!(player.trail.len(), 3);
    }

    #[test]
    fn movement_aborts_when_wall_appears() {
        let mut maze = corridor_maze();
        let mut player = Player::new(Pos::new(0, 0));
        player.move_in_direction(&maze, Dir::South);
        // first snap lands on the start cell
        player.update_movement(&maze, BlockGeometry::default());
        player.update_movement(&maze, BlockGeometry::default());
        assert_eq!(player.pos, Pos::new(0, 0));

        maze.cell_mut(Pos::new(0, 1)).unwrap().walls[Dir::South.index()] = true;
        maze.cell_mut(Pos::new(0, 2)).unwrap().walls[Dir::North.index()] = true;
        player.update_movement(&maze, BlockGeometry::default());
        player.update_movement(&maze, BlockGeometry::default());
        assert_eq!(player.pos, Pos::new(0, 1));
        assert!(!player.moving);
        assert!(player.path.is_empty());
    }

    #[test]
    fn trail_records_pixel_centres() {
        let maze = corridor_maze();
        let geometry = BlockGeometry {
            width: 30.0,
            height: 20.0,
        };
        let mut player = Player::new(Pos::new(0, 0));
        player.move_in_direction(&maze, Dir::South);
        while player.moving {
            player.update_movement(&maze, geometry);
        }
        let last = player.trail.nodes().last().copied().unwrap();
        assert_eq!(last.cell, Pos::new(0, 2));
        assert_eq!((last.x, last.y), (15.0, 50.0));
    }

    #[test]
    fn trail_is_bounded() {
        let mut trail = Trail::new(3);
        for i in 0..5 {
            trail.push(TrailNode {
                cell: Pos::new(i, 0),
                x: 0.0,
                y: 0.0,
            });
        }
        let cells: Vec<usize> = trail.nodes().map(|n| n.cell.x).collect();
        assert_eq!(cells, vec![2, 3, 4]);
    }

    #[test]
    fn draw_position_interpolates() {
        let maze = corridor_maze();
        let mut player = Player::new(Pos::new(0, 0));
        player.move_in_direction(&maze, Dir::South);
        player.update_movement(&maze, BlockGeometry::default());
        player.update_movement(&maze, BlockGeometry::default());
        player.update_movement(&maze, BlockGeometry::default());
        assert_eq!(player.draw_position(), (0.0, 0.5));
    }

    #[test]
    fn speed_is_clamped() {
        let mut player = Player::default();
        for _ in 0..20 {
            player.adjust_speed(false);
        }
        assert!((player.move_increment - MIN_MOVE_INCREMENT).abs() < 1e-6);
        for _ in 0..20 {
            player.adjust_speed(true);
        }
        assert!((player.move_increment - MAX_MOVE_INCREMENT).abs() < 1e-6);
    }
}
