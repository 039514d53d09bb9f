use std::collections::VecDeque;

/// Side length of the void square in the middle of the full maze.
pub const DEFAULT_DEAD_SIZE: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    North,
    East,
    South,
    West,
}

impl Dir {
    /// Wall-array order: a cell's `walls[d.index()]` is the wall facing `d`.
    pub const ALL: [Dir; 4] = [Dir::North, Dir::East, Dir::South, Dir::West];

    pub fn index(self) -> usize {
        match self {
            Dir::North => 0,
            Dir::East => 1,
            Dir::South => 2,
            Dir::West => 3,
        }
    }

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::North => (0, -1),
            Dir::East => (1, 0),
            Dir::South => (0, 1),
            Dir::West => (-1, 0),
        }
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::North => Dir::South,
            Dir::East => Dir::West,
            Dir::South => Dir::North,
            Dir::West => Dir::East,
        }
    }

    pub fn between(from: Pos, to: Pos) -> Option<Dir> {
        let dx = to.x as isize - from.x as isize;
        let dy = to.y as isize - from.y as isize;
        Dir::ALL.into_iter().find(|d| d.delta() == (dx, dy))
    }
}

/// The four sub-mazes, clockwise from the top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomRight,
        Quadrant::BottomLeft,
    ];

    pub fn index(self) -> usize {
        match self {
            Quadrant::TopLeft => 0,
            Quadrant::TopRight => 1,
            Quadrant::BottomRight => 2,
            Quadrant::BottomLeft => 3,
        }
    }

    pub fn from_index(idx: usize) -> Quadrant {
        Quadrant::ALL[idx % 4]
    }

    pub fn offset(self) -> (usize, usize) {
        match self {
            Quadrant::TopLeft => (0, 0),
            Quadrant::TopRight => (1, 0),
            Quadrant::BottomRight => (1, 1),
            Quadrant::BottomLeft => (0, 1),
        }
    }

    pub fn opposite(self) -> Quadrant {
        Quadrant::from_index(self.index() + 2)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn step(self, dir: Dir, width: usize, height: usize) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let nx = self.x as isize + dx;
        let ny = self.y as isize + dy;
        if nx < 0 || ny < 0 {
            return None;
        }
        let nx = nx as usize;
        let ny = ny as usize;
        if nx >= width || ny >= height {
            return None;
        }
        Some(Pos { x: nx, y: ny })
    }
}

/// Content attached to a cell, reported when the player enters or leaves it.
#[derive(Clone, Debug, PartialEq)]
pub enum Feature {
    Wisdom { title: String, text: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub walls: [bool; 4],
    pub visited: bool,
    pub dead: bool,
    pub features: Vec<Feature>,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            walls: [true; 4],
            visited: false,
            dead: false,
            features: Vec::new(),
        }
    }
}

impl Cell {
    pub fn has_wall(&self, dir: Dir) -> bool {
        self.walls[dir.index()]
    }
}

/// True when the global coordinate `g` lies in the centred dead square of a
/// `full_width` x `full_height` maze.
///
/// Both construction modes go through here; quadrant mazes translate their
/// local coordinates first so the four dead corners tile into one square.
pub fn in_dead_zone(g: Pos, full_width: usize, full_height: usize, dead_size: usize) -> bool {
    fn within(v: usize, len: usize, dead: usize) -> bool {
        let lo = (len / 2).saturating_sub(dead / 2);
        v >= lo && v < lo + dead
    }
    within(g.x, full_width, dead_size) && within(g.y, full_height, dead_size)
}

/// A grid of cells indexed `[x][y]`, either a whole maze or one quadrant of it.
#[derive(Clone, Debug, PartialEq)]
pub struct Maze {
    pub width: usize,
    pub height: usize,
    pub dead_size: usize,
    pub(crate) grid: Vec<Vec<Cell>>,
}

impl Maze {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_dead_size(width, height, DEFAULT_DEAD_SIZE)
    }

    pub fn with_dead_size(width: usize, height: usize, dead_size: usize) -> Self {
        Self::build(width, height, dead_size, |pos| {
            in_dead_zone(pos, width, height, dead_size)
        })
    }

    /// A quadrant-sized maze whose dead cells are those that will fall in
    /// the dead zone once it is placed at `quadrant` in a `2*width` x
    /// `2*height` maze.
    pub fn as_quadrant(width: usize, height: usize, dead_size: usize, quadrant: Quadrant) -> Self {
        let (qx, qy) = quadrant.offset();
        Self::build(width, height, dead_size, |pos| {
            let global = Pos::new(width * qx + pos.x, height * qy + pos.y);
            in_dead_zone(global, width * 2, height * 2, dead_size)
        })
    }

    fn build(
        width: usize,
        height: usize,
        dead_size: usize,
        is_dead: impl Fn(Pos) -> bool,
    ) -> Self {
        let grid: Vec<Vec<Cell>> = (0..width)
            .map(|x| {
                (0..height)
                    .map(|y| Cell {
                        dead: is_dead(Pos::new(x, y)),
                        ..Cell::default()
                    })
                    .collect()
            })
            .collect();
        Self {
            width,
            height,
            dead_size,
            grid,
        }
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    pub fn cell(&self, pos: Pos) -> Option<&Cell> {
        self.grid.get(pos.x).and_then(|col| col.get(pos.y))
    }

    pub fn cell_mut(&mut self, pos: Pos) -> Option<&mut Cell> {
        self.grid.get_mut(pos.x).and_then(|col| col.get_mut(pos.y))
    }

    pub fn neighbor(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        pos.step(dir, self.width, self.height)
    }

    /// Out-of-bounds positions count as walled.
    pub fn has_wall(&self, pos: Pos, dir: Dir) -> bool {
        self.cell(pos).map_or(true, |c| c.has_wall(dir))
    }

    pub fn is_dead(&self, pos: Pos) -> bool {
        self.cell(pos).map_or(false, |c| c.dead)
    }

    pub fn open_dirs(&self, pos: Pos) -> Vec<Dir> {
        Dir::ALL
            .into_iter()
            .filter(|&d| !self.has_wall(pos, d) && self.neighbor(pos, d).is_some())
            .collect()
    }

    /// Clears the wall between `pos` and its neighbour in `dir` on both cells.
    /// Returns false without touching anything when the neighbour is out of
    /// bounds or either cell is dead.
    pub fn open_between(&mut self, pos: Pos, dir: Dir) -> bool {
        let Some(next) = self.neighbor(pos, dir) else {
            return false;
        };
        if !self.in_bounds(pos) || self.is_dead(pos) || self.is_dead(next) {
            return false;
        }
        self.grid[pos.x][pos.y].walls[dir.index()] = false;
        self.grid[next.x][next.y].walls[dir.opposite().index()] = false;
        true
    }

    /// Logical quadrant of a full-maze coordinate. Left iff `x < width/2`,
    /// top iff `y < height/2`.
    pub fn position_quadrant(&self, pos: Pos) -> Quadrant {
        let left = pos.x < self.width / 2;
        let top = pos.y < self.height / 2;
        match (top, left) {
            (true, true) => Quadrant::TopLeft,
            (true, false) => Quadrant::TopRight,
            (false, false) => Quadrant::BottomRight,
            (false, true) => Quadrant::BottomLeft,
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.width).flat_map(move |x| (0..self.height).map(move |y| Pos::new(x, y)))
    }

    pub fn live_cells(&self) -> impl Iterator<Item = Pos> + '_ {
        self.positions().filter(move |&p| !self.is_dead(p))
    }

    pub fn find_asymmetric_wall(&self) -> Option<(Pos, Dir)> {
        for pos in self.positions() {
            for dir in [Dir::East, Dir::South] {
                if let Some(next) = self.neighbor(pos, dir) {
                    if self.has_wall(pos, dir) != self.has_wall(next, dir.opposite()) {
                        return Some((pos, dir));
                    }
                }
            }
        }
        None
    }

    pub fn open_pair_count(&self) -> usize {
        self.positions()
            .map(|pos| {
                [Dir::East, Dir::South]
                    .into_iter()
                    .filter(|&d| self.neighbor(pos, d).is_some() && !self.has_wall(pos, d))
                    .count()
            })
            .sum()
    }

    // indexed [x][y]
    pub fn reachable_from(&self, start: Pos) -> Vec<Vec<bool>> {
        let mut seen = vec![vec![false; self.height]; self.width];
        if !self.in_bounds(start) {
            return seen;
        }
        let mut q = VecDeque::new();
        seen[start.x][start.y] = true;
        q.push_back(start);
        while let Some(pos) = q.pop_front() {
            for dir in self.open_dirs(pos) {
                if let Some(next) = self.neighbor(pos, dir) {
                    if !seen[next.x][next.y] {
                        seen[next.x][next.y] = true;
                        q.push_back(next);
                    }
                }
            }
        }
        seen
    }

    pub fn is_connected_from(&self, start: Pos) -> bool {
        let seen = self.reachable_from(start);
        self.live_cells().all(|p| seen[p.x][p.y])
    }
}
