use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::carver::carve_from;
use crate::error::MazeError;
use crate::maze::{Maze, Pos, Quadrant};
use crate::stitch::{splice_quadrant, stitch_quadrants};

/// Builds quadrant mazes and joins them into the live maze.
pub struct MazeGenerator {
    width: usize,
    height: usize,
    dead_size: usize,
    rng: StdRng,
}

impl MazeGenerator {
    pub fn new(
        width: usize,
        height: usize,
        dead_size: usize,
        seed: Option<u64>,
    ) -> Result<Self, MazeError> {
        if width < 4 || height < 4 || width % 2 != 0 || height % 2 != 0 {
            return Err(MazeError::InvalidDimensions { width, height });
        }
        if dead_size + 2 > width.min(height) {
            return Err(MazeError::DeadZoneTooLarge {
                dead_size,
                width,
                height,
            });
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            width,
            height,
            dead_size,
            rng,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dead_size(&self) -> usize {
        self.dead_size
    }

    pub fn quadrant_size(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Quadrant-local cell the carve starts from: the quadrant's outer corner.
    pub fn carve_start(&self, quadrant: Quadrant) -> Pos {
        let (qw, qh) = self.quadrant_size();
        let (qx, qy) = quadrant.offset();
        Pos::new(qx * (qw - 1), qy * (qh - 1))
    }

    pub fn generate_quadrant(&mut self, quadrant: Quadrant) -> Maze {
        let (qw, qh) = self.quadrant_size();
        let mut maze = Maze::as_quadrant(qw, qh, self.dead_size, quadrant);
        let start = self.carve_start(quadrant);
        carve_from(&mut maze, start, &mut self.rng);
        maze
    }

    pub fn generate_maze(&mut self) -> Maze {
        let quadrants = Quadrant::ALL.map(|q| self.generate_quadrant(q));
        info!(
            "generated {}x{} maze (dead zone {})",
            self.width, self.height, self.dead_size
        );
        stitch_quadrants(quadrants)
    }

    /// Carves a new layout for `quadrant` and splices it into `maze`. The
    /// other three quadrants keep their cells.
    pub fn regenerate_quadrant(&mut self, maze: &mut Maze, quadrant: Quadrant) {
        let fresh = self.generate_quadrant(quadrant);
        splice_quadrant(maze, quadrant, fresh);
        debug!("regenerated quadrant {:?}", quadrant);
    }
}
