pub mod carver;
pub mod config;
pub mod error;
pub mod game;
pub mod generator;
pub mod lore;
pub mod maze;
pub mod player;
pub mod stitch;

pub use error::MazeError;
pub use game::{Game, GameEvent, Intent};
pub use maze::{Cell, Dir, Feature, Maze, Pos, Quadrant};
