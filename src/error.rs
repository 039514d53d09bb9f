use thiserror::Error;

/// Errors raised while configuring or constructing a maze.
#[derive(Debug, Error, PartialEq)]
pub enum MazeError {
    #[error("maze dimensions {width}x{height} must be even and at least 4x4")]
    InvalidDimensions { width: usize, height: usize },

    #[error("dead zone of size {dead_size} does not fit a {width}x{height} maze")]
    DeadZoneTooLarge {
        dead_size: usize,
        width: usize,
        height: usize,
    },

    #[error("invalid value {value:?} for setting {name}")]
    InvalidSetting { name: &'static str, value: String },
}
