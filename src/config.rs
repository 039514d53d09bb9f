use std::str::FromStr;

use crate::error::MazeError;
use crate::maze::DEFAULT_DEAD_SIZE;

pub const DEFAULT_MAZE_SIZE: usize = 18;
pub const MAX_MAZE_SIZE: usize = 200;
pub const DEFAULT_TICK_MS: u64 = 50;
pub const DEFAULT_RENDER_FPS: u64 = 60;
pub const DEFAULT_LORE_CHANCE: f64 = 0.35;

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub maze_size: usize,
    pub dead_size: usize,
    pub tick_ms: u64,
    pub render_fps: u64,
    pub seed: Option<u64>,
    pub lore_chance: f64,
    pub log_file: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            maze_size: DEFAULT_MAZE_SIZE,
            dead_size: DEFAULT_DEAD_SIZE,
            tick_ms: DEFAULT_TICK_MS,
            render_fps: DEFAULT_RENDER_FPS,
            seed: None,
            lore_chance: DEFAULT_LORE_CHANCE,
            log_file: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, MazeError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads every `MAZE_*` setting through `lookup`; unset values fall back
    /// to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MazeError> {
        let defaults = Settings::default();
        let settings = Settings {
            maze_size: parse_var(&lookup, "MAZE_SIZE")?.unwrap_or(defaults.maze_size),
            dead_size: parse_var(&lookup, "MAZE_DEAD_SIZE")?.unwrap_or(defaults.dead_size),
            tick_ms: parse_var(&lookup, "MAZE_TICK_MS")?.unwrap_or(defaults.tick_ms),
            render_fps: parse_var(&lookup, "MAZE_FPS")?.unwrap_or(defaults.render_fps),
            seed: parse_var(&lookup, "MAZE_SEED")?,
            lore_chance: parse_var(&lookup, "MAZE_LORE_CHANCE")?.unwrap_or(defaults.lore_chance),
            log_file: lookup("MAZE_LOG_FILE").filter(|v| !v.is_empty()),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), MazeError> {
        if self.tick_ms == 0 {
            return Err(invalid("MAZE_TICK_MS", self.tick_ms));
        }
        if self.render_fps == 0 {
            return Err(invalid("MAZE_FPS", self.render_fps));
        }
        if !(0.0..=1.0).contains(&self.lore_chance) {
            return Err(invalid("MAZE_LORE_CHANCE", self.lore_chance));
        }
        if self.maze_size > MAX_MAZE_SIZE {
            return Err(invalid("MAZE_SIZE", self.maze_size));
        }
        if self.maze_size < 4 || self.maze_size % 2 != 0 {
            return Err(MazeError::InvalidDimensions {
                width: self.maze_size,
                height: self.maze_size,
            });
        }
        if self.dead_size + 2 > self.maze_size {
            return Err(MazeError::DeadZoneTooLarge {
                dead_size: self.dead_size,
                width: self.maze_size,
                height: self.maze_size,
            });
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, MazeError> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| MazeError::InvalidSetting { name, value: raw }),
    }
}

fn invalid(name: &'static str, value: impl ToString) -> MazeError {
    MazeError::InvalidSetting {
        name,
        value: value.to_string(),
    }
}
