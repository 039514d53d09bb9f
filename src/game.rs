use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::Settings;
use crate::error::MazeError;
use crate::generator::MazeGenerator;
use crate::lore::{random_title, MarkovChain};
use crate::maze::{Dir, Feature, Maze, Pos, Quadrant};
use crate::player::{BlockGeometry, Player};

/// Things the front-end reacts to; drained once per frame.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    QuadrantRegenerated { quadrant: Quadrant, level: u32 },
    FeatureEntered { pos: Pos, feature: Feature },
    FeatureLeft { pos: Pos, feature: Feature },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Move(Dir),
    Faster,
    Slower,
}

pub struct Game {
    pub maze: Maze,
    pub player: Player,
    generator: MazeGenerator,
    lore: MarkovChain,
    lore_chance: f64,
    pub quadrants_visited: [bool; 4],
    pub quadrants_regenerated: [bool; 4],
    pub levels: [u32; 4],
    pub game_time: u64,
    pub render_tick: u64,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn from_settings(settings: &Settings) -> Result<Self, MazeError> {
        let generator = MazeGenerator::new(
            settings.maze_size,
            settings.maze_size,
            settings.dead_size,
            settings.seed,
        )?;
        Ok(Self::new(generator, settings.lore_chance))
    }

    pub fn new(mut generator: MazeGenerator, lore_chance: f64) -> Self {
        let maze = generator.generate_maze();
        let mut player = Player::new(Pos::new(0, 0));
        player.quadrant = maze.position_quadrant(player.pos);
        let mut quadrants_visited = [false; 4];
        quadrants_visited[player.quadrant.index()] = true;
        let lore_chance = if lore_chance.is_finite() {
            lore_chance.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            maze,
            player,
            generator,
            lore: MarkovChain::with_corpus(),
            lore_chance,
            quadrants_visited,
            quadrants_regenerated: [false; 4],
            levels: [1; 4],
            game_time: 0,
            render_tick: 0,
            events: Vec::new(),
        }
    }

    pub fn level(&self, quadrant: Quadrant) -> u32 {
        self.levels[quadrant.index()]
    }

    /// Applies one input intent. Move intents are ignored while the player
    /// is mid-run; speed intents always apply.
    pub fn handle_intent(&mut self, intent: Intent) -> bool {
        match intent {
            Intent::Move(dir) => self.player.move_in_direction(&self.maze, dir),
            Intent::Faster => {
                self.player.adjust_speed(true);
                true
            }
            Intent::Slower => {
                self.player.adjust_speed(false);
                true
            }
        }
    }

    /// One logic tick: regenerate on a quadrant change, then advance the
    /// player against the (possibly rewritten) grid.
    pub fn tick(&mut self, geometry: BlockGeometry) {
        self.check_quadrant();

        let before = self.player.pos;
        self.player.update_movement(&self.maze, geometry);
        if self.player.pos != before {
            self.report_features(before, self.player.pos);
        }

        self.game_time += 1;
    }

    pub fn advance_render_tick(&mut self) {
        self.render_tick = self.render_tick.wrapping_add(1);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn check_quadrant(&mut self) {
        let current = self.maze.position_quadrant(self.player.pos);
        if current == self.player.quadrant {
            return;
        }
        self.player.quadrant = current;
        self.quadrants_visited[current.index()] = true;
        self.quadrants_regenerated[current.index()] = false;

        let opposite = current.opposite();
        if !self.quadrants_regenerated[opposite.index()] {
            self.regenerate(opposite);
        }
    }

    fn regenerate(&mut self, quadrant: Quadrant) {
        let idx = quadrant.index();
        self.generator.regenerate_quadrant(&mut self.maze, quadrant);
        self.quadrants_regenerated[idx] = true;
        self.quadrants_visited[idx] = false;
        self.levels[idx] += 1;
        self.place_wisdom(quadrant);
        debug!("quadrant {:?} now at level {}", quadrant, self.levels[idx]);
        self.events.push(GameEvent::QuadrantRegenerated {
            quadrant,
            level: self.levels[idx],
        });
    }

    fn place_wisdom(&mut self, quadrant: Quadrant) {
        let rng = self.generator.rng_mut();
        if !rng.gen_bool(self.lore_chance) {
            return;
        }

        let (qw, qh) = self.generator.quadrant_size();
        let (qx, qy) = quadrant.offset();
        let local = self.generator.carve_start(quadrant);
        let corner = Pos::new(local.x + qx * qw, local.y + qy * qh);
        let candidates: Vec<Pos> = self
            .maze
            .live_cells()
            .filter(|&p| p != corner && self.maze.position_quadrant(p) == quadrant)
            .collect();

        let rng = self.generator.rng_mut();
        let Some(&pos) = candidates.choose(rng) else {
            return;
        };
        let Some(text) = self.lore.generate(rng) else {
            return;
        };
        let title = random_title(rng);
        if let Some(cell) = self.maze.cell_mut(pos) {
            debug!("wisdom placed at {:?}", pos);
            cell.features.push(Feature::Wisdom { title, text });
        }
    }

    fn report_features(&mut self, from: Pos, to: Pos) {
        if let Some(cell) = self.maze.cell(from) {
            for feature in &cell.features {
                self.events.push(GameEvent::FeatureLeft {
                    pos: from,
                    feature: feature.clone(),
                });
            }
        }
        if let Some(cell) = self.maze.cell(to) {
            for feature in &cell.features {
                self.events.push(GameEvent::FeatureEntered {
                    pos: to,
                    feature: feature.clone(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(seed: u64, lore_chance: f64) -> Game {
        Game::new(MazeGenerator::new(18, 18, 6, Some(seed)).unwrap(), lore_chance)
    }

    #[test]
    fn starts_in_top_left() {
        let game = game(1, 0.0);
        assert_eq!(game.player.pos, Pos::new(0, 0));
        assert_eq!(game.player.quadrant, Quadrant::TopLeft);
        assert_eq!(game.quadrants_visited, [true, false, false, false]);
        assert_eq!(game.levels, [1; 4]);
        assert!(game.maze.is_connected_from(Pos::new(0, 0)));
    }

    #[test]
    fn staying_put_regenerates_nothing() {
        let mut game = game(2, 0.0);
        let before = game.maze.clone();
        for _ in 0..10 {
            game.tick(BlockGeometry::default());
        }
        assert_eq!(game.maze, before);
        assert!(game.drain_events().is_empty());
        assert_eq!(game.game_time, 10);
    }

    #[test]
    fn speed_intents_apply_while_moving() {
        let mut game = game(3, 0.0);
        let dir = game.maze.open_dirs(Pos::new(0, 0))[0];
        assert!(game.handle_intent(Intent::Move(dir)));
        assert!(!game.handle_intent(Intent::Move(dir)));
        let before = game.player.move_increment;
        assert!(game.handle_intent(Intent::Faster));
        assert!(game.player.move_increment > before);
    }

    #[test]
    fn certain_lore_places_one_wisdom() {
        let mut game = game(4, 1.0);
        game.player.pos = Pos::new(12, 2);
        game.tick(BlockGeometry::default());
        let wisdom: Vec<Pos> = game
            .maze
            .positions()
            .filter(|&p| !game.maze.cell(p).unwrap().features.is_empty())
            .collect();
        assert_eq!(wisdom.len(), 1);
        assert_eq!(game.maze.position_quadrant(wisdom[0]), Quadrant::BottomLeft);
        assert!(!game.maze.is_dead(wisdom[0]));
    }

    #[test]
    fn non_finite_lore_chance_places_nothing() {
        for chance in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut game = game(6, chance);
            game.player.pos = Pos::new(12, 2);
            game.tick(BlockGeometry::default());
            assert_eq!(game.levels, [1, 1, 1, 2]);
            assert!(game
                .maze
                .positions()
                .all(|p| game.maze.cell(p).unwrap().features.is_empty()));
        }
    }

    #[test]
    fn entering_a_wisdom_cell_reports_it() {
        let mut game = game(5, 0.0);
        let dir = game.maze.open_dirs(Pos::new(0, 0))[0];
        let next = game.maze.neighbor(Pos::new(0, 0), dir).unwrap();
        let feature = Feature::Wisdom {
            title: "t".to_string(),
            text: "x".to_string(),
        };
        game.maze.cell_mut(next).unwrap().features.push(feature.clone());

        game.handle_intent(Intent::Move(dir));
        for _ in 0..4 {
            game.tick(BlockGeometry::default());
        }
        let events = game.drain_events();
        assert!(events.contains(&GameEvent::FeatureEntered { pos: next, feature }));
    }
}
