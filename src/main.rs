use anyhow::{Context, Result};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use log::info;
use std::fs::File;
use std::io::{self, Stdout, Write};
use std::thread;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

use shifting_maze::config::Settings;
use shifting_maze::player::BlockGeometry;
use shifting_maze::{Dir, Feature, Game, GameEvent, Intent, Maze, Pos, Quadrant};

const CELL_W: usize = 2;
const HUD_ROWS: u16 = 1;
const FOOTER_ROWS: u16 = 2;
// one maze cell spans two lattice tiles each way
const GEOMETRY: BlockGeometry = BlockGeometry {
    width: 4.0,
    height: 2.0,
};

const PALETTE: [Color; 8] = [
    Color::Green,
    Color::Blue,
    Color::Cyan,
    Color::Magenta,
    Color::DarkYellow,
    Color::Red,
    Color::DarkCyan,
    Color::DarkMagenta,
];

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Trail,
    Wall,
    Void,
    Floor,
    Wisdom,
}

#[derive(Clone, Copy, PartialEq)]
struct Tile {
    glyph: Glyph,
    color: Color,
}

/// Wall colour per quadrant, reassigned whenever a quadrant levels up.
struct Palette {
    colors: [Color; 4],
}

impl Palette {
    fn new(game: &Game) -> Self {
        let mut palette = Self {
            colors: [Color::Reset; 4],
        };
        for q in Quadrant::ALL {
            palette.assign(q, game.level(q));
        }
        palette
    }

    fn assign(&mut self, quadrant: Quadrant, level: u32) {
        let idx = (level as usize + quadrant.index() * 2) % PALETTE.len();
        self.colors[quadrant.index()] = PALETTE[idx];
    }

    fn color(&self, quadrant: Quadrant) -> Color {
        self.colors[quadrant.index()]
    }
}

struct Renderer {
    last: Vec<Tile>,
    lattice_w: usize,
    lattice_h: usize,
    last_hud: String,
    last_footer: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    fn new(maze: &Maze) -> Self {
        let lattice_w = maze.width * 2 + 1;
        let lattice_h = maze.height * 2 + 1;
        Self {
            last: vec![
                Tile {
                    glyph: Glyph::Floor,
                    color: Color::Reset,
                };
                lattice_w * lattice_h
            ],
            lattice_w,
            lattice_h,
            last_hud: String::new(),
            last_footer: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: HUD_ROWS,
        }
    }
}

struct Ui {
    palette: Palette,
    wisdom: Option<(String, String)>,
}

fn main() -> Result<()> {
    let settings = Settings::from_env().context("reading MAZE_* settings")?;
    init_logging(&settings)?;
    let mut game = Game::from_settings(&settings).context("building the maze")?;
    info!(
        "starting {}x{} maze, tick {}ms, {} fps",
        settings.maze_size, settings.maze_size, settings.tick_ms, settings.render_fps
    );

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &mut game, &settings);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn init_logging(settings: &Settings) -> Result<()> {
    let Some(path) = &settings.log_file else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating log file {}", path))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run(stdout: &mut Stdout, game: &mut Game, settings: &Settings) -> Result<()> {
    let mut renderer = Renderer::new(&game.maze);
    let mut ui = Ui {
        palette: Palette::new(game),
        wisdom: None,
    };
    let tick_time = Duration::from_millis(settings.tick_ms);
    let frame_time = Duration::from_micros(1_000_000 / settings.render_fps.max(1));
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.code == KeyCode::Char('q') {
                    return Ok(());
                }
                if let Some(intent) = intent_for(key.code) {
                    game.handle_intent(intent);
                }
            }
        }

        if last_tick.elapsed() >= tick_time {
            last_tick = Instant::now();
            game.tick(GEOMETRY);
            for ev in game.drain_events() {
                apply_event(&mut ui, ev);
            }
        }

        render(stdout, game, &ui, &mut renderer)?;
        game.advance_render_tick();

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn intent_for(code: KeyCode) -> Option<Intent> {
    match code {
        KeyCode::Char('w') | KeyCode::Up => Some(Intent::Move(Dir::North)),
        KeyCode::Char('d') | KeyCode::Right => Some(Intent::Move(Dir::East)),
        KeyCode::Char('s') | KeyCode::Down => Some(Intent::Move(Dir::South)),
        KeyCode::Char('a') | KeyCode::Left => Some(Intent::Move(Dir::West)),
        KeyCode::Char('t') => Some(Intent::Faster),
        KeyCode::Char('g') => Some(Intent::Slower),
        _ => None,
    }
}

fn apply_event(ui: &mut Ui, ev: GameEvent) {
    match ev {
        GameEvent::QuadrantRegenerated { quadrant, level } => ui.palette.assign(quadrant, level),
        GameEvent::FeatureEntered {
            feature: Feature::Wisdom { title, text },
            ..
        } => ui.wisdom = Some((title, text)),
        GameEvent::FeatureLeft { .. } => ui.wisdom = None,
    }
}

fn render(stdout: &mut Stdout, game: &Game, ui: &Ui, renderer: &mut Renderer) -> io::Result<()> {
    let needed_h = renderer.lattice_h as u16 + HUD_ROWS + FOOTER_ROWS;
    let needed_w = (renderer.lattice_w * CELL_W) as u16;

    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + HUD_ROWS;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
        stdout.queue(Clear(ClearType::All))?;
    }

    let hud = format!(
        "Levels  TL {}  TR {}  BR {}  BL {}   Speed {:.1}   (wasd move, t/g speed, q quit)",
        game.levels[0], game.levels[1], game.levels[2], game.levels[3], game.player.move_increment
    );
    if renderer.needs_full || hud != renderer.last_hud {
        print_line(stdout, renderer.origin_x, renderer.origin_y - HUD_ROWS, &hud, Color::White)?;
        renderer.last_hud = hud;
    }

    let player_at = player_tile(game);
    for ly in 0..renderer.lattice_h {
        for lx in 0..renderer.lattice_w {
            let tile = if (lx, ly) == player_at {
                Tile {
                    glyph: Glyph::Player,
                    color: Color::Yellow,
                }
            } else {
                tile_for(game, ui, lx, ly)
            };
            let idx = ly * renderer.lattice_w + lx;
            if renderer.needs_full || tile != renderer.last[idx] {
                renderer.last[idx] = tile;
                draw_tile(stdout, renderer, lx, ly, tile)?;
            }
        }
    }

    let footer = match &ui.wisdom {
        Some((title, text)) => format!("{}: {}", title, text),
        None => String::new(),
    };
    if renderer.needs_full || footer != renderer.last_footer {
        let row = renderer.origin_y + renderer.lattice_h as u16;
        let clipped: String = footer.chars().take(needed_w as usize).collect();
        print_line(stdout, renderer.origin_x, row, &clipped, Color::Grey)?;
        renderer.last_footer = footer;
    }
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

fn print_line(stdout: &mut Stdout, x: u16, y: u16, text: &str, color: Color) -> io::Result<()> {
    stdout.queue(MoveTo(x, y))?;
    stdout.queue(Clear(ClearType::CurrentLine))?;
    stdout.queue(SetForegroundColor(color))?;
    stdout.queue(Print(text))?;
    stdout.queue(ResetColor)?;
    Ok(())
}

fn player_tile(game: &Game) -> (usize, usize) {
    let (fx, fy) = game.player.draw_position();
    (
        (fx * 2.0 + 1.0).round() as usize,
        (fy * 2.0 + 1.0).round() as usize,
    )
}

/// Lattice tile `(lx, ly)`: odd/odd is a cell, even/odd a vertical wall
/// segment, odd/even a horizontal one, even/even a corner.
fn tile_for(game: &Game, ui: &Ui, lx: usize, ly: usize) -> Tile {
    let maze = &game.maze;
    let owner = Pos::new((lx / 2).min(maze.width - 1), (ly / 2).min(maze.height - 1));
    let wall_color = ui.palette.color(maze.position_quadrant(owner));
    let wall = Tile {
        glyph: Glyph::Wall,
        color: wall_color,
    };
    let void = Tile {
        glyph: Glyph::Void,
        color: Color::DarkGrey,
    };
    let floor = Tile {
        glyph: Glyph::Floor,
        color: Color::Reset,
    };

    match (lx % 2 == 1, ly % 2 == 1) {
        (true, true) => {
            let pos = Pos::new(lx / 2, ly / 2);
            let Some(cell) = maze.cell(pos) else {
                return floor;
            };
            if cell.dead {
                void
            } else if !cell.features.is_empty() {
                Tile {
                    glyph: Glyph::Wisdom,
                    color: Color::White,
                }
            } else if game.player.trail.nodes().any(|n| n.cell == pos) {
                Tile {
                    glyph: Glyph::Trail,
                    color: wall_color,
                }
            } else {
                floor
            }
        }
        (false, true) => segment(maze, lx / 2, ly / 2, true, wall, void, floor),
        (true, false) => segment(maze, lx / 2, ly / 2, false, wall, void, floor),
        (false, false) => {
            let (i, j) = (lx / 2, ly / 2);
            let around = [
                (i.wrapping_sub(1), j.wrapping_sub(1)),
                (i, j.wrapping_sub(1)),
                (i.wrapping_sub(1), j),
                (i, j),
            ];
            if around.iter().all(|&(x, y)| maze.is_dead(Pos::new(x, y))) {
                return void;
            }
            let walled = wall_between(maze, i, j.wrapping_sub(1), true)
                || wall_between(maze, i, j, true)
                || wall_between(maze, i.wrapping_sub(1), j, false)
                || wall_between(maze, i, j, false);
            if walled {
                wall
            } else {
                floor
            }
        }
    }
}

fn segment(
    maze: &Maze,
    i: usize,
    j: usize,
    vertical: bool,
    wall: Tile,
    void: Tile,
    floor: Tile,
) -> Tile {
    let (a, b) = segment_cells(i, j, vertical);
    if maze.is_dead(a) && maze.is_dead(b) {
        void
    } else if wall_between(maze, i, j, vertical) {
        wall
    } else {
        floor
    }
}

/// The two cells on either side of a wall segment. A vertical segment at
/// lattice column `2i` separates cell `i-1` from cell `i` in row `j`.
fn segment_cells(i: usize, j: usize, vertical: bool) -> (Pos, Pos) {
    if vertical {
        (Pos::new(i.wrapping_sub(1), j), Pos::new(i, j))
    } else {
        (Pos::new(i, j.wrapping_sub(1)), Pos::new(i, j))
    }
}

fn wall_between(maze: &Maze, i: usize, j: usize, vertical: bool) -> bool {
    let (a, b) = segment_cells(i, j, vertical);
    let (toward_b, toward_a) = if vertical {
        (Dir::East, Dir::West)
    } else {
        (Dir::South, Dir::North)
    };
    match (maze.in_bounds(a), maze.in_bounds(b)) {
        (true, true) => maze.has_wall(a, toward_b) || maze.has_wall(b, toward_a),
        (true, false) => maze.has_wall(a, toward_b),
        (false, true) => maze.has_wall(b, toward_a),
        (false, false) => false,
    }
}

fn draw_tile(stdout: &mut Stdout, renderer: &Renderer, x: usize, y: usize, tile: Tile) -> io::Result<()> {
    let text = match tile.glyph {
        Glyph::Player => "🙂",
        Glyph::Trail => "· ",
        Glyph::Wall => "██",
        Glyph::Void => "░░",
        Glyph::Floor => "  ",
        Glyph::Wisdom => "✦ ",
    };
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(tile.color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}
