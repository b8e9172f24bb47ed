//! GRIDTRIS console driver
//!
//! Plays the engine in a terminal: keys move the piece, `s` starts the
//! auto-drop cadence, and the final score is printed when the game ends.

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use gridtris::{
    BagSource, Direction, Engine, EngineError, GameStore, PieceSource, SavedGame, StoreError,
    UniformSource,
    input::{Command, InputHandler},
    settings::{Randomizer, Settings},
    source::UPCOMING,
    ui,
};
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend};
use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};

/// Poll timeout while nothing is scheduled
const IDLE_POLL: Duration = Duration::from_millis(250);

/// How long the game-over screen stays up before the terminal is released
const GAME_OVER_LINGER: Duration = Duration::from_secs(2);

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    GameOver,
    Quit,
}

/// Get the gridtris temp directory, creating it if needed
fn gridtris_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("gridtris");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn open_store(settings: &Settings) -> Option<GameStore> {
    if !settings.persistence.enabled && !settings.persistence.resume {
        return None;
    }
    let store = match &settings.persistence.dir {
        Some(dir) => Ok(GameStore::new(dir)),
        None => GameStore::open_default(),
    };
    store
        .inspect_err(|e| tracing::warn!("Saved games unavailable: {}", e))
        .ok()
}

/// Build the engine, resuming the saved game when asked to
fn create_engine(settings: &Settings, store: Option<&GameStore>) -> io::Result<Engine> {
    let invalid = |e: EngineError| io::Error::new(io::ErrorKind::InvalidInput, e);
    let id = &settings.persistence.game_id;

    if settings.persistence.resume {
        if let Some(store) = store {
            match store.load(id) {
                Ok(Some(saved)) => return Engine::restore(&saved).map_err(invalid),
                Ok(None) => tracing::info!("No saved game {:?}, starting fresh", id),
                Err(e) => tracing::warn!("Could not load saved game {:?}: {}", id, e),
            }
        }
    }

    Engine::new(settings.board.width, settings.board.height).map_err(invalid)
}

/// Leaving during the game-over screen still ends the game
fn quit_outcome(engine: &Engine) -> Outcome {
    if engine.is_game_over() {
        Outcome::GameOver
    } else {
        Outcome::Quit
    }
}

/// Save an unfinished game on quit, drop the slot once a game has ended
fn update_saved_game(
    store: &GameStore,
    settings: &Settings,
    outcome: Outcome,
    engine: &Engine,
) -> Result<(), StoreError> {
    let id = &settings.persistence.game_id;
    match outcome {
        Outcome::Quit if settings.persistence.enabled => {
            store.save(id, &SavedGame::capture(&engine.state()))
        }
        Outcome::GameOver => store.remove(id),
        Outcome::Quit => Ok(()),
    }
}

fn create_source(settings: &Settings) -> Box<dyn PieceSource> {
    let gameplay = &settings.gameplay;
    match (gameplay.randomizer, gameplay.seed) {
        (Randomizer::Uniform, Some(seed)) => Box::new(UniformSource::with_seed(seed)),
        (Randomizer::Uniform, None) => Box::new(UniformSource::new()),
        (Randomizer::Bag, Some(seed)) => Box::new(BagSource::with_seed(seed)),
        (Randomizer::Bag, None) => Box::new(BagSource::new()),
    }
}

fn main() -> io::Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    // Setup tracing to a log file, stdout belongs to the TUI
    let log_dir = gridtris_temp_dir();
    let log_file = format!("{:08x}.log", session_id);
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gridtris=debug")),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "GRIDTRIS starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let settings = Settings::load();
    // Write a default file on first run so there is something to edit
    if Settings::settings_path().is_some_and(|path| !path.exists()) {
        if let Err(e) = settings.save() {
            tracing::warn!("Could not write default settings: {}", e);
        }
    }
    let store = open_store(&settings);
    let mut engine = create_engine(&settings, store.as_ref())?;
    let mut source = create_source(&settings);

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut engine, source.as_mut(), &settings);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    let outcome = result?;

    if let Some(store) = &store {
        if let Err(e) = update_saved_game(store, &settings, outcome, &engine) {
            eprintln!("Warning: Could not update saved game: {}", e);
        }
    }

    if let Outcome::GameOver = outcome {
        println!("GAME OVER");
    }
    println!("Final Score: {}", engine.score().points);
    tracing::info!(score = engine.score().points, "GRIDTRIS shutting down");

    Ok(())
}

/// Main loop: spawn on empty, draw, wait for a key or the next auto-drop tick
fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    engine: &mut Engine,
    source: &mut dyn PieceSource,
    settings: &Settings,
) -> io::Result<Outcome> {
    let input = InputHandler::from_settings(settings);
    let interval = settings.gameplay.auto_drop_interval();
    let mut auto_drop = false;
    let mut last_drop = Instant::now();
    let mut game_over_time: Option<Instant> = None;

    loop {
        if !engine.is_game_over() && engine.active_piece().is_none() {
            engine.spawn_from(source);
        }

        let upcoming = source.preview(UPCOMING);
        terminal.draw(|frame| {
            ui::render_game(frame, &engine.state(), &upcoming, settings, auto_drop)
        })?;

        let timeout = if engine.is_game_over() {
            let since = *game_over_time.get_or_insert_with(Instant::now);
            if since.elapsed() >= GAME_OVER_LINGER {
                return Ok(Outcome::GameOver);
            }
            GAME_OVER_LINGER.saturating_sub(since.elapsed())
        } else if auto_drop {
            interval.saturating_sub(last_drop.elapsed())
        } else {
            IDLE_POLL
        };

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match input.key_down(key) {
                        Some(Command::Quit) => return Ok(quit_outcome(engine)),
                        Some(_) if engine.is_game_over() => {}
                        Some(Command::MoveLeft) => {
                            engine.move_piece(Direction::Left);
                        }
                        Some(Command::MoveRight) => {
                            engine.move_piece(Direction::Right);
                        }
                        Some(Command::Rotate) => {
                            engine.rotate_piece();
                        }
                        Some(Command::HardDrop) => {
                            engine.hard_drop();
                        }
                        Some(Command::StartAutoDrop) => {
                            if !auto_drop {
                                tracing::debug!("auto-drop started");
                                auto_drop = true;
                                last_drop = Instant::now();
                            }
                        }
                        None => {}
                    }
                }
            }
        }

        if auto_drop && !engine.is_game_over() && last_drop.elapsed() >= interval {
            engine.move_piece(Direction::Down);
            last_drop = Instant::now();
        }
    }
}
