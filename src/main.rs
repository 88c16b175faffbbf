//! BLOCKFALL - a terminal falling-block puzzle game

mod board;
mod game;
mod input;
mod piece;
mod settings;
mod shapes;
mod ui;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use game::{Action, Game, GameState};
use input::InputHandler;
use ratatui::{backend::CrosstermBackend, Terminal};
use settings::Settings;
use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Fixed gravity interval
const GRAVITY_INTERVAL: Duration = Duration::from_millis(500);

fn main() -> io::Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    // Log to a file; the terminal itself is in raw mode while we run
    let log_dir = std::env::temp_dir().join("blockfall");
    let _ = std::fs::create_dir_all(&log_dir);
    let log_file = format!("{:08x}.log", session_id);

    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("blockfall=debug".parse().unwrap()),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "blockfall starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    // A malformed catalog is unrecoverable; bail before touching the terminal
    shapes::verify_catalog();

    let settings = Settings::load();

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run app and capture result
    let result = run_app(&mut terminal, &settings);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    // Write the settings file so there is something to edit
    if let Err(e) = settings.save() {
        eprintln!("Warning: Could not save settings: {}", e);
    }

    if let Ok(Some(score)) = &result {
        println!("Thanks for playing BLOCKFALL!");
        println!("Final Score: {}", score);
    }

    result.map(|_| ())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: &Settings,
) -> io::Result<Option<u64>> {
    let mut game = Game::new();
    let mut input = InputHandler::from_settings(settings);
    let mut last_gravity = Instant::now();

    loop {
        // Render
        terminal.draw(|frame| ui::render_game(frame, &game, settings))?;

        // Drain every pending input event before this cycle's gravity check;
        // the initial poll doubles as the frame throttle
        if event::poll(FRAME_DURATION)? {
            loop {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Release {
                        input.key_up(key);
                    } else {
                        match game.state {
                            GameState::Running => {
                                for action in input.key_down(key) {
                                    if action == Action::Quit {
                                        tracing::info!(score = game.score, "quit requested");
                                        return Ok(Some(game.score));
                                    }
                                    game.apply(action);
                                }
                            }
                            GameState::GameOver => match key.code {
                                KeyCode::Char('r') | KeyCode::Enter => {
                                    tracing::info!(score = game.score, "restarting");
                                    game = Game::new();
                                    input.clear();
                                    last_gravity = Instant::now();
                                }
                                KeyCode::Char('q') | KeyCode::Esc => {
                                    return Ok(Some(game.score));
                                }
                                _ => {}
                            },
                        }
                    }
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }

        // Held-key repeats (DAS/ARR)
        if game.state == GameState::Running {
            for action in input.update() {
                game.apply(action);
            }
        }

        // Gravity
        if last_gravity.elapsed() >= GRAVITY_INTERVAL {
            game.apply(Action::GravityTick);
            last_gravity = Instant::now();
        }
    }
}
