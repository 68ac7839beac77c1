//! MedAi Navigator: interactive terminal UI
//!
//! Layout:
//!   ┌─── header: [F1] Symptoms  [F2] Treatment ... [F6] Find Help ─────────┐
//!   ├─── form ──────────────────────┬─── results / list ──────────────────┤
//!   │  focused field marked "›"     │  analysis, prescription, answer,    │
//!   │                               │  appointments, medications, help    │
//!   ├───────────────────────────────┴─────────────────────────────────────┤
//!   │  notice (only while one is shown)                                   │
//!   ├─────────────────────────────────────────────────────────────────────┤
//!   │  footer (key bindings)                                              │
//!   └─────────────────────────────────────────────────────────────────────┘
//!
//! Model calls run on worker threads; the loop polls for their replies
//! between key presses. No tracing subscriber is installed because the
//! terminal belongs to the UI.

mod app;
mod form;
mod ui;

use std::{io, path::PathBuf, time::Duration};

use chrono::{Local, NaiveDate};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use medai_config::MedaiConfig;
use medai_core::traits::ModelClient;
use medai_model::HttpModelClient;
use medai_navigator::{build_runner, mock_data::offline_model};

use crate::app::App;

#[derive(Parser)]
#[command(name = "medai-tui", version, about = "MedAi Navigator terminal UI")]
struct Args {
    /// TOML configuration file. Defaults to the built-in settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Answer from canned replies instead of calling the model endpoint.
    #[arg(long)]
    offline: bool,
}

const POLL_MS: u64 = 100;

// ── Terminal setup / teardown ────────────────────────────────────────────────

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

// ── Main event loop ──────────────────────────────────────────────────────────

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

fn build_app(args: &Args) -> Result<App, String> {
    let config = MedaiConfig::load(args.config.as_deref()).map_err(|e| e.to_string())?;
    let model: Box<dyn ModelClient> = if args.offline {
        Box::new(offline_model())
    } else {
        Box::new(HttpModelClient::new(&config.model).map_err(|e| e.to_string())?)
    };
    Ok(App::new(
        build_runner(model),
        config.planner.default_medication_days,
        local_today,
    ))
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    loop {
        app.drain_replies();
        terminal.draw(|f| ui::ui(f, app))?;

        if event::poll(Duration::from_millis(POLL_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key) {
                    return Ok(());
                }
            }
        }
    }
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    // Fail before touching the terminal so the message stays readable.
    let mut app = match build_app(&args) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("medai-tui: {e}");
            std::process::exit(1);
        }
    };

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    result
}
