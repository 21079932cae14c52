//! Interactive terminal view.

mod app;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pvw_core::SystemSession;
use ratatui::{backend::CrosstermBackend, prelude::Backend, Terminal};
use tokio::sync::mpsc;

use app::App;

/// How long to wait for a background result before polling the keyboard.
const TICK: Duration = Duration::from_millis(50);

pub async fn run(session: Arc<SystemSession>, read_only: bool) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run_app(&mut terminal, session, read_only).await;

    // Restore the terminal even if the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    session: Arc<SystemSession>,
    read_only: bool,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = App::new(session, read_only, tx);
    app.refresh();

    loop {
        terminal.draw(|f| ui::draw(f, &mut app))?;

        tokio::select! {
            Some(message) = rx.recv() => app.handle_message(message),
            _ = tokio::time::sleep(TICK) => {}
        }

        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
