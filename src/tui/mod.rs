// TUI module - the transcript viewer
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard and mouse input, timer ticks, followed lines)
// - Rendering the transcript and routing input to line components

pub mod app;
pub mod clipboard;
pub mod input;
pub mod scroll;
pub mod toast;
pub mod ui;

use crate::config::Config;
use crate::document::SharedDocument;
use crate::logging::LogBuffer;
use crate::translate::Translator;
use anyhow::{Context, Result};
use app::App;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Position, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Run the viewer until the user quits
///
/// `follow` delivers lines appended to the source file, if it is followed.
pub async fn run_tui(
    document: SharedDocument,
    source: Option<PathBuf>,
    config: Config,
    translator: Arc<Translator>,
    log_buffer: LogBuffer,
    follow: Option<mpsc::Receiver<String>>,
) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = App::new(document, source, &config, translator, log_buffer);
    let result = run_event_loop(&mut terminal, &mut app, follow).await;

    // Line components tear down before the terminal is restored
    drop(app);

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Waits on terminal input, the redraw tick and followed lines, whichever
/// comes first. Line events are drained after each wake-up so the frame
/// reflects them.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    mut follow: Option<mpsc::Receiver<String>>,
) -> Result<()> {
    // Redraw tick: drives scroll animation, spinners and toast expiry
    let mut tick_interval = tokio::time::interval(Duration::from_millis(100));

    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .context("Failed to draw terminal")?;
        app.collect_focus_requests();

        tokio::select! {
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key_event)) => handle_key_event(app, key_event),
                        Ok(Event::Mouse(mouse_event)) => handle_mouse_event(app, mouse_event),
                        _ => {}
                    }
                }
            } => {}

            _ = tick_interval.tick() => app.tick(),

            Some(text) = async {
                match follow.as_mut() {
                    Some(rx) => rx.recv().await,
                    None => std::future::pending().await,
                }
            } => app.push_line(text),
        }

        app.drain_line_events();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle keyboard input
///
/// A line in edit mode gets first claim on every key; global shortcuts
/// only see what it leaves.
fn handle_key_event(app: &mut App, key_event: KeyEvent) {
    if key_event.kind != KeyEventKind::Press {
        return;
    }

    if key_event.code == KeyCode::Char('c') && key_event.modifiers.contains(KeyModifiers::CONTROL)
    {
        app.should_quit = true;
        return;
    }

    if app.edit_key(&key_event) {
        return;
    }

    match key_event.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => app.should_quit = true,
        KeyCode::Char('t') => app.translate_focused(),
        KeyCode::Char('y') => app.copy_selection(),
        KeyCode::Esc => app.clear_selection(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll.scroll_up(1),
        KeyCode::Down | KeyCode::Char('j') => app.scroll.scroll_down(1),
        KeyCode::PageUp => app.scroll.page_up(),
        KeyCode::PageDown => app.scroll.page_down(),
        _ => {}
    }
}

/// Handle mouse input
fn handle_mouse_event(app: &mut App, mouse_event: MouseEvent) {
    let position = Position::new(mouse_event.column, mouse_event.row);

    match mouse_event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            app.pointer_down(position, mouse_event.modifiers, Instant::now())
        }
        MouseEventKind::Drag(MouseButton::Left) => app.pointer_drag(position),
        MouseEventKind::Up(MouseButton::Left) => app.pointer_up(),
        MouseEventKind::Moved => app.pointer_moved(position),
        MouseEventKind::ScrollUp => app.scroll.scroll_up(3),
        MouseEventKind::ScrollDown => app.scroll.scroll_down(3),
        _ => {}
    }
}
