mod app;
mod braille;
mod cli;
mod country;
mod data;
mod error;
mod logging;
mod map;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use cli::Cli;
use crossbeam_channel::{Receiver, TryRecvError};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use data::{HttpSource, LoadResult};
use logging::LogConfig;
use map::Camera;
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::default()
        .with_level(cli.log_level.into())
        .with_log_file(cli.log_file.clone());
    logging::init_logging(&log_config).context("failed to open log file")?;

    // Start the one load attempt before the first frame
    let source = HttpSource::new(cli.url.clone(), cli.timeout());
    let loading = data::spawn_load(source, cli.object.clone());

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal, &cli, loading);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Handle mouse events for rotating and picking
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for the hover tooltip
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.press(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.drag_to(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.release(mouse.column, mouse.row),
        _ => {}
    }
}

/// Hand the load result to the app once it arrives
fn poll_load(app: &mut App, loading: &Receiver<LoadResult>) {
    if !app.is_loading() {
        return;
    }
    match loading.try_recv() {
        Ok(result) => app.finish_loading(result),
        Err(TryRecvError::Empty) => {}
        Err(TryRecvError::Disconnected) => {
            tracing::error!("loader exited without a result");
            app.finish_loading(Err(error::LoadError::Network(
                "loader exited without a result".into(),
            )));
        }
    }
}

fn run(terminal: &mut DefaultTerminal, cli: &Cli, loading: Receiver<LoadResult>) -> Result<()> {
    let size = terminal.size()?;
    let camera = Camera::new(cli.rotate_speed, !cli.no_rotate);
    let mut app = App::new(size.width as usize, size.height as usize, camera);
    let mut last_frame = Instant::now();

    // Main loop
    loop {
        poll_load(&mut app, &loading);

        // Draw
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                            KeyCode::Char('a') | KeyCode::Char('A') => app.toggle_auto_rotate(),
                            KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),
                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width as usize, height as usize);
                }
                _ => {}
            }
        }

        // Advance camera and overlay animations
        let now = Instant::now();
        app.tick(now - last_frame);
        last_frame = now;

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
