mod app;
mod audio;
mod config;
mod effects;
mod keyboard;
mod pitch;
mod scale;
mod synth;
mod ui;

use anyhow::Result;
use app::{App, AppMode};
use audio::AudioEngine;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyboardEnhancementFlags, KeyModifiers, MouseButton, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{fs::File, io, sync::{Arc, Mutex}, time::Duration};
use synth::Synth;

fn log_level(verbose: bool) -> simplelog::LevelFilter {
    if verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    }
}

fn init_logging(verbose: bool) {
    use simplelog::{Config as LogConfig, WriteLogger};

    let level = log_level(verbose);

    // The alternate screen owns stdout/stderr, so logs go to a file.
    let path = std::env::temp_dir().join("termenvox.log");
    if let Ok(file) = File::create(&path) {
        let _ = WriteLogger::init(level, LogConfig::default(), file);
    }
    log::info!("termenvox starting (log level: {:?})", level);
}

fn main() -> Result<()> {
    let verbose = std::env::args().any(|a| a == "--verbose" || a == "-v");
    init_logging(verbose);

    enable_raw_mode()?;
    let mut stdout = io::stdout();

    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES))?;
    } else {
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let result = run(&mut terminal, enhanced);

    disable_raw_mode()?;
    if enhanced {
        execute!(terminal.backend_mut(),
            PopKeyboardEnhancementFlags, LeaveAlternateScreen, DisableMouseCapture)?;
    } else {
        execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    }
    terminal.show_cursor()?;
    if let Err(e) = result {
        log::error!("fatal: {:?}", e);
        eprintln!("Error: {:?}", e);
    }
    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, enhanced: bool) -> Result<()> {
    let synth = Arc::new(Mutex::new(Synth::new(44100.0)));
    let _audio = AudioEngine::new(Arc::clone(&synth))?;
    let mut app = App::new(Arc::clone(&synth));

    loop {
        if !enhanced { app.tick_fallback_release(); }
        terminal.draw(|f| ui::draw(f, &mut app, enhanced))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // ── Key release (enhanced mode only) ──────────────────
                    if key.kind == KeyEventKind::Release {
                        if key.code == KeyCode::Char(' ') { app.space_release(); }
                        continue;
                    }

                    // ── Key repeat ────────────────────────────────────────
                    if key.kind == KeyEventKind::Repeat {
                        match key.code {
                            KeyCode::Up if app.mode == AppMode::Settings => app.field_up(),
                            KeyCode::Down if app.mode == AppMode::Settings => app.field_down(),
                            KeyCode::Up => app.volume_up(),
                            KeyCode::Down => app.volume_down(),
                            KeyCode::Char(' ') if !enhanced => app.space_press_fallback(),
                            _ => {}
                        }
                        continue;
                    }

                    // ── Key press ─────────────────────────────────────────
                    match key.code {
                        // An Esc first backs out of a running edit.
                        KeyCode::Esc => {
                            if !app.cancel_edit() { break; }
                        }
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,

                        KeyCode::Tab => app.toggle_mode(),
                        KeyCode::F(1) => app.cycle_wave(),

                        // Space sounds the note from either focus.
                        KeyCode::Char(' ') => {
                            if enhanced { app.space_press(); } else { app.space_press_fallback(); }
                        }

                        // ── Settings focus ────────────────────────────────
                        KeyCode::Up if app.mode == AppMode::Settings => app.field_up(),
                        KeyCode::Down if app.mode == AppMode::Settings => app.field_down(),
                        KeyCode::Enter if app.mode == AppMode::Settings => app.confirm_field(),
                        KeyCode::Backspace if app.mode == AppMode::Settings => app.backspace(),
                        KeyCode::Char(c) if app.mode == AppMode::Settings => app.input_char(c),

                        // ── Pad focus ─────────────────────────────────────
                        KeyCode::Up => app.volume_up(),
                        KeyCode::Down => app.volume_down(),

                        _ => {}
                    }
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::Moved => app.pointer_moved(mouse.column, mouse.row),
                    MouseEventKind::Drag(MouseButton::Left) => {
                        app.pointer_moved(mouse.column, mouse.row)
                    }
                    MouseEventKind::Down(MouseButton::Left) => {
                        app.pointer_down(mouse.column, mouse.row)
                    }
                    MouseEventKind::Up(MouseButton::Left) => app.pointer_up(),
                    _ => {}
                },
                Event::FocusLost => app.release_all(),
                _ => {}
            }
        }
    }

    app.release_all();
    Ok(())
}
