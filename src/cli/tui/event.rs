//! Crossterm event handling for the dashboard

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use std::time::Duration;

use super::app::App;

/// Mouse scroll lines per event.
const MOUSE_SCROLL_LINES: u32 = 3;

/// Poll crossterm events and update app state.
pub fn handle_events(app: &mut App, timeout: Duration) -> Result<()> {
    // Drain any pending bus events first.
    app.drain_events();

    if event::poll(timeout)? {
        match event::read()? {
            Event::Key(key) => handle_key(app, key),
            Event::Mouse(mouse) => handle_mouse(app, mouse),
            _ => {}
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        // ── Quit ────────────────────────────────────────────────
        (KeyModifiers::CONTROL, KeyCode::Char('c'))
        | (_, KeyCode::Esc)
        | (_, KeyCode::Char('q')) => {
            app.should_quit = true;
        }

        // ── Scroll the main log ─────────────────────────────────
        (_, KeyCode::Up) => app.scroll_up(),
        (_, KeyCode::Down) => app.scroll_down(),
        (_, KeyCode::PageUp) => {
            for _ in 0..10 {
                app.scroll_up();
            }
        }
        (_, KeyCode::PageDown) => {
            for _ in 0..10 {
                app.scroll_down();
            }
        }
        (_, KeyCode::End) => app.scroll_to_bottom(),

        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            for _ in 0..MOUSE_SCROLL_LINES {
                app.scroll_up();
            }
        }
        MouseEventKind::ScrollDown => {
            for _ in 0..MOUSE_SCROLL_LINES {
                app.scroll_down();
            }
        }
        _ => {}
    }
}
