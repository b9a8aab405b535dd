//! Dashboard rendering with ratatui

use chrono::Timelike;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

use super::app::{App, LogLine};
use questrunner_core::LogLevel;

/// Main draw function — renders the full dashboard layout.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // banner
            Constraint::Min(5),    // body
        ])
        .split(frame.area());

    draw_banner(frame, outer[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(65), // main log
            Constraint::Percentage(35), // success log + status
        ])
        .split(outer[1]);

    draw_main_log(frame, app, body[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(body[1]);

    draw_success_log(frame, app, right[0]);
    draw_status_panel(frame, app, right[1]);
}

// ── banner ──────────────────────────────────────────────────────────────

fn draw_banner(frame: &mut Frame, area: Rect) {
    let version = env!("CARGO_PKG_VERSION");
    let banner = Paragraph::new(Line::from(vec![
        Span::styled("📊 QUESTRUNNER ", Style::default().fg(Color::White).bold()),
        Span::styled(format!("v{version}"), Style::default().fg(Color::DarkGray)),
        Span::raw("  ·  q to quit"),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)),
    );
    frame.render_widget(banner, area);
}

// ── log panes ───────────────────────────────────────────────────────────

fn level_style(level: LogLevel) -> Style {
    match level {
        LogLevel::Info => Style::default().fg(Color::White),
        LogLevel::Wait => Style::default().fg(Color::Yellow),
        LogLevel::Success => Style::default().fg(Color::Green),
        LogLevel::Warn => Style::default().fg(Color::Magenta),
        LogLevel::Error => Style::default().fg(Color::Red).bold(),
    }
}

fn render_line(line: &LogLine) -> Line<'_> {
    let ts = line.timestamp;
    Line::from(vec![
        Span::styled(
            format!("[{:02}:{:02}:{:02}] ", ts.hour(), ts.minute(), ts.second()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(&line.message, level_style(line.level)),
    ])
}

fn draw_main_log(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Main Log 📜 ");

    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let lines: Vec<Line> = app.main_log.iter().map(render_line).collect();
    let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });

    // Follow the bottom unless the user scrolled up.
    let total_lines = paragraph.line_count(inner.width) as u16;
    let max_scroll = total_lines.saturating_sub(inner.height);
    let offset = app.scroll_offset.min(max_scroll as usize);
    app.scroll_offset = offset;
    let scroll_pos = max_scroll.saturating_sub(offset as u16);

    let mut scrollbar_state =
        ScrollbarState::new(max_scroll as usize).position(scroll_pos as usize);
    frame.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight),
        area,
        &mut scrollbar_state,
    );

    frame.render_widget(paragraph.scroll((scroll_pos, 0)), inner);
}

fn draw_success_log(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Success Log ✅ ");

    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    // Tail view, no manual scrolling on this pane.
    let visible = app
        .success_log
        .iter()
        .rev()
        .take(inner.height as usize)
        .collect::<Vec<_>>();
    let lines: Vec<Line> = visible.into_iter().rev().map(render_line).collect();
    frame.render_widget(Paragraph::new(Text::from(lines)), inner);
}

// ── status panel ────────────────────────────────────────────────────────

fn draw_status_panel(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Status Panel 📊 ");

    let wallets = match app.status.wallets_count {
        Some(count) => count.to_string(),
        None => "-".to_string(),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("Wallets: ", Style::default().fg(Color::Cyan).bold()),
            Span::raw(wallets),
        ]),
        Line::from(vec![
            Span::styled("Status:  ", Style::default().fg(Color::Cyan).bold()),
            Span::raw(app.status.status.as_str()),
        ]),
        Line::raw(""),
        Line::from(Span::styled(
            "q / Esc / Ctrl-C to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let panel = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(panel, area);
}
