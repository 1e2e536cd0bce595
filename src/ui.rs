use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppMode, Field};
use crate::keyboard;
use crate::scale;

// ── Top-level routing ─────────────────────────────────────────────────────────

/// Draw the whole screen.  `app.mode` controls which panel has keyboard
/// focus (highlighted border), not what is visible.
pub fn draw(f: &mut Frame, app: &mut App, enhanced: bool) {
    let area = f.area();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title bar
            Constraint::Min(8),    // pad + settings
            Constraint::Length(4), // status
            Constraint::Length(3), // help
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(24), Constraint::Length(34)])
        .split(rows[1]);

    draw_title(f, rows[0], enhanced, app);
    draw_pad(f, columns[0], app);
    draw_settings(f, columns[1], app);
    draw_status(f, rows[2], app);
    draw_help(f, rows[3], app);
}

// ── Title bar ─────────────────────────────────────────────────────────────────

fn draw_title(f: &mut Frame, area: Rect, enhanced: bool, app: &App) {
    let focus_label = match app.mode {
        AppMode::Play => "Pad",
        AppMode::Settings => "Settings",
    };
    let kb_mode = if enhanced { "enhanced" } else { "fallback" };
    let sounding = if app.state.active { "  ▶PLAYING" } else { "" };

    let text = format!(
        "  TermEnvox  ─  Focus: {}{}  ─  [{}]  ─  Tab: cycle focus  F1: wave",
        focus_label, sounding, kb_mode
    );
    let color = if enhanced { Color::Cyan } else { Color::Yellow };
    f.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

// ── Pad ───────────────────────────────────────────────────────────────────────

fn draw_pad(f: &mut Frame, area: Rect, app: &mut App) {
    let focused = app.mode == AppMode::Play;
    let title = if focused {
        " ► Pad — move to tune, hold LMB/Space to sound  [↑↓] Volume "
    } else {
        " Pad "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        });
    let inner = block.inner(area);
    f.render_widget(block, area);

    // The event handlers hit-test against the drawn interior.
    app.pad_area = inner;

    let cells = keyboard::cell_colors(inner.width as f64, &app.config, &app.state);

    // Resolve each terminal column to the cell covering its center.
    let mut column_colors = Vec::with_capacity(inner.width as usize);
    for col in 0..inner.width {
        let color = if cells.is_empty() {
            Color::Black
        } else {
            let idx = ((col as f64 + 0.5) / cells[0].width) as usize;
            cells[idx.min(cells.len() - 1)].color
        };
        column_colors.push(color);
    }

    let marker = keyboard::pointer_marker(
        app.pointer.0 as f64 - inner.x as f64,
        app.pointer.1 as f64 - inner.y as f64,
        app.state.active,
    );
    let marker_cell = (marker.x as i32, marker.y as i32);
    let marker_visible = marker.x >= 0.0
        && marker_cell.0 < inner.width as i32
        && marker.y >= 0.0
        && marker_cell.1 < inner.height as i32;

    let mut lines: Vec<Line> = Vec::with_capacity(inner.height as usize);
    for row in 0..inner.height {
        let mut spans = Vec::with_capacity(inner.width as usize);
        for col in 0..inner.width {
            let bg = column_colors[col as usize];
            if marker_visible && (col as i32, row as i32) == marker_cell {
                spans.push(Span::styled("●", Style::default().fg(marker.color).bg(bg)));
            } else {
                spans.push(Span::styled(" ", Style::default().bg(bg)));
            }
        }
        lines.push(Line::from(spans));
    }
    f.render_widget(Paragraph::new(lines), inner);
}

// ── Settings panel ────────────────────────────────────────────────────────────

fn draw_settings(f: &mut Frame, area: Rect, app: &App) {
    let focused = app.mode == AppMode::Settings;
    let title = if focused {
        " ► Settings — [↑↓] Field  [Enter] Edit/Apply "
    } else {
        " Settings "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        });
    let inner = block.inner(area);

    // Keep the selection visible when the panel is shorter than the list.
    let visible = inner.height as usize;
    let offset = app.selected_field.saturating_sub(visible.saturating_sub(1));

    let mut lines: Vec<Line> = Vec::new();
    for index in offset..Field::COUNT.min(offset + visible) {
        let field = Field::from_index(index);
        let selected = index == app.selected_field;
        let editing = selected && app.edit_buffer.is_some();

        let value = if editing {
            format!("{}▏", app.edit_buffer.as_deref().unwrap_or(""))
        } else {
            app.field_value(field)
        };

        let label_style = if selected && focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else if selected {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let value_style = if editing {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else if matches!(field, Field::PitchClass(i) if !app.config.scale[i]) {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };

        lines.push(Line::from(vec![
            Span::styled(format!(" {:<16}", field.label()), label_style),
            Span::styled(value, value_style),
        ]));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

// ── Status bar ────────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let note = scale::note_name(app.state.semitone);
    let inst = &app.config.instrument;
    let (gesture, gesture_color) = if app.state.active {
        ("● sounding", Color::Red)
    } else {
        ("○ idle", Color::DarkGray)
    };
    let extra = if app.status_msg.is_empty() {
        String::new()
    } else {
        format!("  │  {}", app.status_msg)
    };

    let text = vec![
        Line::from(vec![
            Span::styled("Note: ", Style::default().fg(Color::DarkGray)),
            Span::styled(note, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw("  │  "),
            Span::styled("Freq: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{:.2} Hz", app.state.frequency),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  │  "),
            Span::styled("Wave: ", Style::default().fg(Color::DarkGray)),
            Span::styled(inst.oscillator.name(), Style::default().fg(Color::Cyan)),
            Span::raw("  │  "),
            Span::styled("Vol: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{:.0}%", inst.volume * 100.0),
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            ),
            Span::styled(extra, Style::default().fg(Color::Yellow)),
        ]),
        Line::from(vec![
            Span::styled("Octaves: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}..{}", app.config.min_output_octave, app.config.max_output_octave),
                Style::default().fg(Color::White),
            ),
            Span::raw("  │  "),
            Span::styled(gesture, Style::default().fg(gesture_color).add_modifier(Modifier::BOLD)),
        ]),
    ];

    f.render_widget(
        Paragraph::new(text)
            .block(Block::default().title(" Status ").borders(Borders::ALL))
            .wrap(Wrap { trim: false }),
        area,
    );
}

// ── Help line ─────────────────────────────────────────────────────────────────

fn draw_help(f: &mut Frame, area: Rect, app: &App) {
    let w = Style::default().fg(Color::White);

    let line = match app.mode {
        AppMode::Play => Line::from(vec![
            Span::raw("Move over pad: pitch  │  "),
            Span::styled("[LMB/Space] ", w),
            Span::raw("Sound  │  "),
            Span::styled("[↑↓] ", w),
            Span::raw("Volume  │  "),
            Span::styled("[F1] ", w),
            Span::raw("Waveform  │  "),
            Span::styled("[Tab] ", w),
            Span::raw("Settings  │  "),
            Span::styled("[Esc] ", w),
            Span::raw("Quit"),
        ]),
        AppMode::Settings => Line::from(vec![
            Span::styled("[↑↓] ", w),
            Span::raw("Field  │  "),
            Span::styled("[Enter] ", w),
            Span::raw("Toggle / edit / apply  │  "),
            Span::raw("type a number to edit  │  "),
            Span::styled("[Esc] ", w),
            Span::raw("Cancel edit / quit"),
        ]),
    };

    f.render_widget(
        Paragraph::new(line)
            .block(Block::default().title(" Help ").borders(Borders::ALL))
            .style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
