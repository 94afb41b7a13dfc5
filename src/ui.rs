use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, BorderType, Borders, Paragraph,
    },
    Frame, Terminal,
};

use crate::app::App;
use crate::storage::KeyValueStore;
use crate::util::{format_rate, format_record_time, format_window, per_second, rect_contains};

pub fn run<S: KeyValueStore>(mut app: App<S>, running: Arc<AtomicBool>) -> io::Result<()> {
    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.start();
    let res = run_app_loop(&mut terminal, &mut app, &running);
    app.stop();

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        log::error!("ui loop failed: {}", err);
    }
    res
}

fn run_app_loop<B: ratatui::backend::Backend, S: KeyValueStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
    running: &AtomicBool,
) -> io::Result<()> {
    while running.load(Ordering::SeqCst) {
        terminal.draw(|f| draw(f, app))?;

        // Handle input, waking up in time for the next tick
        if event::poll(app.poll_timeout())? {
            match event::read()? {
                Event::Key(key) => match key_action(&key) {
                    Some(KeyAction::Quit) => return Ok(()),
                    Some(KeyAction::Click) => app.on_click(),
                    None => {}
                },
                Event::Mouse(mouse) => {
                    if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                        let hit = app
                            .button_area
                            .map(|area| rect_contains(area, mouse.column, mouse.row))
                            .unwrap_or(false);
                        if hit {
                            app.on_click();
                        }
                    }
                }
                _ => {}
            }
        }
        app.on_tick();
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Quit,
    Click,
}

// Raw mode delivers Ctrl-C as a key press rather than SIGINT
fn key_action(key: &KeyEvent) -> Option<KeyAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(KeyAction::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(KeyAction::Quit),
        KeyCode::Char(' ') | KeyCode::Enter => Some(KeyAction::Click),
        _ => None,
    }
}

fn draw<S: KeyValueStore>(f: &mut Frame, app: &mut App<S>) {
    let now = app.now();
    let window_ms = app.engine.config().window_ms();

    // ============= whole screen layout ============
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints(
            [
                Constraint::Length(12), // Upside Rate Box
                Constraint::Min(7),     // Middle Button
                Constraint::Length(1),  // Bottom Status Bar
            ]
            .as_ref(),
        )
        .split(f.size());

    // ============= Top Rate Box ============
    let rate_block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Speed Clicker [window {}] ", format_window(window_ms)))
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(rate_block.clone(), main_chunks[0]);

    let inner_area = rate_block.inner(main_chunks[0]);
    let top_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)].as_ref())
        .split(inner_area);

    let max_rate = app.rate_history.iter().cloned().fold(5.0, f64::max);
    let x_limit = app.rate_history.len() as f64;
    let history_canvas = Canvas::default()
        .block(
            Block::default()
                .title(" Rate ")
                .title_style(Style::default().fg(Color::Green)),
        )
        .marker(Marker::Braille)
        .x_bounds([0.0, x_limit])
        .y_bounds([0.0, max_rate])
        .paint(|ctx| {
            for (i, &val) in app.rate_history.iter().enumerate() {
                ctx.draw(&CanvasLine {
                    x1: i as f64,
                    y1: 0.0,
                    x2: i as f64,
                    y2: val,
                    color: Color::Green,
                });
            }
        });
    f.render_widget(history_canvas, top_chunks[0]);

    let label = Style::default().fg(Color::DarkGray);
    let record_style = if app.record_flash(now) {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    };
    let saved = if app.high_score.persisted { "" } else { " (unsaved)" };

    let stats = vec![
        Line::from(Span::styled("CURRENT", label)),
        Line::from(Span::styled(
            format_rate(app.current_rate, window_ms),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{:.1} /s", per_second(app.current_rate, window_ms)),
            label,
        )),
        Line::from(""),
        Line::from(Span::styled("HIGH SCORE", label)),
        Line::from(vec![
            Span::styled(app.high_score.value.to_string(), record_style),
            Span::styled(saved, Style::default().fg(Color::Red)),
        ]),
        Line::from(vec![
            Span::styled("  set: ", label),
            Span::raw(format_record_time(app.high_score.achieved_at)),
        ]),
        Line::from(vec![
            Span::styled("  session: ", label),
            Span::raw(format!("{} best, {} clicks", app.session_best, app.total_clicks)),
        ]),
    ];
    f.render_widget(Paragraph::new(stats), top_chunks[1]);

    // ============= Middle Click Button ============
    let button_area = centered(main_chunks[1], 40, 7);
    app.button_area = Some(button_area);
    draw_button(f, app, now, button_area);

    // ============ Bottom Status Bar ============
    let status_content = Line::from(vec![
        Span::styled(
            " SPEED CLICKER ",
            Style::default()
                .bg(Color::White)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | Click the button as fast as you can! "),
        Span::styled("SPACE/ENTER/mouse", Style::default().fg(Color::Cyan)),
        Span::raw(" to click | Press 'q' to quit"),
    ]);
    let status_bar = Paragraph::new(status_content).style(Style::default().bg(Color::Rgb(20, 20, 20)));
    f.render_widget(status_bar, main_chunks[2]);
}

fn draw_button<S: KeyValueStore>(f: &mut Frame, app: &mut App<S>, now: u64, area: Rect) {
    let ripples = app.ripples.active(now);
    let strongest = ripples.iter().map(|(_, left)| *left).fold(0.0, f64::max);
    let border_color = if strongest > 0.66 {
        Color::White
    } else if strongest > 0.33 {
        Color::LightCyan
    } else if strongest > 0.0 {
        Color::Cyan
    } else {
        Color::Blue
    };

    let width = area.width.saturating_sub(2) as usize;
    let mut ripple_row = vec![' '; width];
    for (ripple, left) in &ripples {
        if width == 0 {
            break;
        }
        let slot = (ripple.offset as usize * width / 7).min(width - 1);
        ripple_row[slot] = if *left > 0.5 { '*' } else { '.' };
    }

    let button = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "CLICK",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            ripple_row.into_iter().collect::<String>(),
            Style::default().fg(border_color),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Thick)
            .border_style(Style::default().fg(border_color)),
    );
    f.render_widget(button, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
