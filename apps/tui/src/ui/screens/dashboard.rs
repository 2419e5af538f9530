use crate::app::App;
use crate::ui::widgets::map::render_map;
use crate::ui::widgets::popup::{centered_rect, render_alert};
use ipgeo_view::controls::{ControlView, Tone};
use ipgeo_view::{Field, Projection};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use tachyonfx::EffectRenderer;
use throbber_widgets_tui::{Throbber, BRAILLE_SIX};

const LABEL_WIDTH: usize = 24;

pub fn render_dashboard(app: &App, f: &mut Frame<'_>) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Title and mode badge
            Constraint::Length(3), // Search input
            Constraint::Min(8),    // Details and map
            Constraint::Length(4), // Controls and status
            Constraint::Length(1), // Shortcuts hint
        ])
        .split(f.area().inner(Margin::new(1, 0)));

    render_header(app, f, layout[0]);
    render_search(app, f, layout[1]);
    render_content(app, f, layout[2]);
    render_status(app, f, layout[3]);
    render_shortcuts(f, layout[4]);

    if app.show_help {
        render_help_popup(f);
    }
    if let Some(message) = &app.alert {
        render_alert(message, f);
    }
}

fn render_header(app: &App, f: &mut Frame<'_>, area: Rect) {
    let badge_style = if app.dashboard.search_header().is_some() {
        Style::default().fg(Color::Black).bg(Color::Magenta)
    } else {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    };

    let block = Block::default()
        .title(" IP Geolocation ")
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .title(
            TextLine::from(Span::styled(
                format!(" {} ", app.dashboard.mode_badge()),
                badge_style.add_modifier(Modifier::BOLD),
            ))
            .right_aligned(),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let subtitle = app.dashboard.search_header().map_or_else(
        || TextLine::from(Span::styled(
            "Your connection, as seen by the lookup server",
            Style::default().fg(Color::Gray),
        )),
        |header| {
            let mut spans = vec![
                Span::styled("Search results for ", Style::default().fg(Color::Gray)),
                Span::styled(
                    header.address,
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {}", header.family.label()),
                    Style::default().fg(Color::Gray),
                ),
            ];
            if header.private {
                spans.push(Span::styled(
                    "  (private address)",
                    Style::default().fg(Color::Red),
                ));
            }
            TextLine::from(spans)
        },
    );

    let api = TextLine::from(Span::styled(
        format!("Lookup server: {}", app.api_base),
        Style::default().fg(Color::DarkGray),
    ));

    f.render_widget(Paragraph::new(Text::from(vec![subtitle, api])).block(block), area);
}

fn render_search(app: &App, f: &mut Frame<'_>, area: Rect) {
    let [input_area, button_area] =
        Layout::horizontal([Constraint::Min(20), Constraint::Length(18)]).areas(area);

    let focused = app.dashboard.search_focused();
    let border = if focused { Color::Yellow } else { Color::DarkGray };
    let block = Block::default()
        .title(" Search IP (/) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let input = if focused {
        TextLine::from(vec![
            Span::raw(app.dashboard.search_text()),
            Span::styled("█", Style::default().fg(Color::Yellow)),
        ])
    } else if app.dashboard.search_text().is_empty() {
        TextLine::from(Span::styled(
            "Enter an IPv4 or IPv6 address",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        TextLine::from(app.dashboard.search_text())
    };
    f.render_widget(Paragraph::new(input).block(block), input_area);

    let search = app.dashboard.controls().search;
    let button = Paragraph::new(TextLine::from(control_span(&search)))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(control_style(&search)));
    f.render_widget(button, button_area);
}

fn render_content(app: &App, f: &mut Frame<'_>, area: Rect) {
    match app.dashboard.projection() {
        Projection::Error { message } => render_error_panel(f, area, &message),
        Projection::Details { fields, map } => {
            let [details_area, map_area] =
                Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
                    .areas(area);
            render_details(app, f, details_area, &fields);
            render_map(f, map_area, &map);
        }
    }
}

fn render_error_panel(f: &mut Frame<'_>, area: Rect, message: &str) {
    let block = Block::default()
        .title(" Error ")
        .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let text = Text::from(vec![
        TextLine::from(""),
        TextLine::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        TextLine::from(""),
        TextLine::from(Span::styled(
            "Press r to refresh",
            Style::default().fg(Color::Gray),
        )),
    ]);

    f.render_widget(
        Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_details(app: &App, f: &mut Frame<'_>, area: Rect, fields: &[(Field, String)]) {
    let block = Block::default()
        .title(" Details ")
        .title_style(Style::default().fg(Color::Yellow))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::vertical(fields.iter().map(|_| Constraint::Length(1))).split(inner);

    for ((field, value), row) in fields.iter().zip(rows.iter()) {
        let line = TextLine::from(vec![
            Span::styled(
                format!("{:<LABEL_WIDTH$}", field.label()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(value.as_str()),
        ]);
        f.render_widget(Paragraph::new(line), *row);
    }

    if let Ok(mut card_fx) = app.card_fx.lock() {
        let buffer = f.buffer_mut();
        for (effect, row) in card_fx.iter_mut().zip(rows.iter()) {
            buffer.render_effect(effect, *row, app.last_tick);
        }
    }
}

fn render_status(app: &App, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Controls ")
        .title_style(Style::default().fg(Color::Yellow))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let controls = app.dashboard.controls();
    let mut buttons = vec![
        key_hint("r"),
        control_span(&controls.refresh),
        Span::raw("   "),
        key_hint("c"),
        control_span(&controls.copy),
        Span::raw("   "),
        key_hint("x"),
        control_span(&controls.clear_cache),
    ];
    if let Some(back) = &controls.back {
        buttons.extend([Span::raw("   "), key_hint("b"), control_span(back)]);
    }

    let status = if app.is_busy() {
        Throbber::default()
            .label(app.status_message.as_str())
            .throbber_set(BRAILLE_SIX)
            .throbber_style(Style::default().fg(Color::Yellow))
            .to_line(&app.throbber)
    } else {
        let style = if app.status_message.starts_with("Error") {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };
        TextLine::from(Span::styled(app.status_message.as_str(), style))
    };

    f.render_widget(
        Paragraph::new(Text::from(vec![TextLine::from(buttons), status])).block(block),
        area,
    );
}

fn render_shortcuts(f: &mut Frame<'_>, area: Rect) {
    let hint = Paragraph::new(TextLine::from(Span::styled(
        "r refresh · c copy · x clear cache · / search · b back · F1 help · q quit",
        Style::default().fg(Color::DarkGray),
    )))
    .alignment(Alignment::Center);
    f.render_widget(hint, area);
}

fn render_help_popup(f: &mut Frame<'_>) {
    let area = centered_rect(60, 60, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title("== Help & Keyboard Shortcuts ==")
        .title_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let shortcuts = [
        ("r", "Refresh the record from its source"),
        ("c", "Copy the IPv4 address"),
        ("x", "Clear the lookup server cache"),
        ("/ or s", "Focus the search input"),
        ("Enter", "Look up the typed address"),
        ("Esc", "Leave the search input, or go back to your IP"),
        ("b", "Back to your IP"),
        ("F1", "Toggle this help"),
        ("q", "Quit"),
    ];

    let mut lines = vec![
        TextLine::from(Span::styled(
            "IP Geolocation Dashboard",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        TextLine::from(""),
    ];
    lines.extend(shortcuts.iter().map(|(key, action)| {
        TextLine::from(vec![
            Span::styled(
                format!("  {key:<8}"),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw(*action),
        ])
    }));
    lines.push(TextLine::from(""));
    lines.push(TextLine::from(Span::styled(
        "Press any key to close",
        Style::default().fg(Color::Gray),
    )));

    f.render_widget(
        Paragraph::new(Text::from(lines))
            .block(block)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn key_hint(key: &'static str) -> Span<'static> {
    Span::styled(
        format!("[{key}] "),
        Style::default().fg(Color::DarkGray),
    )
}

fn control_style(control: &ControlView) -> Style {
    let style = match control.tone {
        Tone::Normal => Style::default().fg(Color::Cyan),
        Tone::Busy => Style::default().fg(Color::DarkGray),
        Tone::Success => Style::default().fg(Color::Green),
        Tone::Failure => Style::default().fg(Color::Red),
    };
    if control.enabled {
        style.add_modifier(Modifier::BOLD)
    } else {
        style.add_modifier(Modifier::DIM)
    }
}

fn control_span(control: &ControlView) -> Span<'static> {
    Span::styled(control.label, control_style(control))
}
