use std::time::Duration;

use ipgeo_view::controls::{ControlView, Tone};
use ipgeo_view::projection::{MapMarker, MAP_UNAVAILABLE_DETAIL, MAP_UNAVAILABLE_TITLE};
use ipgeo_view::viewport::{marker_radius, Viewport};
use ipgeo_view::{Field, MapView, Projection};
use ratzilla::ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line as TextLine, Span, Text},
    widgets::{
        canvas::{Canvas, Circle, Map, MapResolution},
        Block, Borders, Clear, Paragraph, Wrap,
    },
    Frame,
};

use crate::animation::RevealStep;
use crate::WebApp;

const LABEL_WIDTH: usize = 24;

pub fn render_dashboard(app: &WebApp, now: Duration, f: &mut Frame<'_>) {
    let area = f.area();
    let block = Block::default()
        .title("IP Geolocation")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .title(
            TextLine::from(Span::styled(
                format!(" {} ", app.dashboard.mode_badge()),
                badge_style(app).add_modifier(Modifier::BOLD),
            ))
            .right_aligned(),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area).inner(Margin::new(1, 1));
    f.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(inner);

    render_header(app, f, layout[0]);
    render_search(app, f, layout[1]);
    render_content(app, now, f, layout[2]);
    render_controls(app, f, layout[3]);
    render_shortcuts(f, layout[4]);

    if app.show_help {
        render_help(f, area);
    }
}

fn badge_style(app: &WebApp) -> Style {
    if app.dashboard.search_header().is_some() {
        Style::default().fg(Color::Black).bg(Color::Magenta)
    } else {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    }
}

fn render_header(app: &WebApp, f: &mut Frame<'_>, area: Rect) {
    let line = app.dashboard.search_header().map_or_else(
        || {
            TextLine::from(Span::styled(
                "Your connection, as seen by the lookup server",
                Style::default().fg(Color::Gray),
            ))
        },
        |header| {
            let mut spans = vec![
                Span::styled("Search results for ", Style::default().fg(Color::Gray)),
                Span::styled(
                    header.address,
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
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

    f.render_widget(Paragraph::new(line), area);
}

fn render_search(app: &WebApp, f: &mut Frame<'_>, area: Rect) {
    let [input_area, button_area] =
        Layout::horizontal([Constraint::Min(20), Constraint::Length(18)]).areas(area);

    let focused = app.dashboard.search_focused();
    let text = app.dashboard.search_text();
    let block = Block::default()
        .title("Search IP (/)")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Yellow } else { Color::Gray }));

    let input = if focused {
        TextLine::from(vec![
            Span::raw(text),
            Span::styled("█", Style::default().fg(Color::Yellow)),
        ])
    } else if text.is_empty() {
        TextLine::from(Span::styled(
            "Enter an IPv4 or IPv6 address",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        TextLine::from(text)
    };
    f.render_widget(Paragraph::new(input).block(block), input_area);

    let search = app.dashboard.controls().search;
    f.render_widget(
        Paragraph::new(TextLine::from(control_span(&search)))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(control_style(&search)),
            ),
        button_area,
    );
}

fn render_content(app: &WebApp, now: Duration, f: &mut Frame<'_>, area: Rect) {
    match app.dashboard.projection() {
        Projection::Error { message } => render_error(f, area, &message),
        Projection::Details { fields, map } => {
            let content = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
                .split(area);
            render_details(app, now, f, content[0], &fields);
            render_map(f, content[1], &map);
        }
    }
}

fn render_error(f: &mut Frame<'_>, area: Rect, message: &str) {
    let block = Block::default()
        .title("Error")
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

fn render_details(
    app: &WebApp,
    now: Duration,
    f: &mut Frame<'_>,
    area: Rect,
    fields: &[(Field, String)],
) {
    let block = Block::default()
        .title("Details")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = fields
        .iter()
        .enumerate()
        .map(|(index, (field, value))| {
            let (label, text) = reveal_styles(app.reveal.step(index, now));
            TextLine::from(vec![
                Span::styled(format!("{:<LABEL_WIDTH$}", field.label()), label),
                Span::styled(value.clone(), text),
            ])
        })
        .collect::<Vec<_>>();

    f.render_widget(Paragraph::new(Text::from(lines)), inner);
}

fn reveal_styles(step: RevealStep) -> (Style, Style) {
    match step {
        RevealStep::Hidden => (
            Style::default().fg(Color::Black),
            Style::default().fg(Color::Black),
        ),
        RevealStep::Dim => (
            Style::default().fg(Color::Cyan).add_modifier(Modifier::DIM),
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        ),
        RevealStep::Shown => (
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            Style::default().fg(Color::White),
        ),
    }
}

fn render_map(f: &mut Frame<'_>, area: Rect, map: &MapView) {
    match map {
        MapView::Present(marker) => render_marker(f, area, marker),
        MapView::Unavailable => render_map_unavailable(f, area),
    }
}

fn render_marker(f: &mut Frame<'_>, area: Rect, marker: &MapMarker) {
    let block = Block::default()
        .title(marker.title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [canvas_area, popup_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(2)]).areas(inner);

    let viewport = Viewport::around(marker.latitude, marker.longitude, marker.zoom);
    let radius = marker_radius(marker, &viewport);
    let (x, y) = (marker.longitude, marker.latitude);

    f.render_widget(
        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds(viewport.x_bounds)
            .y_bounds(viewport.y_bounds)
            .paint(move |ctx| {
                ctx.draw(&Map {
                    color: Color::DarkGray,
                    resolution: MapResolution::High,
                });
                ctx.layer();
                ctx.draw(&Circle {
                    x,
                    y,
                    radius,
                    color: Color::Blue,
                });
                ctx.print(
                    x,
                    y,
                    Span::styled(
                        "●",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                );
            }),
        canvas_area,
    );

    let popup = marker.popup_rows().map(|row| {
        TextLine::from(
            row.iter()
                .flat_map(|(name, value)| {
                    [
                        Span::styled(format!("{name}: "), Style::default().fg(Color::Yellow)),
                        Span::raw(format!("{value}  ")),
                    ]
                })
                .collect::<Vec<_>>(),
        )
    });
    f.render_widget(
        Paragraph::new(Text::from(popup.to_vec())).wrap(Wrap { trim: true }),
        popup_area,
    );
}

fn render_map_unavailable(f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title("Map")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let text = Text::from(vec![
        TextLine::from(""),
        TextLine::from(Span::styled(
            MAP_UNAVAILABLE_TITLE,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        TextLine::from(Span::styled(
            MAP_UNAVAILABLE_DETAIL,
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

fn render_controls(app: &WebApp, f: &mut Frame<'_>, area: Rect) {
    let controls = app.dashboard.controls();
    let mut spans = vec![
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
        spans.extend([Span::raw("   "), key_hint("b"), control_span(back)]);
    }

    let block = Block::default()
        .title("Controls")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    f.render_widget(
        Paragraph::new(TextLine::from(spans))
            .block(block)
            .alignment(Alignment::Center),
        area,
    );
}

fn render_shortcuts(f: &mut Frame<'_>, area: Rect) {
    f.render_widget(
        Paragraph::new("r refresh · c copy · x clear cache · / search · b back · F1 help")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn render_help(f: &mut Frame<'_>, area: Rect) {
    let popup = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .split(area)[1];
    let popup = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .split(popup)[1];
    f.render_widget(Clear, popup);

    let shortcuts = [
        ("r", "Refresh the page data"),
        ("c", "Copy the IPv4 address"),
        ("x", "Clear the lookup server cache"),
        ("/ or s", "Focus the search input"),
        ("Enter", "Look up the typed address"),
        ("Esc", "Leave the search input, or go back to your IP"),
        ("b", "Back to your IP"),
        ("F1", "Toggle this help"),
    ];
    let mut lines = shortcuts
        .iter()
        .map(|(key, action)| {
            TextLine::from(vec![
                Span::styled(
                    format!("  {key:<8}"),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(*action),
            ])
        })
        .collect::<Vec<_>>();
    lines.push(TextLine::from(""));
    lines.push(TextLine::from(Span::styled(
        "Press any key to close",
        Style::default().fg(Color::Gray),
    )));

    f.render_widget(
        Paragraph::new(Text::from(lines))
            .block(
                Block::default()
                    .title("Help")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .wrap(Wrap { trim: true }),
        popup,
    );
}

fn key_hint(key: &'static str) -> Span<'static> {
    Span::styled(format!("[{key}] "), Style::default().fg(Color::DarkGray))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::CardReveal;
    use ipgeo_view::{Dashboard, IpRecord, RefreshPolicy};
    use ratzilla::ratatui::{backend::TestBackend, Terminal};

    fn app(record: IpRecord) -> WebApp {
        WebApp {
            dashboard: Dashboard::new(record, RefreshPolicy::default()),
            show_help: false,
            reveal: CardReveal::default(),
        }
    }

    fn draw(app: &mut WebApp, now: Duration) -> String {
        app.reveal.sync(app.dashboard.revision(), Duration::ZERO);
        let mut terminal = Terminal::new(TestBackend::new(120, 34)).unwrap();
        terminal.draw(|f| render_dashboard(app, now, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn renders_fields_and_map() {
        let mut app = app(IpRecord {
            ipv4: Some("1.2.3.4".to_string()),
            city: Some("Porto".to_string()),
            latitude: Some(41.15),
            longitude: Some(-8.61),
            ..IpRecord::default()
        });
        let screen = draw(&mut app, Duration::from_secs(5));

        assert!(screen.contains("Viewing Your IP"));
        assert!(screen.contains("1.2.3.4"));
        assert!(screen.contains("Porto"));
        assert!(screen.contains("Your Location"));
        assert!(screen.contains("Refresh Data"));
    }

    #[test]
    fn error_record_replaces_content() {
        let mut app = app(IpRecord::from_error("IP data unavailable"));
        let screen = draw(&mut app, Duration::from_secs(5));

        assert!(screen.contains("IP data unavailable"));
        assert!(!screen.contains("IPv4 Address"));
        assert!(!screen.contains(MAP_UNAVAILABLE_TITLE));
    }

    #[test]
    fn missing_coordinates_show_placeholder() {
        let mut app = app(IpRecord {
            ipv4: Some("1.2.3.4".to_string()),
            ..IpRecord::default()
        });
        let screen = draw(&mut app, Duration::from_secs(5));

        assert!(screen.contains(MAP_UNAVAILABLE_TITLE));
    }

    #[test]
    fn help_lists_shortcuts() {
        let mut app = app(IpRecord::default());
        app.show_help = true;
        let screen = draw(&mut app, Duration::from_secs(5));

        assert!(screen.contains("Toggle this help"));
    }

    #[test]
    fn hidden_rows_use_background_colour() {
        let (label, value) = reveal_styles(RevealStep::Hidden);
        assert_eq!(label.fg, Some(Color::Black));
        assert_eq!(value.fg, Some(Color::Black));
    }
}
