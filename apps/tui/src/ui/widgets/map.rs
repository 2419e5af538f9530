use ipgeo_view::projection::{MapMarker, MAP_UNAVAILABLE_DETAIL, MAP_UNAVAILABLE_TITLE};
use ipgeo_view::viewport::{marker_radius, Viewport};
use ipgeo_view::MapView;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::canvas::{Canvas, Circle, Map, MapResolution};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

pub fn render_map(f: &mut Frame<'_>, area: Rect, map: &MapView) {
    match map {
        MapView::Present(marker) => render_marker(f, area, marker),
        MapView::Unavailable => render_unavailable(f, area),
    }
}

fn render_marker(f: &mut Frame<'_>, area: Rect, marker: &MapMarker) {
    let block = Block::default()
        .title(format!(" {} ", marker.title))
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [canvas_area, popup_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(2)]).areas(inner);

    let viewport = Viewport::around(marker.latitude, marker.longitude, marker.zoom);
    let radius = marker_radius(marker, &viewport);
    let (x, y) = (marker.longitude, marker.latitude);

    let canvas = Canvas::default()
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
                Span::styled("●", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            );
        });
    f.render_widget(canvas, canvas_area);

    f.render_widget(
        Paragraph::new(popup_text(marker)).wrap(Wrap { trim: true }),
        popup_area,
    );
}

/// The marker popup, folded onto two lines.
fn popup_text(marker: &MapMarker) -> Text<'_> {
    let label = Style::default().fg(Color::Yellow);
    let entry = |(name, value): &(&'static str, String)| {
        vec![
            Span::styled(format!("{name}: "), label),
            Span::raw(value.clone()),
            Span::raw("  "),
        ]
    };

    Text::from(
        marker
            .popup_rows()
            .map(|row| TextLine::from(row.iter().flat_map(entry).collect::<Vec<_>>()))
            .to_vec(),
    )
}

fn render_unavailable(f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Map ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let text = Text::from(vec![
        TextLine::from(""),
        TextLine::from(Span::styled(
            MAP_UNAVAILABLE_TITLE,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
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

#[cfg(test)]
mod tests {
    use super::*;

    fn marker() -> MapMarker {
        MapMarker {
            latitude: 41.15,
            longitude: -8.61,
            zoom: 13,
            radius_meters: 1000.0,
            title: "Your Location",
            popup: vec![
                ("IP", "1.2.3.4".to_string()),
                ("Owner", "Example".to_string()),
                ("ISP", "Example ISP".to_string()),
                ("City", "Porto".to_string()),
                ("Country", "Portugal".to_string()),
                ("Coordinates", "41.1500, -8.6100".to_string()),
            ],
        }
    }

    fn line_text(line: &TextLine<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn popup_is_split_across_two_lines() {
        let marker = marker();
        let text = popup_text(&marker);

        assert_eq!(text.lines.len(), 2);
        assert_eq!(
            line_text(&text.lines[0]).trim_end(),
            "IP: 1.2.3.4  Owner: Example  ISP: Example ISP"
        );
        assert_eq!(
            line_text(&text.lines[1]).trim_end(),
            "City: Porto  Country: Portugal  Coordinates: 41.1500, -8.6100"
        );
    }
}
