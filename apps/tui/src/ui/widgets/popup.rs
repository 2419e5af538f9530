use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);

    center
}

/// Modal prompt drawn over everything else until a key is pressed.
pub fn render_alert(message: &str, f: &mut Frame<'_>) {
    let mut area = centered_rect(60, 30, f.area());
    let wanted = u16::try_from(message.lines().count() + 4).unwrap_or(u16::MAX);
    if area.height < wanted {
        area.height = wanted.min(f.area().height);
    }
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Alert ")
        .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let mut lines: Vec<TextLine<'_>> = message.lines().map(TextLine::from).collect();
    lines.push(TextLine::from(""));
    lines.push(TextLine::from(Span::styled(
        "Press any key to continue",
        Style::default().fg(Color::Gray),
    )));

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
