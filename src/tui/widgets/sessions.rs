use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::{score_bar, score_color};
use crate::truncate;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let title = if let Some(category) = &app.filter_category {
        format!(" Sessions (category: {}) ", category)
    } else {
        " Sessions ".to_string()
    };

    let items: Vec<ListItem> = app
        .sessions
        .items
        .iter()
        .map(|session| {
            let percentage = session.percentage();
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<18}", session.ended_at.format("%Y-%m-%d %H:%M")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{:<22}", truncate(&session.category, 20)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{:<8}", format!("{}/{}", session.correct, session.answered)),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    format!("{:<10}", format!("{}/{}", session.score, session.available)),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(score_bar(percentage), Style::default().fg(Color::Green)),
                Span::styled(
                    format!(" {:>5.1}%", percentage),
                    Style::default().fg(score_color(percentage)),
                ),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().fg(Color::Cyan));

    if items.is_empty() {
        let paragraph = Paragraph::new("No sessions match.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let header_style = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::BOLD);
    let header = Line::from(vec![
        Span::styled(format!("  {:<18}", "Finished"), header_style),
        Span::styled(format!("{:<22}", "Category"), header_style),
        Span::styled(format!("{:<8}", "Right"), header_style),
        Span::styled(format!("{:<10}", "Points"), header_style),
        Span::styled("Score", header_style),
    ]);

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.sessions.selected);

    // Header sits on the first row inside the border
    let header_area = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: 1,
    };
    f.render_widget(Paragraph::new(header), header_area);

    let list_area = Rect {
        x: area.x,
        y: area.y + 1,
        width: area.width,
        height: area.height.saturating_sub(1),
    };

    f.render_stateful_widget(list, list_area, &mut state);
}
