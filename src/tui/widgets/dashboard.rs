use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::{score_bar, score_color};
use crate::truncate;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Stats
            Constraint::Min(0),    // Recent sessions
        ])
        .split(area);

    draw_stats(f, app, chunks[0]);
    draw_recent_sessions(f, app, chunks[1]);
}

fn stat_line(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

fn draw_stats(f: &mut Frame, app: &App, area: Rect) {
    let stats = &app.stats;
    let accuracy = stats.accuracy();

    let text = vec![
        Line::from(vec![
            Span::styled("Questions: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}", stats.total_questions),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" in {} categories", stats.total_categories),
                Style::default().fg(Color::Gray),
            ),
        ]),
        stat_line("Sessions", format!("{}", stats.total_sessions), Color::White),
        stat_line(
            "Answers",
            format!("{} ({} correct)", stats.total_answers, stats.correct_answers),
            Color::White,
        ),
        stat_line("Accuracy", format!("{:.1}%", accuracy), score_color(accuracy)),
        stat_line(
            "Points",
            format!("{} / {}", stats.points_earned, stats.points_available),
            Color::Cyan,
        ),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Stats ")
        .title_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(text).block(block);
    f.render_widget(paragraph, area);
}

fn draw_recent_sessions(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Recent Sessions ")
        .title_style(Style::default().fg(Color::Magenta));

    if app.recent_sessions.is_empty() {
        let paragraph = Paragraph::new("No sessions yet. Run `trivia-quiz play` to take a quiz!")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .recent_sessions
        .iter()
        .map(|session| {
            let percentage = session.percentage();
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<10}", session.ended_at.format("%b %d")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{:<22}", truncate(&session.category, 20)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(score_bar(percentage), Style::default().fg(Color::Green)),
                Span::styled(
                    format!(" {:>5.1}%", percentage),
                    Style::default().fg(score_color(percentage)),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(block);
    f.render_widget(list, area);
}
