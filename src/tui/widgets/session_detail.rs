use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::{score_bar, score_color};
use crate::models::SessionSummary;
use crate::scoring;
use crate::truncate;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let Some(session) = &app.selected_session else {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Session Detail ");
        let paragraph = Paragraph::new("No session selected").block(block);
        f.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Summary
            Constraint::Min(0),    // Answers
        ])
        .split(area);

    draw_summary(f, app, session, chunks[0]);
    draw_answers(f, app, chunks[1]);
}

fn draw_summary(f: &mut Frame, app: &App, session: &SessionSummary, area: Rect) {
    let percentage = session.percentage();
    let results: Vec<_> = app
        .selected_answers
        .iter()
        .map(|a| a.result.clone())
        .collect();
    let minutes = scoring::to_minutes(scoring::total_elapsed_seconds(&results));

    let text = vec![
        Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Gray)),
            Span::styled(score_bar(percentage), Style::default().fg(Color::Green)),
            Span::styled(
                format!(
                    " {}/{} points ({:.2}%)",
                    session.score, session.available, percentage
                ),
                Style::default().fg(score_color(percentage)),
            ),
        ]),
        Line::from(vec![
            Span::styled("Correct: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{} of {}", session.correct, session.answered),
                Style::default().fg(Color::White),
            ),
            Span::raw("  "),
            Span::styled("Time: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{:.2} minutes", minutes),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled("Finished: ", Style::default().fg(Color::Gray)),
            Span::styled(
                session.ended_at.format("%b %d, %Y %H:%M").to_string(),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled("Session: ", Style::default().fg(Color::Gray)),
            Span::styled(
                session.session_id.to_string(),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", session.category))
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn draw_answers(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .selected_answers
        .iter()
        .enumerate()
        .map(|(i, answer)| {
            let result = &answer.result;
            let (mark, color) = if result.is_correct {
                ("✔", Color::Green)
            } else {
                ("✘", Color::Red)
            };

            let mut lines = vec![Line::from(vec![
                Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{} ", mark), Style::default().fg(color)),
                Span::styled(
                    truncate(&answer.question_text, 60),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!(
                        "  {}pts {:.1}s",
                        result.points,
                        scoring::elapsed_seconds(result)
                    ),
                    Style::default().fg(Color::DarkGray),
                ),
            ])];

            let mut detail = vec![
                Span::raw("      "),
                Span::styled("Answered: ", Style::default().fg(Color::Gray)),
                Span::styled(result.user_answer.clone(), Style::default().fg(color)),
            ];
            if !result.is_correct {
                detail.extend(vec![
                    Span::styled("  Correct: ", Style::default().fg(Color::Gray)),
                    Span::styled(
                        answer.correct_answer.clone(),
                        Style::default().fg(Color::Green),
                    ),
                ]);
            }
            lines.push(Line::from(detail));

            ListItem::new(lines)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Answers ({}) ", app.selected_answers.len()))
        .title_style(Style::default().fg(Color::Magenta));

    let list = List::new(items).block(block);
    f.render_widget(list, area);
}
