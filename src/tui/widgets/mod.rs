pub mod dashboard;
pub mod session_detail;
pub mod sessions;

use ratatui::style::Color;

// Green for a pass, yellow for half, red below
pub fn score_color(percentage: f64) -> Color {
    if percentage >= 70.0 {
        Color::Green
    } else if percentage >= 50.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

pub fn score_bar(percentage: f64) -> String {
    let filled = ((percentage / 20.0).round() as usize).min(5);
    format!("{}{}", "█".repeat(filled), "░".repeat(5 - filled))
}
