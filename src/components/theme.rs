use tui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThemeColor {
    /// Team lines of a match that has started.
    Primary,
    /// Team lines of a match with no scores yet.
    Idle,
    /// Middle line of a match card.
    Detail,
    Dim,
    Winner,
    Qualified,
}

pub fn resolve(color: ThemeColor) -> Style {
    match color {
        ThemeColor::Primary => Style::default().fg(Color::Rgb(239, 68, 68)).add_modifier(Modifier::BOLD),
        ThemeColor::Idle => Style::default().fg(Color::Gray),
        ThemeColor::Detail => Style::default().fg(Color::White),
        ThemeColor::Dim => Style::default().fg(Color::Indexed(240)),
        ThemeColor::Winner => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ThemeColor::Qualified => Style::default().fg(Color::Rgb(34, 197, 94)).add_modifier(Modifier::BOLD),
    }
}

/// Stroke colors arrive as `#rrggbb` strings on layout edges.
pub fn stroke(hex: &str) -> Style {
    let color = hex.parse::<Color>().unwrap_or(Color::White);
    Style::default().fg(color)
}
