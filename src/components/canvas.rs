use bracket_api::layout::{Edge, Handle, Node, NodeData, NodeKind, Position};
use bracket_api::{Match, MatchStatus, QualifiedTeam};
use std::collections::HashMap;
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::Style;
use tui::widgets::Widget;

use crate::components::theme::{ThemeColor, resolve, stroke};

// ---------------------------------------------------------------------------
// Projection: layout units → terminal cells
// ---------------------------------------------------------------------------

/// Rows per match card: team 1, detail line, team 2.
pub const CARD_HEIGHT: u16 = 3;
/// Rows per qualified-team card: label, team name.
pub const QUALIFIED_HEIGHT: u16 = 2;

/// How many layout units one terminal column / row covers, plus the card width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub units_per_col: f64,
    pub units_per_row: f64,
    pub card_width: u16,
}

impl Projection {
    /// Round spacing 250 → 25 columns, match spacing 150 → 4 rows.
    pub const BRACKET: Projection = Projection { units_per_col: 10.0, units_per_row: 37.5, card_width: 22 };
    /// Column width 120 → 15 columns, row height 100 → 4 rows.
    pub const GRID: Projection = Projection { units_per_col: 8.0, units_per_row: 25.0, card_width: 13 };

    fn place(&self, position: Position, origin: Position) -> (i32, i32) {
        let col = ((position.x - origin.x) / self.units_per_col).round() as i32;
        let row = ((position.y - origin.y) / self.units_per_row).round() as i32;
        (col, row)
    }
}

/// Top-left corner of the node cloud; maps to cell (0, 0).
fn origin(nodes: &[Node]) -> Position {
    if nodes.is_empty() {
        return Position { x: 0.0, y: 0.0 };
    }
    nodes.iter().fold(Position { x: f64::MAX, y: f64::MAX }, |acc, n| Position {
        x: acc.x.min(n.position.x),
        y: acc.y.min(n.position.y),
    })
}

fn card_height(kind: NodeKind) -> u16 {
    match kind {
        NodeKind::Qualified => QUALIFIED_HEIGHT,
        NodeKind::Match | NodeKind::GridMatch => CARD_HEIGHT,
    }
}

/// Width and height in cells needed to show every node.
pub fn canvas_size(nodes: &[Node], projection: Projection) -> (u16, u16) {
    let origin = origin(nodes);
    nodes.iter().fold((0, 0), |(w, h), n| {
        let (col, row) = projection.place(n.position, origin);
        let right = col.max(0) as u16 + projection.card_width;
        let bottom = row.max(0) as u16 + card_height(n.kind);
        (w.max(right), h.max(bottom))
    })
}

// ---------------------------------------------------------------------------
// NodeCanvas widget
// ---------------------------------------------------------------------------

/// Draws positioned nodes as cards and edges as orthogonal box-drawing lines.
pub struct NodeCanvas<'a> {
    pub nodes: &'a [Node],
    pub edges: &'a [Edge],
    pub projection: Projection,
    pub scroll_x: u16,
    pub scroll_y: u16,
}

impl<'a> Widget for NodeCanvas<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let origin = origin(self.nodes);
        let cells: HashMap<&str, (i32, i32)> = self
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), self.projection.place(n.position, origin)))
            .collect();

        let mut surface = Surface {
            buf,
            area,
            scroll_x: i32::from(self.scroll_x),
            scroll_y: i32::from(self.scroll_y),
        };

        // Pass 1: edges, so cards drawn afterwards sit on top of them.
        for edge in self.edges {
            let (Some(&source), Some(&target)) =
                (cells.get(edge.source.as_str()), cells.get(edge.target.as_str()))
            else {
                continue;
            };
            let from = attach_point(source, edge.source_handle, self.projection.card_width);
            let to = attach_point(target, edge.target_handle, self.projection.card_width);
            let style = stroke(edge.style.stroke);
            draw_edge(&mut surface, from, edge.source_handle, to, edge.target_handle, style);
        }

        // Pass 2: cards.
        for node in self.nodes {
            let (col, row) = cells[node.id.as_str()];
            let width = self.projection.card_width as usize;
            let lines = match &node.data {
                NodeData::Match(m) => match_card(m, node.kind, width),
                NodeData::Qualified(team) => qualified_card(team, width),
            };
            for (i, (text, style)) in lines.into_iter().enumerate() {
                surface.put_str(col, row + i as i32, &text, style);
            }
        }
    }
}

/// Cell just outside the card on the handle's side, level with the card's
/// second row.
fn attach_point((col, row): (i32, i32), handle: Handle, width: u16) -> (i32, i32) {
    match handle {
        Handle::Left => (col - 1, row + 1),
        Handle::Right => (col + i32::from(width), row + 1),
    }
}

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

fn center(text: &str, width: usize) -> String {
    let clipped: String = text.chars().take(width).collect();
    let len = clipped.chars().count();
    let left = (width - len) / 2;
    format!("{}{}{}", " ".repeat(left), clipped, " ".repeat(width - len - left))
}

/// Detail line between the two teams: result, live score, venue, or status.
pub fn detail_line(m: &Match) -> String {
    if m.is_bye {
        return "BYE".to_string();
    }
    match m.status {
        MatchStatus::Completed => match &m.winner {
            Some(winner) => format!("Winner: {winner}"),
            None => m.status.label().to_string(),
        },
        MatchStatus::InProgress if !m.score1.is_empty() && !m.score2.is_empty() => {
            format!("{} - {}", m.score1, m.score2)
        }
        _ if m.arena.to_lowercase().contains("arena") => m.arena.clone(),
        _ if !m.arena.is_empty() => format!("Arena: {}", m.arena),
        _ => m.status.label().to_string(),
    }
}

fn team_label<'m>(number: &'m str, display: &'m str, kind: NodeKind) -> &'m str {
    match kind {
        NodeKind::GridMatch if !number.is_empty() => number,
        _ => display,
    }
}

fn match_card(m: &Match, kind: NodeKind, width: usize) -> Vec<(String, Style)> {
    let team_style = |number: &str, display: &str| {
        let won = m.is_completed() && m.winner.as_deref().is_some_and(|w| w == number && !w.is_empty());
        if won {
            resolve(ThemeColor::Winner)
        } else if m.is_bye && display.to_lowercase().contains("bye") {
            resolve(ThemeColor::Dim)
        } else if m.has_scores() {
            resolve(ThemeColor::Primary)
        } else {
            resolve(ThemeColor::Idle)
        }
    };

    vec![
        (
            center(team_label(&m.team1_number, &m.team1_display, kind), width),
            team_style(&m.team1_number, &m.team1_display),
        ),
        (center(&detail_line(m), width), resolve(ThemeColor::Detail)),
        (
            center(team_label(&m.team2_number, &m.team2_display, kind), width),
            team_style(&m.team2_number, &m.team2_display),
        ),
    ]
}

fn qualified_card(team: &QualifiedTeam, width: usize) -> Vec<(String, Style)> {
    vec![
        (center("QUALIFIED", width), resolve(ThemeColor::Dim)),
        (center(&team.team_name, width), resolve(ThemeColor::Qualified)),
    ]
}

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

const UP: u8 = 1;
const DOWN: u8 = 2;
const LEFT: u8 = 4;
const RIGHT: u8 = 8;

/// Box-drawing glyph for a set of arms. Overlapping lines merge by OR-ing arms.
pub fn glyph(mask: u8) -> char {
    match mask {
        m if m == UP | DOWN | LEFT | RIGHT => '┼',
        m if m == UP | DOWN | RIGHT => '├',
        m if m == UP | DOWN | LEFT => '┤',
        m if m == DOWN | LEFT | RIGHT => '┬',
        m if m == UP | LEFT | RIGHT => '┴',
        m if m == DOWN | RIGHT => '┌',
        m if m == DOWN | LEFT => '┐',
        m if m == UP | RIGHT => '└',
        m if m == UP | LEFT => '┘',
        m if m & (UP | DOWN) != 0 && m & (LEFT | RIGHT) == 0 => '│',
        _ => '─',
    }
}

fn arms(symbol: &str) -> u8 {
    match symbol {
        "┼" => UP | DOWN | LEFT | RIGHT,
        "├" => UP | DOWN | RIGHT,
        "┤" => UP | DOWN | LEFT,
        "┬" => DOWN | LEFT | RIGHT,
        "┴" => UP | LEFT | RIGHT,
        "┌" => DOWN | RIGHT,
        "┐" => DOWN | LEFT,
        "└" => UP | RIGHT,
        "┘" => UP | LEFT,
        "│" => UP | DOWN,
        "─" => LEFT | RIGHT,
        _ => 0,
    }
}

fn direction((x, y): (i32, i32), (nx, ny): (i32, i32)) -> u8 {
    if nx < x {
        LEFT
    } else if nx > x {
        RIGHT
    } else if ny < y {
        UP
    } else if ny > y {
        DOWN
    } else {
        0
    }
}

/// Arm pointing from an attach cell back into its card.
fn toward_card(handle: Handle) -> u8 {
    match handle {
        Handle::Left => RIGHT,
        Handle::Right => LEFT,
    }
}

/// Cells along the step path: across to the midpoint column, along to the
/// target row, then across into the target.
fn route(from: (i32, i32), to: (i32, i32)) -> Vec<(i32, i32)> {
    let mid = (from.0 + to.0).div_euclid(2);
    let corners = [from, (mid, from.1), (mid, to.1), to];

    let mut cells = vec![from];
    for pair in corners.windows(2) {
        let (mut x, mut y) = pair[0];
        let (tx, ty) = pair[1];
        while (x, y) != (tx, ty) {
            x += (tx - x).signum();
            y += (ty - y).signum();
            cells.push((x, y));
        }
    }
    cells
}

fn draw_edge(
    surface: &mut Surface,
    from: (i32, i32),
    from_handle: Handle,
    to: (i32, i32),
    to_handle: Handle,
    style: Style,
) {
    let cells = route(from, to);
    let last = cells.len() - 1;
    for (i, &cell) in cells.iter().enumerate() {
        let mut mask = 0;
        if i > 0 {
            mask |= direction(cell, cells[i - 1]);
        }
        if i < last {
            mask |= direction(cell, cells[i + 1]);
        }
        if i == 0 {
            mask |= toward_card(from_handle);
        }
        if i == last {
            mask |= toward_card(to_handle);
        }
        surface.put_arms(cell.0, cell.1, mask, style);
    }
}

// ---------------------------------------------------------------------------
// Clipped drawing surface
// ---------------------------------------------------------------------------

struct Surface<'b> {
    buf: &'b mut Buffer,
    area: Rect,
    scroll_x: i32,
    scroll_y: i32,
}

impl Surface<'_> {
    /// Canvas cell → screen cell, or `None` when scrolled out of `area`.
    fn screen(&self, col: i32, row: i32) -> Option<(u16, u16)> {
        let x = col - self.scroll_x;
        let y = row - self.scroll_y;
        if x < 0 || y < 0 || x >= i32::from(self.area.width) || y >= i32::from(self.area.height) {
            return None;
        }
        Some((self.area.x + x as u16, self.area.y + y as u16))
    }

    fn put_char(&mut self, col: i32, row: i32, ch: char, style: Style) {
        if let Some(pos) = self.screen(col, row)
            && let Some(cell) = self.buf.cell_mut(pos)
        {
            cell.set_char(ch);
            cell.set_style(style);
        }
    }

    fn put_str(&mut self, col: i32, row: i32, text: &str, style: Style) {
        for (i, ch) in text.chars().enumerate() {
            self.put_char(col + i as i32, row, ch, style);
        }
    }

    fn put_arms(&mut self, col: i32, row: i32, mask: u8, style: Style) {
        let Some(pos) = self.screen(col, row) else {
            return;
        };
        if let Some(cell) = self.buf.cell_mut(pos) {
            let merged = arms(cell.symbol()) | mask;
            cell.set_char(glyph(merged));
            cell.set_style(style);
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
