use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::canvas::{NodeCanvas, Projection, canvas_size};
use crate::state::app_state::Viewport;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use bracket_api::layout::{Edge, Node};

static TABS: &[&str; 2] = &["Bracket", "Grid"];

const HELP_TEXT: &str = "\
q / Ctrl-C   quit
1            bracket (32 teams)
2            grid (128 teams)
?            this help, Esc to leave
h j k l      pan (arrow keys work too)
r            refresh now
f            toggle full screen
\"            toggle log pane";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let _ = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Bracket => draw_bracket(f, layout.main, app),
            MenuItem::Grid => draw_grid(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Bracket => 0,
        MenuItem::Grid => 1,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

/// Status line, one row per pipeline error, then the key legend. Returns the
/// area left for the canvas.
fn draw_header(f: &mut Frame, area: Rect, status: String, updated: Option<&str>, errors: &[String]) -> Rect {
    let error_rows = u16::try_from(errors.len()).unwrap_or(u16::MAX);
    let [header, error_row, key_legend, content] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(error_rows),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(area);

    let mut spans = vec![Span::styled(status, Style::default().fg(Color::White))];
    if let Some(updated) = updated {
        spans.push(Span::styled(format!("  | updated {updated}"), Style::default().fg(Color::DarkGray)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), header);

    if !errors.is_empty() {
        let lines: Vec<Line> = errors.iter().map(|e| Line::from(format!("Error: {e}"))).collect();
        f.render_widget(Paragraph::new(lines).style(Style::default().fg(Color::Red)), error_row);
    }

    f.render_widget(
        Paragraph::new("Keys: h/j/k/l=pan  r=refresh  1/2=tabs  ?=help  q=quit")
            .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );
    content
}

fn draw_bracket(f: &mut Frame, area: Rect, app: &mut App) {
    let block = default_border(Color::White).title(" 32-Team Bracket ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let errors = app.errors();
    let bracket = &mut app.state.bracket;
    let content = draw_header(f, inner, bracket.status_line(), bracket.last_updated.as_deref(), &errors);
    draw_canvas(
        f,
        content,
        &bracket.layout.nodes,
        &bracket.layout.edges,
        Projection::BRACKET,
        &mut bracket.viewport,
    );
}

fn draw_grid(f: &mut Frame, area: Rect, app: &mut App) {
    let block = default_border(Color::White).title(" 128-Team Grid ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let errors = app.errors();
    let grid = &mut app.state.grid;
    let status = if grid.demo {
        format!("Demo grid: {} matches", grid.nodes.len())
    } else {
        format!("{} matches", grid.nodes.len())
    };
    let content = draw_header(f, inner, status, grid.last_updated.as_deref(), &errors);

    if grid.nodes.is_empty() {
        f.render_widget(
            Paragraph::new("Waiting for grid data...")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            content,
        );
        return;
    }
    draw_canvas(f, content, &grid.nodes, &[], Projection::GRID, &mut grid.viewport);
}

/// Render a node canvas, first pulling the viewport back inside the canvas.
fn draw_canvas(
    f: &mut Frame,
    area: Rect,
    nodes: &[Node],
    edges: &[Edge],
    projection: Projection,
    viewport: &mut Viewport,
) {
    let (width, height) = canvas_size(nodes, projection);
    viewport.x = viewport.x.min(width.saturating_sub(area.width));
    viewport.y = viewport.y.min(height.saturating_sub(area.height));

    f.render_widget(
        NodeCanvas { nodes, edges, projection, scroll_x: viewport.x, scroll_y: viewport.y },
        area,
    );
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Help ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(HELP_TEXT).style(Style::default().fg(Color::Gray)), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style(Style::default().fg(Color::Gray));
    f.render_widget(logs, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
