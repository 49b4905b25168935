//! Grid layout for the 128-team board: no edges, just two blocks of columns.

use crate::Match;
use crate::layout::{Node, NodeData, NodeKind, Position};

#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    pub columns_per_section: usize,
    pub sections: usize,
    pub column_width: f64,
    pub row_height: f64,
    /// Extra x offset applied to every section after the first.
    pub section_gap: f64,
    pub top_margin: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns_per_section: 5,
            sections: 2,
            column_width: 120.0,
            row_height: 100.0,
            section_gap: 720.0,
            top_margin: 50.0,
        }
    }
}

fn is_bye_slot(display: &str) -> bool {
    display.eq_ignore_ascii_case("bye")
}

/// Place matches left-to-right, top-to-bottom. Slots where both sides are BYEs
/// aren't real matches and are dropped before placement.
pub fn grid_layout(matches: &[Match], config: &GridConfig) -> Vec<Node> {
    let per_row = (config.columns_per_section * config.sections).max(1);
    let per_section = config.columns_per_section.max(1);

    matches
        .iter()
        .filter(|m| !(is_bye_slot(&m.team1_display) && is_bye_slot(&m.team2_display)))
        .enumerate()
        .map(|(i, m)| {
            let row = i / per_row;
            let col = i % per_row;
            let section = col / per_section;
            let x = (col % per_section) as f64 * config.column_width + section as f64 * config.section_gap;
            let y = row as f64 * config.row_height + config.top_margin;
            Node {
                id: m.id.clone(),
                kind: NodeKind::GridMatch,
                position: Position { x, y },
                data: NodeData::Match(m.clone()),
            }
        })
        .collect()
}
