//! Bracket layout engine: rounds of matches → positioned nodes + directed edges.
//!
//! The bracket converges on the center from both sides. The first match round
//! is split in half (first half on the right, second half on the left), every
//! later round sits one `round_spacing` closer to `center_x`, and the terminal
//! "qualified teams" stage stacks up at the center itself.
//!
//! Coordinates are abstract world units, not terminal cells.

use crate::{Match, QualifiedTeam, Round, RoundEntries};
use serde::Serialize;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

pub const CENTER_X: f64 = 1200.0;
pub const CENTER_Y: f64 = 500.0;
/// Horizontal distance between adjacent round columns.
pub const ROUND_SPACING: f64 = 250.0;
/// Vertical distance between neighbouring first-round matches on one side.
pub const BASE_MATCH_SPACING: f64 = 150.0;
/// How many `ROUND_SPACING` steps out from the center the first round sits.
pub const MAX_ROUND_DEPTH: u32 = 4;
/// The qualified column starts this far above `CENTER_Y`...
pub const QUALIFIED_OFFSET: f64 = 150.0;
/// ...and steps down by this much per team.
pub const QUALIFIED_ROW_HEIGHT: f64 = 100.0;

const BRACKET_STROKE: &str = "#ffffff";
const ADVANCEMENT_STROKE: &str = "#22c55e";
const EDGE_TYPE: &str = "smoothstep";

// ---------------------------------------------------------------------------
// Custom display order
// ---------------------------------------------------------------------------

/// Hand-specified display permutations, keyed by the number of matches in a round.
///
/// Each entry lists original match indices in display order: the right-side
/// subsequence first, then the left-side one. Rounds whose size has no entry
/// (or whose entry doesn't fit) are displayed in array order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOrder {
    orders: BTreeMap<usize, Vec<usize>>,
}

impl MatchOrder {
    /// No permutations at all; every round shows in array order.
    pub fn identity() -> Self {
        Self::default()
    }

    /// The ordering used by the 32-team bracket (16 → 8 → 4 matches).
    pub fn standard() -> Self {
        let mut order = Self::identity();
        order.insert(vec![14, 6, 2, 10, 4, 12, 8, 0], vec![15, 7, 3, 11, 5, 13, 9, 1]);
        order.insert(vec![6, 2, 4, 0], vec![7, 3, 5, 1]);
        order.insert(vec![2, 0], vec![3, 1]);
        order
    }

    /// Register a permutation made of a right-side and a left-side run.
    pub fn insert(&mut self, right: Vec<usize>, left: Vec<usize>) {
        let mut order = right;
        order.extend(left);
        self.orders.insert(order.len(), order);
    }

    /// Display order for a round of `len` matches: `result[slot] = original index`.
    pub fn for_round(&self, len: usize) -> Vec<usize> {
        match self.orders.get(&len) {
            Some(order) if is_permutation(order, len) => order.clone(),
            _ => (0..len).collect(),
        }
    }
}

fn is_permutation(order: &[usize], len: usize) -> bool {
    let mut seen = vec![false; len];
    order.len() == len
        && order.iter().all(|&i| i < len && !std::mem::replace(&mut seen[i], true))
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub center_x: f64,
    pub center_y: f64,
    pub round_spacing: f64,
    pub base_match_spacing: f64,
    pub max_round_depth: u32,
    pub qualified_offset: f64,
    pub qualified_row_height: f64,
    pub match_order: MatchOrder,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            center_x: CENTER_X,
            center_y: CENTER_Y,
            round_spacing: ROUND_SPACING,
            base_match_spacing: BASE_MATCH_SPACING,
            max_round_depth: MAX_ROUND_DEPTH,
            qualified_offset: QUALIFIED_OFFSET,
            qualified_row_height: QUALIFIED_ROW_HEIGHT,
            match_order: MatchOrder::standard(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    #[serde(rename = "match")]
    Match,
    #[serde(rename = "qualified")]
    Qualified,
    #[serde(rename = "gridMatch")]
    GridMatch,
}

/// Render payload: the full record, so the renderer never recomputes anything.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeData {
    Match(Match),
    Qualified(QualifiedTeam),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub position: Position,
    pub data: NodeData,
}

/// Which half of the bracket a match is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Named attachment point on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: &'static str,
    pub stroke_width: u8,
}

impl EdgeStyle {
    /// Match → next-round match.
    pub const BRACKET: EdgeStyle = EdgeStyle { stroke: BRACKET_STROKE, stroke_width: 2 };
    /// Final match round → qualified team.
    pub const ADVANCEMENT: EdgeStyle = EdgeStyle { stroke: ADVANCEMENT_STROKE, stroke_width: 3 };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_handle: Handle,
    pub target_handle: Handle,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub style: EdgeStyle,
}

impl Edge {
    fn new(source: &str, target: &str, side: Side, style: EdgeStyle) -> Self {
        // Right-side matches leave through their left handle and enter the
        // target on its right, mirrored for the left side.
        let (source_handle, target_handle) = match side {
            Side::Right => (Handle::Left, Handle::Right),
            Side::Left => (Handle::Right, Handle::Left),
        };
        Self {
            id: format!("edge-{source}-{target}"),
            source: source.to_string(),
            target: target.to_string(),
            source_handle,
            target_handle,
            kind: EDGE_TYPE,
            style,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BracketLayout {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl BracketLayout {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// One already-placed match round: `(original index, y)` in display order.
type Placed = Vec<(usize, f64)>;

/// Lay out a whole bracket. Pure: the same rounds and config always produce the
/// same nodes and edges, in the same order.
pub fn layout(rounds: &[Round], config: &LayoutConfig) -> BracketLayout {
    let mut out = BracketLayout::default();
    let mut previous: Option<Placed> = None;
    let last = rounds.len().saturating_sub(1);

    for (round_idx, round) in rounds.iter().enumerate() {
        match &round.entries {
            RoundEntries::QualifiedTeams(teams) => {
                place_qualified(teams, config, &mut out.nodes);
                previous = None;
            }
            RoundEntries::Matches(matches) => {
                let order = config.match_order.for_round(matches.len());
                let placed = match &previous {
                    None => place_first_round(matches, &order, config, &mut out.nodes),
                    Some(parents) => {
                        let column = RoundColumn { round_idx, is_last: round_idx == last, total_rounds: rounds.len() };
                        place_later_round(matches, &order, parents, column, config, &mut out.nodes)
                    }
                };
                connect_round(matches, &order, rounds.get(round_idx + 1), &mut out.edges);
                previous = Some(placed);
            }
        }
    }

    out
}

fn place_qualified(teams: &[QualifiedTeam], config: &LayoutConfig, nodes: &mut Vec<Node>) {
    let top = config.center_y - config.qualified_offset;
    for (i, team) in teams.iter().enumerate() {
        nodes.push(Node {
            id: team.id.clone(),
            kind: NodeKind::Qualified,
            position: Position { x: config.center_x, y: top + i as f64 * config.qualified_row_height },
            data: NodeData::Qualified(team.clone()),
        });
    }
}

/// Side of a display slot: the first half (rounded up) goes right.
fn side_of(slot: usize, len: usize) -> Side {
    if slot < len.div_ceil(2) { Side::Right } else { Side::Left }
}

fn signed(side: Side, distance: f64) -> f64 {
    match side {
        Side::Right => distance,
        Side::Left => -distance,
    }
}

fn match_node(m: &Match, x: f64, y: f64) -> Node {
    Node {
        id: m.id.clone(),
        kind: NodeKind::Match,
        position: Position { x, y },
        data: NodeData::Match(m.clone()),
    }
}

fn place_first_round(
    matches: &[Match],
    order: &[usize],
    config: &LayoutConfig,
    nodes: &mut Vec<Node>,
) -> Placed {
    let right_count = matches.len().div_ceil(2);
    let depth = config.round_spacing * f64::from(config.max_round_depth);

    let mut placed = Vec::with_capacity(matches.len());
    for (slot, &orig) in order.iter().enumerate() {
        let side = side_of(slot, matches.len());
        let (side_index, side_count) = match side {
            Side::Right => (slot, right_count),
            Side::Left => (slot - right_count, matches.len() - right_count),
        };
        // Center each side's block of matches on center_y.
        let block_height = side_count.saturating_sub(1) as f64 * config.base_match_spacing;
        let y = config.center_y - block_height / 2.0 + side_index as f64 * config.base_match_spacing;
        let x = config.center_x + signed(side, depth);

        nodes.push(match_node(&matches[orig], x, y));
        placed.push((orig, y));
    }
    placed
}

#[derive(Debug, Clone, Copy)]
struct RoundColumn {
    round_idx: usize,
    is_last: bool,
    total_rounds: usize,
}

fn place_later_round(
    matches: &[Match],
    order: &[usize],
    parents: &Placed,
    column: RoundColumn,
    config: &LayoutConfig,
    nodes: &mut Vec<Node>,
) -> Placed {
    let parent_y = |orig: usize| parents.iter().find(|(o, _)| *o == orig).map(|(_, y)| *y);

    let mut placed = Vec::with_capacity(matches.len());
    for (slot, &orig) in order.iter().enumerate() {
        let y = match (parent_y(orig * 2), parent_y(orig * 2 + 1)) {
            (Some(a), Some(b)) => (a + b) / 2.0,
            _ => config.center_y,
        };
        let x = if column.is_last {
            config.center_x
        } else {
            let rounds_from_final = (column.total_rounds - 1 - column.round_idx) as f64;
            config.center_x + signed(side_of(slot, matches.len()), config.round_spacing * rounds_from_final)
        };

        nodes.push(match_node(&matches[orig], x, y));
        placed.push((orig, y));
    }
    placed
}

/// One outgoing edge per match, into the round that follows. Targets that
/// don't exist are skipped.
fn connect_round(matches: &[Match], order: &[usize], next: Option<&Round>, edges: &mut Vec<Edge>) {
    let Some(next) = next else {
        return;
    };

    for (slot, &orig) in order.iter().enumerate() {
        let source = &matches[orig];
        let side = side_of(slot, matches.len());
        let edge = match &next.entries {
            RoundEntries::QualifiedTeams(teams) => teams
                .get(orig)
                .map(|team| Edge::new(&source.id, &team.id, side, EdgeStyle::ADVANCEMENT)),
            RoundEntries::Matches(next_matches) => next_matches
                .get(orig / 2)
                .map(|target| Edge::new(&source.id, &target.id, side, EdgeStyle::BRACKET)),
        };
        edges.extend(edge);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use std::collections::HashMap;

    fn match_round(id: &str, first_id: usize, count: usize) -> Round {
        let matches = (first_id..first_id + count).map(|i| Match::placeholder(format!("match-{i}"))).collect();
        Round::matches(id, id, matches)
    }

    fn qualified_round(count: usize) -> Round {
        let teams = (0..count)
            .map(|i| QualifiedTeam { id: format!("qualified-{i}"), team_name: "TBP".into() })
            .collect();
        Round::qualified("qualified", "Qualified Teams", teams)
    }

    fn y_of(layout: &BracketLayout, id: &str) -> f64 {
        layout.node(id).map(|n| n.position.y).unwrap_or(f64::NAN)
    }

    #[test]
    fn test_standard_orders_are_permutations() {
        let order = MatchOrder::standard();
        for len in [16, 8, 4] {
            let mut o = order.for_round(len);
            assert_ne!(o, (0..len).collect::<Vec<_>>(), "len={len} should be permuted");
            o.sort_unstable();
            assert_eq!(o, (0..len).collect::<Vec<_>>());
        }
        assert_eq!(order.for_round(2), vec![0, 1]);
        assert_eq!(order.for_round(0), Vec::<usize>::new());
    }

    #[test]
    fn test_bad_order_entry_falls_back_to_identity() {
        let mut order = MatchOrder::identity();
        order.insert(vec![0, 0], vec![1, 1]);
        assert_eq!(order.for_round(4), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_first_round_node_count_and_sides() {
        let rounds = fixtures::bracket_template();
        let out = layout(&rounds, &LayoutConfig::default());
        let first: Vec<&Node> = out.nodes.iter().take(16).collect();
        assert_eq!(first.len(), 16);

        let right = CENTER_X + ROUND_SPACING * 4.0;
        let left = CENTER_X - ROUND_SPACING * 4.0;
        assert!(first[..8].iter().all(|n| n.position.x == right));
        assert!(first[8..].iter().all(|n| n.position.x == left));
    }

    #[test]
    fn test_first_round_is_centered_per_side() {
        let rounds = fixtures::bracket_template();
        let out = layout(&rounds, &LayoutConfig::default());
        let ys: Vec<f64> = out.nodes[..8].iter().map(|n| n.position.y).collect();
        // 8 matches, 7 gaps of 150 → block of 1050 centered on 500.
        assert_eq!(ys[0], CENTER_Y - 525.0);
        assert_eq!(ys[7], CENTER_Y + 525.0);
        let mean = ys.iter().sum::<f64>() / ys.len() as f64;
        assert_eq!(mean, CENTER_Y);
    }

    #[test]
    fn test_display_order_follows_custom_order() {
        let rounds = fixtures::bracket_template();
        let out = layout(&rounds, &LayoutConfig::default());
        let first_ids: Vec<&str> = out.nodes[..3].iter().map(|n| n.id.as_str()).collect();
        assert_eq!(first_ids, vec!["match-14", "match-6", "match-2"]);
    }

    #[test]
    fn test_later_rounds_average_their_parents() {
        let rounds = fixtures::bracket_template();
        let out = layout(&rounds, &LayoutConfig::default());

        for window in rounds.windows(2) {
            let (RoundEntries::Matches(parents), RoundEntries::Matches(children)) =
                (&window[0].entries, &window[1].entries)
            else {
                continue;
            };
            for (k, child) in children.iter().enumerate() {
                let a = y_of(&out, &parents[2 * k].id);
                let b = y_of(&out, &parents[2 * k + 1].id);
                assert_eq!(y_of(&out, &child.id), (a + b) / 2.0, "child {}", child.id);
            }
        }
    }

    #[test]
    fn test_columns_step_toward_center() {
        let rounds = fixtures::bracket_template();
        let out = layout(&rounds, &LayoutConfig::default());
        let xs: Vec<f64> = ["match-16", "match-24", "qualified-0"]
            .iter()
            .map(|id| out.node(id).map(|n| (n.position.x - CENTER_X).abs()).unwrap_or(f64::NAN))
            .collect();
        // round of 16 is two rounds from the terminal stage, quarter finals one.
        assert_eq!(xs, vec![500.0, 250.0, 0.0]);
    }

    #[test]
    fn test_final_match_round_sits_on_center() {
        let rounds = vec![match_round("r1", 0, 4), match_round("r2", 4, 2), match_round("final", 6, 1)];
        let config = LayoutConfig { match_order: MatchOrder::identity(), ..Default::default() };
        let out = layout(&rounds, &config);
        let final_node = out.node("match-6").unwrap();
        assert_eq!(final_node.position.x, CENTER_X);
        assert_eq!(final_node.position.y, CENTER_Y);
    }

    #[test]
    fn test_qualified_teams_stack_at_center() {
        let out = layout(&[qualified_round(4)], &LayoutConfig::default());
        let ys: Vec<f64> = out.nodes.iter().map(|n| n.position.y).collect();
        assert_eq!(ys, vec![350.0, 450.0, 550.0, 650.0]);
        assert!(out.nodes.iter().all(|n| n.kind == NodeKind::Qualified && n.position.x == CENTER_X));
        assert!(out.edges.is_empty());
    }

    #[test]
    fn test_edge_count_and_targets() {
        let rounds = vec![match_round("r1", 0, 16), match_round("r2", 16, 8)];
        let out = layout(&rounds, &LayoutConfig::default());
        let r1_edges: Vec<&Edge> = out.edges.iter().filter(|e| e.style == EdgeStyle::BRACKET).collect();
        assert_eq!(r1_edges.len(), 16);

        let mut hits: HashMap<&str, usize> = HashMap::new();
        for e in &r1_edges {
            *hits.entry(e.target.as_str()).or_default() += 1;
        }
        assert_eq!(hits.len(), 8);
        assert!(hits.values().all(|&n| n == 2));
        assert_eq!(
            out.edges.iter().find(|e| e.source == "match-5").map(|e| e.target.as_str()),
            Some("match-18")
        );
    }

    #[test]
    fn test_handles_mirror_by_side() {
        let rounds = fixtures::bracket_template();
        let out = layout(&rounds, &LayoutConfig::default());
        // match-14 is the first right-side slot, match-15 the first left-side slot.
        let right = out.edges.iter().find(|e| e.source == "match-14").unwrap();
        assert_eq!((right.source_handle, right.target_handle), (Handle::Left, Handle::Right));
        let left = out.edges.iter().find(|e| e.source == "match-15").unwrap();
        assert_eq!((left.source_handle, left.target_handle), (Handle::Right, Handle::Left));
    }

    #[test]
    fn test_advancement_edges_into_qualified_slots() {
        let rounds = fixtures::bracket_template();
        let out = layout(&rounds, &LayoutConfig::default());
        let adv: Vec<&Edge> = out.edges.iter().filter(|e| e.style == EdgeStyle::ADVANCEMENT).collect();
        assert_eq!(adv.len(), 4);
        assert!(adv.iter().any(|e| e.source == "match-24" && e.target == "qualified-0"));
        assert_eq!(out.edges.len(), 16 + 8 + 4);
    }

    #[test]
    fn test_dangling_targets_are_dropped() {
        let rounds = vec![match_round("r1", 0, 4), match_round("r2", 4, 1), qualified_round(0)];
        let config = LayoutConfig { match_order: MatchOrder::identity(), ..Default::default() };
        let out = layout(&rounds, &config);
        // matches 2 and 3 would feed a second r2 match that doesn't exist.
        let sources: Vec<&str> = out.edges.iter().map(|e| e.source.as_str()).collect();
        assert_eq!(sources, vec!["match-0", "match-1"]);
    }

    #[test]
    fn test_missing_parents_fall_back_to_center() {
        let rounds = vec![match_round("r1", 0, 2), match_round("r2", 2, 2)];
        let config = LayoutConfig { match_order: MatchOrder::identity(), ..Default::default() };
        let out = layout(&rounds, &config);
        assert_eq!(y_of(&out, "match-3"), CENTER_Y);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let rounds = fixtures::demo_bracket();
        let config = LayoutConfig::default();
        assert_eq!(layout(&rounds, &config), layout(&rounds, &config));
    }

    #[test]
    fn test_serialized_shape() {
        let rounds = vec![match_round("r1", 0, 2), qualified_round(2)];
        let out = layout(&rounds, &LayoutConfig::default());
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["nodes"][0]["type"], "match");
        assert_eq!(json["nodes"][0]["data"]["team1Display"], "TBP");
        assert_eq!(json["nodes"][2]["type"], "qualified");
        assert_eq!(json["nodes"][2]["data"]["teamName"], "TBP");
        assert_eq!(json["edges"][0]["sourceHandle"], "left");
        assert_eq!(json["edges"][0]["style"]["strokeWidth"], 3);
        assert_eq!(json["edges"][0]["type"], "smoothstep");
    }
}
