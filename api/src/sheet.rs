//! Scoring-sheet parser: raw spreadsheet rows → normalized [`Match`] records.
//!
//! Sheets have no fixed schema. The header row is the first row mentioning an
//! "arena", and every other column is discovered by fuzzy keyword matching on
//! that row's cells.

use crate::{Match, MatchStatus, TBP, contains_bye};
use log::debug;
use std::fmt;

/// Longest name/display string shown on a match card.
pub const MAX_DISPLAY_LEN: usize = 20;

const ELLIPSIS: &str = "...";
const TEAM_NOT_FOUND: &str = "Team Not Found";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    /// No row carries an arena-labeled cell, so the sheet can't be read.
    HeaderNotFound,
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetError::HeaderNotFound => write!(f, "Header row not found"),
        }
    }
}

impl std::error::Error for SheetError {}

// ---------------------------------------------------------------------------
// Column roles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Arena,
    TeamNumber(u8),
    TeamName(u8),
    Score1,
    Score2,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 7] = [
        ColumnRole::Arena,
        ColumnRole::TeamNumber(1),
        ColumnRole::TeamName(1),
        ColumnRole::TeamNumber(2),
        ColumnRole::TeamName(2),
        ColumnRole::Score1,
        ColumnRole::Score2,
    ];
}

/// Column index per role, resolved once from the header row.
/// `None` means the sheet has no such column and reads come back empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub arena: Option<usize>,
    pub team1_number: Option<usize>,
    pub team1_name: Option<usize>,
    pub team2_number: Option<usize>,
    pub team2_name: Option<usize>,
    pub score1: Option<usize>,
    pub score2: Option<usize>,
}

impl ColumnMap {
    pub fn resolve(header: &[String]) -> Self {
        let lowered: Vec<String> = header.iter().map(|c| c.to_lowercase()).collect();
        let mut map = ColumnMap::default();
        for role in ColumnRole::ALL {
            let index = find_column(&lowered, role, &map);
            match role {
                ColumnRole::Arena => map.arena = index,
                ColumnRole::TeamNumber(1) => map.team1_number = index,
                ColumnRole::TeamName(1) => map.team1_name = index,
                ColumnRole::TeamNumber(_) => map.team2_number = index,
                ColumnRole::TeamName(_) => map.team2_name = index,
                ColumnRole::Score1 => map.score1 = index,
                ColumnRole::Score2 => map.score2 = index,
            }
        }
        map
    }
}

/// `lowered` is the header row, already lowercased. `resolved` holds the roles
/// matched so far; the second score column is only meaningful after the first.
fn find_column(lowered: &[String], role: ColumnRole, resolved: &ColumnMap) -> Option<usize> {
    match role {
        ColumnRole::Arena => lowered.iter().position(|c| c.contains("arena")),
        ColumnRole::TeamNumber(n) => lowered.iter().position(|c| is_team_number(c, n)),
        ColumnRole::TeamName(n) => {
            let has_number_column = lowered.iter().any(|c| is_team_number(c, n));
            lowered
                .iter()
                .position(|c| is_team(c, n) && (c.contains("name") || !has_number_column))
        }
        ColumnRole::Score1 => lowered.iter().position(|c| c.contains("scoring")),
        ColumnRole::Score2 => {
            let after = resolved.score1?;
            lowered
                .iter()
                .enumerate()
                .skip(after + 1)
                .find(|(_, c)| c.contains("scoring"))
                .map(|(i, _)| i)
        }
    }
}

fn is_team(cell: &str, n: u8) -> bool {
    let digit = char::from(b'0' + n);
    cell.contains("team") && cell.contains(digit)
}

fn is_team_number(cell: &str, n: u8) -> bool {
    is_team(cell, n) && cell.contains("number")
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse one scoring sheet into matches, in row order.
///
/// Empty input yields no matches. A non-empty sheet without an arena header is
/// rejected as a whole; there are no partial results.
pub fn parse_scoring_sheet(rows: &[Vec<String>]) -> Result<Vec<Match>, SheetError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let header_idx = rows
        .iter()
        .position(|row| row.iter().any(|c| c.to_lowercase().contains("arena")))
        .ok_or(SheetError::HeaderNotFound)?;
    let columns = ColumnMap::resolve(&rows[header_idx]);
    debug!("resolved sheet columns from row {header_idx}: {columns:?}");

    let mut matches = Vec::new();
    for row in &rows[header_idx + 1..] {
        if row.is_empty() || cell(row, columns.arena).is_empty() {
            continue;
        }
        let score1 = cell(row, columns.score1);
        let score2 = cell(row, columns.score2);
        // Repeated header/section rows carry the score column titles again.
        if score1.to_lowercase().contains("scoring") || score2.to_lowercase().contains("scoring") {
            continue;
        }

        let id = format!("match-{}", matches.len());
        matches.push(build_match(id, row, &columns));
    }

    debug!("parsed {} matches from {} rows", matches.len(), rows.len());
    Ok(matches)
}

fn cell(row: &[String], index: Option<usize>) -> &str {
    index.and_then(|i| row.get(i)).map(String::as_str).unwrap_or("")
}

struct Side {
    number: String,
    name: String,
    display: String,
    is_tbp: bool,
}

impl Side {
    fn read(number: &str, name: &str) -> Self {
        let is_tbp = number.is_empty() || name == TEAM_NOT_FOUND;
        let (number, name) = if is_tbp {
            (TBP.to_string(), TBP.to_string())
        } else {
            (number.to_string(), name.to_string())
        };
        let display = display_string(&number, &name);
        Self { number, name, display, is_tbp }
    }
}

fn build_match(id: String, row: &[String], columns: &ColumnMap) -> Match {
    let side1 = Side::read(cell(row, columns.team1_number), cell(row, columns.team1_name));
    let side2 = Side::read(cell(row, columns.team2_number), cell(row, columns.team2_name));
    let score1 = cell(row, columns.score1).to_string();
    let score2 = cell(row, columns.score2).to_string();

    let arena = if side1.is_tbp && side2.is_tbp {
        String::new()
    } else {
        cell(row, columns.arena).to_string()
    };

    let mut status = MatchStatus::NotStarted;
    let mut winner: Option<&Side> = None;
    if !side1.is_tbp && !side2.is_tbp && !score1.is_empty() && !score2.is_empty() {
        status = MatchStatus::Completed;
        // Only an exact 1-0 / 0-1 result names a winner. Anything else stays
        // completed with no winner.
        winner = match (score1.as_str(), score2.as_str()) {
            ("1", "0") => Some(&side1),
            ("0", "1") => Some(&side2),
            _ => None,
        };
    } else if !score1.is_empty() || !score2.is_empty() {
        status = MatchStatus::InProgress;
    }

    let is_bye = contains_bye(&side1.display) || contains_bye(&side2.display);

    Match {
        id,
        arena,
        winner: winner.map(|s| s.number.clone()),
        winner_display: winner.map(|s| truncate(&s.display)),
        team1_name: truncate(&side1.name),
        team1_display: truncate(&side1.display),
        team1_number: side1.number,
        team2_name: truncate(&side2.name),
        team2_display: truncate(&side2.display),
        team2_number: side2.number,
        score1,
        score2,
        status,
        is_bye,
    }
}

/// `"{number}: {name}"` when both are known, otherwise whichever is present.
pub fn display_string(number: &str, name: &str) -> String {
    if !number.is_empty() && !name.is_empty() && number != TBP {
        format!("{number}: {name}")
    } else if !number.is_empty() {
        number.to_string()
    } else if !name.is_empty() {
        name.to_string()
    } else {
        TBP.to_string()
    }
}

/// Cut strings longer than [`MAX_DISPLAY_LEN`] chars down to fit, ending in "...".
pub fn truncate(s: &str) -> String {
    if s.chars().count() <= MAX_DISPLAY_LEN {
        return s.to_string();
    }
    let keep = MAX_DISPLAY_LEN - ELLIPSIS.len();
    let mut out: String = s.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect()
    }

    const HEADER: &[&str] = &[
        "Arena",
        "Team 1 Number",
        "Team 1 Name",
        "Team 2 Number",
        "Team 2 Name",
        "Scoring 1",
        "Scoring 2",
    ];

    #[test]
    fn completed_match_with_team1_winner() {
        let sheet = rows(&[HEADER, &["Arena 1", "1", "Hawks", "2", "Eagles", "1", "0"]]);
        let matches = parse_scoring_sheet(&sheet).unwrap();
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.id, "match-0");
        assert_eq!(m.arena, "Arena 1");
        assert_eq!(m.status, MatchStatus::Completed);
        assert_eq!(m.winner.as_deref(), Some("1"));
        assert_eq!(m.winner_display.as_deref(), Some("1: Hawks"));
        assert_eq!(m.team1_display, "1: Hawks");
        assert_eq!(m.team2_display, "2: Eagles");
        assert!(!m.is_bye);
    }

    #[test]
    fn completed_match_with_team2_winner() {
        let sheet = rows(&[HEADER, &["Arena 2", "7", "Owls", "9", "Crows", "0", "1"]]);
        let m = &parse_scoring_sheet(&sheet).unwrap()[0];
        assert_eq!(m.winner.as_deref(), Some("9"));
        assert_eq!(m.winner_display.as_deref(), Some("9: Crows"));
    }

    #[test]
    fn ambiguous_scores_complete_without_winner() {
        let sheet = rows(&[HEADER, &["Arena 3", "1", "Hawks", "2", "Eagles", "2", "1"]]);
        let m = &parse_scoring_sheet(&sheet).unwrap()[0];
        assert_eq!(m.status, MatchStatus::Completed);
        assert_eq!(m.winner, None);
        assert_eq!(m.winner_display, None);

        let tied = rows(&[HEADER, &["Arena 3", "1", "Hawks", "2", "Eagles", "1", "1"]]);
        let m = &parse_scoring_sheet(&tied).unwrap()[0];
        assert_eq!(m.status, MatchStatus::Completed);
        assert_eq!(m.winner, None);
    }

    #[test]
    fn tbp_vs_tbp_row_hides_arena() {
        let sheet = rows(&[HEADER, &["Arena 4", "", "", "", "", "", ""]]);
        let m = &parse_scoring_sheet(&sheet).unwrap()[0];
        assert_eq!(m.arena, "");
        assert_eq!(m.team1_number, TBP);
        assert_eq!(m.team1_name, TBP);
        assert_eq!(m.team2_number, TBP);
        assert_eq!(m.team2_name, TBP);
        assert_eq!(m.team1_display, TBP);
        assert_eq!(m.status, MatchStatus::NotStarted);
    }

    #[test]
    fn team_not_found_becomes_tbp_and_blocks_completion() {
        let sheet = rows(&[HEADER, &["Arena 5", "3", "Team Not Found", "4", "Lions", "1", "0"]]);
        let m = &parse_scoring_sheet(&sheet).unwrap()[0];
        assert_eq!(m.team1_number, TBP);
        assert_eq!(m.team1_display, TBP);
        assert_eq!(m.arena, "Arena 5");
        assert_eq!(m.status, MatchStatus::InProgress);
        assert_eq!(m.winner, None);
    }

    #[test]
    fn single_score_is_in_progress() {
        let sheet = rows(&[HEADER, &["Arena 6", "1", "Hawks", "2", "Eagles", "1", ""]]);
        let m = &parse_scoring_sheet(&sheet).unwrap()[0];
        assert_eq!(m.status, MatchStatus::InProgress);
    }

    #[test]
    fn skips_blank_arena_and_repeated_header_rows() {
        let sheet = rows(&[
            &["Bracket A"],
            HEADER,
            &[],
            &["", "1", "Hawks", "2", "Eagles", "", ""],
            &["Arena", "Team 1 Number", "Team 1 Name", "Team 2 Number", "Team 2 Name", "Scoring 1", "Scoring 2"],
            &["Arena 7", "5", "Bears", "6", "Wolves", "", ""],
        ]);
        let matches = parse_scoring_sheet(&sheet).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].arena, "Arena 7");
        assert_eq!(matches[0].id, "match-0");
    }

    #[test]
    fn missing_header_is_an_error() {
        let sheet = rows(&[&["Team 1", "Team 2"], &["a", "b"]]);
        assert_eq!(parse_scoring_sheet(&sheet), Err(SheetError::HeaderNotFound));
    }

    #[test]
    fn empty_sheet_yields_no_matches() {
        assert_eq!(parse_scoring_sheet(&[]), Ok(Vec::new()));
        assert_eq!(parse_scoring_sheet(&rows(&[HEADER])), Ok(Vec::new()));
    }

    #[test]
    fn short_rows_read_missing_cells_as_empty() {
        let sheet = rows(&[HEADER, &["Arena 8", "1", "Hawks"]]);
        let m = &parse_scoring_sheet(&sheet).unwrap()[0];
        assert_eq!(m.team1_display, "1: Hawks");
        assert_eq!(m.team2_display, TBP);
        assert_eq!(m.score1, "");
        assert_eq!(m.status, MatchStatus::NotStarted);
    }

    #[test]
    fn resolves_columns_case_insensitively() {
        let header: Vec<String> = ["SCORING A", "ARENA", "team 2 name", "Team1 number", "team 1 NAME", "Team 2 Number", "scoring b"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let map = ColumnMap::resolve(&header);
        assert_eq!(map.arena, Some(1));
        assert_eq!(map.team1_number, Some(3));
        assert_eq!(map.team1_name, Some(4));
        assert_eq!(map.team2_number, Some(5));
        assert_eq!(map.team2_name, Some(2));
        assert_eq!(map.score1, Some(0));
        assert_eq!(map.score2, Some(6));
    }

    #[test]
    fn name_column_falls_back_to_bare_team_header() {
        let header: Vec<String> = ["Arena", "Team 1", "Team 2"].iter().map(|s| s.to_string()).collect();
        let map = ColumnMap::resolve(&header);
        assert_eq!(map.team1_number, None);
        assert_eq!(map.team1_name, Some(1));
        assert_eq!(map.team2_name, Some(2));
        assert_eq!(map.score1, None);
        assert_eq!(map.score2, None);
    }

    #[test]
    fn bye_detection_is_case_insensitive() {
        let sheet = rows(&[HEADER, &["Arena 9", "5", "Falcons", "Bye", "", "", ""]]);
        let m = &parse_scoring_sheet(&sheet).unwrap()[0];
        assert_eq!(m.team2_display, "Bye");
        assert!(m.is_bye);
    }

    #[test]
    fn long_names_are_truncated() {
        let sheet = rows(&[HEADER, &["Arena 1", "12", "The Incredibly Long Team Name", "2", "Eagles", "1", "0"]]);
        let m = &parse_scoring_sheet(&sheet).unwrap()[0];
        assert_eq!(m.team1_name, "The Incredibly Lo...");
        assert_eq!(m.team1_display, "12: The Incredibl...");
        assert_eq!(m.winner_display.as_deref(), Some("12: The Incredibl..."));
        assert_eq!(m.team1_number, "12");
    }

    #[test]
    fn truncate_law() {
        for s in ["", "short", "exactly twenty chars", "twenty-one characters", "ünïcödé ñåmé that is rather long"] {
            let t = truncate(s);
            assert!(t.chars().count() <= MAX_DISPLAY_LEN, "{t:?}");
            if s.chars().count() <= MAX_DISPLAY_LEN {
                assert_eq!(t, s);
            }
        }
    }

    #[test]
    fn display_string_prefers_number_and_name() {
        assert_eq!(display_string("5", "Falcons"), "5: Falcons");
        assert_eq!(display_string("TBP", "TBP"), "TBP");
        assert_eq!(display_string("", "Falcons"), "Falcons");
        assert_eq!(display_string("5", ""), "5");
        assert_eq!(display_string("", ""), "TBP");
    }

    #[test]
    fn parsing_is_idempotent() {
        let sheet = rows(&[
            HEADER,
            &["Arena 1", "1", "Hawks", "2", "Eagles", "1", "0"],
            &["Arena 2", "3", "Owls", "", "", "", ""],
        ]);
        assert_eq!(parse_scoring_sheet(&sheet), parse_scoring_sheet(&sheet));
    }
}
