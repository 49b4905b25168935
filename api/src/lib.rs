pub mod client;
pub mod fixtures;
pub mod grid;
pub mod layout;
pub mod progress;
pub mod sheet;
pub mod sheets;

use serde::{Deserialize, Serialize};

/// Placeholder for a team slot that hasn't been decided yet ("to be placed").
pub const TBP: &str = "TBP";

// ---------------------------------------------------------------------------
// Domain types, independent of the spreadsheet wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Match {
    pub id: String,
    pub arena: String,
    pub team1_number: String,
    pub team1_name: String,
    pub team1_display: String,
    pub team2_number: String,
    pub team2_name: String,
    pub team2_display: String,
    pub score1: String,
    pub score2: String,
    pub status: MatchStatus,
    pub winner: Option<String>,
    pub winner_display: Option<String>,
    pub is_bye: bool,
}

impl Match {
    /// An undecided slot: both sides TBP, no arena, no scores.
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            team1_number: TBP.into(),
            team1_name: TBP.into(),
            team1_display: TBP.into(),
            team2_number: TBP.into(),
            team2_name: TBP.into(),
            team2_display: TBP.into(),
            ..Default::default()
        }
    }

    /// A hand-written fixture match that only knows its two labels and venue.
    pub fn fixture(id: &str, team1: &str, team2: &str, arena: &str) -> Self {
        Self {
            id: id.to_string(),
            arena: arena.to_string(),
            team1_name: team1.to_string(),
            team1_display: team1.to_string(),
            team2_name: team2.to_string(),
            team2_display: team2.to_string(),
            is_bye: contains_bye(team1) || contains_bye(team2),
            ..Default::default()
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn has_scores(&self) -> bool {
        !self.score1.is_empty() || !self.score2.is_empty()
    }
}

pub(crate) fn contains_bye(display: &str) -> bool {
    display.to_lowercase().contains("bye")
}

/// Match lifecycle. Rows are classified independently; there are no back-transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl MatchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::NotStarted => "Not Started",
            MatchStatus::InProgress => "In Progress",
            MatchStatus::Completed => "Completed",
        }
    }
}

/// A team that advanced out of the bracket into the terminal display stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualifiedTeam {
    pub id: String,
    pub team_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub entries: RoundEntries,
}

/// A round holds either matches or, for the terminal stage, qualified teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundEntries {
    Matches(Vec<Match>),
    QualifiedTeams(Vec<QualifiedTeam>),
}

impl Round {
    pub fn matches(id: &str, name: &str, matches: Vec<Match>) -> Self {
        Self { id: id.to_string(), name: name.to_string(), entries: RoundEntries::Matches(matches) }
    }

    pub fn qualified(id: &str, name: &str, teams: Vec<QualifiedTeam>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            entries: RoundEntries::QualifiedTeams(teams),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.entries, RoundEntries::QualifiedTeams(_))
    }

    pub fn len(&self) -> usize {
        match &self.entries {
            RoundEntries::Matches(m) => m.len(),
            RoundEntries::QualifiedTeams(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_with_display_labels() {
        let json = serde_json::to_string(&MatchStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let back: MatchStatus = serde_json::from_str("\"Not Started\"").unwrap();
        assert_eq!(back, MatchStatus::NotStarted);
    }

    #[test]
    fn match_serializes_camel_case() {
        let m = Match::placeholder("match-0");
        let value = serde_json::to_value(&m).unwrap();
        assert_eq!(value["team1Display"], "TBP");
        assert_eq!(value["isBye"], false);
        assert_eq!(value["status"], "Not Started");
        assert!(value["winner"].is_null());
    }

    #[test]
    fn fixture_match_detects_bye() {
        let m = Match::fixture("match-2", "003", "BYE", "");
        assert!(m.is_bye);
        assert!(!Match::fixture("match-1", "001", "002", "Arena 1").is_bye);
    }

    #[test]
    fn round_deserializes_both_shapes() {
        let json = r#"[
            {"id": "round-1", "name": "Round 1", "matches": [{"id": "match-1", "team1Display": "Team A"}]},
            {"id": "qualified", "name": "Qualified Teams", "qualifiedTeams": [{"id": "qualified-1", "teamName": "Team Alpha"}]}
        ]"#;
        let rounds: Vec<Round> = serde_json::from_str(json).unwrap();
        assert_eq!(rounds.len(), 2);
        assert!(!rounds[0].is_terminal());
        assert_eq!(rounds[0].len(), 1);
        assert!(rounds[1].is_terminal());
    }
}
