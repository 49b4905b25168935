//! Hard-coded bracket structures, passed into layout as ordinary values.

use crate::{Match, QualifiedTeam, Round, TBP};

pub const ROUND_OF_32_ID: &str = "round-1";
pub const ROUND_OF_16_ID: &str = "round-2";
pub const QUARTER_FINALS_ID: &str = "round-3";
pub const QUALIFIED_ID: &str = "qualified";

/// Empty 32-team bracket: 16 + 8 + 4 undecided matches and four TBP qualifiers.
/// Fetched sheet data is merged into this shape slot by slot.
pub fn bracket_template() -> Vec<Round> {
    let placeholders = |first: usize, count: usize| -> Vec<Match> {
        (first..first + count).map(|i| Match::placeholder(format!("match-{i}"))).collect()
    };
    vec![
        Round::matches(ROUND_OF_32_ID, "Round 1", placeholders(0, 16)),
        Round::matches(ROUND_OF_16_ID, "Round 2", placeholders(16, 8)),
        Round::matches(QUARTER_FINALS_ID, "Quarter Finals", placeholders(24, 4)),
        Round::qualified(QUALIFIED_ID, "Qualified Teams", tbp_qualifiers(4)),
    ]
}

pub fn tbp_qualifiers(count: usize) -> Vec<QualifiedTeam> {
    (0..count)
        .map(|i| QualifiedTeam { id: format!("qualified-{i}"), team_name: TBP.into() })
        .collect()
}

/// Static demo bracket shown when no spreadsheet is configured.
pub fn demo_bracket() -> Vec<Round> {
    const LETTERS: [&str; 32] = [
        "C", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R",
        "S", "T", "U", "V", "W", "X", "Y", "Z", "AA", "BB", "CC", "DD", "EE", "FF",
    ];

    let first = (0..16)
        .map(|i| {
            Match::fixture(
                &format!("match-{}", i + 1),
                &format!("Team {}", LETTERS[2 * i]),
                &format!("Team {}", LETTERS[2 * i + 1]),
                &format!("Arena {}", i + 1),
            )
        })
        .collect();

    let winners = |first_id: usize, count: usize, first_feeder: usize| -> Vec<Match> {
        (0..count)
            .map(|i| {
                let id = first_id + i;
                let feeder = first_feeder + 2 * i;
                Match::fixture(
                    &format!("match-{id}"),
                    &format!("Winner {feeder}"),
                    &format!("Winner {}", feeder + 1),
                    &format!("Arena {id}"),
                )
            })
            .collect()
    };

    let qualified = ["Team Alpha", "Team Beta", "Team Gamma", "Team Delta"]
        .iter()
        .enumerate()
        .map(|(i, name)| QualifiedTeam { id: format!("qualified-{}", i + 1), team_name: name.to_string() })
        .collect();

    vec![
        Round::matches(ROUND_OF_32_ID, "Round 1", first),
        Round::matches(ROUND_OF_16_ID, "Round 2", winners(17, 8, 1)),
        Round::matches(QUARTER_FINALS_ID, "Quarter Finals", winners(25, 4, 17)),
        Round::qualified(QUALIFIED_ID, "Qualified Teams", qualified),
    ]
}

/// Sample 128-team board for the grid view: 64 first-round pairings with a BYE
/// on every third match. Arenas are only assigned to real matches.
pub fn demo_grid() -> Vec<Match> {
    let mut arena = 0;
    (0..64)
        .map(|i| {
            let id = format!("match-{}", i + 1);
            let team1 = format!("{:03}", 2 * i + 1);
            if i % 3 == 1 {
                return Match::fixture(&id, &team1, "BYE", "");
            }
            arena = arena % 6 + 1;
            Match::fixture(&id, &team1, &format!("{:03}", 2 * i + 2), &format!("Arena {arena}"))
        })
        .collect()
}
