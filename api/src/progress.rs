//! Round-unlock tracking for the 32-team bracket.
//!
//! Only one round's sheet is polled at a time. Once every match of that round
//! is completed the next round unlocks, and a finished quarter final turns its
//! winners into the qualified teams.

use crate::fixtures::tbp_qualifiers;
use crate::{Match, QualifiedTeam, Round, RoundEntries};
use log::debug;

/// Navigation axis for the polled rounds. Ordered from earliest to latest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BracketRound {
    #[default]
    RoundOf32,
    RoundOf16,
    QuarterFinals,
}

impl BracketRound {
    pub const ALL: [BracketRound; 3] =
        [BracketRound::RoundOf32, BracketRound::RoundOf16, BracketRound::QuarterFinals];

    pub fn label(&self) -> &'static str {
        match self {
            BracketRound::RoundOf32 => "Round of 32",
            BracketRound::RoundOf16 => "Round of 16",
            BracketRound::QuarterFinals => "Quarter Finals",
        }
    }

    /// Matches needed before the round counts as completed.
    pub fn match_count(&self) -> usize {
        match self {
            BracketRound::RoundOf32 => 16,
            BracketRound::RoundOf16 => 8,
            BracketRound::QuarterFinals => 4,
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            BracketRound::RoundOf32 => Some(BracketRound::RoundOf16),
            BracketRound::RoundOf16 => Some(BracketRound::QuarterFinals),
            BracketRound::QuarterFinals => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

pub fn completed_count(matches: &[Match]) -> usize {
    matches.iter().filter(|m| m.is_completed()).count()
}

pub fn is_round_completed(matches: &[Match], expected: usize) -> bool {
    completed_count(matches) == expected
}

/// Winners of the completed, decided matches, in order.
pub fn qualified_teams(matches: &[Match]) -> Vec<QualifiedTeam> {
    matches
        .iter()
        .filter(|m| m.is_completed())
        .filter_map(|m| {
            let name = m.winner_display.as_ref().or(m.winner.as_ref())?;
            Some(name.clone())
        })
        .enumerate()
        .map(|(i, team_name)| QualifiedTeam { id: format!("qualified-{i}"), team_name })
        .collect()
}

#[derive(Debug, Default)]
pub struct TournamentProgress {
    /// Latest parsed matches per round, indexed by `BracketRound`.
    rounds: [Vec<Match>; 3],
    /// Generation of the response each round was last updated from.
    applied: [Option<u64>; 3],
    /// The round whose sheet is currently polled.
    polling: BracketRound,
}

impl TournamentProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn polling(&self) -> BracketRound {
        self.polling
    }

    pub fn matches(&self, round: BracketRound) -> &[Match] {
        &self.rounds[round.index()]
    }

    /// Store a fetched round. Responses older than the last one applied for the
    /// same round are discarded so a slow poll can't overwrite newer data.
    pub fn apply(&mut self, round: BracketRound, generation: u64, matches: Vec<Match>) -> bool {
        let slot = round.index();
        if self.applied[slot].is_some_and(|last| generation < last) {
            debug!("dropping stale {} response (generation {generation})", round.label());
            return false;
        }
        self.applied[slot] = Some(generation);
        self.rounds[slot] = matches;
        true
    }

    /// Unlock the next round when the polled one is complete and the next one
    /// hasn't been fetched yet. Returns the newly unlocked round.
    pub fn advance(&mut self) -> Option<BracketRound> {
        let current = self.polling;
        let next = current.next()?;
        let done = self.is_completed(current);
        if done && self.rounds[next.index()].is_empty() {
            debug!("{} completed, unlocking {}", current.label(), next.label());
            self.polling = next;
            return Some(next);
        }
        None
    }

    /// Newest response generation applied to any round.
    pub fn latest_generation(&self) -> Option<u64> {
        self.applied.iter().flatten().copied().max()
    }

    pub fn is_completed(&self, round: BracketRound) -> bool {
        let matches = self.matches(round);
        !matches.is_empty() && is_round_completed(matches, round.match_count())
    }

    pub fn is_finished(&self) -> bool {
        self.is_completed(BracketRound::QuarterFinals)
    }

    /// Merge fetched data into the bracket `template`: slot `i` of each match
    /// round keeps its template id and takes everything else from fetched match
    /// `i`. The terminal round lists the real qualifiers once the quarter finals
    /// are done.
    pub fn rounds(&self, template: &[Round]) -> Vec<Round> {
        let mut match_rounds = BracketRound::ALL.iter();
        template
            .iter()
            .map(|round| match &round.entries {
                RoundEntries::Matches(slots) => {
                    let fetched = match_rounds.next().map(|r| self.matches(*r)).unwrap_or_default();
                    let merged = slots
                        .iter()
                        .enumerate()
                        .map(|(i, slot)| match fetched.get(i) {
                            Some(m) => Match { id: slot.id.clone(), ..m.clone() },
                            None => slot.clone(),
                        })
                        .collect();
                    Round { entries: RoundEntries::Matches(merged), ..round.clone() }
                }
                RoundEntries::QualifiedTeams(teams) => {
                    let teams = if self.is_finished() {
                        qualified_teams(self.matches(BracketRound::QuarterFinals))
                    } else if teams.is_empty() {
                        tbp_qualifiers(BracketRound::QuarterFinals.match_count())
                    } else {
                        teams.clone()
                    };
                    Round { entries: RoundEntries::QualifiedTeams(teams), ..round.clone() }
                }
            })
            .collect()
    }

    pub fn status_line(&self) -> String {
        if self.is_finished() {
            return "Tournament Completed".to_string();
        }
        let round = self.polling;
        let matches = self.matches(round);
        let total = if matches.is_empty() { round.match_count() } else { matches.len() };
        format!("{}: {}/{} matches completed", round.label(), completed_count(matches), total)
    }
}
