use crate::state::network::LoadingState;
use bracket_api::Match;
use bracket_api::progress::BracketRound;
use crossterm::event::KeyEvent;

/// Independent fetch pipelines. A failure in one never clears the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    Bracket,
    Grid,
}

/// Every request carries the generation it was issued with so late responses
/// can be recognised and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkRequest {
    LoadRound { round: BracketRound, generation: u64 },
    LoadGrid { generation: u64 },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    RoundLoaded { round: BracketRound, generation: u64, matches: Vec<Match> },
    GridLoaded { generation: u64, matches: Vec<Match> },
    Error { pipeline: Pipeline, generation: u64, message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    PollTick,
}
