use crate::app::MenuItem;
use bracket_api::Match;
use bracket_api::fixtures::{bracket_template, demo_bracket, demo_grid};
use bracket_api::grid::{GridConfig, grid_layout};
use bracket_api::layout::{BracketLayout, LayoutConfig, Node, layout};
use bracket_api::progress::{BracketRound, TournamentProgress};
use chrono::Local;

/// Pan offset into a canvas, in terminal cells.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: u16,
    pub y: u16,
}

impl Viewport {
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.x = self.x.saturating_add_signed(dx as i16);
        self.y = self.y.saturating_add_signed(dy as i16);
    }
}

fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

// ---------------------------------------------------------------------------
// 32-team bracket
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct BracketState {
    pub progress: TournamentProgress,
    pub config: LayoutConfig,
    /// Latest layout, rebuilt whenever fetched data is applied.
    pub layout: BracketLayout,
    /// Showing the static sample bracket rather than sheet data.
    pub demo: bool,
    pub last_error: Option<String>,
    pub last_updated: Option<String>,
    pub viewport: Viewport,
}

impl BracketState {
    pub fn live() -> Self {
        let mut state = Self::with_layout(false);
        state.relayout();
        state
    }

    pub fn demo() -> Self {
        let mut state = Self::with_layout(true);
        state.layout = layout(&demo_bracket(), &state.config);
        state
    }

    fn with_layout(demo: bool) -> Self {
        Self {
            progress: TournamentProgress::new(),
            config: LayoutConfig::default(),
            layout: BracketLayout::default(),
            demo,
            last_error: None,
            last_updated: None,
            viewport: Viewport::default(),
        }
    }

    pub fn relayout(&mut self) {
        let rounds = self.progress.rounds(&bracket_template());
        self.layout = layout(&rounds, &self.config);
    }

    /// Apply one fetched round. Returns the round to fetch next when this
    /// update completed the polled round.
    pub fn apply(&mut self, round: BracketRound, generation: u64, matches: Vec<Match>) -> Option<BracketRound> {
        if !self.progress.apply(round, generation, matches) {
            return None;
        }
        self.last_error = None;
        self.last_updated = Some(timestamp());
        let unlocked = self.progress.advance();
        self.relayout();
        unlocked
    }

    /// Record a failed fetch unless a newer response already landed.
    pub fn fail(&mut self, generation: u64, message: String) -> bool {
        if self.progress.latest_generation().is_some_and(|last| generation < last) {
            return false;
        }
        self.last_error = Some(message);
        true
    }

    pub fn status_line(&self) -> String {
        if self.demo {
            return "Demo bracket (no spreadsheet configured)".to_string();
        }
        self.progress.status_line()
    }
}

// ---------------------------------------------------------------------------
// 128-team grid
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct GridState {
    pub config: GridConfig,
    pub nodes: Vec<Node>,
    pub demo: bool,
    applied: Option<u64>,
    pub last_error: Option<String>,
    pub last_updated: Option<String>,
    pub viewport: Viewport,
}

impl GridState {
    pub fn live() -> Self {
        Self::from_matches(&[], false)
    }

    pub fn demo() -> Self {
        Self::from_matches(&demo_grid(), true)
    }

    fn from_matches(matches: &[Match], demo: bool) -> Self {
        let config = GridConfig::default();
        Self {
            nodes: grid_layout(matches, &config),
            config,
            demo,
            applied: None,
            last_error: None,
            last_updated: None,
            viewport: Viewport::default(),
        }
    }

    /// Same stale-response rule as the bracket rounds.
    pub fn apply(&mut self, generation: u64, matches: &[Match]) -> bool {
        if self.applied.is_some_and(|last| generation < last) {
            return false;
        }
        self.applied = Some(generation);
        self.nodes = grid_layout(matches, &self.config);
        self.last_error = None;
        self.last_updated = Some(timestamp());
        true
    }

    pub fn fail(&mut self, generation: u64, message: String) -> bool {
        if self.applied.is_some_and(|last| generation < last) {
            return false;
        }
        self.last_error = Some(message);
        true
    }
}

// ---------------------------------------------------------------------------
// Top-level state
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub bracket: BracketState,
    pub grid: GridState,
    /// Last generation handed out to a request.
    pub generation: u64,
}

impl AppState {
    pub fn new(live: bool) -> Self {
        let (bracket, grid) = if live {
            (BracketState::live(), GridState::live())
        } else {
            (BracketState::demo(), GridState::demo())
        };
        Self {
            active_tab: MenuItem::default(),
            previous_tab: MenuItem::default(),
            show_logs: false,
            bracket,
            grid,
            generation: 0,
        }
    }

    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn viewport_mut(&mut self) -> Option<&mut Viewport> {
        match self.active_tab {
            MenuItem::Bracket => Some(&mut self.bracket.viewport),
            MenuItem::Grid => Some(&mut self.grid.viewport),
            MenuItem::Help => None,
        }
    }
}
