use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::messages::{NetworkRequest, Pipeline};
use bracket_api::Match;
use bracket_api::progress::BracketRound;
use log::{info, warn};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Bracket,
    Grid,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new() -> Self {
        Self::with_settings(AppSettings::load())
    }

    pub fn with_settings(settings: AppSettings) -> Self {
        let live = settings.sheets.is_configured();
        if !live {
            info!("no spreadsheet configured, showing demo data");
        }

        let app = Self {
            state: AppState::new(live),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    pub fn is_live(&self) -> bool {
        self.settings.sheets.is_configured()
    }

    // -----------------------------------------------------------------------
    // Polling
    // -----------------------------------------------------------------------

    /// Requests for one poll cycle: the round currently being polled plus the
    /// grid sheet. Nothing is fetched in demo mode.
    pub fn poll_requests(&mut self) -> Vec<NetworkRequest> {
        if !self.is_live() {
            return Vec::new();
        }
        let round = self.state.bracket.progress.polling();
        let mut requests = Vec::with_capacity(2);
        if !self.state.bracket.progress.is_finished() {
            requests.push(self.round_request(round));
        }
        requests.push(NetworkRequest::LoadGrid { generation: self.state.next_generation() });
        requests
    }

    fn round_request(&mut self, round: BracketRound) -> NetworkRequest {
        NetworkRequest::LoadRound { round, generation: self.state.next_generation() }
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    /// Returns a follow-up request when the update unlocked the next round.
    pub fn on_round_loaded(
        &mut self,
        round: BracketRound,
        generation: u64,
        matches: Vec<Match>,
    ) -> Option<NetworkRequest> {
        let unlocked = self.state.bracket.apply(round, generation, matches)?;
        info!("{} unlocked", unlocked.label());
        Some(self.round_request(unlocked))
    }

    pub fn on_grid_loaded(&mut self, generation: u64, matches: Vec<Match>) {
        if !self.state.grid.apply(generation, &matches) {
            warn!("dropped stale grid response (generation {generation})");
        }
    }

    /// An error older than the pipeline's latest applied response is dropped,
    /// same as a stale success.
    pub fn on_error(&mut self, pipeline: Pipeline, generation: u64, message: String) {
        let applied = match pipeline {
            Pipeline::Bracket => self.state.bracket.fail(generation, message),
            Pipeline::Grid => self.state.grid.fail(generation, message),
        };
        if !applied {
            warn!("dropped stale {pipeline:?} error (generation {generation})");
        }
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        if let Some(viewport) = self.state.viewport_mut() {
            viewport.pan(dx, dy);
        }
    }

    /// Error text for the header, per pipeline.
    pub fn errors(&self) -> Vec<String> {
        let bracket = self.state.bracket.last_error.as_ref().map(|e| format!("bracket: {e}"));
        let grid = self.state.grid.last_error.as_ref().map(|e| format!("grid: {e}"));
        bracket.into_iter().chain(grid).collect()
    }
}
