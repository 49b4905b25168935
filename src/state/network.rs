use crate::state::app_settings::SheetNames;
use crate::state::messages::{NetworkRequest, NetworkResponse, Pipeline};
use bracket_api::client::{ApiError, SheetsClient, SheetsConfig};
use log::{debug, error};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Runs sheet fetches one at a time and reports back over `responses`.
pub struct NetworkWorker {
    client: SheetsClient,
    sheet_names: SheetNames,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        config: SheetsConfig,
        sheet_names: SheetNames,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client: SheetsClient::new(config),
            sheet_names,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let response = self.handle(request).await;
            let is_ok = !matches!(response, NetworkResponse::Error { .. });

            debug!("network request complete");
            self.stop_loading_animation(is_ok).await;

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle(&self, request: NetworkRequest) -> NetworkResponse {
        match request {
            NetworkRequest::LoadRound { round, generation } => {
                let sheet = self.sheet_names.for_round(round);
                debug!("loading {} from \"{sheet}\" (generation {generation})", round.label());
                match self.client.fetch_matches(sheet).await {
                    Ok(matches) => NetworkResponse::RoundLoaded { round, generation, matches },
                    Err(e) => error_response(Pipeline::Bracket, generation, e),
                }
            }
            NetworkRequest::LoadGrid { generation } => {
                let sheet = &self.sheet_names.grid;
                debug!("loading grid from \"{sheet}\" (generation {generation})");
                match self.client.fetch_matches(sheet).await {
                    Ok(matches) => NetworkResponse::GridLoaded { generation, matches },
                    Err(e) => error_response(Pipeline::Grid, generation, e),
                }
            }
        }
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

fn error_response(pipeline: Pipeline, generation: u64, err: ApiError) -> NetworkResponse {
    NetworkResponse::Error { pipeline, generation, message: err.to_string() }
}
