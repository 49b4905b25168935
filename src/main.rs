mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::app_state::BracketState;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::refresher::PeriodicRefresher;
use bracket_api::layout::{LayoutConfig, layout};
use bracket_api::{Match, Round};
use bracket_api::client::SheetsClient;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::{error, info};
use serde::Serialize;
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args().await? {
        return Ok(());
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Info)?;
    tui_logger::set_default_level(log::LevelFilter::Info);

    let app = App::new();
    let sheets = app.settings.sheets.clone();
    let sheet_names = app.settings.sheet_names.clone();
    let poll_interval = app.settings.poll_interval;
    let app = Arc::new(Mutex::new(app));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(sheets, sheet_names, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Poll thread
    let periodic_updater = PeriodicRefresher::new(ui_event_tx.clone(), poll_interval);
    let periodic_task = tokio::spawn(periodic_updater.run());

    // First fetch
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();
    periodic_task.abort();

    Ok(())
}

/// A fetched sheet as printed by `dump`.
#[derive(Serialize)]
struct SheetDump {
    sheet: String,
    fetched_at: String,
    matches: Vec<Match>,
}

/// Returns true when the arguments were a one-shot command and the UI
/// shouldn't start.
async fn handle_cli_args() -> anyhow::Result<bool> {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return Ok(false);
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
        }
        "-V" | "--version" => {
            println!("bracket-tui {}", env!("CARGO_PKG_VERSION"));
        }
        "dump" => {
            let Some(sheet) = args.next() else {
                eprintln!("dump needs a sheet name\n\n{}", usage_text());
                std::process::exit(2);
            };
            let settings = AppSettings::load();
            if !settings.sheets.is_configured() {
                anyhow::bail!("no spreadsheet configured, set BRACKET_SPREADSHEET_ID or BRACKET_SHEETS_DIR");
            }
            let client = SheetsClient::new(settings.sheets);
            let matches = client.fetch_matches(&sheet).await?;
            let dump = SheetDump {
                sheet,
                fetched_at: chrono::Local::now().to_rfc3339(),
                matches,
            };
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
        "layout" => {
            let bracket = match args.next() {
                Some(path) => {
                    let content = std::fs::read_to_string(&path)?;
                    let rounds: Vec<Round> = serde_json::from_str(&content)?;
                    layout(&rounds, &LayoutConfig::default())
                }
                None => BracketState::demo().layout,
            };
            println!("{}", serde_json::to_string_pretty(&bracket)?);
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
    Ok(true)
}

fn usage_text() -> &'static str {
    "bracket-tui - terminal viewer for spreadsheet-scored tournament brackets

Usage:
  bracket-tui
  bracket-tui dump <sheet>   print one sheet's parsed matches as JSON
  bracket-tui layout [file]  print the layout of a JSON round list (default: demo bracket)
  bracket-tui --help
  bracket-tui --version

Environment:
  BRACKET_SPREADSHEET_ID   Spreadsheet to read; without it demo data is shown
  BRACKET_SHEETS_API_KEY   API key sent with every sheet request
  BRACKET_SHEETS_URL       Sheets API base url (default https://sheets.googleapis.com)
  BRACKET_SHEETS_DIR       Read sheets from <dir>/<sheet>.json instead of HTTP
  BRACKET_SHEET_32         Round of 32 sheet name (default \"Ali's 32\")
  BRACKET_SHEET_16         Round of 16 sheet name (default \"Ali's 16\")
  BRACKET_SHEET_8          Quarter finals sheet name (default \"Ali's 8\")
  BRACKET_SHEET_128        128-team grid sheet name (default \"Ali's 128\")
  BRACKET_POLL_SECS        Seconds between polls (default 10)
  BRACKET_LOG              Log level: error, warn, info, debug, trace"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw =
                    handle_network_response(response, &app, &network_requests, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }
        }
    }
}

/// Queue requests for the network worker, logging any the worker can no
/// longer receive.
pub async fn send_all(network_requests: &mpsc::Sender<NetworkRequest>, requests: Vec<NetworkRequest>) {
    for request in requests {
        if let Err(e) = network_requests.send(request).await {
            error!("Failed to queue network request: {e}");
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let requests = app.lock().await.poll_requests();
            send_all(network_requests, requests).await;
            true
        }
        UiEvent::PollTick => {
            let requests = app.lock().await.poll_requests();
            send_all(network_requests, requests).await;
            false
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
        }
        NetworkResponse::RoundLoaded { round, generation, matches } => {
            let follow_up = app.lock().await.on_round_loaded(round, generation, matches);
            if let Some(request) = follow_up {
                info!("fetching newly unlocked round");
                send_all(network_requests, vec![request]).await;
            }
        }
        NetworkResponse::GridLoaded { generation, matches } => {
            app.lock().await.on_grid_loaded(generation, matches);
        }
        NetworkResponse::Error { pipeline, generation, message } => {
            error!("{pipeline:?} fetch failed: {message}");
            app.lock().await.on_error(pipeline, generation, message);
        }
    }
    true
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        let event = match tokio::task::spawn_blocking(crossterm_event::read).await {
            Ok(Ok(event)) => event,
            Ok(Err(e)) => {
                error!("Failed to read terminal event: {e}");
                continue;
            }
            Err(_) => break,
        };

        let ui_event = match event {
            Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
            Event::Resize(_, _) => Some(UiEvent::Resize),
            _ => None,
        };

        if let Some(ui_event) = ui_event
            && ui_events.send(ui_event).await.is_err()
        {
            break;
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

/// Restore the terminal. Best effort: it also runs from the panic hook.
pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
