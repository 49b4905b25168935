use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Cells moved per pan keypress.
const PAN_X: i32 = 4;
const PAN_Y: i32 = 2;

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Bracket),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Grid),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Panning
        (_, Char('h') | KeyCode::Left, _) => guard.pan(-PAN_X, 0),
        (_, Char('l') | KeyCode::Right, _) => guard.pan(PAN_X, 0),
        (_, Char('k') | KeyCode::Up, _) => guard.pan(0, -PAN_Y),
        (_, Char('j') | KeyCode::Down, _) => guard.pan(0, PAN_Y),

        // Refresh now
        (_, Char('r'), _) => {
            let requests = guard.poll_requests();
            drop(guard);
            crate::send_all(network_requests, requests).await;
        }

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }
}
