use crate::state::messages::UiEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Emits a poll tick every `period`. The app decides what a tick fetches, since
/// the polled round changes as the bracket advances.
pub struct PeriodicRefresher {
    ui_events: mpsc::Sender<UiEvent>,
    period: Duration,
}

impl PeriodicRefresher {
    pub fn new(ui_events: mpsc::Sender<UiEvent>, period: Duration) -> Self {
        Self { ui_events, period }
    }

    pub async fn run(self) {
        let mut poll_interval = interval(self.period);
        // Skip the immediate first tick so startup loading isn't double-triggered.
        poll_interval.tick().await;

        loop {
            poll_interval.tick().await;
            if self.ui_events.send(UiEvent::PollTick).await.is_err() {
                break;
            }
        }
    }
}
