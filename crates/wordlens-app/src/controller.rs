use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use wordlens_types::AppEvent;

use crate::events::event_loop;
use crate::io::watcher_io;
use crate::setup::Services;
use crate::sink::{ChannelSink, UiSink};
use crate::state::AppState;
use crate::ui::ui_loop;

/// Room for every category's result for a long burst of words. The sink
/// never waits on a full queue; anything past this is dropped with a warning.
pub(crate) const DISPLAY_QUEUE: usize = 1024;
const INPUT_QUEUE: usize = 64;

/// The two queues between input, event loop and display
pub struct ChannelSet {
    /// Coordinator results and snippets on their way to the display
    pub display: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    /// Typed or copied text on its way to the event loop
    pub input: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            display: kanal::bounded_async(DISPLAY_QUEUE),
            input: kanal::bounded_async(INPUT_QUEUE),
        }
    }
}

/// Owns the channels and the shutdown token; spawns the long-running tasks
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Sink that turns coordinator results into display events
    pub fn sink(&self) -> Arc<dyn UiSink> {
        Arc::new(ChannelSink::new(self.channels.display.0.clone()))
    }

    /// Cancelled together with everything else on `shutdown`
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.child_token()
    }

    pub fn spawn_tasks(&self, services: Arc<Services>) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();
        let (display_tx, display_rx) = self.channels.display.clone();
        let (input_tx, input_rx) = self.channels.input.clone();

        tasks.spawn(event_loop(self.state.clone(), input_rx, display_tx, services));
        tasks.spawn(ui_loop(display_rx, self.cancel_token.child_token()));
        tasks.spawn(watcher_io(
            self.state.clone(),
            self.cancel_token.child_token(),
            input_tx,
        ));

        tracing::debug!("Spawned {} tasks", tasks.len());
        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
