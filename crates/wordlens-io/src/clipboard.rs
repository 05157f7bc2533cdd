use std::time::Duration;

use arboard::Clipboard;
use tokio::time::{self, MissedTickBehavior};

/// Copies longer than this are documents, not words or phrases
const MAX_TEXT_CHARS: usize = 500;

/// Poll the clipboard and report every new copy of a word or phrase.
///
/// Whatever was on the clipboard before the watcher started is not input.
pub async fn watch_clipboard<F>(poll: Duration, mut on_text: F) -> Result<(), anyhow::Error>
where
    F: FnMut(String) + Send + 'static,
{
    let mut clipboard = Clipboard::new()?;
    let mut seen = clipboard
        .get_text()
        .map(|text| text.trim().to_string())
        .unwrap_or_default();

    let mut ticker = time::interval(poll);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let Ok(text) = clipboard.get_text() else {
            continue;
        };
        if let Some(text) = fresh_copy(&mut seen, &text) {
            on_text(text);
        }
    }
}

fn fresh_copy(seen: &mut String, text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() || text == seen {
        return None;
    }
    *seen = text.to_string();

    if text.chars().count() > MAX_TEXT_CHARS {
        tracing::debug!("Ignoring a {} char clipboard copy", text.chars().count());
        return None;
    }
    Some(seen.clone())
}
