use std::sync::Arc;

use kanal::AsyncSender;
use wordlens_core::preprocess::{DefaultPreprocessor, Preprocessor};
use wordlens_types::{AppEvent, GenerationToken};

use crate::setup::Services;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Blank, or no letters to look up
    Ignored,
    /// Below the user's vocabulary level
    TooSimple(String),
    Submitted(GenerationToken),
    /// Sent to the snippet translator
    Snippet,
}

/// A single word is looked up unless it is too common for the user's level;
/// anything longer is translated as a snippet in the background
pub fn handle_text_input(
    text: &str,
    level: u32,
    services: &Arc<Services>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> InputAction {
    let normalized = DefaultPreprocessor.process(text);
    if normalized.is_empty() {
        return InputAction::Ignored;
    }

    if normalized.contains(' ') {
        let services = services.clone();
        let tx = app_to_ui_tx.clone();

        tokio::spawn(async move {
            let Some(translation) = services.snippets.translate(&normalized).await else {
                return;
            };
            let event = AppEvent::ShowSnippet {
                text: normalized,
                translation,
            };
            if let Err(e) = tx.send(event).await {
                tracing::error!("Failed to send snippet to UI: {}", e);
            }
        });
        return InputAction::Snippet;
    }

    if services.vocabulary.is_word_too_simple(&normalized, level) {
        tracing::debug!("'{}' is below level {}, skipping", normalized, level);
        return InputAction::TooSimple(normalized);
    }

    match services.coordinator.submit(&normalized) {
        Some(token) => InputAction::Submitted(token),
        None => InputAction::Ignored,
    }
}
