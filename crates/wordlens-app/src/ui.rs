use kanal::AsyncReceiver;
use tokio_util::sync::CancellationToken;
use wordlens_types::{AppEvent, MeaningsRecord};

/// Console presenter: prints each event as it arrives
pub async fn ui_loop(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            event = app_to_ui_rx.recv() => event?,
        };

        if let Some(text) = render(&event) {
            println!("{text}");
        }
    }
}

pub fn render(event: &AppEvent) -> Option<String> {
    match event {
        AppEvent::BackendReady => Some("Ready. Type a word.".to_string()),
        AppEvent::ResetDisplay { word } => Some(format!("\n== {word} ==")),
        AppEvent::ShowTranslation { record, .. } => {
            let text = if record.is_empty() { "-" } else { record.text.as_str() };
            Some(format!("  translation: {} [{}]", text, record.source.label()))
        }
        AppEvent::ShowMeanings { record, .. } => Some(render_meanings(record)),
        AppEvent::AudioPlayed { accent, .. } => Some(format!("  pronounced ({accent})")),
        AppEvent::ShowImage { path, .. } => Some(format!("  image: {}", path.display())),
        AppEvent::ShowSnippet { text, translation } => Some(format!("\n\"{text}\"\n  {translation}")),
        AppEvent::StatusUpdate(status) => Some(format!("  ({status})")),
        AppEvent::RawTextInput { .. } | AppEvent::ConfigChanged => None,
    }
}

fn render_meanings(record: &MeaningsRecord) -> String {
    if record.is_empty() {
        return "  meanings: none".to_string();
    }

    let lines: Vec<String> = record
        .meanings
        .iter()
        .map(|meaning| {
            let pos = meaning["partOfSpeech"].as_str().unwrap_or("?");
            let definition = meaning["definitions"][0]["definition"].as_str().unwrap_or("");
            format!("  {pos}: {definition}")
        })
        .collect();
    lines.join("\n")
}
