use futures_util::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Connect to a text feed and report each message until the peer closes.
/// UTF-8 binary frames count as text.
pub async fn start_ws_listener<F>(url: &str, mut on_text: F) -> Result<(), anyhow::Error>
where
    F: FnMut(String) + Send + 'static,
{
    let (ws_stream, _) = connect_async(url).await?;
    let (_, mut read) = ws_stream.split();

    while let Some(msg) = read.next().await {
        match msg? {
            Message::Text(text) => on_text(text.as_str().to_string()),
            Message::Binary(bytes) => match std::str::from_utf8(&bytes) {
                Ok(text) => on_text(text.to_string()),
                Err(_) => tracing::debug!("Skipping {} byte binary frame", bytes.len()),
            },
            Message::Close(frame) => {
                tracing::debug!("Close frame: {:?}", frame);
                break;
            }
            _ => {}
        }
    }

    tracing::info!("WebSocket feed {} closed", url);
    Ok(())
}
