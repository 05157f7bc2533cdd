use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Report each non-empty line typed on stdin until EOF
pub async fn read_stdin_lines<F>(on_text: F) -> Result<(), anyhow::Error>
where
    F: FnMut(String) + Send + 'static,
{
    read_lines(BufReader::new(tokio::io::stdin()), on_text).await
}

pub async fn read_lines<R, F>(reader: R, mut on_text: F) -> Result<(), anyhow::Error>
where
    R: AsyncBufRead + Unpin,
    F: FnMut(String),
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if !line.is_empty() {
            on_text(line.to_string());
        }
    }

    Ok(())
}
