//! Direct TCP client for the game protocol.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Connect, send the `SID:` handshake, then pipe stdin to the server and the server to stdout.
pub async fn run_direct(addr: &str, sid: &str) -> Result<()> {
    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("connect to game server at {}", addr))?;
    tracing::info!(addr, sid, "connected to game server");
    play(
        stream,
        sid,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

/// Drive one session over `stream` until either side closes.
pub async fn play<I, O>(stream: TcpStream, sid: &str, input: I, mut output: O) -> Result<()>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin + Send + 'static,
{
    let (mut reader, mut writer) = stream.into_split();
    writer
        .write_all(shared::handshake_line(sid).as_bytes())
        .await?;

    let printer = tokio::spawn(async move {
        let copied = tokio::io::copy(&mut reader, &mut output).await;
        let _ = output.flush().await;
        copied
    });

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if printer.is_finished() {
            break;
        }
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.shutdown().await?;

    printer.await?.context("read from game server")?;
    Ok(())
}
