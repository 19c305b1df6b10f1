use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Read newline-delimited job envelopes from stdin into the job channel.
///
/// This is the local stand-in for the external message consumer: one JSON
/// envelope per line, blank lines skipped. Exits on EOF, on cancellation,
/// or when the router side of the channel is gone; dropping the sender
/// closes the channel so the router drains and stops.
pub async fn read_stdin(tx: mpsc::Sender<String>, cancel: CancellationToken) {
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        if tx.send(line.to_string()).await.is_err() {
                            break; // router stopped
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::warn!(error = %e, "stdin read error");
                        break;
                    }
                }
            }
        }
    }
}
