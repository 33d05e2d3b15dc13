//! Trailing-edge debounce for filter text.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

/// Spawn a debouncer. Strings sent on the returned sender come out of the
/// receiver only after `delay` has passed with no newer input; intermediate
/// keystrokes are dropped. Closing the sender flushes the pending value.
pub fn spawn_debounce(delay: Duration) -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
    let (in_tx, mut in_rx) = mpsc::channel::<String>(64);
    let (out_tx, out_rx) = mpsc::channel::<String>(16);
    tokio::spawn(async move {
        let mut pending: Option<String> = None;
        loop {
            if pending.is_none() {
                match in_rx.recv().await {
                    Some(text) => pending = Some(text),
                    None => break,
                }
                continue;
            }
            tokio::select! {
                maybe = in_rx.recv() => match maybe {
                    Some(text) => pending = Some(text),
                    None => {
                        if let Some(text) = pending.take() {
                            let _ = out_tx.send(text).await;
                        }
                        break;
                    }
                },
                _ = tokio::time::sleep(delay) => {
                    if let Some(text) = pending.take() {
                        if out_tx.send(text).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
        debug!("debounce loop stopped");
    });
    (in_tx, out_rx)
}
