//! Terminal event abstraction.
//!
//! Wraps crossterm events into a simpler enum and runs a background task that
//! forwards them over a channel so the picker loop can await them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// High-level events consumed by the picker.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
}

/// Background terminal reader.  Input arriving after [`EventReader::shutdown`]
/// is left in the terminal for whoever reads it next.
pub struct EventReader {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    stop: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl EventReader {
    pub fn spawn(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stopped = Arc::clone(&stop);

        let task = tokio::task::spawn_blocking(move || {
            while !stopped.load(Ordering::Acquire) {
                let has_event = event::poll(tick_rate).unwrap_or(false);
                if stopped.load(Ordering::Acquire) {
                    break;
                }
                let app_event = if has_event {
                    match event::read() {
                        Ok(CtEvent::Key(k)) => AppEvent::Key(k),
                        Ok(CtEvent::Resize(w, h)) => AppEvent::Resize(w, h),
                        Ok(_) | Err(_) => continue,
                    }
                } else {
                    AppEvent::Tick
                };
                if tx.send(app_event).is_err() {
                    break; // receiver dropped
                }
            }
        });

        Self { rx, stop, task }
    }

    pub async fn recv(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }

    /// Stop reading and wait for the reader to finish its last poll.
    pub async fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        self.rx.close();
        if let Err(e) = (&mut self.task).await {
            tracing::debug!("event reader ended abnormally: {e}");
        }
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_waits_for_the_reader_to_stop() {
        let mut reader = EventReader::spawn(Duration::from_millis(10));
        tokio::time::timeout(Duration::from_secs(5), reader.shutdown())
            .await
            .expect("reader did not stop");
        assert!(reader.task.is_finished());
        assert!(reader.stop.load(Ordering::Acquire));
    }
}
