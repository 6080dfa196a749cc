/// ----- EVENT CHANNEL -----
/// An ordered queue shared between the command surface and the tick loop.
/// Pushing never blocks. `pop` blocks until an item arrives or the channel
/// is shut down; once shut down it keeps handing out queued items and then
/// returns `None` immediately instead of blocking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use parking_lot::Mutex;

pub struct EventChannel<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
    // Dropping the sender disconnects `shutdown_rx`, which wakes every blocked `pop`.
    shutdown_tx: Mutex<Option<Sender<()>>>,
    shutdown_rx: Receiver<()>,
    shut_down: AtomicBool,
}

impl<T> EventChannel<T> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        let (shutdown_tx, shutdown_rx) = bounded(0);
        EventChannel {
            tx,
            rx,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            shutdown_rx,
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn push(&self, item: T) {
        // `self.rx` lives as long as `self`, so the channel is never disconnected.
        let _ = self.tx.send(item);
    }

    /// Blocks until an item is available. Returns `None` once the channel is
    /// shut down and empty.
    pub fn pop(&self) -> Option<T> {
        loop {
            if let Ok(item) = self.rx.try_recv() {
                return Some(item);
            }
            if self.is_shutdown() {
                return None;
            }
            select! {
                recv(self.rx) -> item => return item.ok(),
                recv(self.shutdown_rx) -> _ => {},
            }
        }
    }

    /// Like `pop`, but gives up after `timeout`.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        if let Ok(item) = self.rx.try_recv() {
            return Some(item);
        }
        if self.is_shutdown() {
            return None;
        }
        select! {
            recv(self.rx) -> item => item.ok(),
            recv(self.shutdown_rx) -> _ => self.rx.try_recv().ok(),
            default(timeout) => None,
        }
    }

    pub fn try_pop(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Idempotent.
    pub fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
        self.shutdown_tx.lock().take();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<T> Default for EventChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}
