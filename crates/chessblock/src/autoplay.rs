//! Timed forward stepping through a game.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::engine::LegalityEngine;
use crate::navigator::{BoardView, Navigator};

/// A running autoplay task. Stops by itself at the end of the current line,
/// when [`Autoplay::stop`] is called, or when dropped.
#[derive(Debug)]
pub struct Autoplay {
    handle: Option<JoinHandle<()>>,
}

impl Autoplay {
    /// Advance `navigator` one ply every `period`, starting one period from
    /// now. Must be called inside a tokio runtime.
    pub fn start<B, E>(navigator: Arc<Mutex<Navigator<B, E>>>, period: Duration) -> Self
    where
        B: BoardView + Send + 'static,
        E: LegalityEngine + Default + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let mut nav = navigator.lock().await;
                if nav.is_at_end() {
                    debug!("Autoplay reached end of line");
                    break;
                }
                nav.go_forward();
                if nav.is_at_end() {
                    debug!("Autoplay reached end of line");
                    break;
                }
            }
        });
        Self { handle: Some(handle) }
    }

    /// Stop stepping. Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Wait for autoplay to reach the end of the line.
    pub async fn finished(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Autoplay {
    fn drop(&mut self) {
        self.stop();
    }
}
