/// Autoplay against a shared navigator, on tokio's paused clock.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chessblock::{Autoplay, LineId};
use common::navigator;
use tokio::sync::Mutex;

#[tokio::test(start_paused = true)]
async fn test_autoplay_walks_main_line_to_end() {
    let nav = Arc::new(Mutex::new(navigator("1. e4 e5 2. Nf3 (2. f4) Nc6 3. Bb5")));
    Autoplay::start(nav.clone(), Duration::from_secs(1)).finished().await;

    let nav = nav.lock().await;
    assert!(nav.is_at_end());
    assert_eq!(nav.cursor().line, LineId::ROOT);
    assert_eq!(nav.cursor().index, 5);
    let indices: Vec<usize> = nav.board().updates.iter().map(|u| u.cursor.index).collect();
    assert_eq!(indices, [0, 1, 2, 3, 4, 5]);
}

#[tokio::test(start_paused = true)]
async fn test_autoplay_from_inside_variation_stays_in_it() {
    let nav = Arc::new(Mutex::new(navigator("1. e4 e5 (1... c5 2. Nf3 d6) 2. Nf3")));
    let line = {
        let mut guard = nav.lock().await;
        guard.go_to_variation(LineId::ROOT, 1, 0);
        guard.cursor().line
    };

    Autoplay::start(nav.clone(), Duration::from_millis(200)).finished().await;
    let guard = nav.lock().await;
    assert_eq!(guard.cursor().line, line);
    assert_eq!(guard.cursor().index, 3);
    assert_eq!(guard.current_node().unwrap().san, "d6");
}

#[tokio::test(start_paused = true)]
async fn test_dropping_autoplay_stops_it() {
    let nav = Arc::new(Mutex::new(navigator("1. e4 e5 2. Nf3 Nc6")));
    let autoplay = Autoplay::start(nav.clone(), Duration::from_millis(100));
    tokio::time::sleep(Duration::from_millis(250)).await;
    drop(autoplay);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(nav.lock().await.cursor().index, 2);
}

#[tokio::test(start_paused = true)]
async fn test_autoplay_at_end_finishes_immediately() {
    let nav = Arc::new(Mutex::new(navigator("1. e4")));
    nav.lock().await.go_to_end();
    let autoplay = Autoplay::start(nav.clone(), Duration::from_millis(100));
    autoplay.finished().await;
    assert_eq!(nav.lock().await.cursor().index, 1);
}
