//! Transient operator notices.
//!
//! Protocol-level errors (an inbound `error` frame, a rejected side-channel
//! request) are shown to the operator for a fixed window and then disappear
//! on their own.  They never touch telemetry or connectivity.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::warn;

/// Display window used when none is configured.
pub const DEFAULT_NOTICE_WINDOW: Duration = Duration::from_secs(5);

/// A single notice and when it was raised.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub raised_at: Instant,
}

/// Holds notices until their display window has elapsed.
#[derive(Debug)]
pub struct NoticeBoard {
    window: Duration,
    notices: Mutex<VecDeque<Notice>>,
    raised: broadcast::Sender<Notice>,
}

impl NoticeBoard {
    pub fn new(window: Duration) -> Self {
        let (raised, _) = broadcast::channel(32);
        Self {
            window,
            notices: Mutex::new(VecDeque::new()),
            raised,
        }
    }

    /// Posts a notice; it stays active for the board's display window.
    pub fn raise(&self, message: impl Into<String>) {
        let notice = Notice {
            message: message.into(),
            raised_at: Instant::now(),
        };
        warn!(message = %notice.message, "operator notice");

        let mut notices = self.lock();
        self.prune(&mut notices);
        notices.push_back(notice.clone());
        drop(notices);

        // No subscribers is fine; active() still reports the notice.
        let _ = self.raised.send(notice);
    }

    /// Messages still inside their display window, oldest first.
    pub fn active(&self) -> Vec<String> {
        let mut notices = self.lock();
        self.prune(&mut notices);
        notices.iter().map(|n| n.message.clone()).collect()
    }

    /// Receives each notice as it is raised.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.raised.subscribe()
    }

    fn prune(&self, notices: &mut VecDeque<Notice>) {
        while let Some(front) = notices.front() {
            if front.raised_at.elapsed() >= self.window {
                notices.pop_front();
            } else {
                break;
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Notice>> {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_notice_is_active_inside_window() {
        // Arrange
        let board = NoticeBoard::default();

        // Act
        board.raise("stall");
        tokio::time::advance(Duration::from_millis(4_999)).await;

        // Assert
        assert_eq!(board.active(), vec!["stall".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notice_expires_after_window() {
        let board = NoticeBoard::default();
        board.raise("stall");

        tokio::time::advance(Duration::from_secs(5)).await;

        assert!(board.active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_notices_expire_independently() {
        // Arrange
        let board = NoticeBoard::new(Duration::from_secs(2));
        board.raise("first");
        tokio::time::advance(Duration::from_secs(1)).await;
        board.raise("second");

        // Act
        tokio::time::advance(Duration::from_millis(1_500)).await;

        // Assert
        assert_eq!(board.active(), vec!["second".to_string()]);
    }

    #[tokio::test]
    async fn test_subscribers_receive_raised_notices() {
        let board = NoticeBoard::default();
        let mut rx = board.subscribe();

        board.raise("AD3 not connected");

        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.message, "AD3 not connected");
    }
}
