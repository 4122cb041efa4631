//! Broadcast notifications and the per-user read status.
//!
//! There is no incremental change feed: the watcher simply refetches the
//! whole set on every tick and reports the unread count when it changes.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::Notification;

use super::client::{BackendClient, eq};
use super::error::Result;

#[derive(Deserialize)]
struct NotificationId {
    notification_id: String,
}

#[derive(Serialize)]
struct ReadStatusRow<'a> {
    user_id: &'a str,
    notification_id: &'a str,
    is_read: bool,
}

impl BackendClient {
    /// Every notification, newest first.
    pub fn fetch_notifications(&self) -> Result<Vec<Notification>> {
        self.select(
            "notifications",
            &[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
            ],
        )
    }

    /// Ids of the notifications `user_id` has already read.
    pub fn read_notification_ids(&self, user_id: &str) -> Result<HashSet<String>> {
        let rows: Vec<NotificationId> = self.select(
            "user_notifications_status",
            &[
                ("select", "notification_id".to_string()),
                ("user_id", eq(user_id)),
            ],
        )?;
        Ok(rows.into_iter().map(|r| r.notification_id).collect())
    }

    /// Record every id in `ids` as read by `user_id`.
    pub fn mark_notifications_read(&self, user_id: &str, ids: &[&str]) -> Result<()> {
        let rows: Vec<ReadStatusRow<'_>> = ids
            .iter()
            .map(|id| ReadStatusRow {
                user_id,
                notification_id: id,
                is_read: true,
            })
            .collect();
        self.upsert("user_notifications_status", &rows)
    }

    pub fn unread_notification_count(&self, user_id: &str) -> Result<usize> {
        let all: Vec<IdRow> = self.select("notifications", &[("select", "id".to_string())])?;
        let read = self.read_notification_ids(user_id)?;
        Ok(count_unread(all.iter().map(|r| r.id.as_str()), &read))
    }
}

#[derive(Deserialize)]
struct IdRow {
    id: String,
}

/// How many of `ids` are not in `read`.
pub fn count_unread<'a>(ids: impl IntoIterator<Item = &'a str>, read: &HashSet<String>) -> usize {
    ids.into_iter().filter(|id| !read.contains(*id)).count()
}

/// Background refetch of a user's unread count.
///
/// Dropping the watch stops the thread at its next wake-up.
pub struct NotificationWatch {
    pub(super) counts: Receiver<usize>,
    stop: Arc<AtomicBool>,
}

const WAKE_STEP: Duration = Duration::from_millis(200);

impl NotificationWatch {
    pub fn spawn(client: Arc<BackendClient>, user_id: String, every: Duration) -> Self {
        Self::spawn_with(every, move || client.unread_notification_count(&user_id))
    }

    /// Run `fetch` now and then every `every`, publishing changed counts.
    pub(super) fn spawn_with<F>(every: Duration, mut fetch: F) -> Self
    where
        F: FnMut() -> Result<usize> + Send + 'static,
    {
        let (tx, counts) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        thread::spawn(move || {
            let mut last: Option<usize> = None;
            while !stop_flag.load(Ordering::Relaxed) {
                match fetch() {
                    Ok(n) if last != Some(n) => {
                        debug!(unread = n, "notification count changed");
                        last = Some(n);
                        if tx.send(n).is_err() {
                            return;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "notification refresh failed"),
                }
                let wake = Instant::now() + every;
                while Instant::now() < wake {
                    if stop_flag.load(Ordering::Relaxed) {
                        return;
                    }
                    thread::sleep(WAKE_STEP.min(every));
                }
            }
        });

        Self { counts, stop }
    }

    /// The most recent count published since the last call, if any.
    pub fn latest(&self) -> Option<usize> {
        self.counts.try_iter().last()
    }
}

impl Drop for NotificationWatch {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}
