//! Host poll loop.
//!
//! Spawns a tokio task that periodically loads the task snapshot, fires due
//! reminders and forwards the resulting [`ReminderEvent`]s to the
//! notification layer. This is the only place the wall clock is read.

use crate::config::ReminderSettings;
use crate::error::Result;
use crate::reminder::queue::{ReminderEvent, poll};
use crate::store::TaskStore;
use crate::task::Timestamp;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Default interval between poll ticks.
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(30);

/// Background poller that turns due reminders into events.
pub struct ReminderPoller {
    store: Arc<dyn TaskStore>,
    settings: ReminderSettings,
    events_tx: mpsc::UnboundedSender<ReminderEvent>,
    tick_interval: Duration,
}

impl ReminderPoller {
    /// Create a poller reading from `store` and sending to `events_tx`.
    pub fn new(
        store: Arc<dyn TaskStore>,
        settings: ReminderSettings,
        events_tx: mpsc::UnboundedSender<ReminderEvent>,
    ) -> Self {
        Self {
            store,
            settings,
            events_tx,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }

    /// Override the tick interval.
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Run one poll at `now`. Returns the number of reminders fired.
    ///
    /// The snapshot is saved back only when something fired.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be loaded or saved.
    pub fn tick(&self, now: Timestamp) -> Result<usize> {
        let mut tasks = self.store.load()?;
        let events = poll(&mut tasks, now, &self.settings);
        if events.is_empty() {
            return Ok(0);
        }

        self.store.save(&tasks)?;

        let fired: usize = events
            .iter()
            .map(|event| match event {
                ReminderEvent::ForcedDue(_) => 1,
                ReminderEvent::NormalDue(batch) => batch.len(),
            })
            .sum();
        debug!(now, fired, "reminders fired");

        for event in events {
            if self.events_tx.send(event).is_err() {
                debug!("reminder event channel closed");
                break;
            }
        }
        Ok(fired)
    }

    /// Start the poll loop. The loop ends when the event receiver is dropped.
    pub fn run(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                interval_ms = self.tick_interval.as_millis() as u64,
                "reminder poller started"
            );
            let mut interval = tokio::time::interval(self.tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                if self.events_tx.is_closed() {
                    info!("reminder event channel closed, stopping poller");
                    break;
                }
                let now = chrono::Utc::now().timestamp();
                if let Err(e) = self.tick(now) {
                    error!("reminder poll failed: {e}");
                }
            }
        })
    }
}
