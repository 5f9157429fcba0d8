/*
 * Copyright 2025 Cory Parent
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! In-process transport: per-requester notification channels and a
//! JSON-logging pool publication sink
//!
//! Notifications are enqueued, never sent synchronously, because the
//! scheduler invokes the notifier while holding its lock.

use chrono::{DateTime, Utc};
use concerto_core::{
    timestamp_now, CoreError, CoreResult, PoolObserver, PoolSnapshot, RequesterId,
    RequesterNotifier,
};
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// One queued notification for a connected requester
#[derive(Debug, Clone)]
pub struct Notification {
    /// The requester being told to re-examine its requests
    pub requester: RequesterId,

    /// When the scheduler emitted the notification
    pub sent_at: DateTime<Utc>,
}

/// Registry of connected requesters and their notification channels
#[derive(Default)]
pub struct ChannelTransport {
    requesters: DashMap<RequesterId, mpsc::UnboundedSender<Notification>>,
}

impl ChannelTransport {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect a requester, returning its notification stream
    pub fn register(&self, requester: RequesterId) -> mpsc::UnboundedReceiver<Notification> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.requesters.insert(requester, sender);
        info!("Requester connected: {requester}");
        receiver
    }

    /// Disconnect a requester
    pub fn unregister(&self, requester: &RequesterId) {
        if self.requesters.remove(requester).is_some() {
            info!("Requester disconnected: {requester}");
        }
    }

    /// Number of connected requesters
    pub fn len(&self) -> usize {
        self.requesters.len()
    }

    /// Whether no requesters are connected
    pub fn is_empty(&self) -> bool {
        self.requesters.is_empty()
    }
}

impl RequesterNotifier for ChannelTransport {
    fn notify(&self, requester: RequesterId) -> CoreResult<()> {
        let delivered = match self.requesters.get(&requester) {
            Some(sender) => sender
                .send(Notification {
                    requester,
                    sent_at: timestamp_now(),
                })
                .is_ok(),
            None => return Err(CoreError::unknown_requester(requester)),
        };
        if delivered {
            Ok(())
        } else {
            // receiver dropped without unregistering
            self.requesters.remove(&requester);
            Err(CoreError::unknown_requester(requester))
        }
    }
}

/// Publishes pool snapshots as JSON log lines on a named topic
pub struct LoggingPoolObserver {
    topic: String,
}

impl LoggingPoolObserver {
    /// Create an observer logging under the given topic name
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
        }
    }
}

impl PoolObserver for LoggingPoolObserver {
    fn pool_changed(&self, snapshot: &PoolSnapshot) {
        match serde_json::to_string(snapshot) {
            Ok(body) => info!("[{}] {}", self.topic, body),
            Err(err) => warn!("[{}] snapshot serialization failed: {}", self.topic, err),
        }
    }
}
