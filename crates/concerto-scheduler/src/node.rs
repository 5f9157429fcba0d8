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

//! Scheduler node lifecycle: the Big Scheduler Lock and the periodic tick
//!
//! Three threads of control reach the scheduler: the transport's request
//! callback, the conductor's roster callback, and the reschedule timer. All
//! of them serialize on one `parking_lot::Mutex` held across the entire
//! operation. The critical sections are short, in-memory index work, and
//! none of them block on I/O while holding the lock.

use crate::config::SchedulerConfig;
use crate::error::SchedulerResult;
use crate::scheduler::Scheduler;
use concerto_core::{ClientInfo, PoolObserver, RequestHandle, RequesterId, RequesterNotifier};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;

/// Node lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Node is stopped
    Stopped,

    /// Tick task running, callbacks accepted
    Running,

    /// Node is shutting down
    ShuttingDown,
}

/// Owns a [`Scheduler`] behind the Big Scheduler Lock and drives its
/// periodic rescheduling.
pub struct SchedulerNode {
    scheduler: Arc<Mutex<Scheduler>>,
    config: SchedulerConfig,
    state: NodeState,
    tick_task: Option<JoinHandle<()>>,
}

impl SchedulerNode {
    /// Create a stopped node with a validated configuration
    pub fn new(
        config: SchedulerConfig,
        notifier: Arc<dyn RequesterNotifier>,
        observer: Arc<dyn PoolObserver>,
    ) -> SchedulerResult<Self> {
        config.validate()?;
        Ok(Self {
            scheduler: Arc::new(Mutex::new(Scheduler::new(notifier, observer))),
            config,
            state: NodeState::Stopped,
            tick_task: None,
        })
    }

    /// The node configuration
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Current lifecycle state
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// The Big Scheduler Lock, for transports that batch operations
    pub fn scheduler(&self) -> Arc<Mutex<Scheduler>> {
        Arc::clone(&self.scheduler)
    }

    /// Publish the initial pool snapshot and start the reschedule tick.
    ///
    /// Must run inside a tokio runtime. Idempotent while running.
    pub fn start(&mut self) -> SchedulerResult<()> {
        if self.state == NodeState::Running {
            return Ok(());
        }
        info!(
            "Starting scheduler node (reschedule every {:?})",
            self.config.reschedule_interval
        );

        // latched topic: subscribers see the pool even before it changes
        self.scheduler.lock().publish_pool();

        let scheduler = Arc::clone(&self.scheduler);
        let period = self.config.reschedule_interval;
        self.tick_task = Some(tokio::spawn(async move {
            let mut tick = tokio::time::interval(period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately; skip it so the initial
            // reschedule happens one full period after start
            tick.tick().await;
            loop {
                tick.tick().await;
                scheduler.lock().reschedule();
            }
        }));

        self.state = NodeState::Running;
        info!("Scheduler node started");
        Ok(())
    }

    /// Stop the tick task
    pub fn stop(&mut self) {
        if self.state != NodeState::Running {
            return;
        }
        self.state = NodeState::ShuttingDown;
        info!("Stopping scheduler node");
        if let Some(task) = self.tick_task.take() {
            task.abort();
        }
        self.state = NodeState::Stopped;
        info!("Scheduler node stopped");
    }

    /// Transport callback entry point
    pub fn handle_requests(&self, requester: RequesterId, requests: &[Arc<dyn RequestHandle>]) {
        self.scheduler.lock().handle_requests(requester, requests);
    }

    /// Conductor callback entry point
    pub fn track_clients(&self, clients: &[ClientInfo]) {
        self.scheduler.lock().track_clients(clients);
    }
}

impl Drop for SchedulerNode {
    fn drop(&mut self) {
        if let Some(task) = self.tick_task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ActiveRequest;
    use concerto_core::{CoreResult, PoolSnapshot, RequestId, RequestStatus, ResourceSpec};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct QuietNotifier;

    impl RequesterNotifier for QuietNotifier {
        fn notify(&self, _requester: RequesterId) -> CoreResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingObserver {
        published: AtomicUsize,
    }

    impl PoolObserver for CountingObserver {
        fn pool_changed(&self, _snapshot: &PoolSnapshot) {
            self.published.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn test_node(interval: Duration) -> (SchedulerNode, Arc<CountingObserver>) {
        let observer = Arc::new(CountingObserver::default());
        let config = SchedulerConfig {
            reschedule_interval: interval,
            ..Default::default()
        };
        let node = SchedulerNode::new(
            config,
            Arc::new(QuietNotifier),
            Arc::clone(&observer) as Arc<dyn PoolObserver>,
        )
        .unwrap();
        (node, observer)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SchedulerConfig {
            reschedule_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(SchedulerNode::new(
            config,
            Arc::new(QuietNotifier),
            Arc::new(CountingObserver::default()),
        )
        .is_err());
    }

    #[tokio::test]
    async fn test_start_publishes_initial_snapshot() {
        let (mut node, observer) = test_node(Duration::from_secs(60));
        assert_eq!(node.state(), NodeState::Stopped);

        node.start().unwrap();
        assert_eq!(node.state(), NodeState::Running);
        assert_eq!(observer.published.load(Ordering::SeqCst), 1);

        node.start().unwrap();
        assert_eq!(observer.published.load(Ordering::SeqCst), 1);

        node.stop();
        assert_eq!(node.state(), NodeState::Stopped);
    }

    #[tokio::test]
    async fn test_tick_demotes_unsatisfiable_request() {
        let (mut node, _observer) = test_node(Duration::from_millis(20));
        node.start().unwrap();

        let rq = Arc::new(ActiveRequest::new(
            RequestId::generate(),
            0,
            vec![ResourceSpec::new("concerto:/turtlebot/marvin", "teleop")],
        ));
        node.handle_requests(
            RequesterId::generate(),
            &[Arc::clone(&rq) as Arc<dyn RequestHandle>],
        );
        assert_eq!(rq.status(), RequestStatus::Waiting);

        tokio::time::sleep(Duration::from_millis(200)).await;
        {
            let scheduler = node.scheduler();
            let scheduler = scheduler.lock();
            assert_eq!(scheduler.ready_len(), 0);
            assert_eq!(scheduler.blocked_len(), 1);
        }

        node.stop();
    }
}
