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

//! Scheduling core: ready/blocked queues, dispatch, and periodic rescheduling
//!
//! Every method here must be called with the Big Scheduler Lock held; the
//! [`SchedulerNode`](crate::node::SchedulerNode) wraps a [`Scheduler`] in
//! that lock and routes the transport callbacks and the periodic tick
//! through it.

use crate::error::SchedulerError;
use crate::pool::ResourcePool;
use crate::queue::{PriorityQueue, QueueElement};
use chrono::{DateTime, Utc};
use concerto_core::{
    timestamp_now, ClientInfo, PoolObserver, Reason, RequestHandle, RequestStatus, RequesterId,
    RequesterNotifier, ResourceStatus,
};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Running counters over scheduler activity
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStats {
    /// Requests accepted into the ready queue
    pub queued: u64,

    /// Requests granted resources
    pub granted: u64,

    /// Requests rejected as invalid
    pub rejected: u64,

    /// Requests freed after cancellation
    pub canceled: u64,

    /// Requests demoted to the blocked queue
    pub demoted: u64,

    /// Requests promoted back to the ready queue
    pub promoted: u64,

    /// Dispatch passes run
    pub dispatch_cycles: u64,

    /// Last counter update
    pub last_updated: DateTime<Utc>,
}

impl Default for SchedulerStats {
    fn default() -> Self {
        Self {
            queued: 0,
            granted: 0,
            rejected: 0,
            canceled: 0,
            demoted: 0,
            promoted: 0,
            dispatch_cycles: 0,
            last_updated: timestamp_now(),
        }
    }
}

/// The scheduling core.
///
/// Classifies inbound requests, grants pooled resources in strict
/// priority-FIFO order with head-of-line blocking, demotes requests no
/// combination of known robots could satisfy, and notifies each affected
/// requester exactly once per batch of changes.
pub struct Scheduler {
    pool: ResourcePool,
    ready_queue: PriorityQueue,
    blocked_queue: PriorityQueue,
    notification_set: HashSet<RequesterId>,
    notifier: Arc<dyn RequesterNotifier>,
    observer: Arc<dyn PoolObserver>,
    stats: SchedulerStats,
}

impl Scheduler {
    /// Create a scheduler with an empty pool and empty queues
    pub fn new(notifier: Arc<dyn RequesterNotifier>, observer: Arc<dyn PoolObserver>) -> Self {
        Self {
            pool: ResourcePool::new(),
            ready_queue: PriorityQueue::new(),
            blocked_queue: PriorityQueue::new(),
            notification_set: HashSet::new(),
            notifier,
            observer,
            stats: SchedulerStats::default(),
        }
    }

    /// The resource pool
    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    /// Activity counters
    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Live requests awaiting allocation
    pub fn ready_len(&self) -> usize {
        self.ready_queue.len()
    }

    /// Live requests parked as unsatisfiable
    pub fn blocked_len(&self) -> usize {
        self.blocked_queue.len()
    }

    /// Transport callback: one delivered batch of requests from a requester.
    ///
    /// New requests are queued, canceling requests freed, then a dispatch
    /// pass runs.
    pub fn handle_requests(
        &mut self,
        requester: RequesterId,
        requests: &[Arc<dyn RequestHandle>],
    ) {
        debug!(
            "scheduler callback: {} request(s) from {}",
            requests.len(),
            requester
        );
        for request in requests {
            match request.status() {
                RequestStatus::New => self.queue(Arc::clone(request), requester),
                RequestStatus::Canceling => self.free(request.as_ref(), requester),
                _ => {}
            }
        }
        self.dispatch();
    }

    /// Conductor callback: reconcile the pool against the current roster.
    ///
    /// Blocked requests are not rescanned here; the periodic tick is the
    /// sole path between the blocked and ready queues.
    pub fn track_clients(&mut self, clients: &[ClientInfo]) {
        self.pool.update(clients);
    }

    /// Grant any available resources to ready requests, head first.
    ///
    /// Stops at the first unsatisfiable head so lower-priority requests
    /// cannot overtake it. Notifies all affected requesters and publishes a
    /// pool snapshot if anything changed.
    pub fn dispatch(&mut self) {
        loop {
            let element = match self.ready_queue.pop() {
                Ok(element) => element,
                Err(_) => break,
            };

            let granted = match self.pool.allocate(element.request().as_ref()) {
                Ok(granted) => granted,
                Err(err) => {
                    self.reject_request(&element, &err);
                    continue;
                }
            };

            if granted.is_empty() {
                // unsatisfiable head; restore its position and stop looking
                self.ready_queue.add(element);
                break;
            }

            match element.request().grant(granted.clone()) {
                Ok(()) => {
                    info!("Request granted: {}", element.uuid());
                    self.stats.granted += 1;
                }
                Err(err) => {
                    // request no longer active; undo the allocation
                    debug!("grant refused for {}: {}", element.uuid(), err);
                    self.pool.release_resources(&granted);
                }
            }
            self.notification_set.insert(element.requester());
        }

        self.stats.dispatch_cycles += 1;
        self.stats.last_updated = timestamp_now();
        self.notify_requesters();
        self.publish_if_changed();
    }

    /// Periodic tick: move requests between the blocked and ready queues,
    /// then dispatch.
    ///
    /// A ready head stays put while some combination of available and
    /// allocated robots could still satisfy it; otherwise it is demoted.
    /// Blocked requests whose patterns became satisfiable again are promoted
    /// first.
    pub fn reschedule(&mut self) {
        self.promote_blocked();

        loop {
            let element = match self.ready_queue.pop() {
                Ok(element) => element,
                Err(_) => break,
            };
            match self.feasible_eventually(element.request().as_ref()) {
                Ok(true) => {
                    // head is still live, don't disturb it
                    self.ready_queue.add(element);
                    break;
                }
                Ok(false) => {
                    info!("Request blocked: {}", element.uuid());
                    match element.request().wait(Reason::Unavailable) {
                        Ok(()) => {
                            self.notification_set.insert(element.requester());
                            self.blocked_queue.add(element);
                            self.stats.demoted += 1;
                        }
                        Err(err) => debug!("demotion skipped: {err}"),
                    }
                }
                Err(err) => self.reject_request(&element, &err),
            }
        }

        self.dispatch();
    }

    /// Free all resources allocated to a request and close it
    pub fn free(&mut self, request: &dyn RequestHandle, requester: RequesterId) {
        self.pool.release_request(request);
        if let Err(err) = request.close() {
            debug!("close refused for {}: {}", request.uuid(), err);
        }
        info!("Request canceled: {}", request.uuid());

        let uuid = request.uuid();
        if self.ready_queue.contains(&uuid) {
            self.ready_queue.remove(&uuid);
        } else if self.blocked_queue.contains(&uuid) {
            self.blocked_queue.remove(&uuid);
        }

        self.notification_set.insert(requester);
        self.stats.canceled += 1;
        self.stats.last_updated = timestamp_now();
    }

    /// Publish the current pool snapshot unconditionally, clearing the latch
    pub fn publish_pool(&mut self) {
        self.observer.pool_changed(&self.pool.known_resources());
        self.pool.clear_changed();
    }

    fn queue(&mut self, request: Arc<dyn RequestHandle>, requester: RequesterId) {
        if let Err(err) = request.wait(Reason::Busy) {
            // requester already advanced the request; drop silently
            debug!("queue refused for {}: {}", request.uuid(), err);
            return;
        }
        info!("Request queued: {}", request.uuid());
        self.ready_queue.add(QueueElement::new(request, requester));
        self.notification_set.insert(requester);
        self.stats.queued += 1;
    }

    fn reject_request(&mut self, element: &QueueElement, error: &SchedulerError) {
        warn!("Request rejected: {}: {}", element.uuid(), error);
        if let Err(err) = element.request().cancel(Reason::Invalid) {
            debug!("cancel refused for {}: {}", element.uuid(), err);
        }
        self.notification_set.insert(element.requester());
        self.stats.rejected += 1;
    }

    /// Would the request be satisfiable if every held robot were returned?
    fn feasible_eventually(&self, request: &dyn RequestHandle) -> Result<bool, SchedulerError> {
        let matches = self.pool.match_list(
            &request.resources(),
            &[ResourceStatus::Available, ResourceStatus::Allocated],
        )?;
        Ok(!matches.is_empty())
    }

    fn promote_blocked(&mut self) {
        if self.blocked_queue.is_empty() {
            return;
        }
        let parked: Vec<QueueElement> = self.blocked_queue.iter().cloned().collect();
        for element in parked {
            match self.feasible_eventually(element.request().as_ref()) {
                Ok(true) => {
                    if element.request().wait(Reason::Busy).is_err() {
                        continue;
                    }
                    info!("Request unblocked: {}", element.uuid());
                    self.blocked_queue.remove(&element.uuid());
                    self.notification_set.insert(element.requester());
                    self.ready_queue.add(element);
                    self.stats.promoted += 1;
                }
                Ok(false) => {}
                Err(err) => {
                    self.blocked_queue.remove(&element.uuid());
                    self.reject_request(&element, &err);
                }
            }
        }
    }

    /// Notify every requester accumulated in the notification set.
    ///
    /// A requester the transport no longer knows is shut down, freeing
    /// whatever it still has queued. The set is drained up front because the
    /// shutdown path inserts into it again; everything re-added belongs to
    /// requesters already handled this round.
    fn notify_requesters(&mut self) {
        let pending: Vec<RequesterId> = self.notification_set.drain().collect();
        for requester in pending {
            if let Err(err) = self.notifier.notify(requester) {
                warn!("Requester unreachable: {}: {}", requester, err);
                self.shutdown_requester(requester);
            }
        }
        self.notification_set.clear();
    }

    /// Recover everything a vanished requester still has in the queues
    fn shutdown_requester(&mut self, requester: RequesterId) {
        info!("Shutting down requester: {}", requester);
        let mut doomed: Vec<QueueElement> = self
            .ready_queue
            .iter()
            .filter(|element| element.requester() == requester)
            .cloned()
            .collect();
        doomed.extend(
            self.blocked_queue
                .iter()
                .filter(|element| element.requester() == requester)
                .cloned(),
        );
        for element in doomed {
            self.free(element.request().as_ref(), requester);
        }
    }

    fn publish_if_changed(&mut self) {
        if self.pool.changed() {
            self.publish_pool();
        }
    }
}
