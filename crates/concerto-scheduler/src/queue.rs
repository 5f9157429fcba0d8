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

//! Indexed priority-FIFO queue of pending resource requests

use crate::error::{SchedulerError, SchedulerResult};
use concerto_core::{RequestHandle, RequestId, RequesterId};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

/// Global arrival counter; ties within a priority class pop in FIFO order
static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

fn next_sequence() -> u64 {
    NEXT_SEQUENCE.fetch_add(1, AtomicOrdering::Relaxed)
}

/// One queued request together with its requester and its sort key.
///
/// Priority and sequence are latched at construction so an element keeps its
/// queue position when it is popped and pushed back. Equality and hashing
/// derive solely from the request's uuid.
#[derive(Debug, Clone)]
pub struct QueueElement {
    request: Arc<dyn RequestHandle>,
    requester: RequesterId,
    priority: i32,
    sequence: u64,
}

impl QueueElement {
    /// Wrap a request for queueing, latching its current priority
    pub fn new(request: Arc<dyn RequestHandle>, requester: RequesterId) -> Self {
        let priority = request.priority();
        Self {
            request,
            requester,
            priority,
            sequence: next_sequence(),
        }
    }

    fn with_priority(request: Arc<dyn RequestHandle>, requester: RequesterId, priority: i32) -> Self {
        Self {
            request,
            requester,
            priority,
            sequence: next_sequence(),
        }
    }

    /// The wrapped request
    pub fn request(&self) -> &Arc<dyn RequestHandle> {
        &self.request
    }

    /// The submitting requester
    pub fn requester(&self) -> RequesterId {
        self.requester
    }

    /// Priority latched when the element was built
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Arrival sequence number
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// The request's uuid, the element's identity
    pub fn uuid(&self) -> RequestId {
        self.request.uuid()
    }

    // Negated so that the minimum key is the most urgent element; widened to
    // i64 because -i32::MIN does not fit in i32.
    fn sort_key(&self) -> (i64, u64) {
        (-(self.priority as i64), self.sequence)
    }
}

impl PartialEq for QueueElement {
    fn eq(&self, other: &Self) -> bool {
        self.uuid() == other.uuid()
    }
}

impl Eq for QueueElement {}

impl Hash for QueueElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uuid().hash(state);
    }
}

impl PartialOrd for QueueElement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueElement {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// Priority-FIFO queue with an identity index and lazy removal.
///
/// Removal and priority updates tombstone the victim's sequence number
/// instead of rebuilding the heap; stale entries are discarded when they
/// surface. The live count is tracked explicitly because the heap's physical
/// length is not authoritative.
#[derive(Debug, Default)]
pub struct PriorityQueue {
    heap: BinaryHeap<Reverse<QueueElement>>,
    live: HashMap<RequestId, QueueSlot>,
    tombstones: HashSet<u64>,
}

#[derive(Debug, Clone, Copy)]
struct QueueSlot {
    sequence: u64,
    priority: i32,
}

impl PriorityQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an element unless one with the same uuid is already queued
    pub fn add(&mut self, element: QueueElement) {
        if self.live.contains_key(&element.uuid()) {
            return;
        }
        self.live.insert(
            element.uuid(),
            QueueSlot {
                sequence: element.sequence,
                priority: element.priority,
            },
        );
        self.heap.push(Reverse(element));
    }

    /// Insert an element, re-queueing it when `priority` differs from the
    /// queued copy's.
    ///
    /// The re-queued element gets a fresh sequence number, placing it at the
    /// tail of its new priority class. If the uuid is absent the element is
    /// inserted unchanged; if it is present with the same priority the call
    /// is a no-op.
    pub fn add_with_priority(&mut self, element: QueueElement, priority: i32) {
        let queued = self.live.get(&element.uuid()).map(|slot| slot.priority);
        match queued {
            None => self.add(element),
            Some(p) if p == priority => {}
            Some(_) => {
                self.remove(&element.uuid());
                let fresh =
                    QueueElement::with_priority(element.request, element.requester, priority);
                self.add(fresh);
            }
        }
    }

    /// Peek the most urgent live element
    pub fn peek(&mut self) -> SchedulerResult<&QueueElement> {
        self.discard_stale();
        match self.heap.peek() {
            Some(Reverse(element)) => Ok(element),
            None => Err(SchedulerError::Empty),
        }
    }

    /// Pop the most urgent live element
    pub fn pop(&mut self) -> SchedulerResult<QueueElement> {
        self.discard_stale();
        match self.heap.pop() {
            Some(Reverse(element)) => {
                self.live.remove(&element.uuid());
                Ok(element)
            }
            None => Err(SchedulerError::Empty),
        }
    }

    /// Tombstone the element with this uuid; no-op if absent
    pub fn remove(&mut self, uuid: &RequestId) {
        if let Some(slot) = self.live.remove(uuid) {
            self.tombstones.insert(slot.sequence);
        }
    }

    /// Whether a live element with this uuid is queued
    pub fn contains(&self, uuid: &RequestId) -> bool {
        self.live.contains_key(uuid)
    }

    /// Number of live elements
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no live elements are queued
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Iterate the live elements in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = &QueueElement> {
        self.heap
            .iter()
            .map(|Reverse(element)| element)
            .filter(|element| !self.tombstones.contains(&element.sequence))
    }

    fn discard_stale(&mut self) {
        while let Some(Reverse(top)) = self.heap.peek() {
            if self.tombstones.remove(&top.sequence) {
                self.heap.pop();
            } else {
                break;
            }
        }
    }
}

impl FromIterator<QueueElement> for PriorityQueue {
    fn from_iter<I: IntoIterator<Item = QueueElement>>(iter: I) -> Self {
        let mut queue = Self::new();
        for element in iter {
            queue.add(element);
        }
        queue
    }
}
