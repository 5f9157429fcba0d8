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

//! Interfaces between the scheduler core and its transports

use crate::error::CoreResult;
use crate::types::{PoolSnapshot, Reason, RequestId, RequestStatus, RequesterId, ResourceSpec};
use std::fmt::Debug;

/// A resource request as seen by the scheduler.
///
/// The scheduler consumes requests polymorphically through this capability
/// set; the transport supplies the production implementation and tests use
/// doubles. The four transition operations fail with
/// [`CoreError::InvalidTransition`](crate::error::CoreError) when the
/// requester has concurrently advanced the request past the expected state.
pub trait RequestHandle: Send + Sync + Debug {
    /// Unique request identifier
    fn uuid(&self) -> RequestId;

    /// Requested priority; larger means more urgent
    fn priority(&self) -> i32;

    /// Ordered pattern list, one entry per wanted robot
    fn resources(&self) -> Vec<ResourceSpec>;

    /// Current lifecycle status
    fn status(&self) -> RequestStatus;

    /// Concrete resources recorded by the last successful grant
    fn allocations(&self) -> Vec<ResourceSpec>;

    /// Put the request into the waiting state
    fn wait(&self, reason: Reason) -> CoreResult<()>;

    /// Grant the request, recording its allocation
    fn grant(&self, resources: Vec<ResourceSpec>) -> CoreResult<()>;

    /// Begin cancellation
    fn cancel(&self, reason: Reason) -> CoreResult<()>;

    /// Close the request; idempotent once closed
    fn close(&self) -> CoreResult<()>;
}

/// Outbound notification channel to requesters.
///
/// Invoked under the scheduler lock; implementations must enqueue rather
/// than send synchronously. An
/// [`UnknownRequester`](crate::error::CoreError::UnknownRequester) error
/// tells the scheduler the requester is gone and its resources should be
/// recovered.
pub trait RequesterNotifier: Send + Sync {
    /// Notify one requester that some of its requests changed state
    fn notify(&self, requester: RequesterId) -> CoreResult<()>;
}

/// Sink for latched resource-pool publications
pub trait PoolObserver: Send + Sync {
    /// Called with a fresh snapshot whenever pool membership or status changed
    fn pool_changed(&self, snapshot: &PoolSnapshot);
}
