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

//! Production request handle with the requester-visible state machine

use concerto_core::{
    CoreError, CoreResult, Reason, RequestHandle, RequestId, RequestStatus, ResourceSpec,
};
use parking_lot::RwLock;

/// The transport-side request object shared between a requester and the
/// scheduler.
///
/// State machine:
///
/// ```text
///  New ──wait──► Waiting ──grant──► Granted
///                   │                  │
///                   └───cancel────► Canceling ──close──► Closed
/// ```
///
/// `cancel` is also accepted from `New` and `Granted`; `close` from any
/// non-terminal state. Both are idempotent once reached. Every other
/// combination fails with `InvalidTransition`, which the scheduler absorbs.
#[derive(Debug)]
pub struct ActiveRequest {
    id: RequestId,
    inner: RwLock<RequestState>,
}

#[derive(Debug)]
struct RequestState {
    priority: i32,
    resources: Vec<ResourceSpec>,
    status: RequestStatus,
    reason: Reason,
    allocations: Vec<ResourceSpec>,
}

impl ActiveRequest {
    /// Create a new request in the `New` state
    pub fn new(id: RequestId, priority: i32, resources: Vec<ResourceSpec>) -> Self {
        Self {
            id,
            inner: RwLock::new(RequestState {
                priority,
                resources,
                status: RequestStatus::New,
                reason: Reason::None,
                allocations: Vec::new(),
            }),
        }
    }

    /// Reason recorded by the last wait or cancel transition
    pub fn reason(&self) -> Reason {
        self.inner.read().reason
    }

    /// Requester-side priority update; takes effect when the transport
    /// re-adds the request to the scheduler's queue
    pub fn set_priority(&self, priority: i32) {
        self.inner.write().priority = priority;
    }
}

impl RequestHandle for ActiveRequest {
    fn uuid(&self) -> RequestId {
        self.id
    }

    fn priority(&self) -> i32 {
        self.inner.read().priority
    }

    fn resources(&self) -> Vec<ResourceSpec> {
        self.inner.read().resources.clone()
    }

    fn status(&self) -> RequestStatus {
        self.inner.read().status
    }

    fn allocations(&self) -> Vec<ResourceSpec> {
        self.inner.read().allocations.clone()
    }

    fn wait(&self, reason: Reason) -> CoreResult<()> {
        let mut state = self.inner.write();
        match state.status {
            RequestStatus::New | RequestStatus::Waiting => {
                state.status = RequestStatus::Waiting;
                state.reason = reason;
                Ok(())
            }
            status => Err(CoreError::invalid_transition("wait", status)),
        }
    }

    fn grant(&self, resources: Vec<ResourceSpec>) -> CoreResult<()> {
        let mut state = self.inner.write();
        match state.status {
            RequestStatus::Waiting => {
                state.status = RequestStatus::Granted;
                state.reason = Reason::None;
                state.allocations = resources;
                Ok(())
            }
            status => Err(CoreError::invalid_transition("grant", status)),
        }
    }

    fn cancel(&self, reason: Reason) -> CoreResult<()> {
        let mut state = self.inner.write();
        match state.status {
            RequestStatus::New | RequestStatus::Waiting | RequestStatus::Granted => {
                state.status = RequestStatus::Canceling;
                state.reason = reason;
                Ok(())
            }
            RequestStatus::Canceling => Ok(()),
            status => Err(CoreError::invalid_transition("cancel", status)),
        }
    }

    fn close(&self) -> CoreResult<()> {
        let mut state = self.inner.write();
        state.status = RequestStatus::Closed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teleop_request() -> ActiveRequest {
        ActiveRequest::new(
            RequestId::generate(),
            0,
            vec![ResourceSpec::new("concerto:/turtlebot/roberto", "teleop")],
        )
    }

    #[test]
    fn test_queue_then_grant() {
        let rq = teleop_request();
        assert_eq!(rq.status(), RequestStatus::New);

        rq.wait(Reason::Busy).unwrap();
        assert_eq!(rq.status(), RequestStatus::Waiting);
        assert_eq!(rq.reason(), Reason::Busy);

        let granted = vec![ResourceSpec::new("concerto:/turtlebot/roberto", "teleop")];
        rq.grant(granted.clone()).unwrap();
        assert_eq!(rq.status(), RequestStatus::Granted);
        assert_eq!(rq.allocations(), granted);
    }

    #[test]
    fn test_grant_requires_waiting() {
        let rq = teleop_request();
        let err = rq.grant(Vec::new()).unwrap_err();
        assert!(err.is_invalid_transition());
        assert_eq!(rq.status(), RequestStatus::New);
        assert!(rq.allocations().is_empty());
    }

    #[test]
    fn test_wait_after_grant_rejected() {
        let rq = teleop_request();
        rq.wait(Reason::Busy).unwrap();
        rq.grant(Vec::new()).unwrap();
        assert!(rq.wait(Reason::Unavailable).is_err());
    }

    #[test]
    fn test_rewait_updates_reason() {
        let rq = teleop_request();
        rq.wait(Reason::Busy).unwrap();
        rq.wait(Reason::Unavailable).unwrap();
        assert_eq!(rq.status(), RequestStatus::Waiting);
        assert_eq!(rq.reason(), Reason::Unavailable);
    }

    #[test]
    fn test_cancel_from_any_active_state() {
        let from_new = teleop_request();
        from_new.cancel(Reason::Unavailable).unwrap();
        assert_eq!(from_new.status(), RequestStatus::Canceling);

        let from_waiting = teleop_request();
        from_waiting.wait(Reason::Busy).unwrap();
        from_waiting.cancel(Reason::Unavailable).unwrap();
        assert_eq!(from_waiting.status(), RequestStatus::Canceling);

        let from_granted = teleop_request();
        from_granted.wait(Reason::Busy).unwrap();
        from_granted.grant(Vec::new()).unwrap();
        from_granted.cancel(Reason::Unavailable).unwrap();
        assert_eq!(from_granted.status(), RequestStatus::Canceling);
    }

    #[test]
    fn test_cancel_idempotent_while_canceling() {
        let rq = teleop_request();
        rq.cancel(Reason::Invalid).unwrap();
        rq.cancel(Reason::Unavailable).unwrap();
        assert_eq!(rq.status(), RequestStatus::Canceling);
        assert_eq!(rq.reason(), Reason::Invalid);
    }

    #[test]
    fn test_cancel_after_close_rejected() {
        let rq = teleop_request();
        rq.close().unwrap();
        assert!(rq.cancel(Reason::Unavailable).is_err());
    }

    #[test]
    fn test_close_is_idempotent() {
        let rq = teleop_request();
        rq.wait(Reason::Busy).unwrap();
        rq.close().unwrap();
        rq.close().unwrap();
        assert_eq!(rq.status(), RequestStatus::Closed);
    }

    #[test]
    fn test_set_priority() {
        let rq = teleop_request();
        assert_eq!(rq.priority(), 0);
        rq.set_priority(10);
        assert_eq!(rq.priority(), 10);
    }
}
