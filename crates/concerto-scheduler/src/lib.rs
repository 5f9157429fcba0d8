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

//! # Concerto Scheduler
//!
//! A priority scheduler that allocates pooled robots to resource requests
//! for multi-robot coordination. Requesters submit ordered lists of
//! (URI-pattern, capability) items; the scheduler matches them against the
//! robots the conductor currently reports, grants whole requests when a
//! feasible assignment exists, and parks the rest.
//!
//! ## Features
//!
//! - **Resource Pool**: roster reconciliation, anchored-regex pattern
//!   matching, and a bounded-cost assignment search
//! - **Priority Queue**: priority-FIFO with identity index, in-place
//!   priority updates, and lazy removal
//! - **Scheduling Core**: head-of-line dispatch, periodic demotion and
//!   promotion of unsatisfiable requests, exactly-once notifications
//! - **Node Shell**: one coarse lock and a tokio tick task
//!
//! ## Quick Start
//!
//! ```rust
//! use concerto_core::{ClientInfo, RequestHandle, RequestId, RequesterId, ResourceSpec};
//! use concerto_scheduler::{ActiveRequest, Scheduler};
//! use std::sync::Arc;
//!
//! # struct Quiet;
//! # impl concerto_core::RequesterNotifier for Quiet {
//! #     fn notify(&self, _: RequesterId) -> concerto_core::CoreResult<()> { Ok(()) }
//! # }
//! # impl concerto_core::PoolObserver for Quiet {
//! #     fn pool_changed(&self, _: &concerto_core::PoolSnapshot) {}
//! # }
//! let mut scheduler = Scheduler::new(Arc::new(Quiet), Arc::new(Quiet));
//! scheduler.track_clients(&[ClientInfo::online("concerto:/turtlebot/roberto", "teleop")]);
//!
//! let request = Arc::new(ActiveRequest::new(
//!     RequestId::generate(),
//!     0,
//!     vec![ResourceSpec::new("concerto:/turtlebot/.*", "teleop")],
//! ));
//! scheduler.handle_requests(
//!     RequesterId::generate(),
//!     &[Arc::clone(&request) as Arc<dyn RequestHandle>],
//! );
//! assert_eq!(request.allocations()[0].uri, "concerto:/turtlebot/roberto");
//! ```

pub mod config;
pub mod error;
pub mod node;
pub mod pool;
pub mod queue;
pub mod request;
pub mod scheduler;

// Re-export main types for easy access
pub use config::SchedulerConfig;
pub use error::{SchedulerError, SchedulerResult};
pub use node::{NodeState, SchedulerNode};
pub use pool::{Resource, ResourcePool};
pub use queue::{PriorityQueue, QueueElement};
pub use request::ActiveRequest;
pub use scheduler::{Scheduler, SchedulerStats};

use std::sync::Once;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

static INIT: Once = Once::new();

/// Initialize logging for scheduler binaries.
///
/// Installs a global `tracing` subscriber the first time it is called;
/// later calls are no-ops.
pub fn init() -> SchedulerResult<()> {
    INIT.call_once(|| {
        FmtSubscriber::builder()
            .with_max_level(Level::INFO)
            .with_target(false)
            .init();

        info!("Concerto scheduler initialized");
    });

    Ok(())
}
