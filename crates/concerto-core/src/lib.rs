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

//! # Concerto Core Library
//!
//! Core types, traits, and utilities for the Concerto scheduling ecosystem.
//! This library provides the foundational building blocks shared by the
//! scheduler crate and its transports.
//!
//! ## Features
//!
//! - **Shared Types**: Request/requester identifiers, status enums, resource
//!   descriptors, roster entries, and pool snapshots
//! - **Error Types**: Core error definitions and conversions
//! - **Traits**: The request-handle capability set and the outbound
//!   notification/publication seams
//! - **Constants**: Shared defaults
//!
//! ## Quick Start
//!
//! ```rust
//! use concerto_core::{RequestId, RequesterId, ResourceSpec, ResourceStatus};
//!
//! let request_id = RequestId::generate();
//! let requester_id = RequesterId::generate();
//!
//! // A request item: any turtlebot advertising the teleop capability
//! let spec = ResourceSpec::new("concerto:/turtlebot/.*", "teleop");
//! assert_eq!(ResourceStatus::Available.to_string(), "available");
//! ```

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export main types for easy access
pub use constants::*;
pub use error::{CoreError, CoreResult};
pub use traits::{PoolObserver, RequestHandle, RequesterNotifier};
pub use types::{
    ClientInfo, PoolSnapshot, Reason, RequestId, RequestStatus, RequesterId, ResourceRecord,
    ResourceSpec, ResourceStatus,
};
pub use utils::{anchor_pattern, timestamp_now};
