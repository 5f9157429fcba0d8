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

//! Core types for the Concerto scheduling ecosystem

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Resource request identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct RequestId(Uuid);

/// Requester identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct RequesterId(Uuid);

impl RequestId {
    /// Create a request ID from an existing UUID
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random request ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl RequesterId {
    /// Create a requester ID from an existing UUID
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random requester ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a robot in the resource pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Known but currently unreachable; a held allocation survives
    Missing,

    /// Present and free to be allocated
    Available,

    /// Held by a granted request
    Allocated,

    /// Permanently lost; swept at the next roster reconciliation
    Gone,
}

/// Lifecycle status of a resource request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Newly arrived, not yet examined by the scheduler
    New,

    /// Queued, waiting for resources
    Waiting,

    /// Resources allocated and handed to the requester
    Granted,

    /// Cancellation requested, resources not yet reclaimed
    Canceling,

    /// Terminal state
    Closed,
}

/// Reason codes attached to wait and cancel transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// No reason recorded
    #[default]
    None,

    /// Resources exist but are currently held elsewhere
    Busy,

    /// No combination of known resources can satisfy the request
    Unavailable,

    /// The request itself is malformed
    Invalid,
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Missing => "missing",
            Self::Available => "available",
            Self::Allocated => "allocated",
            Self::Gone => "gone",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::Waiting => "waiting",
            Self::Granted => "granted",
            Self::Canceling => "canceling",
            Self::Closed => "closed",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Busy => "busy",
            Self::Unavailable => "unavailable",
            Self::Invalid => "invalid",
        };
        write!(f, "{s}")
    }
}

/// One requested item, and equally one resolved allocation entry.
///
/// In a request the `uri` may be a regular expression matching several
/// robots; in an allocation it is the concrete URI of the robot chosen for
/// that item. An empty `capability` matches any advertised capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// Robot URI, literal or pattern
    pub uri: String,

    /// Required capability, empty for any
    pub capability: String,
}

impl ResourceSpec {
    /// Create a spec with an explicit capability
    pub fn new(uri: impl Into<String>, capability: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            capability: capability.into(),
        }
    }

    /// Create a spec matching any capability
    pub fn any_capability(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            capability: String::new(),
        }
    }
}

impl fmt::Display for ResourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.capability.is_empty() {
            write!(f, "{}", self.uri)
        } else {
            write!(f, "{}#{}", self.uri, self.capability)
        }
    }
}

/// One entry of the conductor's client roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Stable robot URI
    pub uri: String,

    /// Capability the robot currently advertises
    pub capability: String,

    /// Whether the conductor considers the robot reachable
    pub online: bool,
}

impl ClientInfo {
    /// Create a roster entry for an online client
    pub fn online(uri: impl Into<String>, capability: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            capability: capability.into(),
            online: true,
        }
    }

    /// Create a roster entry for an offline client
    pub fn offline(uri: impl Into<String>, capability: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            capability: capability.into(),
            online: false,
        }
    }
}

/// Publication record for one pooled resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Robot URI
    pub uri: String,

    /// Advertised capability
    pub capability: String,

    /// Current pool status
    pub status: ResourceStatus,

    /// Holding request, if allocated (or missing while held)
    pub owner: Option<RequestId>,
}

/// Latched publication of the entire resource pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Per-resource records, sorted by URI
    pub resources: Vec<ResourceRecord>,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,
}

impl PoolSnapshot {
    /// Number of resources in the snapshot
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Look up a record by URI
    pub fn get(&self, uri: &str) -> Option<&ResourceRecord> {
        self.resources.iter().find(|r| r.uri == uri)
    }
}
