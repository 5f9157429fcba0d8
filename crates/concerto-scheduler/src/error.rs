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

//! Error types for the scheduler crate

use concerto_core::{CoreError, ResourceStatus};
use thiserror::Error;

/// Errors raised by the pool, the queue, and the scheduler
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// A structurally invalid request, e.g. a malformed URI pattern.
    /// Requests failing this way are cancelled rather than retried.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Resource {uri} cannot be allocated while {status}")]
    InvalidAllocation { uri: String, status: ResourceStatus },

    #[error("Queue is empty")]
    Empty,

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl SchedulerError {
    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error rejects the request itself rather than the attempt
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Self::InvalidRequest { .. })
    }
}

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_error() {
        let error = SchedulerError::invalid_request("bad pattern");
        assert!(error.is_invalid_request());
        assert_eq!(error.to_string(), "Invalid request: bad pattern");
    }

    #[test]
    fn test_invalid_allocation_error() {
        let error = SchedulerError::InvalidAllocation {
            uri: "concerto:/turtlebot/marvin".to_string(),
            status: ResourceStatus::Missing,
        };
        assert!(!error.is_invalid_request());
        assert!(error.to_string().contains("missing"));
    }

    #[test]
    fn test_core_error_conversion() {
        let core = CoreError::validation("nope");
        let error: SchedulerError = core.into();
        assert!(matches!(error, SchedulerError::Core(_)));
    }
}
