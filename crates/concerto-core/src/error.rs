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

//! Core error types for the Concerto scheduling ecosystem

use crate::types::{RequestStatus, RequesterId};
use thiserror::Error;

/// Main error type for core operations
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid transition: {operation} not allowed while {status}")]
    InvalidTransition {
        operation: &'static str,
        status: RequestStatus,
    },

    #[error("Unknown requester: {requester}")]
    UnknownRequester { requester: RequesterId },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Create an invalid transition error
    pub fn invalid_transition(operation: &'static str, status: RequestStatus) -> Self {
        Self::InvalidTransition { operation, status }
    }

    /// Create an unknown requester error
    pub fn unknown_requester(requester: RequesterId) -> Self {
        Self::UnknownRequester { requester }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether this error reports a rejected request-state transition
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;
