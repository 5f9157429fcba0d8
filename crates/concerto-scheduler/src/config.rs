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

//! Scheduler configuration

use crate::error::{SchedulerError, SchedulerResult};
use concerto_core::{DEFAULT_POOL_TOPIC, DEFAULT_REQUESTS_TOPIC, DEFAULT_RESCHEDULE_INTERVAL};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunables for a scheduler node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Interval between periodic rescheduling passes
    pub reschedule_interval: Duration,

    /// Topic name for latched resource-pool publications
    pub pool_topic: String,

    /// Topic name for the inbound request stream
    pub requests_topic: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            reschedule_interval: DEFAULT_RESCHEDULE_INTERVAL,
            pool_topic: DEFAULT_POOL_TOPIC.to_string(),
            requests_topic: DEFAULT_REQUESTS_TOPIC.to_string(),
        }
    }
}

impl SchedulerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> SchedulerResult<()> {
        if self.reschedule_interval.is_zero() {
            return Err(SchedulerError::configuration(
                "reschedule interval must be non-zero",
            ));
        }
        if self.pool_topic.is_empty() {
            return Err(SchedulerError::configuration(
                "pool topic must not be empty",
            ));
        }
        if self.requests_topic.is_empty() {
            return Err(SchedulerError::configuration(
                "requests topic must not be empty",
            ));
        }
        Ok(())
    }

    /// Load and validate a configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> SchedulerResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            SchedulerError::configuration(format!("cannot read {}: {}", path.display(), err))
        })?;
        let config: Self = serde_yaml::from_str(&raw).map_err(|err| {
            SchedulerError::configuration(format!("cannot parse {}: {}", path.display(), err))
        })?;
        config.validate()?;
        Ok(config)
    }
}
