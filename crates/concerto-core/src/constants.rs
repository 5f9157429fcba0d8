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

//! Constants and configuration defaults for the Concerto scheduling ecosystem

use std::time::Duration;

/// Default interval between periodic rescheduling passes
pub const DEFAULT_RESCHEDULE_INTERVAL: Duration = Duration::from_secs(1);

/// Default topic name for latched resource-pool publications
pub const DEFAULT_POOL_TOPIC: &str = "resource_pool";

/// Default topic name for the inbound request stream
pub const DEFAULT_REQUESTS_TOPIC: &str = "resource_requests";

/// Largest request (pattern count) for which the allocator retries
/// non-identity permutations before giving up
pub const MAX_PERMUTATION_ITEMS: usize = 3;
