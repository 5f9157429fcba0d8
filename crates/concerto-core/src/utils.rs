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

//! Utility functions for the Concerto scheduling ecosystem

use chrono::{DateTime, Utc};

/// Get the current timestamp
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now()
}

/// Anchor a URI pattern so it must match the whole string.
///
/// The non-capturing group keeps alternations like `a|b` from escaping the
/// anchors.
pub fn anchor_pattern(pattern: &str) -> String {
    format!("^(?:{pattern})$")
}
