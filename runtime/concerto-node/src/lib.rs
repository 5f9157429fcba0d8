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

//! # Concerto Node
//!
//! The scheduler node shell: an in-process transport for requester
//! notifications and pool publications, plus the binary entry point that
//! wires it to a [`SchedulerNode`](concerto_scheduler::SchedulerNode).

pub mod transport;

pub use transport::{ChannelTransport, LoggingPoolObserver, Notification};
