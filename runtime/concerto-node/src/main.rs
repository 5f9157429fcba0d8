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

//! Concerto scheduler node entry point

use clap::Parser;
use concerto_node::{ChannelTransport, LoggingPoolObserver};
use concerto_scheduler::{SchedulerConfig, SchedulerNode};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Concerto resource scheduler node", long_about = None)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Interval between rescheduling passes, in seconds
    #[arg(long)]
    reschedule_interval_secs: Option<u64>,

    /// Topic name for resource-pool publications
    #[arg(long)]
    pool_topic: Option<String>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<SchedulerConfig> {
        let mut config = match &self.config {
            Some(path) => SchedulerConfig::from_yaml_file(path)?,
            None => SchedulerConfig::default(),
        };
        if let Some(secs) = self.reschedule_interval_secs {
            config.reschedule_interval = Duration::from_secs(secs);
        }
        if let Some(topic) = self.pool_topic {
            config.pool_topic = topic;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    concerto_scheduler::init()?;

    let config = Cli::parse().into_config()?;
    let transport = Arc::new(ChannelTransport::new());
    let observer = Arc::new(LoggingPoolObserver::new(config.pool_topic.clone()));

    let mut node = SchedulerNode::new(config, transport, observer)?;
    node.start()?;
    info!("Scheduler node running; press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    node.stop();

    Ok(())
}
