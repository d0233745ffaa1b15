// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use clap::Parser;
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Serial device carrying the radar report stream.  The device must
    /// already be configured for the sensor baud rate.  When absent,
    /// decoding is disabled and status reports disabled.
    #[arg(long, env)]
    pub device: Option<String>,

    /// Path of the persisted settings slot
    #[arg(long, env, default_value = "mmwave.settings")]
    pub settings: String,

    /// Seconds between JSON status lines
    #[arg(long, env, default_value = "1")]
    pub status_interval: u64,

    /// Application log level
    #[arg(long, env, default_value = "info")]
    pub rust_log: LevelFilter,
}
