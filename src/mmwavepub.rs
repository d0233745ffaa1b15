// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

mod args;

use args::Args;
use clap::Parser;
use mmwavepub::{
    command::dispatch,
    session::RadarSession,
    settings::{FileStore, SettingsStore},
    uart::MAX_TARGETS,
};
use serde_json::json;
use std::{io, time::Duration};
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncReadExt, BufReader},
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt as _, Layer as _, Registry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(args.rust_log);

    let journald = match tracing_journald::layer() {
        Ok(journald) => Some(journald.with_filter(args.rust_log)),
        Err(_) => None,
    };

    let subscriber = Registry::default().with(stdout_log).with(journald);
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
    tracing_log::LogTracer::init()?;

    let mut device = match &args.device {
        Some(path) => match File::open(path).await {
            Ok(file) => {
                info!("reading radar reports from {}", path);
                Some(file)
            }
            Err(err) => {
                warn!("unable to open {}: {}, decoding disabled", path, err);
                None
            }
        },
        None => {
            warn!("no serial device configured, decoding disabled");
            None
        }
    };

    let store = FileStore::new(&args.settings);
    let mut session = RadarSession::new(store, device.is_some());
    info!("configuration: {:?}", session.config());

    let mut interval = tokio::time::interval(Duration::from_secs(args.status_interval.max(1)));
    let mut commands = BufReader::new(tokio::io::stdin()).lines();
    let mut commands_open = true;
    let mut buf = [0u8; 256];

    // One cooperative task: decode, command handling, and status emission
    // take turns, so readers always observe the state between polls.
    loop {
        tokio::select! {
            read = read_device(&mut device, &mut buf) => match read {
                Ok(0) => {
                    warn!("end of stream on radar device");
                    device = None;
                }
                Ok(n) => session.poll(&buf[..n]),
                Err(err) => {
                    error!("device read error: {}", err);
                    device = None;
                }
            },
            line = commands.next_line(), if commands_open => match line {
                Ok(Some(line)) => {
                    let reply = dispatch(&mut session, &line);
                    if !reply.is_empty() {
                        println!("{}", reply);
                    }
                }
                Ok(None) => commands_open = false,
                Err(err) => {
                    error!("command input error: {}", err);
                    commands_open = false;
                }
            },
            _ = interval.tick() => info!("{}", format_status(&session)),
        }
    }
}

async fn read_device(device: &mut Option<File>, buf: &mut [u8]) -> io::Result<usize> {
    match device {
        Some(file) => file.read(buf).await,
        None => std::future::pending().await,
    }
}

fn format_status<S: SettingsStore>(session: &RadarSession<S>) -> String {
    let targets: Vec<_> = (0..MAX_TARGETS)
        .map(|slot| match session.target(slot) {
            Some(target) => json!({
                "x": target.x,
                "y": target.y,
                "speed": target.speed,
                "distance": target.distance,
                "in_zone": target.in_zone,
            }),
            None => json!(null),
        })
        .collect();

    let config = session.config();
    json!({
        "enabled": session.enabled(),
        "presence": session.presence(None),
        "active_targets": session.active_targets(),
        "targets": targets,
        "zone": {
            "x1": config.x1,
            "x2": config.x2,
            "y1": config.y1,
            "y2": config.y2,
        },
        "timeout": config.timeout,
    })
    .to_string()
}
