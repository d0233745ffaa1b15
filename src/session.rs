// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    presence::{timestamp, PresenceStatus},
    settings::{Error, SettingsStore},
    uart::{read_targets, FrameReader, Target, FRAME_LEN, MAX_TARGETS},
    zone::{classify, ZoneConfig, X_MAX, X_MIN},
};
use log::{debug, warn};

/// One logical session per physical sensor.
///
/// Owns every piece of mutable decode state: the frame reader, the target
/// slots, the zone configuration, and the presence status.  State is mutated
/// only inside [RadarSession::poll] and the configuration setters; between
/// those calls the target slots and status form a consistent snapshot for
/// readers.  Single execution context, no locks.
pub struct RadarSession<S> {
    reader: FrameReader,
    targets: [Target; MAX_TARGETS],
    config: ZoneConfig,
    status: PresenceStatus,
    store: S,
}

impl<S: SettingsStore> RadarSession<S> {
    /// Create a session backed by `store`.  `enabled` reflects whether a
    /// serial resource is available and is fixed for the session lifetime.
    /// A failing load falls back to the default configuration.
    pub fn new(store: S, enabled: bool) -> RadarSession<S> {
        let config = match store.load() {
            Ok(slot) => ZoneConfig::from_slot(&slot),
            Err(err) => {
                warn!("settings load failed, using defaults: {}", err);
                ZoneConfig::default()
            }
        };

        RadarSession {
            reader: FrameReader::new(),
            targets: [Target::default(); MAX_TARGETS],
            config,
            status: PresenceStatus::new(enabled),
            store,
        }
    }

    /// Drain a batch of available input bytes.  Every complete frame updates
    /// the target slots, zone flags, and presence status as one group;
    /// partial or malformed input leaves the previous snapshot untouched.
    pub fn poll(&mut self, bytes: &[u8]) {
        let now = timestamp().unwrap_or(0);

        for &byte in bytes {
            if let Some(frame) = self.reader.push(byte) {
                self.apply_frame(&frame, now);
            }
        }
    }

    fn apply_frame(&mut self, frame: &[u8; FRAME_LEN], now: u64) {
        let mut targets = read_targets(frame);
        let active = classify(&mut targets, &self.config);

        self.targets = targets;
        self.status.record(active, now);
        debug!("frame: {} active of {} slots", active, MAX_TARGETS);
    }

    /// True when a serial resource was available at startup.
    pub fn enabled(&self) -> bool {
        self.status.enabled
    }

    /// Number of zone-active targets in the latest frame.
    pub fn active_targets(&self) -> usize {
        self.status.active_targets
    }

    /// Target slot accessor.  Returns None for an out-of-range index or a
    /// slot that currently reports no target.
    pub fn target(&self, slot: usize) -> Option<&Target> {
        self.targets.get(slot).filter(|target| !target.is_empty())
    }

    /// Debounced presence.  A `timeout` of None or Some(0) uses the
    /// configured timeout.
    pub fn presence(&self, timeout: Option<u32>) -> bool {
        self.presence_at(timeout, timestamp().unwrap_or(0))
    }

    fn presence_at(&self, timeout: Option<u32>, now: u64) -> bool {
        let timeout = match timeout {
            Some(timeout) if timeout > 0 => timeout,
            _ => self.config.timeout,
        };
        self.status.detected(timeout, now)
    }

    /// Current validated configuration.
    pub fn config(&self) -> &ZoneConfig {
        &self.config
    }

    /// Set the presence timeout in seconds.
    pub fn set_timeout(&mut self, seconds: u32) -> Result<(), Error> {
        let mut config = self.config;
        config.timeout = seconds;
        self.commit(config)
    }

    /// Set the forward detection range.  The x bounds widen to the full
    /// sensor coverage as a side effect.
    pub fn set_distance(&mut self, y1: i32, y2: i32) -> Result<(), Error> {
        let mut config = self.config;
        config.x1 = X_MIN;
        config.x2 = X_MAX;
        config.y1 = y1;
        config.y2 = y2;
        self.commit(config)
    }

    /// Set the full zone rectangle.
    pub fn set_zone(&mut self, x1: i32, x2: i32, y1: i32, y2: i32) -> Result<(), Error> {
        let mut config = self.config;
        config.x1 = x1;
        config.x2 = x2;
        config.y1 = y1;
        config.y2 = y2;
        self.commit(config)
    }

    /// Restore the default zone covering the whole sensor coverage.  The
    /// timeout is kept.
    pub fn reset_zone(&mut self) -> Result<(), Error> {
        let mut config = ZoneConfig::default();
        config.timeout = self.config.timeout;
        self.commit(config)
    }

    /// Persist `config` and reload it through the store; only the reloaded,
    /// revalidated configuration becomes effective.
    fn commit(&mut self, config: ZoneConfig) -> Result<(), Error> {
        self.store.save(&config.to_slot())?;
        self.config = ZoneConfig::from_slot(&self.store.load()?);
        Ok(())
    }
}
