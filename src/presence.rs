// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::io;

/// Debounced presence state derived from zone-active target counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresenceStatus {
    /// True when a serial resource was available at startup; fixed for the
    /// session lifetime.
    pub enabled: bool,
    /// Number of zone-active targets in the latest frame
    pub active_targets: usize,
    /// Wall-clock seconds of the last frame with an active target, 0 = never
    pub last_active: u64,
}

impl PresenceStatus {
    /// Create the status for a session, enabled or not.
    pub fn new(enabled: bool) -> PresenceStatus {
        PresenceStatus {
            enabled,
            ..Default::default()
        }
    }

    /// Record the active-target count of a decoded frame.  The last-active
    /// timestamp only moves forward, on frames with at least one active
    /// target; it is never cleared.
    pub fn record(&mut self, active: usize, now: u64) {
        self.active_targets = active;
        if active > 0 {
            self.last_active = now;
        }
    }

    /// Presence at `now` for a timeout in seconds.  Sticky: true for the
    /// whole timeout window after the last active frame, even across frames
    /// with no active targets.  A sensor that has never seen an active
    /// target reports absent.
    pub fn detected(&self, timeout: u32, now: u64) -> bool {
        self.last_active != 0 && self.last_active + timeout as u64 > now
    }
}

/// Wall-clock seconds since the UNIX epoch.
pub fn timestamp() -> Result<u64, io::Error> {
    let mut tp = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    let err = unsafe { libc::clock_gettime(libc::CLOCK_REALTIME, &mut tp) };
    if err != 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(tp.tv_sec as u64)
}
