// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use log::trace;

/// Report frame header magic, in transmitted byte order.
pub const FRAME_HEADER: [u8; 4] = [0xAA, 0xFF, 0x03, 0x00];

/// Report frame footer magic.
pub const FRAME_FOOTER: [u8; 2] = [0x55, 0xCC];

/// Complete report frame length: 4-byte header, 3 target records of 8 bytes,
/// 2-byte footer.
pub const FRAME_LEN: usize = 30;

/// Accumulation buffer capacity.  Bytes past this are dropped until the next
/// header resynchronizes the reader.
pub const BUFFER_LEN: usize = 32;

/// Number of target slots in every report frame.
pub const MAX_TARGETS: usize = 3;

/// Size of one target record in bytes.
const RECORD_LEN: usize = 8;

/// Tracked radar target decoded from one report frame slot.
///
/// The slot order is the sensor-assigned track index.  A slot with a
/// distance of 0 reports no target and must not be treated as a detection
/// at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Target {
    /// Lateral position in millimeters, sensor frame
    pub x: i32,
    /// Forward position in millimeters, sensor frame
    pub y: i32,
    /// Radial speed in sensor units, signed
    pub speed: i32,
    /// Distance from the sensor in millimeters, 0 = empty slot
    pub distance: u32,
    /// True when the target lies inside the configured detection zone
    pub in_zone: bool,
}

impl Target {
    /// Returns true when this slot currently reports no target.
    pub fn is_empty(&self) -> bool {
        self.distance == 0
    }
}

/// Byte-fed reader for LD2450 report frames.
///
/// The reader consumes the serial stream one byte at a time, matching the
/// header magic against a sliding window of the last 4 bytes and
/// accumulating into a fixed 32-byte buffer.  A header match resets the
/// buffer to the header bytes no matter what was accumulated before, so the
/// reader resynchronizes on any corruption.  A frame is emitted only when
/// the buffer holds exactly [FRAME_LEN] bytes ending in the footer magic;
/// anything else ages out silently.  No allocation per byte.
pub struct FrameReader {
    window: [u8; 4],
    buffer: [u8; BUFFER_LEN],
    len: usize,
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReader {
    /// Create a reader waiting for the first header.
    pub fn new() -> FrameReader {
        FrameReader {
            window: [0; 4],
            buffer: [0; BUFFER_LEN],
            len: 0,
        }
    }

    /// Feed one byte from the serial stream.  Returns a complete frame when
    /// the footer condition is satisfied, otherwise None.
    pub fn push(&mut self, byte: u8) -> Option<[u8; FRAME_LEN]> {
        self.window.rotate_left(1);
        self.window[3] = byte;

        if self.len < BUFFER_LEN {
            self.buffer[self.len] = byte;
            self.len += 1;
        }

        // A header match takes priority over the footer check and may
        // re-trigger mid-frame; whatever was accumulated is discarded.
        if self.window == FRAME_HEADER {
            self.buffer[..4].copy_from_slice(&FRAME_HEADER);
            self.len = 4;
            return None;
        }

        if self.len == FRAME_LEN && self.window[2..] == FRAME_FOOTER {
            let frame = self.buffer[..FRAME_LEN].try_into().unwrap();
            self.len = 0;
            trace!("frame: {:02X?}", frame);
            return Some(frame);
        }

        None
    }

    /// Current accumulation length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true when nothing is accumulated.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Recover a signed quantity from the sensor's 16-bit field encoding.
///
/// The sensor stores 15 magnitude bits with a sign flag in the top bit.  A
/// plain two's-complement read of the field is negative exactly when the
/// flag denotes a negative quantity, but the magnitude is not the
/// two's-complement magnitude: the true value is -(raw) - 32768.  Computed
/// in i32 so the raw value -32768 decodes to 0 without wrapping.
fn decode_signed(raw: i16) -> i32 {
    let raw = raw as i32;
    if raw < 0 {
        -raw - 32768
    } else {
        raw
    }
}

fn read_target(record: &[u8]) -> Target {
    let x = decode_signed(i16::from_le_bytes([record[0], record[1]]));
    // The sensor reports y with the vertical axis inverted.
    let y = -decode_signed(i16::from_le_bytes([record[2], record[3]]));
    let speed = decode_signed(i16::from_le_bytes([record[4], record[5]]));

    let distance = ((x as i64 * x as i64 + y as i64 * y as i64) as f64)
        .sqrt()
        .round() as u32;

    Target {
        x,
        y,
        speed,
        distance,
        in_zone: false,
    }
}

/// Decode the 3 target records of a complete report frame.
///
/// Records sit at offsets `4 + i*8` with 16-bit little-endian x, y, and
/// speed fields at record offsets 0, 2, and 4.  Bytes 6..8 of each record
/// carry the gate resolution and are not consumed.  The result is a pure
/// function of the frame bytes.
pub fn read_targets(frame: &[u8; FRAME_LEN]) -> [Target; MAX_TARGETS] {
    let mut targets = [Target::default(); MAX_TARGETS];

    for (i, target) in targets.iter_mut().enumerate() {
        let offset = 4 + i * RECORD_LEN;
        *target = read_target(&frame[offset..offset + RECORD_LEN]);
    }

    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sensor-side encoding of a signed field, used to build test vectors.
    fn encode_signed(value: i32) -> [u8; 2] {
        let raw = if value >= 0 {
            value as u16
        } else {
            (-value - 32768) as i16 as u16
        };
        raw.to_le_bytes()
    }

    fn frame_with_record(record: [u8; 8]) -> [u8; FRAME_LEN] {
        let mut frame = [0u8; FRAME_LEN];
        frame[..4].copy_from_slice(&FRAME_HEADER);
        frame[4..12].copy_from_slice(&record);
        frame[28..].copy_from_slice(&FRAME_FOOTER);
        frame
    }

    #[test]
    fn test_decode_signed() {
        assert_eq!(decode_signed(0x0032), 50);
        assert_eq!(decode_signed(0x7FFF), 32767);
        assert_eq!(decode_signed(0), 0);
        // 0x8032 reads as -32718, decoding to -50.
        assert_eq!(decode_signed(0x8032u16 as i16), -50);
        // 0xFFFF reads as -1, decoding to -32767.
        assert_eq!(decode_signed(-1), -32767);
        // The i16 minimum must not wrap.
        assert_eq!(decode_signed(i16::MIN), 0);
    }

    #[test]
    fn test_signed_round_trip() {
        for value in [-32767, -6000, -50, -1, 0, 1, 50, 6000, 32767] {
            let bytes = encode_signed(value);
            let raw = i16::from_le_bytes(bytes);
            assert_eq!(decode_signed(raw), value, "value {}", value);
        }
    }

    #[test]
    fn test_read_targets() {
        // x = 0x0032 (50), y = 0x801E (-30, flipped to 30), speed = 0.
        let frame = frame_with_record([0x32, 0x00, 0x1E, 0x80, 0x00, 0x00, 0x00, 0x00]);
        let targets = read_targets(&frame);

        assert_eq!(
            targets[0],
            Target {
                x: 50,
                y: 30,
                speed: 0,
                distance: 58,
                in_zone: false,
            }
        );

        // The remaining slots decode as empty.
        assert!(targets[1].is_empty());
        assert!(targets[2].is_empty());
    }

    #[test]
    fn test_read_targets_deterministic() {
        let frame = frame_with_record([0x10, 0x01, 0x64, 0x00, 0x0A, 0x80, 0x40, 0x01]);
        assert_eq!(read_targets(&frame), read_targets(&frame));
    }

    #[test]
    fn test_speed_sign_recovery() {
        let mut record = [0u8; 8];
        record[4..6].copy_from_slice(&encode_signed(-120));
        let frame = frame_with_record(record);
        assert_eq!(read_targets(&frame)[0].speed, -120);
    }

    #[test]
    fn test_reader_frame() {
        let frame = frame_with_record([0x32, 0x00, 0x1E, 0x80, 0x00, 0x00, 0x00, 0x00]);
        let mut reader = FrameReader::new();

        for &byte in &frame[..FRAME_LEN - 1] {
            assert_eq!(reader.push(byte), None);
        }
        assert_eq!(reader.push(frame[FRAME_LEN - 1]), Some(frame));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_reader_resync_on_header() {
        let mut reader = FrameReader::new();

        // Noise followed by a partial frame.
        for byte in [0x12, 0x55, 0xCC, 0xAA, 0xFF, 0x03] {
            assert_eq!(reader.push(byte), None);
        }

        // A fresh header discards everything accumulated so far.
        for &byte in &FRAME_HEADER {
            assert_eq!(reader.push(byte), None);
        }
        assert_eq!(reader.len(), 4);

        // The frame completes normally from the resynchronized state.
        let frame = frame_with_record([0x10, 0x00, 0x20, 0x00, 0x00, 0x00, 0x00, 0x00]);
        let mut emitted = None;
        for &byte in &frame[4..] {
            emitted = reader.push(byte);
        }
        assert_eq!(emitted, Some(frame));
    }

    #[test]
    fn test_reader_header_mid_accumulation() {
        let frame = frame_with_record([0x10, 0x00, 0x20, 0x00, 0x00, 0x00, 0x00, 0x00]);
        let mut reader = FrameReader::new();

        // Interrupt a frame at 12 bytes with a new header.
        for &byte in &frame[..12] {
            reader.push(byte);
        }
        for &byte in &FRAME_HEADER {
            assert_eq!(reader.push(byte), None);
        }
        assert_eq!(reader.len(), 4);
    }

    #[test]
    fn test_reader_overflow_discards() {
        let mut reader = FrameReader::new();

        for &byte in &FRAME_HEADER {
            reader.push(byte);
        }
        // Flood well past capacity without a footer; nothing may be emitted
        // and the length must stop at capacity.
        for _ in 0..64 {
            assert_eq!(reader.push(0x01), None);
        }
        assert_eq!(reader.len(), BUFFER_LEN);

        // The next header re-arms accumulation.
        let frame = frame_with_record([0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00]);
        let mut emitted = None;
        for &byte in &frame {
            emitted = reader.push(byte);
        }
        assert_eq!(emitted, Some(frame));
    }

    #[test]
    fn test_reader_footer_needs_exact_length() {
        let mut reader = FrameReader::new();

        for &byte in &FRAME_HEADER {
            reader.push(byte);
        }
        // Footer magic at length 6 must not complete a frame.
        assert_eq!(reader.push(0x55), None);
        assert_eq!(reader.push(0xCC), None);
        assert_eq!(reader.len(), 6);
    }
}
