use crate::error::Result;
use bytes::{BufMut, BytesMut};
use std::time::Duration;

// Stream IDs
pub const STREAM_ID_H264: u8 = 0xe0;
pub const STREAM_ID_AAC: u8 = 0xc0;

// Constants
pub const TS_PACKET_SIZE: usize = 188;
pub const TS_HEADER_SIZE: usize = 4;
pub const PES_HEADER_SIZE: usize = 6;
pub const MAX_PES_HEADER_SIZE: usize = 19;
pub const SYNC_BYTE: u8 = 0x47;
pub const PTS_HZ: u64 = 90_000;
pub const PCR_HZ: u64 = 27_000_000;
pub const PCR_MULTIPLIER: u64 = 300;

/// Program clock reference as carried in the adaptation field: a 33-bit
/// base at 90 kHz plus a 9-bit extension counting 27 MHz cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReference {
    /// 33-bit base value
    pub base: u64,
    /// 9-bit extension value
    pub extension: u16,
}

impl ClockReference {
    /// Full clock value in 27 MHz ticks: `base * 300 + extension`.
    pub fn ticks(&self) -> u64 {
        self.base * PCR_MULTIPLIER + u64::from(self.extension)
    }

    /// Clock value in seconds.
    pub fn as_secs_f64(&self) -> f64 {
        self.ticks() as f64 / PCR_HZ as f64
    }

    /// Clock value as a `Duration`.
    pub fn as_duration(&self) -> Duration {
        // Split to avoid overflowing ticks * 1e9 for large clock values.
        let ticks = self.ticks();
        let nanos = (ticks % PCR_HZ) * 1_000_000_000 / PCR_HZ;
        Duration::new(ticks / PCR_HZ, nanos as u32)
    }
}

/// Decoded adaptation field of a TS packet.
///
/// The length byte counts everything after itself, so a packet consumes
/// `length + 1` bytes for the whole field. A zero length is legal and
/// carries no flags or optional fields at all.
#[derive(Debug, Clone, Default)]
pub struct AdaptationField {
    pub length: u8,
    pub discontinuity: bool,
    pub random_access: bool,
    pub es_priority: bool,
    pub pcr: Option<ClockReference>,
    pub opcr: Option<ClockReference>,
    pub splice_countdown: Option<i8>,
    pub private_data: Option<Vec<u8>>,
    /// Bytes after the mandatory and optional fields, counted but never
    /// interpreted.
    pub stuffing_bytes: u8,
}

impl AdaptationField {
    /// Total number of packet bytes the field occupies, including the
    /// length byte itself.
    pub fn wire_len(&self) -> usize {
        self.length as usize + 1
    }
}

/// The fixed 4-byte TS packet header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TSHeader {
    pub sync_byte: u8, // Always 0x47
    pub transport_error: bool,
    pub payload_unit_start: bool,
    pub transport_priority: bool,
    pub pid: u16,
    pub scrambling_control: u8,
    pub adaptation_field_control: u8,
    pub continuity_counter: u8,
}

impl Default for TSHeader {
    fn default() -> Self {
        Self {
            sync_byte: SYNC_BYTE,
            transport_error: false,
            payload_unit_start: false,
            transport_priority: false,
            pid: 0,
            scrambling_control: 0,
            adaptation_field_control: 0b01,
            continuity_counter: 0,
        }
    }
}

impl TSHeader {
    /// True when an adaptation field follows the header (AFC 2 or 3).
    pub fn has_adaptation_field(&self) -> bool {
        self.adaptation_field_control & 0b10 != 0
    }

    /// True when the packet carries payload bytes (AFC 1 or 3).
    pub fn has_payload(&self) -> bool {
        self.adaptation_field_control & 0b01 != 0
    }

    pub fn write_to(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_u8(self.sync_byte);

        let mut b1 = 0u8;
        if self.transport_error {
            b1 |= 0x80;
        }
        if self.payload_unit_start {
            b1 |= 0x40;
        }
        if self.transport_priority {
            b1 |= 0x20;
        }
        b1 |= ((self.pid >> 8) & 0x1f) as u8;
        buf.put_u8(b1);

        buf.put_u8((self.pid & 0xff) as u8);

        let mut b3 = (self.scrambling_control & 0x03) << 6;
        b3 |= (self.adaptation_field_control & 0x03) << 4;
        b3 |= self.continuity_counter & 0x0f;
        buf.put_u8(b3);

        Ok(())
    }
}

// Time conversion utilities
pub fn pts_to_time(pts: u64) -> Duration {
    Duration::from_nanos((pts * 1_000_000_000) / PTS_HZ)
}

pub fn pts_to_secs(pts: u64) -> f64 {
    pts as f64 / PTS_HZ as f64
}
