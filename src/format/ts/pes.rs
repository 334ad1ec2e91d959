use super::types::PES_HEADER_SIZE;
use crate::error::{DemuxError, Result};
use crate::utils::BitReader;

// Stream ids whose PES packets carry no optional header (and therefore
// no PTS/DTS): control, padding and conditional-access streams.
pub const STREAM_ID_PROGRAM_STREAM_MAP: u8 = 0xBC;
pub const STREAM_ID_PADDING: u8 = 0xBE;
pub const STREAM_ID_PRIVATE_2: u8 = 0xBF;
pub const STREAM_ID_ECM: u8 = 0xF0;
pub const STREAM_ID_EMM: u8 = 0xF1;
pub const STREAM_ID_DSMCC: u8 = 0xF2;
pub const STREAM_ID_H222_1_TYPE_E: u8 = 0xF8;
pub const STREAM_ID_PROGRAM_STREAM_DIRECTORY: u8 = 0xFF;

/// Whether PES packets of this stream id carry the optional header with
/// the PTS/DTS flag bits. For the reserved control ids the bytes after
/// the packet length are already payload.
pub fn has_optional_header(stream_id: u8) -> bool {
    !matches!(
        stream_id,
        STREAM_ID_PROGRAM_STREAM_MAP
            | STREAM_ID_PADDING
            | STREAM_ID_PRIVATE_2
            | STREAM_ID_ECM
            | STREAM_ID_EMM
            | STREAM_ID_DSMCC
            | STREAM_ID_H222_1_TYPE_E
            | STREAM_ID_PROGRAM_STREAM_DIRECTORY
    )
}

/// Packetized Elementary Stream (PES) header.
///
/// Only the 6-byte fixed prefix is parsed unconditionally; timestamps
/// are filled in separately because their presence depends on the
/// stream id and the flag bits further into the packet.
#[derive(Debug, Clone, Default)]
pub struct PESHeader {
    /// Start code prefix, 0x000001 for a genuine PES packet
    pub start_code_prefix: u32,
    /// Stream identifier indicating content type (video/audio/etc.)
    pub stream_id: u8,
    /// Declared packet length; 0 means unbounded/unknown
    pub packet_length: u16,
    /// Presentation time stamp (33 bits at 90 kHz), when present
    pub pts: Option<u64>,
    /// Decoding time stamp (33 bits at 90 kHz), when present
    pub dts: Option<u64>,
}

impl PESHeader {
    /// Parses the fixed 6-byte prefix: start code, stream id, declared
    /// length. Works for any stream id; validity is checked afterwards
    /// via [`PESHeader::is_valid`].
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < PES_HEADER_SIZE {
            return Err(DemuxError::Parser("PES header too short".into()));
        }

        Ok(Self {
            start_code_prefix: (data[0] as u32) << 16 | (data[1] as u32) << 8 | data[2] as u32,
            stream_id: data[3],
            packet_length: (data[4] as u16) << 8 | data[5] as u16,
            pts: None,
            dts: None,
        })
    }

    /// True when the start code prefix identifies a genuine PES packet.
    pub fn is_valid(&self) -> bool {
        self.start_code_prefix == 0x000001
    }

    /// A declared length of zero disables length-based completion; the
    /// packet only ends at the next payload-unit start.
    pub fn is_unbounded(&self) -> bool {
        self.packet_length == 0
    }

    /// PTS minus DTS in 90 kHz ticks, when both are present. Used for
    /// reorder-delay diagnostics.
    pub fn pts_dts_delta(&self) -> Option<i64> {
        match (self.pts, self.dts) {
            (Some(pts), Some(dts)) => Some(pts as i64 - dts as i64),
            _ => None,
        }
    }
}

/// Extracts PTS and DTS from a PES packet starting at `data[0]`.
///
/// The flag pair lives in the top two bits of byte 7: `10` means PTS
/// only, `11` PTS followed by DTS, anything else no timestamps (`01` is
/// reserved). The fields themselves start at byte 9, five bytes each.
/// Packets too short for the advertised fields yield no timestamps.
pub fn parse_pts_dts(data: &[u8]) -> Result<(Option<u64>, Option<u64>)> {
    if data.len() < 14 {
        return Ok((None, None));
    }

    match (data[7] >> 6) & 0b11 {
        0b10 => Ok((Some(decode_timestamp(&data[9..14])?), None)),
        0b11 if data.len() >= 19 => Ok((
            Some(decode_timestamp(&data[9..14])?),
            Some(decode_timestamp(&data[14..19])?),
        )),
        _ => Ok((None, None)),
    }
}

/// Reassembles one 33-bit timestamp from its 5-byte encoding: a 4-bit
/// prefix, then 3+15+15 value bits with a marker bit after each group.
fn decode_timestamp(data: &[u8]) -> Result<u64> {
    let mut reader = BitReader::new(data);
    reader.skip_bits(4)?;
    let hi = reader.read_bits(3)? as u64;
    reader.skip_bits(1)?;
    let mid = reader.read_bits(15)? as u64;
    reader.skip_bits(1)?;
    let lo = reader.read_bits(15)? as u64;

    Ok(hi << 30 | mid << 15 | lo)
}
