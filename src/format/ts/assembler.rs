use super::pes::{self, PESHeader};
use super::types::{AdaptationField, TSHeader, TS_HEADER_SIZE, TS_PACKET_SIZE};
use crate::error::{DemuxError, Result};

/// Outcome of absorbing one TS packet into a [`PESAssembler`].
///
/// The payload-carrying variants borrow their fragment straight from the
/// caller's packet buffer; nothing is copied. Fragments must be appended
/// to the output in the order they are returned.
#[derive(Debug, PartialEq, Eq)]
pub enum AbsorbResult<'a> {
    /// The packet belongs to a PID this assembler does not track.
    /// State is left untouched; this signals a routing bug upstream.
    UnexpectedPid,
    /// No unit is in progress and this packet does not start one; its
    /// payload is discarded.
    Idle,
    /// The continuity counter skipped while assembling. The fragment is
    /// not accumulated; the caller decides whether to drop the unit or
    /// keep going with a gap.
    PacketLost,
    /// A payload-unit start opened a new PES unit.
    Started {
        /// First payload fragment of the unit, PES header bytes included.
        fragment: &'a [u8],
    },
    /// The open unit grew by one packet's payload.
    Continued {
        /// This packet's payload fragment.
        fragment: &'a [u8],
    },
    /// The accumulated payload reached the declared PES length.
    Finished {
        /// Final payload fragment of the unit.
        fragment: &'a [u8],
    },
}

/// Reassembles PES units for a single PID out of the TS packets that
/// carry it.
///
/// The assembler is a two-state machine: idle until a payload-unit
/// start arrives, then assembling until the declared PES length is
/// covered (or forever, for unbounded units, until the next start
/// resets it). It keeps no copy of the unit's bytes, only the running
/// length, the last continuity counter and the most recent PES header.
/// One instance lives per tracked PID for the whole demux session.
#[derive(Debug)]
pub struct PESAssembler {
    pid: u16,
    last_continuity_counter: u8,
    assembling: bool,
    bytes_assembled: u64,
    header: Option<PESHeader>,
}

impl PESAssembler {
    /// Creates an idle assembler for one PID.
    pub fn new(pid: u16) -> Self {
        Self {
            pid,
            last_continuity_counter: 0,
            assembling: false,
            bytes_assembled: 0,
            header: None,
        }
    }

    /// The PID this assembler tracks.
    pub fn pid(&self) -> u16 {
        self.pid
    }

    /// Payload bytes accumulated for the unit in progress.
    pub fn bytes_assembled(&self) -> u64 {
        self.bytes_assembled
    }

    /// True while a PES unit is being accumulated.
    pub fn is_assembling(&self) -> bool {
        self.assembling
    }

    /// Header of the unit in progress (or the last finished one).
    pub fn header(&self) -> Option<&PESHeader> {
        self.header.as_ref()
    }

    /// Consumes one TS packet for this assembler's PID.
    ///
    /// `header` must be the already-parsed header of `packet`, and
    /// `adaptation` its adaptation field when the header indicates one.
    /// Payload starts at `4 + length + 1` bytes when the adaptation
    /// field is present and at 4 otherwise; everything from there to the
    /// end of the 188-byte packet is this packet's fragment.
    pub fn absorb_packet<'a>(
        &mut self,
        packet: &'a [u8],
        header: &TSHeader,
        adaptation: Option<&AdaptationField>,
    ) -> Result<AbsorbResult<'a>> {
        if header.pid != self.pid {
            return Ok(AbsorbResult::UnexpectedPid);
        }

        if packet.len() != TS_PACKET_SIZE {
            return Err(DemuxError::Parser("expected a full 188-byte packet".into()));
        }

        let mut offset = TS_HEADER_SIZE;
        if header.has_adaptation_field() {
            let adaptation = adaptation
                .ok_or_else(|| DemuxError::Parser("adaptation field not supplied".into()))?;
            offset += adaptation.wire_len();
        }
        if offset > packet.len() {
            return Err(DemuxError::InvalidData("payload offset out of range".into()));
        }
        let fragment = &packet[offset..];

        if header.payload_unit_start {
            return self.start_unit(fragment, header);
        }

        if !self.assembling {
            // Tail of a unit whose start we never saw; continuity is not
            // evaluated outside a unit.
            return Ok(AbsorbResult::Idle);
        }

        let expected = (self.last_continuity_counter + 1) & 0x0F;
        self.last_continuity_counter = header.continuity_counter;
        if header.continuity_counter != expected {
            return Ok(AbsorbResult::PacketLost);
        }

        self.bytes_assembled += fragment.len() as u64;
        if self.unit_complete() {
            self.assembling = false;
            return Ok(AbsorbResult::Finished { fragment });
        }

        Ok(AbsorbResult::Continued { fragment })
    }

    /// Opens a new unit at a payload-unit start, discarding whatever was
    /// in flight.
    fn start_unit<'a>(
        &mut self,
        fragment: &'a [u8],
        header: &TSHeader,
    ) -> Result<AbsorbResult<'a>> {
        // A new unit discards whatever was in flight, even if the PES
        // prefix below turns out to be unparsable.
        self.assembling = false;
        self.bytes_assembled = 0;

        let mut pes = PESHeader::parse(fragment)?;
        if pes.is_valid() && pes::has_optional_header(pes.stream_id) {
            let (pts, dts) = pes::parse_pts_dts(fragment)?;
            pes.pts = pts;
            pes.dts = dts;
        }
        // A wrong start code or a reserved stream id still gets tracked
        // as raw payload; only timestamp parsing is skipped.
        self.header = Some(pes);
        self.last_continuity_counter = header.continuity_counter;
        self.bytes_assembled = fragment.len() as u64;

        if self.unit_complete() {
            return Ok(AbsorbResult::Finished { fragment });
        }

        self.assembling = true;
        Ok(AbsorbResult::Started { fragment })
    }

    fn unit_complete(&self) -> bool {
        match &self.header {
            Some(pes) if !pes.is_unbounded() => {
                self.bytes_assembled >= u64::from(pes.packet_length)
            }
            _ => false,
        }
    }
}
