use super::assembler::{AbsorbResult, PESAssembler};
use super::parser::TSPacketParser;
use super::types::{pts_to_secs, TSHeader, TS_HEADER_SIZE, TS_PACKET_SIZE};
use crate::error::{DemuxError, Result};
use crate::format::StreamSink;
use log::{debug, trace, warn};
use std::collections::HashMap;
use tokio::io::{AsyncRead, AsyncReadExt};

/// MPEG Transport Stream demuxer.
///
/// Reads fixed 188-byte packets from a byte source and routes them to
/// one [`PESAssembler`] per tracked PID; the payload fragments each
/// assembler emits are appended to that PID's sink in order. Which PIDs
/// to extract is an arbitrary mapping built up with
/// [`TSDemuxer::track_pid`].
pub struct TSDemuxer<R: AsyncRead + Unpin + Send> {
    reader: R,
    parser: TSPacketParser,
    streams: HashMap<u16, StreamEntry>,
    stats: DemuxStats,
}

/// One tracked elementary stream: its assembler plus the output sink.
struct StreamEntry {
    assembler: PESAssembler,
    sink: Box<dyn StreamSink>,
}

/// Counters accumulated over one demuxing session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemuxStats {
    /// 188-byte packets read from the source.
    pub packets_processed: u64,
    /// Packets that belonged to a tracked PID.
    pub packets_matched: u64,
    /// Continuity-counter gaps observed on tracked PIDs.
    pub packets_lost: u64,
    /// PES units whose declared length was fully covered.
    pub units_completed: u64,
    /// Payload bytes handed to sinks.
    pub bytes_emitted: u64,
}

impl<R: AsyncRead + Unpin + Send> TSDemuxer<R> {
    /// Creates a demuxer over a packet source. No PIDs are tracked yet.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            parser: TSPacketParser::new(),
            streams: HashMap::new(),
            stats: DemuxStats::default(),
        }
    }

    /// Routes `pid` to `sink`. Replaces any previous sink for that PID,
    /// resetting its assembly state.
    pub fn track_pid<S: StreamSink + 'static>(&mut self, pid: u16, sink: S) {
        self.streams.insert(
            pid,
            StreamEntry {
                assembler: PESAssembler::new(pid),
                sink: Box::new(sink),
            },
        );
    }

    /// Counters for the session so far.
    pub fn stats(&self) -> DemuxStats {
        self.stats
    }

    /// Reads one complete TS packet; `None` once fewer than 188 bytes
    /// remain, which is the normal end of input.
    async fn read_packet_data(&mut self) -> Result<Option<[u8; TS_PACKET_SIZE]>> {
        let mut packet = [0u8; TS_PACKET_SIZE];
        match self.reader.read_exact(&mut packet).await {
            Ok(_) => Ok(Some(packet)),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Demultiplexes until the source runs out of whole packets, then
    /// flushes every sink.
    pub async fn run_to_end(&mut self) -> Result<DemuxStats> {
        while let Some(packet) = self.read_packet_data().await? {
            match self.process_packet(&packet).await {
                Ok(()) => {}
                // A malformed packet only poisons itself; keep going.
                Err(DemuxError::Io(e)) => return Err(e.into()),
                Err(e) => warn!("skipping packet {}: {}", self.stats.packets_processed, e),
            }
        }

        for entry in self.streams.values_mut() {
            entry.sink.flush().await?;
        }

        Ok(self.stats)
    }

    /// Processes a single 188-byte packet already in memory.
    pub async fn process_packet(&mut self, packet: &[u8]) -> Result<()> {
        self.stats.packets_processed += 1;

        let header = self.parser.parse_header(packet)?;
        if header.transport_error {
            trace!("pid {}: transport error indicator set, skipped", header.pid);
            return Ok(());
        }

        let Some(entry) = self.streams.get_mut(&header.pid) else {
            return Ok(());
        };
        self.stats.packets_matched += 1;
        log_header(&header);

        let adaptation = if header.has_adaptation_field() {
            let field = self.parser.parse_adaptation_field(packet, TS_HEADER_SIZE)?;
            if let Some(pcr) = &field.pcr {
                debug!(
                    "pid {}: PCR base={} ext={} ({:.6}s)",
                    header.pid,
                    pcr.base,
                    pcr.extension,
                    pcr.as_secs_f64()
                );
            }
            if let Some(opcr) = &field.opcr {
                debug!("pid {}: OPCR ({:.6}s)", header.pid, opcr.as_secs_f64());
            }
            Some(field)
        } else {
            None
        };

        // The continuity counter only advances on packets carrying
        // payload, so adaptation-field-only packets must not reach the
        // assembler's loss check.
        if !header.has_payload() {
            return Ok(());
        }

        match entry
            .assembler
            .absorb_packet(packet, &header, adaptation.as_ref())?
        {
            AbsorbResult::Started { fragment } => {
                if let Some(pes) = entry.assembler.header() {
                    debug!(
                        "pid {}: PES start, stream id {:#04x}, declared length {}",
                        header.pid, pes.stream_id, pes.packet_length
                    );
                    if let Some(pts) = pes.pts {
                        debug!("pid {}: PTS {} ({:.6}s)", header.pid, pts, pts_to_secs(pts));
                    }
                    if let Some(dts) = pes.dts {
                        debug!("pid {}: DTS {} ({:.6}s)", header.pid, dts, pts_to_secs(dts));
                    }
                    if let Some(delta) = pes.pts_dts_delta() {
                        debug!("pid {}: PTS-DTS delta {} ticks", header.pid, delta);
                    }
                }
                entry.sink.append(fragment).await?;
                self.stats.bytes_emitted += fragment.len() as u64;
            }
            AbsorbResult::Continued { fragment } => {
                entry.sink.append(fragment).await?;
                self.stats.bytes_emitted += fragment.len() as u64;
            }
            AbsorbResult::Finished { fragment } => {
                entry.sink.append(fragment).await?;
                self.stats.bytes_emitted += fragment.len() as u64;
                self.stats.units_completed += 1;
                debug!(
                    "pid {}: PES unit finished, {} bytes",
                    header.pid,
                    entry.assembler.bytes_assembled()
                );
            }
            AbsorbResult::PacketLost => {
                self.stats.packets_lost += 1;
                warn!(
                    "pid {}: continuity counter gap, packet lost mid-unit",
                    header.pid
                );
            }
            AbsorbResult::Idle => {
                trace!("pid {}: payload before first unit start, dropped", header.pid);
            }
            AbsorbResult::UnexpectedPid => {
                // The map routed by PID, so this cannot happen short of
                // a bug in the routing itself.
                warn!("pid {}: routed to an assembler tracking another PID", header.pid);
            }
        }

        Ok(())
    }
}

fn log_header(header: &TSHeader) {
    trace!(
        "pid {}: start={} afc={} cc={} scrambling={}",
        header.pid,
        header.payload_unit_start as u8,
        header.adaptation_field_control,
        header.continuity_counter,
        header.scrambling_control,
    );
}
