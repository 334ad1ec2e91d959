//! # MPEG Transport Stream (TS) Demultiplexing
//!
//! This module implements extraction of elementary streams from the
//! MPEG-TS container format:
//!
//! - TS packet header and adaptation field parsing
//! - PCR/OPCR clock reference recovery
//! - PES packet header parsing with PTS/DTS extraction
//! - PES unit reassembly with continuity-counter loss detection
//!
//! ## Core Features
//!
//! - **Demuxing**: Route packets of any set of PIDs to per-stream sinks
//! - **Reassembly**: One [`PESAssembler`] state machine per PID
//! - **Timing**: 27 MHz PCR and 90 kHz PTS/DTS decoding
//! - **Loss detection**: continuity-counter gaps surface per packet
//!
//! ## Example Usage
//!
//! ```rust
//! use std::io::Cursor;
//! use tsdemux::format::ts::TSDemuxer;
//! use tsdemux::format::MemorySink;
//!
//! # #[tokio::main]
//! # async fn main() -> tsdemux::Result<()> {
//! let capture: Vec<u8> = Vec::new(); // 188-byte packets from a file
//! let video = MemorySink::new();
//!
//! let mut demuxer = TSDemuxer::new(Cursor::new(capture));
//! demuxer.track_pid(136, video.clone());
//!
//! let stats = demuxer.run_to_end().await?;
//! println!("{} PES units extracted", stats.units_completed);
//! # Ok(())
//! # }
//! ```

/// PES unit reassembly state machine
pub mod assembler;

/// TS demuxer driving assemblers from a packet source
pub mod demuxer;

/// Low-level TS packet parsing utilities
pub mod parser;

/// PES packet header handling
pub mod pes;

/// Core TS types and constants
pub mod types;


// Re-export commonly used types and constants
pub use assembler::{AbsorbResult, PESAssembler};
pub use demuxer::{DemuxStats, TSDemuxer};
pub use parser::TSPacketParser;
pub use pes::{has_optional_header, PESHeader};
pub use types::{
    AdaptationField,
    ClockReference,
    TSHeader,
    PCR_HZ,
    PTS_HZ,
    STREAM_ID_AAC,
    STREAM_ID_H264,
    TS_PACKET_SIZE,
};
