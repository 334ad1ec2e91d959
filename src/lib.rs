#![doc(html_root_url = "https://docs.rs/tsdemux/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # tsdemux - MPEG Transport Stream Demultiplexer
//!
//! `tsdemux` extracts elementary bitstreams from MPEG transport
//! streams. It parses the fixed 188-byte TS packet layout, reassembles
//! Packetized Elementary Stream (PES) units across packets per PID, and
//! recovers presentation timing along the way.
//!
//! ## Features
//!
//! ### Packet Layer
//! - 4-byte TS header parsing (13-bit PID, flags, continuity counter)
//! - Variable-length adaptation field parsing with 33+9-bit PCR/OPCR
//!   clock references and stuffing accounting
//!
//! ### Elementary Streams
//! - PES header parsing with optional 33-bit PTS/DTS timestamps
//! - Per-PID PES reassembly with continuity-counter loss detection
//! - Zero-copy payload fragments routed to pluggable per-stream sinks
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! tsdemux = "0.1.0"
//! ```
//!
//! ### Extracting Elementary Streams
//!
//! ```rust,no_run
//! use tokio::fs::File;
//! use tokio::io::BufReader;
//! use tsdemux::format::{ts::TSDemuxer, WriterSink};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let input = BufReader::new(File::open("capture.ts").await?);
//!     let audio = WriterSink::new(File::create("audio.mp2").await?);
//!     let video = WriterSink::new(File::create("video.264").await?);
//!
//!     let mut demuxer = TSDemuxer::new(input);
//!     demuxer.track_pid(136, audio);
//!     demuxer.track_pid(174, video);
//!
//!     let stats = demuxer.run_to_end().await?;
//!     println!(
//!         "{} packets, {} PES units, {} lost",
//!         stats.packets_processed, stats.units_completed, stats.packets_lost
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - `format`: the TS implementation and the sink abstractions
//!   - Packet, adaptation field and PES header parsers
//!   - The per-PID reassembly state machine
//!   - The demuxer driving everything from an async byte source
//!
//! - `error`: error handling types and utilities
//!
//! - `utils`: bitstream reading helpers
//!
/// Error types and utilities
pub mod error;

/// Media format implementations (TS demuxing and stream sinks)
pub mod format;

/// Common utilities and helper functions
pub mod utils;

pub use error::{DemuxError, Result};
pub use format::ts::TSDemuxer;
