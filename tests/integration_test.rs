use std::io::Cursor;
use tsdemux::format::ts::{STREAM_ID_AAC, STREAM_ID_H264, TS_PACKET_SIZE};
use tsdemux::format::{MemorySink, WriterSink};
use tsdemux::TSDemuxer;

const AUDIO_PID: u16 = 136;
const VIDEO_PID: u16 = 174;

fn encode_timestamp(prefix: u8, ts: u64) -> [u8; 5] {
    let hi = ((ts >> 30) & 0x07) as u8;
    let mid = ((ts >> 15) & 0x7FFF) as u16;
    let lo = (ts & 0x7FFF) as u16;
    [
        (prefix << 4) | (hi << 1) | 0x01,
        (mid >> 7) as u8,
        (((mid & 0x7F) as u8) << 1) | 0x01,
        (lo >> 7) as u8,
        (((lo & 0x7F) as u8) << 1) | 0x01,
    ]
}

fn ts_packet(pid: u16, start: bool, cc: u8, payload: &[u8]) -> Vec<u8> {
    assert!(payload.len() <= TS_PACKET_SIZE - 4);
    let mut packet = vec![0u8; TS_PACKET_SIZE];
    packet[0] = 0x47;
    packet[1] = ((pid >> 8) as u8 & 0x1F) | if start { 0x40 } else { 0x00 };
    packet[2] = (pid & 0xFF) as u8;
    packet[3] = 0x10 | (cc & 0x0F);
    packet[4..4 + payload.len()].copy_from_slice(payload);
    for b in &mut packet[4 + payload.len()..] {
        *b = 0x99;
    }
    packet
}

fn pes_start(pid: u16, cc: u8, stream_id: u8, length: u16, pts: Option<u64>, dts: Option<u64>) -> Vec<u8> {
    let mut payload = vec![0x00, 0x00, 0x01, stream_id];
    payload.extend_from_slice(&length.to_be_bytes());
    payload.push(0x80);
    match (pts, dts) {
        (Some(pts), Some(dts)) => {
            payload.push(0b1100_0000);
            payload.push(10);
            payload.extend_from_slice(&encode_timestamp(0b0011, pts));
            payload.extend_from_slice(&encode_timestamp(0b0001, dts));
        }
        (Some(pts), None) => {
            payload.push(0b1000_0000);
            payload.push(5);
            payload.extend_from_slice(&encode_timestamp(0b0010, pts));
        }
        _ => {
            payload.push(0x00);
            payload.push(0);
        }
    }
    payload.resize(TS_PACKET_SIZE - 4, 0x99);
    ts_packet(pid, true, cc, &payload)
}

/// A two-program capture: bounded audio units and an unbounded video
/// stream with one packet dropped in transit. The demuxer must keep the
/// streams independent and deliver fragments in order.
#[tokio::test]
async fn test_two_stream_extraction() {
    let mut capture = Vec::new();

    // Audio unit 0: declared length 350, covered after one continuation.
    capture.extend_from_slice(&pes_start(AUDIO_PID, 0, STREAM_ID_AAC, 350, Some(90_000), None));
    // Video unit, unbounded, with both timestamps.
    capture.extend_from_slice(&pes_start(
        VIDEO_PID,
        0,
        STREAM_ID_H264,
        0,
        Some(183_000),
        Some(90_000),
    ));
    capture.extend_from_slice(&ts_packet(AUDIO_PID, false, 1, &[0xAA; 184]));
    capture.extend_from_slice(&ts_packet(VIDEO_PID, false, 1, &[0xBB; 184]));
    capture.extend_from_slice(&ts_packet(VIDEO_PID, false, 2, &[0xBB; 184]));
    // Audio unit 1.
    capture.extend_from_slice(&pes_start(AUDIO_PID, 2, STREAM_ID_AAC, 350, Some(180_000), None));
    capture.extend_from_slice(&ts_packet(AUDIO_PID, false, 3, &[0xAA; 184]));
    // Video counter jumps from 2 to 4: one packet was lost.
    capture.extend_from_slice(&ts_packet(VIDEO_PID, false, 4, &[0xBB; 184]));
    capture.extend_from_slice(&ts_packet(VIDEO_PID, false, 5, &[0xBB; 184]));
    // Untracked program data.
    capture.extend_from_slice(&ts_packet(999, false, 0, &[0xEE; 184]));

    let audio_path = std::env::temp_dir().join(format!("tsdemux-it-{}.mp2", std::process::id()));
    let audio_file = tokio::fs::File::create(&audio_path).await.unwrap();
    let video = MemorySink::new();

    let mut demuxer = TSDemuxer::new(Cursor::new(capture));
    demuxer.track_pid(AUDIO_PID, WriterSink::new(audio_file));
    demuxer.track_pid(VIDEO_PID, video.clone());

    let stats = demuxer.run_to_end().await.unwrap();
    assert_eq!(stats.packets_processed, 10);
    assert_eq!(stats.packets_matched, 9);
    assert_eq!(stats.units_completed, 2); // both audio units
    assert_eq!(stats.packets_lost, 1); // the video gap
    assert_eq!(stats.bytes_emitted, 9 * 184 - 184); // lost packet emits nothing

    // Audio landed in the file, in order, starting with the PES header.
    let audio_bytes = tokio::fs::read(&audio_path).await.unwrap();
    assert_eq!(audio_bytes.len(), 4 * 184);
    assert_eq!(&audio_bytes[0..4], &[0x00, 0x00, 0x01, STREAM_ID_AAC]);

    // Video got everything except the lost packet's share.
    assert_eq!(video.len(), 4 * 184);
    let video_bytes = video.take();
    assert_eq!(&video_bytes[0..4], &[0x00, 0x00, 0x01, STREAM_ID_H264]);

    tokio::fs::remove_file(&audio_path).await.unwrap();
}

/// Feeding the same capture one packet at a time must produce the same
/// sink contents as reading it from the source in one run.
#[tokio::test]
async fn test_push_and_pull_agree() {
    let mut packets = Vec::new();
    packets.push(pes_start(AUDIO_PID, 0, STREAM_ID_AAC, 700, None, None));
    for cc in 1..=3u8 {
        packets.push(ts_packet(AUDIO_PID, false, cc, &[cc; 184]));
    }

    let pulled = MemorySink::new();
    let mut demuxer = TSDemuxer::new(Cursor::new(packets.concat()));
    demuxer.track_pid(AUDIO_PID, pulled.clone());
    demuxer.run_to_end().await.unwrap();

    let pushed = MemorySink::new();
    let mut demuxer = TSDemuxer::new(Cursor::new(Vec::new()));
    demuxer.track_pid(AUDIO_PID, pushed.clone());
    for packet in &packets {
        demuxer.process_packet(packet).await.unwrap();
    }

    assert_eq!(pulled.len(), 4 * 184);
    assert_eq!(pulled.take(), pushed.take());
}
