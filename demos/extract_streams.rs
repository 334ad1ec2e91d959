use tokio::fs::File;
use tokio::io::BufReader;
use tsdemux::format::{ts::TSDemuxer, WriterSink};

/// Extracts elementary streams from a transport stream capture.
///
/// Usage:
///
/// ```text
/// extract_streams <input.ts> [pid=output]...
/// extract_streams capture.ts 136=audio.mp2 174=video.264
/// ```
///
/// With no mappings given, PIDs 136 and 174 are written to
/// `pid136.out` and `pid174.out`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let input_path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("usage: extract_streams <input.ts> [pid=output]...");
            std::process::exit(2);
        }
    };

    let mut mappings: Vec<(u16, String)> = Vec::new();
    for arg in args {
        let (pid, path) = arg
            .split_once('=')
            .ok_or_else(|| format!("expected pid=output, got '{arg}'"))?;
        mappings.push((pid.parse()?, path.to_string()));
    }
    if mappings.is_empty() {
        mappings.push((136, "pid136.out".to_string()));
        mappings.push((174, "pid174.out".to_string()));
    }

    let input = BufReader::new(File::open(&input_path).await?);
    let mut demuxer = TSDemuxer::new(input);
    for (pid, path) in &mappings {
        let output = File::create(path).await?;
        demuxer.track_pid(*pid, WriterSink::new(output));
        println!("PID {pid} -> {path}");
    }

    let stats = demuxer.run_to_end().await?;
    println!(
        "{} packets read, {} on tracked PIDs, {} PES units completed, {} packets lost, {} bytes written",
        stats.packets_processed,
        stats.packets_matched,
        stats.units_completed,
        stats.packets_lost,
        stats.bytes_emitted,
    );

    Ok(())
}
