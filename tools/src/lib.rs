//! Introspection and debugging tools for the chunkwire frame transport.
//!
//! This crate backs the `chunkwire-tools` binary:
//!
//! - Decode and print datagram structure
//! - Pack a payload file into datagram files
//! - Reassemble frames from a directory of captured datagrams
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to see what went over the wire.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;
use serde::Serialize;
use transport::{decode_identifier, Frame, FrameStream, StreamConfig};
use wire::{decode_datagram, peek_header, ChunkRecord, DatagramHeader, WireConfig};

/// Structural summary of one datagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub length: usize,
    /// Header fields, when at least a header's worth of bytes was present.
    pub header: Option<HeaderSummary>,
    /// Why the whole datagram was rejected, if it was.
    pub rejected: Option<String>,
    pub chunks: Vec<ChunkSummary>,
    /// Why chunk parsing stopped before the end of the datagram.
    pub stopped: Option<String>,
}

impl InspectReport {
    /// Payload bytes carried by all frame chunks.
    #[must_use]
    pub fn data_bytes(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.data_len).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderSummary {
    pub version: u16,
    pub size: u16,
    pub opaque: u32,
    pub checksum: u16,
}

impl From<DatagramHeader> for HeaderSummary {
    fn from(header: DatagramHeader) -> Self {
        Self {
            version: header.version,
            size: header.size,
            opaque: header.opaque,
            checksum: header.checksum,
        }
    }
}

/// One decoded chunk. Fields that do not apply to the chunk kind are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkSummary {
    pub tag: String,
    pub encoded_len: usize,
    pub data_len: usize,
    pub frame_id: Option<u32>,
    pub task: Option<String>,
    pub flow: Option<String>,
    pub sequence: Option<u16>,
    pub frame_size: Option<u32>,
    pub offset: Option<u32>,
    pub session: Option<u16>,
}

impl ChunkSummary {
    fn from_record(record: &ChunkRecord<'_>, config: &WireConfig) -> Self {
        let mut summary = Self {
            tag: format!("{:?}", record.tag()),
            encoded_len: record.encoded_len(config.dialect),
            data_len: record.data().len(),
            frame_id: record.frame_id(),
            task: None,
            flow: None,
            sequence: None,
            frame_size: None,
            offset: None,
            session: None,
        };
        match record {
            ChunkRecord::Master(chunk) => {
                summary.task = Some(decode_identifier(&chunk.meta.task));
                summary.flow = Some(decode_identifier(&chunk.meta.flow));
                summary.sequence = Some(chunk.sequence);
                summary.frame_size = Some(chunk.frame_size);
            }
            ChunkRecord::Slave(chunk) => {
                summary.task = Some(decode_identifier(&chunk.meta.task));
                summary.flow = Some(decode_identifier(&chunk.meta.flow));
                summary.sequence = Some(chunk.slave_sequence);
                summary.offset = chunk.offset;
            }
            ChunkRecord::RtlAnswer(chunk) | ChunkRecord::RtlRequest(chunk) => {
                summary.session = Some(chunk.session);
            }
            ChunkRecord::Notification(_) => {}
        }
        summary
    }
}

/// Decodes `bytes` and summarizes its structure. Never fails: rejections are
/// reported in the result.
#[must_use]
pub fn inspect_datagram(bytes: &[u8], config: &WireConfig) -> InspectReport {
    let header = peek_header(bytes, config.byte_order)
        .ok()
        .map(HeaderSummary::from);
    match decode_datagram(bytes, config) {
        Ok(datagram) => InspectReport {
            length: bytes.len(),
            header,
            rejected: None,
            chunks: datagram
                .chunks
                .iter()
                .map(|record| ChunkSummary::from_record(record, config))
                .collect(),
            stopped: datagram.stopped.map(|err| err.to_string()),
        },
        Err(err) => InspectReport {
            length: bytes.len(),
            header,
            rejected: Some(err.to_string()),
            chunks: Vec::new(),
            stopped: None,
        },
    }
}

/// Renders a report for terminal output.
#[must_use]
pub fn format_inspect_pretty(report: &InspectReport) -> String {
    let mut out = String::new();
    match report.header {
        Some(header) => {
            let _ = writeln!(
                out,
                "version: 0x{:04x} size: {} opaque: 0x{:08x} checksum: 0x{:04x}",
                header.version, header.size, header.opaque, header.checksum
            );
        }
        None => {
            let _ = writeln!(out, "header: n/a ({} bytes)", report.length);
        }
    }
    if let Some(reason) = &report.rejected {
        let _ = writeln!(out, "rejected: {reason}");
        return out;
    }
    let _ = writeln!(
        out,
        "chunks: {} ({} data bytes)",
        report.chunks.len(),
        report.data_bytes()
    );
    for chunk in &report.chunks {
        let _ = write!(out, "  {}: {} bytes", chunk.tag, chunk.encoded_len);
        if let Some(frame_id) = chunk.frame_id {
            let _ = write!(out, " frame {frame_id}");
        }
        if let (Some(task), Some(flow)) = (&chunk.task, &chunk.flow) {
            let _ = write!(out, " {task}/{flow}");
        }
        if let Some(sequence) = chunk.sequence {
            let _ = write!(out, " seq {sequence}");
        }
        if let Some(frame_size) = chunk.frame_size {
            let _ = write!(out, " frame_size {frame_size}");
        }
        if let Some(offset) = chunk.offset {
            let _ = write!(out, " offset {offset}");
        }
        if let Some(session) = chunk.session {
            let _ = write!(out, " session {session}");
        }
        if chunk.data_len > 0 {
            let _ = write!(out, " data {}", chunk.data_len);
        }
        out.push('\n');
    }
    if let Some(reason) = &report.stopped {
        let _ = writeln!(out, "stopped: {reason}");
    }
    out
}

/// Loads a JSON stream configuration, or the defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<StreamConfig> {
    let Some(path) = path else {
        return Ok(StreamConfig::default());
    };
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let config: StreamConfig = serde_json::from_str(&contents).context("parse config json")?;
    config
        .wire
        .limits
        .validate(config.wire.dialect)
        .map_err(|err| anyhow::anyhow!("config validation failed: {err}"))?;
    Ok(config)
}

/// Lists regular files in `dir`, optionally filtered by a glob on the path or
/// file name, sorted by path.
pub fn collect_datagram_files(dir: &Path, glob: Option<&str>) -> Result<Vec<PathBuf>> {
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        paths.push(path);
    }
    paths.sort();
    Ok(paths)
}

/// Packs `frame` and writes one `NNNNNN.dgram` file per datagram into `dir`.
pub fn pack_to_dir(frame: &Frame, config: &StreamConfig, dir: &Path) -> Result<Vec<PathBuf>> {
    let stream = FrameStream::new(config.clone());
    let datagrams = stream
        .try_pack_frame(frame)
        .map_err(|err| anyhow::anyhow!("pack frame {}: {err}", frame.id.raw()))?;
    fs::create_dir_all(dir).with_context(|| format!("create dir {}", dir.display()))?;

    let mut written = Vec::with_capacity(datagrams.len());
    for (index, datagram) in datagrams.iter().enumerate() {
        let path = dir.join(format!("{index:06}.dgram"));
        fs::write(&path, datagram).with_context(|| format!("write {}", path.display()))?;
        written.push(path);
    }
    tracing::debug!(
        frame_id = frame.id.raw(),
        datagrams = written.len(),
        dir = %dir.display(),
        "wrote datagrams"
    );
    Ok(written)
}

/// Outcome of feeding a sequence of datagrams through a receiving stream.
#[derive(Debug, Default)]
pub struct AssembleReport {
    pub datagrams: usize,
    pub rejected: usize,
    pub chunks_accepted: usize,
    pub frames: Vec<Frame>,
    /// Frames still missing chunks at the end of the input.
    pub incomplete: usize,
}

/// Feeds `datagrams` in order into a fresh stream and drains what completes.
pub fn assemble<I, B>(datagrams: I, config: &StreamConfig) -> AssembleReport
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut stream = FrameStream::new(config.clone());
    let mut report = AssembleReport::default();
    for datagram in datagrams {
        let parsed = stream.parse_datagram(datagram.as_ref());
        report.datagrams += 1;
        if parsed.rejected.is_some() {
            report.rejected += 1;
        }
        report.chunks_accepted += parsed.chunks_accepted;
        report.frames.extend(stream.drain_completed_frames());
    }
    report.incomplete = stream.in_flight();
    report
}

/// Writes each frame's payload into `dir` as `NNNNNN-<id>.bin`.
///
/// Names use only the position and frame id; task and flow come off the
/// wire and are not fit for paths.
pub fn write_payloads(frames: &[Frame], dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("create dir {}", dir.display()))?;
    let mut written = Vec::with_capacity(frames.len());
    for (index, frame) in frames.iter().enumerate() {
        let path = dir.join(format!("{index:06}-{}.bin", frame.id.raw()));
        fs::write(&path, &frame.payload).with_context(|| format!("write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

/// Reads each file in `paths` and assembles them in order.
pub fn assemble_files(paths: &[PathBuf], config: &StreamConfig) -> Result<AssembleReport> {
    let datagrams = paths
        .iter()
        .map(|path| fs::read(path).with_context(|| format!("read datagram {}", path.display())))
        .collect::<Result<Vec<_>>>()?;
    Ok(assemble(datagrams, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wire::{encode_control_datagram, Dialect, RtlChunk};

    fn sample_frame() -> Frame {
        Frame::new(7, "cam1", "v2sps1", vec![0u8; 2000])
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "chunkwire-tools-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn inspect_reports_master_and_slaves() {
        let config = WireConfig::default();
        let datagrams = FrameStream::default().pack_frame(&sample_frame());
        let report = inspect_datagram(&datagrams[0], &config);

        assert!(report.rejected.is_none());
        assert!(report.stopped.is_none());
        assert_eq!(report.length, datagrams[0].len());
        assert_eq!(report.header.unwrap().size as usize, datagrams[0].len());
        assert_eq!(report.chunks[0].tag, "Master");
        assert_eq!(report.chunks[0].task.as_deref(), Some("cam1"));
        assert_eq!(report.chunks[0].flow.as_deref(), Some("v2sps1"));
        assert_eq!(report.chunks[0].frame_size, Some(2000));
        assert!(report.chunks[1..].iter().all(|chunk| chunk.tag == "Slave"));

        let total: usize = datagrams
            .iter()
            .map(|bytes| inspect_datagram(bytes, &config).data_bytes())
            .sum();
        assert_eq!(total, 2000);
    }

    #[test]
    fn inspect_shows_offsets_in_offset_dialect() {
        let config = WireConfig::new(Dialect::OffsetAddressed);
        let stream = FrameStream::new(StreamConfig::new(config.clone()));
        let datagrams = stream.pack_frame(&sample_frame());
        let report = inspect_datagram(&datagrams[0], &config);
        assert_eq!(report.chunks[0].offset, None);
        assert_eq!(report.chunks[1].offset, Some(483));
    }

    #[test]
    fn inspect_reports_rejection() {
        let config = WireConfig::default();
        let mut bytes = FrameStream::default().pack_frame(&sample_frame())[0].clone();
        bytes[20] ^= 0x01;
        let report = inspect_datagram(&bytes, &config);
        assert!(report.rejected.is_some());
        assert!(report.chunks.is_empty());
        assert!(report.header.is_some());
        assert!(format_inspect_pretty(&report).contains("rejected:"));

        let short = inspect_datagram(&[1, 2, 3], &config);
        assert!(short.header.is_none());
        assert!(short.rejected.is_some());
    }

    #[test]
    fn inspect_control_datagram() {
        let config = WireConfig::default();
        let record = ChunkRecord::RtlRequest(RtlChunk {
            session: 42,
            reserved: 0,
        });
        let bytes = encode_control_datagram(&record, &config).unwrap();
        let report = inspect_datagram(&bytes, &config);
        assert_eq!(report.chunks.len(), 1);
        assert_eq!(report.chunks[0].session, Some(42));
        assert_eq!(report.chunks[0].frame_id, None);
    }

    #[test]
    fn pretty_output_lists_chunks() {
        let config = WireConfig::default();
        let datagrams = FrameStream::default().pack_frame(&sample_frame());
        let text = format_inspect_pretty(&inspect_datagram(&datagrams[0], &config));
        assert!(text.starts_with("version: 0x0100"));
        assert!(text.contains("Master"));
        assert!(text.contains("cam1/v2sps1"));
    }

    #[test]
    fn report_serializes_to_json() {
        let config = WireConfig::default();
        let datagrams = FrameStream::default().pack_frame(&sample_frame());
        let json = serde_json::to_value(inspect_datagram(&datagrams[1], &config)).unwrap();
        assert_eq!(json["chunks"][0]["tag"], "Slave");
        assert!(json["rejected"].is_null());
    }

    #[test]
    fn assemble_in_memory() {
        let config = StreamConfig::default();
        let datagrams = FrameStream::default().pack_frame(&sample_frame());
        let report = assemble(&datagrams, &config);
        assert_eq!(report.datagrams, datagrams.len());
        assert_eq!(report.rejected, 0);
        assert_eq!(report.frames, vec![sample_frame()]);
        assert_eq!(report.incomplete, 0);
    }

    #[test]
    fn assemble_counts_rejections_and_incomplete() {
        let config = StreamConfig::default();
        let datagrams = FrameStream::default().pack_frame(&sample_frame());
        let report = assemble([&datagrams[0][..], &[0u8; 4][..]], &config);
        assert_eq!(report.rejected, 1);
        assert!(report.frames.is_empty());
        assert_eq!(report.incomplete, 1);
    }

    #[test]
    fn pack_then_assemble_files() {
        let dir = scratch_dir("roundtrip");
        let config = StreamConfig::default();
        let written = pack_to_dir(&sample_frame(), &config, &dir).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[0].ends_with("000000.dgram"));

        let paths = collect_datagram_files(&dir, Some("*.dgram")).unwrap();
        assert_eq!(paths, written);
        let report = assemble_files(&paths, &config).unwrap();
        assert_eq!(report.frames, vec![sample_frame()]);

        assert!(collect_datagram_files(&dir, Some("*.bin")).unwrap().is_empty());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn payload_names_ignore_wire_identifiers() {
        let dir = scratch_dir("payloads");
        let frames = vec![
            Frame::new(9, "../..", "/etc", vec![1, 2]),
            Frame::new(9, "t", "f", vec![3]),
        ];
        let written = write_payloads(&frames, &dir).unwrap();
        assert_eq!(
            written,
            vec![dir.join("000000-9.bin"), dir.join("000001-9.bin")]
        );
        assert!(written.iter().all(|path| path.parent() == Some(dir.as_path())));
        assert_eq!(fs::read(&written[0]).unwrap(), vec![1, 2]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn inspect_decodes_identifiers_like_the_receiver() {
        let config = WireConfig::default();
        let frame = Frame::new(3, "ab", "c", vec![1; 10]);
        let datagrams = FrameStream::default().pack_frame(&frame);
        let report = inspect_datagram(&datagrams[0], &config);
        let received = assemble(&datagrams, &StreamConfig::default()).frames;
        assert_eq!(report.chunks[0].task.as_deref(), Some(received[0].task.as_str()));
        assert_eq!(report.chunks[0].flow.as_deref(), Some(received[0].flow.as_str()));
    }

    #[test]
    fn pack_refuses_invalid_frame() {
        let dir = scratch_dir("invalid");
        let frame = Frame::new(1, "", "f", vec![1]);
        assert!(pack_to_dir(&frame, &StreamConfig::default(), &dir).is_err());
        assert!(!dir.exists());
    }

    #[test]
    fn load_config_defaults_and_json() {
        assert_eq!(load_config(None).unwrap(), StreamConfig::default());

        let dir = scratch_dir("config");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("stream.json");
        let config = StreamConfig::new(WireConfig::new(Dialect::OffsetAddressed));
        fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), config);

        fs::write(&path, "{ not json").unwrap();
        assert!(load_config(Some(&path)).is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
