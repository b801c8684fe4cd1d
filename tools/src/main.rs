use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chunkwire_tools::{
    assemble_files, collect_datagram_files, format_inspect_pretty, inspect_datagram, load_config,
    pack_to_dir, write_payloads,
};
use clap::{Parser, Subcommand, ValueEnum};
use transport::Frame;

#[derive(Parser)]
#[command(
    name = "chunkwire-tools",
    version,
    about = "chunkwire datagram inspection and packing tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect datagram structure and chunk layout.
    Inspect {
        /// Path to a datagram file or a directory of them.
        path: PathBuf,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
        /// Stream configuration JSON.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Pack a payload file into datagram files.
    Pack {
        /// Path to the payload bytes.
        payload: PathBuf,
        #[arg(long)]
        task: String,
        #[arg(long)]
        flow: String,
        #[arg(long)]
        id: u32,
        #[arg(long, default_value_t = 0)]
        sequence: u16,
        /// Directory receiving `NNNNNN.dgram` files.
        #[arg(long)]
        out: PathBuf,
        /// Stream configuration JSON.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Reassemble frames from a directory of datagram files, in name order.
    Assemble {
        dir: PathBuf,
        /// Optional glob filter for datagram files.
        #[arg(long)]
        glob: Option<String>,
        /// Stream configuration JSON.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory receiving one payload file per completed frame.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Inspect {
            path,
            glob,
            format,
            config,
        } => {
            let config = load_config(config.as_deref()).context("load config")?;
            let paths = if path.is_dir() {
                collect_datagram_files(&path, glob.as_deref())?
            } else {
                vec![path]
            };
            let multiple = paths.len() > 1;
            for path in paths {
                let bytes = fs::read(&path)
                    .with_context(|| format!("read datagram {}", path.display()))?;
                let report = inspect_datagram(&bytes, &config.wire);
                match format {
                    OutputFormat::Json => {
                        let json =
                            serde_json::to_string_pretty(&report).context("serialize json")?;
                        println!("{json}");
                    }
                    OutputFormat::Pretty => {
                        if multiple {
                            println!("== {} ({} bytes) ==", path.display(), bytes.len());
                        }
                        print!("{}", format_inspect_pretty(&report));
                    }
                }
            }
        }
        Command::Pack {
            payload,
            task,
            flow,
            id,
            sequence,
            out,
            config,
        } => {
            let config = load_config(config.as_deref()).context("load config")?;
            let bytes = fs::read(&payload)
                .with_context(|| format!("read payload {}", payload.display()))?;
            let frame = Frame::new(id, task, flow, bytes).with_sequence(sequence);
            let written = pack_to_dir(&frame, &config, &out)?;
            println!(
                "frame {id}: {} bytes in {} datagrams -> {}",
                frame.payload.len(),
                written.len(),
                out.display()
            );
        }
        Command::Assemble {
            dir,
            glob,
            config,
            out,
        } => {
            let config = load_config(config.as_deref()).context("load config")?;
            let paths = collect_datagram_files(&dir, glob.as_deref())?;
            let report = assemble_files(&paths, &config)?;
            println!(
                "datagrams: {} rejected: {} chunks accepted: {}",
                report.datagrams, report.rejected, report.chunks_accepted
            );
            for frame in &report.frames {
                println!(
                    "frame {}: {}/{} seq {} priority {} {} bytes",
                    frame.id.raw(),
                    frame.task,
                    frame.flow,
                    frame.sequence,
                    frame.priority,
                    frame.payload.len()
                );
            }
            if report.incomplete > 0 {
                println!("incomplete frames: {}", report.incomplete);
            }
            if let Some(out) = out {
                let written = write_payloads(&report.frames, &out)?;
                println!("wrote {} payloads -> {}", written.len(), out.display());
            }
        }
    }
    Ok(())
}
