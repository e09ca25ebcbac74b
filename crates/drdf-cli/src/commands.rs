use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use drdf_format::{DrdfReader, StreamSummary};
use drdf_store::DrdfStore;
use drdf_types::{Image, PixelAu16Tu16, PixelType, RunId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?;
    let reader = DrdfReader::new(config.read);
    match cli.command {
        Command::Create(args) => cmd_create(args, cli.format),
        Command::Read(args) => cmd_read(&reader, args, cli.format),
        Command::Verify(args) => cmd_verify(&reader, args, cli.format),
        Command::Merge(args) => cmd_merge(&reader, args, cli.format),
    }
}

// ---------------------------------------------------------------------------
// Summaries (shared by text and JSON output)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub id: String,
    pub georef: String,
    pub events: Vec<EventSummary>,
}

#[derive(Debug, Serialize)]
pub struct EventSummary {
    pub id: u32,
    pub amplitude_sum: f64,
    pub images: Vec<ImageSummary>,
}

#[derive(Debug, Serialize)]
pub struct ImageSummary {
    pub source: String,
    pub width: u32,
    pub height: u32,
    pub pixel_type: PixelType,
    pub bytes: usize,
}

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    pub runs: usize,
    pub events: usize,
    pub images: usize,
    pub chunks: usize,
    pub bytes: u64,
    pub checksum: String,
}

impl FileReport {
    fn new(path: &Path, store: &DrdfStore, summary: &StreamSummary) -> Self {
        Self {
            path: path.display().to_string(),
            runs: store.len(),
            events: store.event_count(),
            images: store.image_count(),
            chunks: summary.chunks,
            bytes: summary.bytes,
            checksum: format!("{:#010x}", summary.checksum),
        }
    }

    fn print(&self, verb: &str, format: OutputFormat) -> anyhow::Result<()> {
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(self)?),
            OutputFormat::Text => {
                println!("{} {} {}", "✓".green().bold(), verb, self.path.bold());
                println!(
                    "  {} runs, {} events, {} images",
                    self.runs, self.events, self.images
                );
                println!(
                    "  {} chunks, {} bytes, checksum {}",
                    self.chunks,
                    self.bytes,
                    self.checksum.cyan()
                );
            }
        }
        Ok(())
    }
}

pub fn summarize(store: &DrdfStore) -> Vec<RunSummary> {
    store
        .runs()
        .map(|(id, run)| RunSummary {
            id: id.to_string(),
            georef: run.georef().to_string(),
            events: run
                .events()
                .map(|(event_id, event)| EventSummary {
                    id: *event_id,
                    amplitude_sum: event.amplitude_sum(),
                    images: event
                        .images()
                        .map(|(source, image)| ImageSummary {
                            source: source.clone(),
                            width: image.width(),
                            height: image.height(),
                            pixel_type: image.pixel_type(),
                            bytes: image.size(),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Store construction
// ---------------------------------------------------------------------------

/// Name of the `index`-th camera in a generated event.
pub fn source_name(index: u32) -> String {
    format!("CAM_NORTH_X05_Y{index:02}")
}

/// One run of random `Au16Tu16` images. Only the run id depends on the clock.
pub fn generate_store(args: &CreateArgs) -> anyhow::Result<DrdfStore> {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut store = DrdfStore::new();
    store.start_run(RunId::new_v1());
    store.set_georef(args.georef.as_str())?;

    let pixel_count = usize::from(args.size) * usize::from(args.size);
    for _ in 0..args.events {
        let event = u32::from(rng.gen::<u16>());
        store.start_event(event)?;
        for index in 0..args.sources {
            let pixels: Vec<PixelAu16Tu16> = (0..pixel_count)
                .map(|_| PixelAu16Tu16 {
                    amplitude: rng.gen(),
                    time: rng.gen(),
                })
                .collect();
            let mut image = Image::from_pixels(args.size, args.size, &pixels)?;
            store.move_image(source_name(index), &mut image)?;
        }
    }
    Ok(store)
}

/// Copy every event of every input into a fresh run of `merged`.
pub fn flatten_into(merged: &mut DrdfStore, input: &DrdfStore) -> anyhow::Result<()> {
    for (_, run) in input.runs() {
        for (event_id, event) in run.events() {
            merged.start_event(*event_id)?;
            for (source, image) in event.images() {
                merged.add_image(source.as_str(), image)?;
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_create(args: CreateArgs, format: OutputFormat) -> anyhow::Result<()> {
    let store = generate_store(&args)?;
    let summary = drdf_format::write_file(&store, &args.file)
        .with_context(|| format!("writing {}", args.file.display()))?;
    info!(path = %args.file.display(), seed = args.seed, "created");
    FileReport::new(&args.file, &store, &summary).print("Created", format)
}

fn cmd_read(reader: &DrdfReader, args: ReadArgs, format: OutputFormat) -> anyhow::Result<()> {
    let store = reader
        .read_file(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let runs = summarize(&store);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&runs)?),
        OutputFormat::Text => {
            for run in &runs {
                println!(
                    "{} {}  georef {}  ({} events)",
                    "run".bold(),
                    run.id.yellow(),
                    run.georef.cyan(),
                    run.events.len()
                );
                for event in &run.events {
                    println!(
                        "  {} {:<6} {} images, amplitude {}",
                        "event".bold(),
                        event.id,
                        event.images.len(),
                        event.amplitude_sum
                    );
                    for image in &event.images {
                        println!(
                            "    {:<20} {}x{} {:<8} {} bytes",
                            image.source.green(),
                            image.width,
                            image.height,
                            image.pixel_type.to_string(),
                            image.bytes
                        );
                    }
                }
            }
        }
    }
    Ok(())
}

fn cmd_verify(reader: &DrdfReader, args: VerifyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (store, summary) = reader
        .decode_file(&args.file)
        .with_context(|| format!("verifying {}", args.file.display()))?;
    FileReport::new(&args.file, &store, &summary).print("Verified", format)
}

fn cmd_merge(reader: &DrdfReader, args: MergeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut merged = DrdfStore::new();
    merged.start_run(RunId::new_v1());
    merged.set_georef(args.georef.as_str())?;

    for input in &args.inputs {
        let store = reader
            .read_file(input)
            .with_context(|| format!("reading {}", input.display()))?;
        flatten_into(&mut merged, &store)?;
        info!(input = %input.display(), events = store.event_count(), "merged");
    }

    let summary = drdf_format::write_file(&merged, &args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    FileReport::new(&args.output, &merged, &summary).print("Merged into", format)
}
