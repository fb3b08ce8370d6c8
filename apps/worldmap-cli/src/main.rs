use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use worldmap_common::Point;
use worldmap_kernel::{OreKind, SampleWorld, WorldState};
use worldmap_persist::{DEFAULT_MAP_FILE, DecodeOptions, MAGIC, MapStore, WorldCodec};

#[derive(Parser)]
#[command(name = "worldmap-cli", about = "CLI tool for worldmap save files")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Map file to operate on
    #[arg(short, long, default_value = DEFAULT_MAP_FILE)]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print format details
    Info,
    /// Build a deterministic sample world and save it
    Generate {
        /// World seed
        #[arg(short, long, default_value = "42")]
        seed: i32,
        /// Side length of each noise chunk
        #[arg(
            short,
            long,
            default_value = "16",
            value_parser = clap::value_parser!(u32).range(..=i32::MAX as i64)
        )]
        chunk_size: u32,
        /// Chunks from -radius..=radius on each axis are populated
        #[arg(short, long, default_value = "1")]
        radius: i32,
    },
    /// Load a map and print its contents
    Inspect {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
        /// Reject files whose chunk size differs
        #[arg(long)]
        expect_chunk_size: Option<u32>,
    },
    /// Load a map, re-encode it and compare with the file bytes
    Verify {
        /// Reject files whose chunk size differs
        #[arg(long)]
        expect_chunk_size: Option<u32>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    tracing::debug!(file = %cli.file.display(), command = ?cli.command, "dispatching");
    match cli.command {
        Commands::Info => {
            println!("worldmap-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("signature: {MAGIC:02x?}");
            println!("byte order: little-endian");
            println!("default file: {DEFAULT_MAP_FILE}");
            println!("ore kinds:");
            for kind in OreKind::ALL {
                println!("  {:>3} {}", kind.tag(), kind.name());
            }
        }
        Commands::Generate {
            seed,
            chunk_size,
            radius,
        } => {
            let world = SampleWorld {
                seed,
                chunk_size,
                radius,
            }
            .build()
            .context("building sample world")?;
            let store = MapStore::new(&cli.file);
            let written = store
                .save(&world)
                .with_context(|| format!("saving {}", cli.file.display()))?;
            println!("Wrote {written} bytes to {}", cli.file.display());
            print_summary(&world);
        }
        Commands::Inspect {
            json,
            expect_chunk_size,
        } => {
            let world = load(&cli.file, expect_chunk_size)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&world.summary())?);
            } else {
                print_summary(&world);
                print_chunks(&world);
            }
        }
        Commands::Verify { expect_chunk_size } => {
            let world = load(&cli.file, expect_chunk_size)?;
            let on_disk = MapStore::new(&cli.file).read_bytes()?;
            let encoded = WorldCodec::new().encode_to_vec(&world)?;
            if encoded != on_disk {
                bail!(
                    "re-encoded map differs from {} ({} bytes vs {} on disk)",
                    cli.file.display(),
                    encoded.len(),
                    on_disk.len()
                );
            }
            println!("OK: {} ({} bytes)", cli.file.display(), on_disk.len());
        }
    }

    Ok(())
}

fn load(path: &Path, expect_chunk_size: Option<u32>) -> anyhow::Result<WorldState> {
    let options = DecodeOptions {
        expected_chunk_size: expect_chunk_size,
    };
    MapStore::with_options(path, options)
        .load()
        .with_context(|| format!("loading {}", path.display()))
}

fn print_summary(world: &WorldState) {
    let s = world.summary();
    println!("seed={} chunk_size={}", s.seed, s.chunk_size);
    println!("ores: {} deposits in {} chunks", s.ore_deposits, s.ore_chunks);
    println!(
        "structures: {} in {} chunks",
        s.structures, s.structure_chunks
    );
    println!("buildings: {}", s.buildings);
    println!("noise chunks: {}", s.noise_chunks);
}

fn print_chunks(world: &WorldState) {
    for (chunk, kinds) in world.ores() {
        let counts: Vec<String> = kinds
            .iter()
            .map(|(kind, points)| format!("{}={}", kind.name(), points.len()))
            .collect();
        println!("  ore chunk {chunk}: {}", counts.join(" "));
    }
    for (chunk, list) in world.structures() {
        for s in list {
            println!(
                "  structure chunk {chunk}: type={} at {} footprint={}",
                s.structure_type,
                s.position,
                s.points.len()
            );
        }
    }
    for b in world.buildings() {
        println!("  building at {} footprint={}", b.position, b.points.len());
    }
    for (chunk, grid) in world.noise_chunks() {
        let (min, max) = grid
            .samples()
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let origin = Point::new(
            chunk.x.wrapping_mul(grid.size() as i32),
            chunk.y.wrapping_mul(grid.size() as i32),
        );
        println!("  noise chunk {chunk} origin {origin}: min={min:.3} max={max:.3}");
    }
}
