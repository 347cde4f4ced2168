//! interfere CLI - clearance and interference checks between solids
//!
//! Runs an analysis over a JSON scene and inspects the resulting scratch
//! file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use interfere::{
    InterferenceConfig, InterferenceEngine, InterferenceOutputs, OutputKind, OutputValue, Scene,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "interfere")]
#[command(about = "Minimum distance and interference between solid bodies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a JSON scene and write a scratch file
    Run {
        /// Scene description (.json)
        scene: PathBuf,
        /// Run configuration (.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Scratch file to write
        #[arg(short, long, default_value = "interference.bin")]
        scratch: PathBuf,
        /// Nearest-neighbour worker threads
        #[arg(short, long)]
        workers: Option<usize>,
    },
    /// Print outputs stored in a scratch file
    Show {
        /// Scratch file written by `run`
        scratch: PathBuf,
        /// Output to print (default: all)
        #[arg(short, long)]
        output: Option<OutputKind>,
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scene,
            config,
            scratch,
            workers,
        } => {
            run_scene(&scene, config.as_deref(), &scratch, workers)?;
        }
        Commands::Show {
            scratch,
            output,
            json,
        } => {
            show_outputs(&scratch, output, json)?;
        }
    }

    Ok(())
}

fn run_scene(
    scene_path: &Path,
    config_path: Option<&Path>,
    scratch: &Path,
    workers: Option<usize>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => InterferenceConfig::load(path)?,
        None => InterferenceConfig::default(),
    };
    if workers.is_some() {
        config.workers = workers;
    }

    let scene = Scene::load(scene_path)?;
    let bodies = scene.build(&config.attr_name)?;
    info!(scene = %scene_path.display(), bodies = bodies.len(), "loaded scene");

    let engine = InterferenceEngine::new(config)?;
    let report = engine
        .run(&bodies, scratch)
        .with_context(|| format!("interference run on {}", scene_path.display()))?;

    println!("Distances ({} bodies):", report.len());
    print_table(report.names(), report.len(), |i, j| report.distance(i, j));
    Ok(())
}

fn show_outputs(scratch: &Path, output: Option<OutputKind>, json: bool) -> Result<()> {
    let outputs = InterferenceOutputs::open(scratch);
    let kinds = match output {
        Some(kind) => vec![kind],
        None => OutputKind::ALL.to_vec(),
    };

    if json {
        let mut doc = serde_json::Map::new();
        for kind in kinds {
            doc.insert(kind.name().to_string(), outputs.value(kind)?.to_json());
        }
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    let names = outputs
        .names()
        .with_context(|| format!("reading {}", scratch.display()))?;
    for kind in kinds {
        println!("{kind}:");
        match outputs.value(kind)? {
            OutputValue::Names(list) => {
                for (i, name) in list.iter().enumerate() {
                    println!("  {}: {}", i + 1, name);
                }
            }
            OutputValue::Matrix(m) if kind == OutputKind::Distances => {
                print_table(names, m.nrows(), |i, j| m[(i, j)]);
            }
            OutputValue::Matrix(m) => {
                for r in 0..m.nrows() {
                    let row: Vec<String> = m.row(r).iter().map(|v| format!("{v:>14.6e}")).collect();
                    println!("  {}", row.join(" "));
                }
            }
        }
        println!();
    }
    Ok(())
}

fn print_table(names: &[String], n: usize, value: impl Fn(usize, usize) -> f64) {
    let width = names.iter().map(String::len).max().unwrap_or(0).max(12);
    print!("  {:width$}", "");
    for name in names {
        print!(" {name:>width$}");
    }
    println!();
    for i in 0..n {
        print!("  {:width$}", names[i]);
        for j in 0..n {
            print!(" {:>width$.6}", value(i, j));
        }
        println!();
    }
}
