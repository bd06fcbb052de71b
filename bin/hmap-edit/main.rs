use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use heightmod::map::{Brush, BrushShape};
use heightmod::{Config, Terrain};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hmap-edit", about = "Edit a raw terrain heightmap through a replayable edit log")]
struct Cli {
    /// RON config file. Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Headerless base grid, laid out as described by the config.
    #[arg(long)]
    base: PathBuf,
    /// Edit log to replay and update. Created on the first edit.
    #[arg(long)]
    edits: PathBuf,
    /// Flip the base grid vertically after loading.
    #[arg(long)]
    invert_y: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print grid and edit log statistics.
    Info,
    /// Print the interpolated height at a world position and the surface normal of the cell containing it.
    #[command(allow_negative_numbers = true)]
    Sample { x: f32, y: f32 },
    /// Apply a brush centered on grid cell (x, y) and save the log.
    #[command(allow_negative_numbers = true)]
    Brush {
        x: i32,
        y: i32,
        #[arg(long, default_value_t = 8)]
        radius: u32,
        #[arg(long, default_value_t = BrushShape::Cosine)]
        shape: BrushShape,
        /// Elevation change at the center, as a fraction of the full sample range.
        #[arg(long)]
        delta: f32,
    },
    /// Revert the most recent brush and save the log.
    Undo,
    /// Write the edited grid in the same raw layout as the base grid.
    Bake { out: PathBuf },
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::read_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => Config::default(),
    };

    let mut terrain = Terrain::load(&config.base_grid, &cli.base, cli.invert_y, &config.map)?;
    if cli.edits.exists() {
        terrain.load_edits(&cli.edits)?;
    } else {
        log::info!("No edit log at {}, starting fresh", cli.edits.display());
    }

    match cli.command {
        Command::Info => {
            let grid = terrain.grid();
            println!(
                "grid: {}x{}, {} byte(s) per sample",
                grid.width(),
                grid.height(),
                grid.depth().bytes()
            );
            println!(
                "edits: {} cells modified, {} brushes",
                terrain.edits().num_mods(),
                terrain.edits().brushes().len()
            );
            if let Some(last) = terrain.edits().last_brush() {
                println!("last brush: {:?}", last);
            }
        }
        Command::Sample { x, y } => {
            let (cx, cy) = (x.floor() as i32, y.floor() as i32);
            let n = terrain.surface_normal(cx, cy);
            println!("height: {}", terrain.interpolated_height(x, y));
            println!(
                "normal at cell ({}, {}): ({:.4}, {:.4}, {:.4})",
                cx, cy, n.x, n.y, n.z
            );
        }
        Command::Brush {
            x,
            y,
            radius,
            shape,
            delta,
        } => {
            let brush = Brush::new(x, y, radius, shape, terrain.scale_delta(delta));
            let cells = terrain.apply_brush(brush);
            println!("changed {} cells", cells);
            terrain.save_edits(&cli.edits)?;
        }
        Command::Undo => {
            match terrain.undo_last() {
                Some(brush) => println!("undid {:?}", brush),
                None => println!("nothing to undo"),
            }
            terrain.save_edits(&cli.edits)?;
        }
        Command::Bake { out } => {
            std::fs::write(&out, terrain.grid().to_bytes())
                .with_context(|| format!("writing {}", out.display()))?;
            println!("wrote {}", out.display());
        }
    }

    Ok(())
}
