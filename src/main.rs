use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;

use wilderness_engine::ascii::{self, MapShape, MapView};
use wilderness_engine::config::{ChannelSeeds, WorldConfig};
use wilderness_engine::export;
use wilderness_engine::terrain::Field;
use wilderness_engine::world::Wilderness;

#[derive(Parser, Debug)]
#[command(name = "wilderness_engine")]
#[command(about = "Explore and export the procedural wilderness")]
struct Args {
    /// Load a world configuration from a JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Master seed; derives all channel seeds (overrides the config)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Center X coordinate
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    x: i32,

    /// Center Y coordinate
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    y: i32,

    /// Map radius in tiles
    #[arg(short, long, default_value = "10")]
    radius: i32,

    /// Show the full square grid instead of the circular viewport
    #[arg(long)]
    rect: bool,

    /// Overlay storm fronts on the map
    #[arg(long)]
    weather: bool,

    /// Print the terrain sample at (x, y) instead of a map
    #[arg(long)]
    probe: bool,

    /// Export the world map to a PNG at this path
    #[arg(long)]
    export_map: Option<String>,

    /// Width/height of the exported world map in pixels
    #[arg(long, default_value = "1024")]
    export_size: u32,

    /// Export a raw noise channel (elevation, distortion, moisture, weather)
    #[arg(long)]
    export_noise: Option<String>,

    /// Write the rendered map to a text file as well as stdout
    #[arg(long)]
    export_ascii: Option<String>,

    /// Zoom factor for noise export (0 = base framing)
    #[arg(long, default_value = "0")]
    zoom: u32,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match WorldConfig::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => WorldConfig::default(),
    };

    if let Some(master) = args.seed {
        config.seeds = ChannelSeeds::from_master(master);
        println!("Deriving channel seeds from master seed {master}");
    }

    let world = match Wilderness::new(config) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Weather fronts drift with the wall clock.
    let time_base = (Local::now().timestamp().rem_euclid(100_000)) as f64 / 100_000.0;

    if args.probe {
        let terrain = world.terrain();
        let sample = terrain.sample(args.x, args.y);
        println!("Location     : ({}, {})", args.x, args.y);
        println!("Elevation    : {}", sample.elevation);
        println!("Temperature  : {}", sample.temperature);
        println!("Moisture     : {}", sample.moisture);
        println!("Weather      : {}", terrain.weather(args.x, args.y, time_base));
        println!("Sector       : {}", world.sector_at(args.x, args.y));
        return ExitCode::SUCCESS;
    }

    if let Some(path) = &args.export_map {
        println!("Exporting {}x{} world map to {path}...", args.export_size, args.export_size);
        if let Err(e) = export::export_map(&world, args.export_size, args.export_size, path) {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
        println!("Done.");
        return ExitCode::SUCCESS;
    }

    if let Some(field_name) = &args.export_noise {
        let field = match field_name.as_str() {
            "elevation" => Field::Elevation,
            "distortion" => Field::ElevationDistortion,
            "moisture" => Field::Moisture,
            "weather" => Field::Weather,
            other => {
                eprintln!("error: unknown noise field '{other}'");
                return ExitCode::FAILURE;
            }
        };
        let path = format!("noise_{}_{}.png", field_name, Local::now().format("%Y%m%d_%H%M%S"));
        println!("Exporting {field_name} channel to {path}...");
        if let Err(e) =
            export::export_noise(world.terrain(), field, args.export_size, args.export_size, args.zoom, &path)
        {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
        println!("Done.");
        return ExitCode::SUCCESS;
    }

    let shape = if args.rect { MapShape::Rect } else { MapShape::Circle };
    let view = if args.weather { MapView::Weather } else { MapView::Terrain };

    let grid = world.render(args.x, args.y, args.radius, time_base);
    print!("{}", ascii::render_to_string(&grid, shape, view));
    println!(" Current Location : ({}, {})", args.x, args.y);
    println!(" Sector           : {}", world.sector_at(args.x, args.y));

    if let Some(path) = &args.export_ascii {
        if let Err(e) = ascii::export_ascii(&grid, shape, view, path) {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
        println!("Wrote {path}");
    }

    ExitCode::SUCCESS
}
