//! Cubical Persistence: Homology of a Sampled Space
//!
//! Samples a synthetic shape (or reads a CSV point cloud), estimates its
//! density, builds the cubical filtration and prints the lifetime of every
//! hole.
//!
//! ## Protocol
//!
//! 1. Sample or load the point cloud
//! 2. Fit a Gaussian KDE with the configured bandwidth
//! 3. Build the grid and the filtration
//! 4. Run the persistence reduction
//! 5. Report holes per dimension and the final Betti numbers
//!
//! ```bash
//! cargo run --release --bin cubical_persistence -- --shape s1 --points 800 --precision 25
//! cargo run --release --bin cubical_persistence -- --csv cloud.csv --pruning 0.8 --json pd.json
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

use tda_cubical::{
    Bandwidth, Filtration, FiltrationConfig, PersistentHomology, PointCloud, SampleConfig, Shape,
    TdaResult,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ShapeArg {
    /// Two clusters on a line
    S0,
    /// Circle
    S1,
    /// Sphere
    S2,
    /// Torus
    T2,
    /// Real projective plane in R^4
    Rp2,
    /// Two touching circles
    #[value(name = "s1vs1")]
    S1vS1,
}

impl From<ShapeArg> for Shape {
    fn from(arg: ShapeArg) -> Self {
        match arg {
            ShapeArg::S0 => Shape::S0 { radius: 1.0 },
            ShapeArg::S1 => Shape::circle(),
            ShapeArg::S2 => Shape::sphere(),
            ShapeArg::T2 => Shape::torus(),
            ShapeArg::Rp2 => Shape::Rp2,
            ShapeArg::S1vS1 => Shape::S1vS1 { radius: 1.0 },
        }
    }
}

/// Persistent homology of a KDE cubical filtration.
#[derive(Parser, Debug)]
#[command(name = "cubical_persistence", version, about, long_about = None)]
struct Args {
    /// Synthetic shape to sample.
    #[arg(long, value_enum, default_value = "s1", conflicts_with = "csv")]
    shape: ShapeArg,

    /// Read the cloud from a `;`-separated CSV file (one row per axis).
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Number of sampled points.
    #[arg(long, default_value_t = 1000)]
    points: usize,

    /// Standard deviation of the sampling noise.
    #[arg(long, default_value_t = 0.1)]
    noise: f64,

    /// Seed of the sampler.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// JSON filtration configuration; the flags below override it.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Lattice points per axis.
    #[arg(long)]
    precision: Option<usize>,

    /// Fraction of each axis range added to the bounding box.
    #[arg(long)]
    margin: Option<f64>,

    /// Keep only cubes with value below this threshold, in (0, 1].
    #[arg(long)]
    pruning: Option<f64>,

    /// KDE bandwidth factor; 0 selects Scott's rule.
    #[arg(long)]
    bandwidth: Option<f64>,

    /// Write the persistence diagram as JSON.
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Write the point cloud as CSV.
    #[arg(long, value_name = "FILE")]
    export_csv: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    let log_level_filter = args
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(log_level_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> TdaResult<()> {
    println!("═══════════════════════════════════════════════════════════════");
    println!("  Cubical Persistence: KDE Filtration Homology");
    println!("═══════════════════════════════════════════════════════════════\n");

    let mut config = match args.config.as_deref() {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            FiltrationConfig::from_json(path)?
        }
        None => FiltrationConfig::default(),
    };
    if let Some(precision) = args.precision {
        config.precision = precision;
    }
    if let Some(margin) = args.margin {
        config.margin = margin;
    }
    if args.pruning.is_some() {
        config.pruning = args.pruning;
    }
    if let Some(bandwidth) = args.bandwidth {
        config.bandwidth = Bandwidth::from_value(bandwidth);
    }
    config.validate()?;

    let cloud = match args.csv.as_deref() {
        Some(path) => {
            info!("Reading point cloud from {}", path.display());
            PointCloud::from_csv(path)?
        }
        None => {
            let sample = SampleConfig {
                shape: args.shape.into(),
                points: args.points,
                noise: args.noise,
                seed: args.seed,
            };
            sample.validate()?;
            sample.shape.sample(sample.points, sample.noise, sample.seed)?
        }
    };
    if let Some(path) = args.export_csv.as_deref() {
        cloud.to_csv(path)?;
        info!("Point cloud written to {}", path.display());
    }

    println!("Parameters:");
    println!("  {}", cloud);
    println!("  precision = {}", config.precision);
    println!("  margin    = {:.3}", config.margin);
    match config.pruning {
        Some(p) => println!("  pruning   = {:.3}", p),
        None => println!("  pruning   = none"),
    }
    println!("  bandwidth = {:?}", config.bandwidth);
    println!();

    let start = Instant::now();
    let grid = cloud.grid(config.precision, config.margin)?;
    let kde = cloud.kde(config.bandwidth)?;
    println!("KDE bandwidth factor: {:.4}", kde.factor());

    let filtration = Filtration::from_grid(grid, &kde, config.pruning)?;
    println!("{}", filtration.grid());
    println!("{}", filtration);

    let homology = PersistentHomology::compute(&filtration)?;
    println!("Computed in {:.2?}\n", start.elapsed());

    println!("Holes:");
    print!("{homology}");
    println!();

    println!("Summary:");
    let diagram = homology.diagram();
    let betti = homology.betti_numbers();
    for d in 0..homology.dimension() {
        println!(
            "  H{}: {} holes, max life {:.4}, β{} at end = {}",
            d,
            diagram.count(d),
            diagram.max_persistence(d),
            d,
            betti.beta(d)
        );
    }
    println!("  Euler characteristic: {}", homology.euler_characteristic());

    if let Some(path) = args.json.as_deref() {
        diagram.to_json(path)?;
        info!("Persistence diagram written to {}", path.display());
    }

    Ok(())
}
