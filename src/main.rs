//! vecclust CLI - cluster a dataset and export centroids/assignments

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vecclust::pipeline::{assignments, centroids, cluster, inspect, prefix};
use vecclust::{PipelineConfig, VecsKind};

#[derive(Parser)]
#[command(name = "vecclust")]
#[command(about = "K-means centroids and assignments for bvecs datasets", long_about = None)]
struct Cli {
    /// TOML config file; built-in defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster the dataset and save centroid/assignment arrays
    Cluster(Overrides),
    /// Convert the centroid array to fvecs
    Centroids(Overrides),
    /// Convert the assignment array to ivecs
    Assignments(Overrides),
    /// Run cluster, centroids and assignments in order
    Run(Overrides),
    /// Copy the first N vectors of a bvecs file
    Prefix {
        input: PathBuf,
        output: PathBuf,
        count: usize,
        /// Expected dimension of every record
        #[arg(short, long)]
        dimension: Option<usize>,
    },
    /// Validate a vecs file and print its shape
    Inspect {
        path: PathBuf,
        /// Element type; inferred from the extension when omitted
        #[arg(short, long, value_enum)]
        kind: Option<VecsKind>,
        /// Expected dimension of every record
        #[arg(short, long)]
        dimension: Option<usize>,
    },
}

/// Per-run overrides of the config file
#[derive(Args)]
struct Overrides {
    #[arg(long)]
    dataset: Option<PathBuf>,
    #[arg(long)]
    dimension: Option<usize>,
    #[arg(long)]
    num_clusters: Option<usize>,
    #[arg(long)]
    max_vectors: Option<usize>,
    #[arg(long)]
    iterations: Option<usize>,
    #[arg(long)]
    restarts: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
}

impl Overrides {
    fn apply(self, config: &mut PipelineConfig) {
        let c = &mut config.clustering;
        if let Some(dataset) = self.dataset {
            config.paths.dataset = dataset;
        }
        if let Some(v) = self.dimension {
            c.dimension = v;
        }
        if let Some(v) = self.num_clusters {
            c.num_clusters = v;
        }
        if let Some(v) = self.max_vectors {
            c.max_vectors = Some(v);
        }
        if let Some(v) = self.iterations {
            c.iterations = v;
        }
        if let Some(v) = self.restarts {
            c.restarts = v;
        }
        if let Some(v) = self.seed {
            c.seed = Some(v);
        }
    }
}

fn load_config(path: Option<&PathBuf>, overrides: Overrides) -> anyhow::Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_ref();

    match cli.command {
        Commands::Cluster(o) => {
            let config = load_config(config_path, o)?;
            let summary = cluster::run(&config).context("clustering failed")?;
            println!(
                "Clustered {} vectors ({} dims) into {} centroids, objective {:.4e}",
                summary.vectors, summary.dimension, summary.clusters, summary.objective
            );
        }
        Commands::Centroids(o) => {
            let config = load_config(config_path, o)?;
            let n = centroids::run(&config).context("centroid export failed")?;
            println!("Wrote {} centroids to {}", n, config.paths.centroids_vecs.display());
        }
        Commands::Assignments(o) => {
            let config = load_config(config_path, o)?;
            let n = assignments::run(&config).context("assignment export failed")?;
            println!("Wrote {} assignments to {}", n, config.paths.assignments_vecs.display());
        }
        Commands::Run(o) => {
            let config = load_config(config_path, o)?;
            let summary = cluster::run(&config).context("clustering failed")?;
            let c = centroids::run(&config).context("centroid export failed")?;
            let a = assignments::run(&config).context("assignment export failed")?;
            println!(
                "Clustered {} vectors into {} centroids (objective {:.4e}); wrote {} + {} records",
                summary.vectors, summary.clusters, summary.objective, c, a
            );
        }
        Commands::Prefix {
            input,
            output,
            count,
            dimension,
        } => {
            let n = prefix::run(&input, &output, count, dimension)
                .with_context(|| format!("copying prefix of {}", input.display()))?;
            println!("Copied {} vectors to {}", n, output.display());
        }
        Commands::Inspect {
            path,
            kind,
            dimension,
        } => {
            let s = inspect::run(&path, kind, dimension)
                .with_context(|| format!("inspecting {}", path.display()))?;
            println!("{}", path.display());
            println!("  records    : {}", s.records);
            println!("  dimension  : {}", s.dimension);
            println!("  min / max  : {} / {}", s.min, s.max);
            println!("  non-finite : {}", s.non_finite);
        }
    }

    Ok(())
}
