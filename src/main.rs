use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use gang_network_analyzer::classify::{Feature, Target};
use gang_network_analyzer::cluster::Linkage;
use gang_network_analyzer::data::TieEnumeration;
use gang_network_analyzer::{load_network, run_analysis, storage, viz, Config};

#[derive(Parser, Debug)]
#[clap(
    name = "gang-network-analyzer",
    about = "Co-offending network analysis of a London street gang"
)]
struct Cli {
    /// Path to the tie-weight matrix CSV
    #[clap(long)]
    matrix: PathBuf,

    /// Path to the person attribute CSV
    #[clap(long)]
    attributes: PathBuf,

    /// Output directory for results
    #[clap(long, default_value = "network_results")]
    output_dir: PathBuf,

    /// Required number of people (0 accepts any size)
    #[clap(long, default_value = "54")]
    expected_nodes: usize,

    /// How ties are enumerated from the symmetric matrix
    #[clap(long, value_enum, default_value = "directed")]
    tie_mode: TieEnumeration,

    /// Decimal places the power iteration must agree to
    #[clap(long, default_value = "6")]
    power_precision: u32,

    /// Iteration cap for the power iteration
    #[clap(long, default_value = "10000")]
    power_max_iterations: usize,

    /// Value added to the matrix diagonal before the power iteration
    #[clap(long, default_value = "1.0")]
    power_diagonal: f64,

    /// Linkage for hierarchical clustering
    #[clap(long, value_enum, default_value = "average")]
    linkage: Linkage,

    /// Number of clusters cut from the dendrogram
    #[clap(long, default_value = "4")]
    clusters: usize,

    /// Cut the dendrogram at this dissimilarity instead (overrides --clusters)
    #[clap(long)]
    cut_height: Option<f64>,

    /// Attribute the classifiers predict
    #[clap(long, value_enum, default_value = "prison")]
    target: Target,

    /// Classifier features, comma separated (default: all but strength)
    #[clap(long, value_enum, value_delimiter = ',')]
    features: Vec<Feature>,

    /// Seed for the train/test split
    #[clap(long, default_value = "42")]
    seed: u64,

    /// Share of people held out for testing
    #[clap(long, default_value = "0.3")]
    test_fraction: f64,

    /// Maximum decision tree depth
    #[clap(long, default_value = "3")]
    tree_depth: usize,

    /// People listed per metric in the rankings
    #[clap(long, default_value = "5")]
    top: usize,

    /// Skip visualizations
    #[clap(long)]
    skip_viz: bool,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::default();
        config.expected_nodes = (self.expected_nodes > 0).then_some(self.expected_nodes);
        config.tie_mode = self.tie_mode;
        config.power.precision = self.power_precision;
        config.power.max_iterations = self.power_max_iterations;
        config.power.diagonal = self.power_diagonal;
        config.clustering.linkage = self.linkage;
        config.clustering.clusters = self.clusters;
        config.clustering.cut_height = self.cut_height;
        config.classifier.target = self.target;
        if !self.features.is_empty() {
            config.classifier.features = self.features.clone();
        }
        config.classifier.seed = self.seed;
        config.classifier.test_fraction = self.test_fraction;
        config.classifier.tree.max_depth = self.tree_depth;
        config.top_k = self.top;
        config
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    log::info!("Starting gang network analysis");
    log::info!("Matrix: {}", args.matrix.display());
    log::info!("Attributes: {}", args.attributes.display());
    log::info!("Output: {}", args.output_dir.display());

    let config = args.config();

    // 1. Load data
    let network = load_network(&args.matrix, &args.attributes, config.expected_nodes)?;
    log::info!(
        "Loaded {} people with {} ties",
        network.size(),
        network.matrix.tie_count()
    );

    // 2. Analyse
    let analysis = run_analysis(&network, &config)?;
    if let Some(error) = &analysis.power_error {
        log::warn!("Continuing without power scores: {}", error);
    }
    if let Some(error) = &analysis.classification_error {
        log::warn!("Continuing without classifiers: {}", error);
    }

    // 3. Save results
    storage::save_results(&analysis, &config, &args.output_dir)?;

    // 4. Generate visualizations if requested
    if !args.skip_viz {
        viz::generate_visualizations(&analysis, &args.output_dir)?;
    }

    log::info!("Analysis complete. Results saved to {}", args.output_dir.display());

    Ok(())
}
