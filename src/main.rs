use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::Serialize;
use tracing::info;

use hashforest_classify::{
    BatchClassifier, ClassifierConfig, CrossValidation, DataSpecification, FeatureMetadata,
    RowSource,
};
use hashforest_io::{ExperimentName, ResultWriter, Table, TableReader};
use hashforest_rf::{MaxFeatures, RandomForestConfig, SplitCriterion};

#[derive(Parser)]
#[command(name = "hashforest")]
#[command(about = "Random forest classification of mixed categorical and numeric attributes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Which columns to use and how to read them.
#[derive(Args, Debug, Clone)]
struct ColumnArgs {
    /// Name of the label column
    #[arg(long)]
    label: String,

    /// Comma-separated feature column names (defaults to every other column)
    #[arg(long, value_delimiter = ',')]
    features: Vec<String>,

    /// Comma-separated feature columns to parse as numbers where possible
    #[arg(long, value_delimiter = ',')]
    numeric: Vec<String>,
}

/// Encoder and forest hyper-parameters.
#[derive(Args, Debug, Clone)]
struct ModelArgs {
    /// Length of the hashed feature vector
    #[arg(long, default_value_t = hashforest_classify::DEFAULT_VECTOR_LENGTH)]
    vector_length: usize,

    /// Slots per hashed token
    #[arg(long, default_value_t = 1)]
    probes: usize,

    /// Number of trees in the forest
    #[arg(long, default_value_t = hashforest_rf::DEFAULT_TREES)]
    n_trees: usize,

    /// Columns examined per split: "sqrt", "log2", "all", a count, or a fraction in (0, 1)
    #[arg(long, default_value = "sqrt")]
    max_features: String,

    /// Maximum tree depth (unlimited if not set)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Minimum rows in a node for it to be split
    #[arg(long, default_value_t = 2)]
    min_samples_split: usize,

    /// Minimum rows in each child of a split
    #[arg(long, default_value_t = 1)]
    min_samples_leaf: usize,

    /// Split criterion: "gini", "entropy", or "classification-error"
    #[arg(long, default_value = "gini")]
    criterion: String,

    /// Share of rows drawn per tree (1.0 = bootstrap with replacement)
    #[arg(long, default_value_t = 1.0)]
    subsample: f64,
}

#[derive(Subcommand)]
enum Command {
    /// Cross-validate the classifier on one labeled CSV file
    Evaluate {
        /// Path to the labeled CSV file
        #[arg(long)]
        data: PathBuf,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: ExperimentName,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Number of cross-validation folds
        #[arg(long, default_value_t = 5)]
        cv_folds: usize,

        #[command(flatten)]
        columns: ColumnArgs,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Train on one CSV file and classify every row of another
    Predict {
        /// Path to the labeled training CSV file
        #[arg(long)]
        train: PathBuf,

        /// Path to the CSV file to classify (label column optional)
        #[arg(long)]
        data: PathBuf,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: ExperimentName,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        columns: ColumnArgs,

        #[command(flatten)]
        model: ModelArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct EvaluateOutput {
    experiment: String,
    n_rows: usize,
    n_labels: usize,
    cv_mean_accuracy: f64,
    cv_std_accuracy: f64,
    baseline_accuracy: f64,
    n_trees: usize,
    output: PathBuf,
}

#[derive(Serialize)]
struct PredictOutput {
    experiment: String,
    n_train_rows: usize,
    n_rows: usize,
    n_labels: usize,
    accuracy: Option<f64>,
    output: PathBuf,
}

fn parse_max_features(s: &str) -> Result<MaxFeatures> {
    match s {
        "sqrt" => Ok(MaxFeatures::Sqrt),
        "log2" => Ok(MaxFeatures::Log2),
        "all" => Ok(MaxFeatures::All),
        other => {
            if let Ok(n) = other.parse::<usize>() {
                return Ok(MaxFeatures::Fixed(n));
            }
            match other.parse::<f64>() {
                Ok(f) if f > 0.0 && f < 1.0 => Ok(MaxFeatures::Fraction(f)),
                _ => anyhow::bail!(
                    "invalid max features: {other} (expected sqrt, log2, all, a count, or a fraction in (0, 1))"
                ),
            }
        }
    }
}

fn parse_criterion(s: &str) -> Result<SplitCriterion> {
    match s {
        "gini" => Ok(SplitCriterion::Gini),
        "entropy" => Ok(SplitCriterion::Entropy),
        "classification-error" => Ok(SplitCriterion::ClassificationError),
        other => anyhow::bail!(
            "unknown criterion: {other} (expected gini, entropy, or classification-error)"
        ),
    }
}

fn build_config(model: &ModelArgs, seed: u64) -> Result<ClassifierConfig> {
    let forest = RandomForestConfig::new(model.n_trees)?
        .with_max_features(parse_max_features(&model.max_features)?)
        .with_max_depth(model.max_depth)
        .with_min_samples_split(model.min_samples_split)
        .with_min_samples_leaf(model.min_samples_leaf)
        .with_criterion(parse_criterion(&model.criterion)?)
        .with_subsample(model.subsample)
        .with_seed(seed);
    let config = ClassifierConfig::new(model.vector_length, model.n_trees)?
        .with_probes(model.probes)?
        .with_forest(forest)?;
    Ok(config)
}

/// Feature column names in encoding order.
fn feature_names(columns: &ColumnArgs, table: &Table) -> Result<Vec<String>> {
    let names: Vec<String> = if columns.features.is_empty() {
        table
            .headers()
            .iter()
            .filter(|h| **h != columns.label)
            .cloned()
            .collect()
    } else {
        columns.features.clone()
    };
    if names.contains(&columns.label) {
        anyhow::bail!("label column \"{}\" cannot also be a feature", columns.label);
    }
    if let Some(unknown) = columns.numeric.iter().find(|n| !names.contains(n)) {
        anyhow::bail!("numeric column \"{unknown}\" is not a feature column");
    }
    Ok(names)
}

/// Project `table` to `[features..., label]` and describe it.
///
/// Feature `i` lands in column `i` and the label in column `features.len()`,
/// so any other table projected to the same feature names encodes alike.
fn project(
    table: &Table,
    features: &[String],
    columns: &ColumnArgs,
) -> Result<(Table, DataSpecification)> {
    let mut names = features.to_vec();
    names.push(columns.label.clone());
    let projected = table.select(&names)?;

    let metadata = features
        .iter()
        .map(|name| {
            if columns.numeric.contains(name) {
                FeatureMetadata::numeric(name.as_str())
            } else {
                FeatureMetadata::categorical(name.as_str())
            }
        })
        .collect();
    let spec = DataSpecification::new(features.len(), (0..features.len()).collect(), metadata)?;
    Ok((projected, spec))
}

fn read_table(path: &Path) -> Result<Table> {
    TableReader::new(path)
        .read()
        .with_context(|| format!("failed to read {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Evaluate {
            data,
            experiment,
            output_dir,
            cv_folds,
            columns,
            model,
        } => {
            let table = read_table(&data)?;
            let features = feature_names(&columns, &table)?;
            let (table, spec) = project(&table, &features, &columns)?;
            let config = build_config(&model, cli.seed)?;
            info!(
                n_rows = table.num_rows(),
                n_features = features.len(),
                vector_length = config.vector_length(),
                "starting cross-validation"
            );

            let result = CrossValidation::new(cv_folds)?
                .with_seed(cli.seed)
                .evaluate(&spec, &config, &table)
                .context("cross-validation failed")?;

            let writer = ResultWriter::new(&output_dir, experiment.clone())?;
            let output = writer.write_evaluation(&config, &result)?;

            let summary = EvaluateOutput {
                experiment: experiment.to_string(),
                n_rows: result.n_samples,
                n_labels: result.labels.len(),
                cv_mean_accuracy: result.mean_accuracy,
                cv_std_accuracy: result.std_accuracy,
                baseline_accuracy: result.mean_baseline_accuracy,
                n_trees: config.n_trees(),
                output,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Command::Predict {
            train,
            data,
            experiment,
            output_dir,
            columns,
            model,
        } => {
            let train_table = read_table(&train)?;
            let features = feature_names(&columns, &train_table)?;
            let (train_table, spec) = project(&train_table, &features, &columns)?;

            let query = read_table(&data)?;
            let has_label = query.column_index(&columns.label).is_ok();
            let query = if has_label {
                project(&query, &features, &columns)?.0
            } else {
                query.select(&features)?
            };

            let config = build_config(&model, cli.seed)?;
            let mut classifier = BatchClassifier::new(spec, config);
            let n_train_rows =
                classifier.train_rows(&train_table, &train_table, 0..train_table.num_rows())?;
            classifier.close().context("failed to fit classifier")?;

            let results = (0..query.num_rows())
                .into_par_iter()
                .map(|row| classifier.classify(&query, row))
                .collect::<Result<Vec<_>, _>>()?;
            info!(n_rows = results.len(), "rows classified");

            let actual: Option<Vec<String>> =
                has_label.then(|| query.column(features.len()).map(String::from).collect());

            let labels = classifier.specification().label_map().names();
            let writer = ResultWriter::new(&output_dir, experiment.clone())?;
            let output = writer.write_predictions(labels, &results, actual.as_deref())?;

            let accuracy = actual.as_ref().filter(|_| !results.is_empty()).map(|a| {
                let correct = results
                    .iter()
                    .zip(a)
                    .filter(|(r, truth)| r.is_correct(truth))
                    .count();
                correct as f64 / results.len() as f64
            });

            let summary = PredictOutput {
                experiment: experiment.to_string(),
                n_train_rows,
                n_rows: results.len(),
                n_labels: labels.len(),
                accuracy,
                output,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
