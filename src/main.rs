use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use featstore::prelude::*;
use featstore::{Column, SeededRandom};

/// Build and query incremental feature tables
#[derive(Parser, Debug)]
#[command(name = "featstore")]
#[command(about = "Incremental, schema-checked feature tables", long_about = None)]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty store from a JSON config with feature and class names
    Init {
        #[arg(short, long)]
        config: PathBuf,

        /// Path of the snapshot to create
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Merge a JSON array of records into a store
    Add {
        #[arg(short, long)]
        store: PathBuf,

        #[arg(short, long)]
        batch: PathBuf,

        /// Region id used when the batch has no region column
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Predict classes for a JSON array of records
    Predict {
        #[arg(short, long)]
        store: PathBuf,

        #[arg(short, long)]
        batch: PathBuf,

        /// Use seeded random assignment instead of nearest centroids
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the stored table
    Show {
        #[arg(short, long)]
        store: PathBuf,

        /// Print records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Init { config, out } => {
            let config = ClassifierConfig::from_json_file(&config)?;
            let store = FeatureStore::new(&config.feature_names, &config.class_names)?;
            let file = SnapshotFile::new(&out);
            if file.exists() {
                anyhow::bail!("refusing to overwrite existing store {:?}", out);
            }
            file.save(&store)?;
            info!(
                features = config.feature_names.len(),
                classes = config.class_names.len(),
                "Initialized store at {:?}",
                out
            );
        }
        Command::Add { store, batch, name } => {
            let file = SnapshotFile::new(&store);
            let mut feature_store = file.load()?;
            let frame = read_frame(&batch)?;

            let report = match name {
                Some(name) => {
                    let outcome = feature_store
                        .add_batch_of_feature_sets([(name, frame)])
                        .pop()
                        .context("no batch outcome")?;
                    outcome.result?
                }
                None => feature_store.add_features(&frame)?,
            };
            file.save(&feature_store)?;
            println!("{}", report);
        }
        Command::Predict { store, batch, seed } => {
            let feature_store = SnapshotFile::new(&store).load()?;
            let mut classifier = Classifier::from_store(feature_store);
            match seed {
                Some(seed) => classifier.set_predictor(Box::new(SeededRandom::new(seed))),
                None => {
                    if classifier.train() == 0 {
                        warn!("Store has no annotated objects, predictions are uninformed");
                    }
                }
            }

            let mut frame = read_frame(&batch)?;
            let predictions = classifier.predict(&frame)?;
            let predictions = predictions.into_iter().map(Value::Int).collect();
            frame.push_column(Column::new("prediction", predictions))?;
            println!("{}", serde_json::to_string_pretty(&frame.to_records())?);
        }
        Command::Show { store, json } => {
            let feature_store = SnapshotFile::new(&store).load()?;
            if json {
                let records = feature_store.to_frame().to_records();
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                println!("{}", feature_store);
            }
        }
    }

    Ok(())
}

fn read_frame(path: &Path) -> anyhow::Result<Frame> {
    let data = std::fs::read(path).with_context(|| format!("reading batch {:?}", path))?;
    let records: serde_json::Value =
        serde_json::from_slice(&data).with_context(|| format!("parsing batch {:?}", path))?;
    Ok(Frame::from_records(&records)?)
}
