use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tactile_pipeline::dataset::{ClsDataset, Domain, RgDataset, SplitDataset};
use tactile_pipeline::{debug, manifest, ForceCorrection, PipelineConfig, Report, Stage};

#[derive(Parser)]
#[command(name = "tactile-pipeline")]
#[command(about = "Dataset splitting, preprocessing and evaluation reports for the tactile sensor")]
struct Cli {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the data root directory
    #[arg(long, global = true, value_name = "DIR")]
    data_root: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a dataset and log its parameters and split sizes
    Inspect {
        #[command(subcommand)]
        experiment: Experiment,
    },

    /// Save every preprocessing stage of random training pairs
    DebugRoi {
        /// Number of pairs to dump
        #[arg(long, default_value_t = 5)]
        count: usize,

        #[arg(long, value_name = "DIR", default_value = "../debug")]
        out: PathBuf,

        /// Seed for pair selection
        #[arg(long)]
        seed: Option<u64>,

        #[command(subcommand)]
        experiment: Experiment,
    },

    /// Assemble one batch and log its shape
    Batch {
        #[arg(long, value_enum, default_value_t = Stage::Train)]
        stage: Stage,

        #[arg(long, default_value_t = 4)]
        size: usize,

        /// First index for val/test batches
        #[arg(long, default_value_t = 0)]
        start: usize,

        /// Seed for train sampling
        #[arg(long)]
        seed: Option<u64>,

        #[command(subcommand)]
        experiment: Experiment,
    },

    /// Write train/val/test CSV manifests
    Manifest {
        #[arg(long, value_name = "DIR")]
        out: PathBuf,

        #[command(subcommand)]
        experiment: Experiment,
    },

    /// Compare model predictions with ground truth and write a spreadsheet
    Report {
        #[arg(long, value_enum, default_value_t = Domain::Xy)]
        domain: Domain,

        /// Held-out recording folder under the data root
        #[arg(long, default_value = "rg_rarb_test_01")]
        test_folder: String,

        /// CSV of predictions (name,x,y,ra,rb,f,d)
        #[arg(long, value_name = "CSV")]
        predictions: PathBuf,

        #[arg(long, value_name = "DIR", default_value = "../result")]
        save_folder: PathBuf,

        /// Keep raw force predictions
        #[arg(long)]
        no_correction: bool,

        /// Seed for the force correction offset
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Subcommand, Clone)]
enum Experiment {
    /// Shape classification
    Cls {
        #[arg(long)]
        shape: String,
    },
    /// Force/position regression
    Rg {
        #[arg(long, value_enum, default_value_t = Domain::Xy)]
        domain: Domain,

        /// Use a held-out folder as the test slice instead of the training folder
        #[arg(long)]
        test_folder: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn open_rg(
    config: &PipelineConfig,
    domain: Domain,
    test_folder: Option<&str>,
) -> anyhow::Result<RgDataset> {
    match test_folder {
        Some(folder) => RgDataset::open_test(config, domain, folder),
        None => RgDataset::open_train(config, domain),
    }
}

/// Run `f` on whichever dataset the experiment names
fn with_dataset(
    config: &PipelineConfig,
    experiment: &Experiment,
    f: &mut dyn FnMut(&dyn DatasetCommand) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    match experiment {
        Experiment::Cls { shape } => f(&ClsDataset::open(config, shape)?),
        Experiment::Rg {
            domain,
            test_folder,
        } => f(&open_rg(config, *domain, test_folder.as_deref())?),
    }
}

/// Dataset operations the CLI needs, object-safe so both experiments share one code path
trait DatasetCommand {
    fn inspect(&self);
    fn debug_roi(&self, count: usize, out: &Path, rng: &mut StdRng) -> anyhow::Result<()>;
    fn batch(
        &self,
        stage: Stage,
        size: usize,
        start: usize,
        rng: &mut StdRng,
    ) -> anyhow::Result<()>;
    fn manifest(&self, out: &Path) -> anyhow::Result<()>;
}

impl<D: SplitDataset> DatasetCommand for D {
    fn inspect(&self) {
        self.log_summary();
    }

    fn debug_roi(&self, count: usize, out: &Path, rng: &mut StdRng) -> anyhow::Result<()> {
        debug::dump_stages(self.split().stage(Stage::Train), self.preprocessor(), count, out, rng)?;
        Ok(())
    }

    fn batch(
        &self,
        stage: Stage,
        size: usize,
        start: usize,
        rng: &mut StdRng,
    ) -> anyhow::Result<()> {
        let reader = self.batches();
        let batch = match stage {
            Stage::Train => reader.random_batch(rng, size)?,
            _ => reader.direct_batch(size, start, stage)?,
        };

        let label_min = batch.labels.iter().copied().fold(f32::INFINITY, f32::min);
        let label_max = batch.labels.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        info!("{} batch images: {:?}", stage, batch.images.shape());
        info!(
            "{} batch labels: {:?} in [{}, {}]",
            stage,
            batch.labels.shape(),
            label_min,
            label_max
        );
        Ok(())
    }

    fn manifest(&self, out: &Path) -> anyhow::Result<()> {
        manifest::write_manifests(self.split(), out)?;
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let mut config = PipelineConfig::load(args.config.as_deref())?;
    if let Some(root) = args.data_root {
        config = config.with_data_root(root);
    }

    match args.command {
        Command::Inspect { experiment } => {
            with_dataset(&config, &experiment, &mut |d| {
                d.inspect();
                Ok(())
            })?;
        }
        Command::DebugRoi {
            count,
            out,
            seed,
            experiment,
        } => {
            let mut rng = rng_from(seed);
            with_dataset(&config, &experiment, &mut |d| d.debug_roi(count, &out, &mut rng))?;
        }
        Command::Batch {
            stage,
            size,
            start,
            seed,
            experiment,
        } => {
            let mut rng = rng_from(seed);
            with_dataset(&config, &experiment, &mut |d| d.batch(stage, size, start, &mut rng))?;
        }
        Command::Manifest { out, experiment } => {
            with_dataset(&config, &experiment, &mut |d| d.manifest(&out))?;
        }
        Command::Report {
            domain,
            test_folder,
            predictions,
            save_folder,
            no_correction,
            seed,
        } => {
            let dataset = RgDataset::open_test(&config, domain, &test_folder)?;
            dataset.log_summary();

            let mut report = Report::from_predictions(&dataset, &predictions)?;
            if !no_correction {
                let mut rng = rng_from(seed);
                report.apply_correction(&ForceCorrection::default(), &mut rng);
            }

            let summary = report.write(&save_folder, &test_folder)?;
            println!("Report written to {}", summary.path.display());
        }
    }

    Ok(())
}
