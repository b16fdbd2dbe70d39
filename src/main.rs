mod dataset;
mod error;
mod mnist_loader;
mod visualize;

use std::path::PathBuf;

use clap::Parser;
use dataset::{DataSource, DatasetConfig, Image, Role};
use log::error;
use rand::{rngs::StdRng, SeedableRng};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding the four MNIST IDX files (optionally gzipped)
    #[arg(short, long, default_value = "mnist")]
    data_dir: PathBuf,

    /// Number of digits to render from each split
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,

    /// Render randomly sampled digits instead of the first ones
    #[arg(short, long)]
    random: bool,

    /// Record count the training files must declare
    #[arg(long, default_value_t = dataset::TRAIN_COUNT)]
    train_count: u32,

    /// Record count the test files must declare
    #[arg(long, default_value_t = dataset::TEST_COUNT)]
    test_count: u32,

    /// Seed for --random, for a reproducible sample
    #[arg(short, long, default_value = None)]
    seed: Option<u64>,
}

fn show(images: &[Image], args: &Args, rng: &mut StdRng) {
    if args.random {
        let indices = visualize::sample_indices(images.len(), args.count, rng);
        visualize::print_samples(images, &indices);
    } else {
        visualize::print_digits(images, args.count);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = DatasetConfig::from_dir(&args.data_dir);
    for (role, count) in [
        (Role::TrainImages, args.train_count),
        (Role::TrainLabels, args.train_count),
        (Role::TestImages, args.test_count),
        (Role::TestLabels, args.test_count),
    ] {
        let path = config.get(role).path.clone();
        config = config.with_source(role, DataSource::new(path, count));
    }

    let data = dataset::load_data(&config).unwrap_or_else(|e| {
        error!("{}", e);
        std::process::exit(1);
    });

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let (train_images, train_labels, test_images, test_labels) = data.into_parts();

    show(&train_images, &args, &mut rng);
    show(&test_images, &args, &mut rng);

    if let Some(label) = train_labels.first() {
        println!("{} (digit {})", label, label.digit());
    }
    if let Some(label) = test_labels.first() {
        println!("{} (digit {})", label, label.digit());
    }
}
