use anyhow::Result;
use clap::Parser;
use prettytable::{cell, row, Table};
use stad_dataset::{
    config::Config,
    dataset::{FramePath, IndexedDataset, StadDataset},
    sampler::WeightedSampler,
};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Parser)]
enum Opts {
    /// Print a summary of the dataset described by a configuration file.
    Info {
        /// configuration file
        config_file: PathBuf,
    },
    /// Print one epoch of sampler indices.
    Sample {
        /// configuration file
        config_file: PathBuf,
        #[clap(long, default_value = "0")]
        epoch: u64,
        #[clap(long, default_value = "0")]
        rank: usize,
        #[clap(long, default_value = "1")]
        world_size: usize,
    },
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    match Opts::parse() {
        Opts::Info { config_file } => {
            info(config_file)?;
        }
        Opts::Sample {
            config_file,
            epoch,
            rank,
            world_size,
        } => {
            sample(config_file, epoch, rank, world_size)?;
        }
    }

    Ok(())
}

fn info(config_file: impl AsRef<Path>) -> Result<()> {
    let config = Config::open(config_file)?;
    let dataset = StadDataset::load(config.dataset)?;

    let num_actors: usize = dataset
        .records()
        .iter()
        .map(|record| record.ann.len())
        .sum();
    let num_videos = dataset
        .records()
        .iter()
        .map(|record| &record.video_id)
        .collect::<std::collections::HashSet<_>>()
        .len();

    let mut table = Table::new();
    table.add_row(row!["frame records", dataset.num_records()]);
    table.add_row(row!["videos", num_videos]);
    table.add_row(row!["actors (after augmentation)", num_actors]);
    table.add_row(row![
        "classes",
        dataset
            .classes()
            .map(|classes| format!("{}", classes.len()))
            .unwrap_or_else(|| "unfiltered".into()),
    ]);
    table.add_row(row![
        "per-sample weights",
        dataset
            .per_sample_weights()
            .map(|weights| format!("{} entries", weights.len()))
            .unwrap_or_else(|| "none".into()),
    ]);
    table.printstd();

    // per-record listing
    let mut table = Table::new();
    table.add_row(row!["img_key", "path", "shot info", "fps", "actors"]);
    for record in dataset.records() {
        let path = match &record.path {
            FramePath::FrameDir(dir) => format!("{}", dir.display()),
            FramePath::Filename(file) => format!("{}", file.display()),
        };
        table.add_row(row![
            record.img_key,
            path,
            record
                .shot_info
                .map(|(start, end)| format!("{}..={}", start, end))
                .unwrap_or_else(|| "deferred".into()),
            record.fps,
            record.ann.len(),
        ]);
    }
    table.printstd();

    Ok(())
}

fn sample(
    config_file: impl AsRef<Path>,
    epoch: u64,
    rank: usize,
    world_size: usize,
) -> Result<()> {
    let Config {
        dataset: dataset_config,
        sampler: sampler_config,
    } = Config::open(config_file)?;
    let dataset = StadDataset::load(dataset_config)?;

    let weights = dataset.per_sample_weights().map(|weights| weights.to_vec());
    let sampler = WeightedSampler::new(
        dataset.num_records(),
        weights,
        &sampler_config,
        rank,
        world_size,
    )?;

    let indices = sampler.indices(epoch)?;
    println!(
        "{}",
        indices
            .iter()
            .map(|index| index.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    );

    Ok(())
}
