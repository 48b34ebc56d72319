mod cli;

use anyhow::Context;
use clap::Parser;
use log::info;

use ehr_cohort::DatasetLoader;
use ehr_cohort::pipeline;

use crate::cli::{Cli, Command};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Analyze(args) => {
            let config = args.to_config();
            info!(
                "Analysing lab {} against diagnosis {}",
                config.lab_code, config.diagnosis_code
            );

            let report = pipeline::run(&config)
                .await
                .context("Cohort analysis failed")?;
            report.print_summary();

            if let Some(dir) = &config.output_dir {
                report
                    .write_outputs(dir)
                    .with_context(|| format!("Failed to write outputs to {}", dir.display()))?;
            }
        }
        Command::Fetch(args) => {
            let loader = DatasetLoader::new(args.to_config())?;
            let paths = loader.fetch_all().await.context("Fetching partitions failed")?;
            info!("{} partition files available", paths.len());
        }
    }

    Ok(())
}
