//! beanstalk-deploy: publish a bundle to AWS Elastic Beanstalk from a
//! pipeline step.
//!
//! Creates an application version from an S3 bundle and, when asked,
//! updates the `-stable` or `-beta` environment to it.

use std::path::PathBuf;

use anyhow::Result;
use clap::builder::BoolishValueParser;
use clap::Parser;
use colored::Colorize;

mod config;
mod logging;

use config::{FileConfig, Settings};

/// Set by the pipeline server once the pipeline configuration is reviewed.
const APPROVAL_VAR: &str = "DRONE_YAML_VERIFIED";

/// Publish a bundle to AWS Elastic Beanstalk
#[derive(Debug, Parser)]
#[command(name = "beanstalk-deploy")]
#[command(about = "Create an Elastic Beanstalk application version and roll it out", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    /// TOML file with default settings
    #[arg(long, env = "PLUGIN_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, env = "PLUGIN_DEBUG", num_args = 0..=1, default_missing_value = "true", value_parser = BoolishValueParser::new())]
    debug: Option<bool>,
}

/// Load `.env` without overriding the host environment.
///
/// The approval variable is skipped: only the pipeline server may set it.
fn load_dotenv() {
    // A missing .env file is fine; pipelines pass settings through the environment.
    let Ok(entries) = dotenvy::dotenv_iter() else {
        return;
    };

    for (key, value) in entries.flatten() {
        if key == APPROVAL_VAR || std::env::var_os(&key).is_some() {
            continue;
        }
        std::env::set_var(key, value);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    load_dotenv();

    let cli = Cli::parse();
    logging::init(cli.debug.unwrap_or(false));

    let file = match &cli.config {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading settings file");
            FileConfig::load(path)?
        },
        None => FileConfig::default(),
    };
    let request = cli
        .settings
        .into_request(file, |name| std::env::var(name).ok())?;

    match beanstalk_deploy::deploy(&request).await {
        Ok(outcome) => {
            println!(
                "{} Created version {} of {}",
                "✅".green(),
                outcome.version_label.bold(),
                outcome.application.bold()
            );
            match &outcome.updated_environment {
                Some(environment) => println!(
                    "{} Environment {} is updating to {}",
                    "🚀".green(),
                    environment.bold(),
                    outcome.version_label.bold()
                ),
                None => println!("   Environment update skipped"),
            }
            Ok(())
        },
        Err(err) => {
            if err.version_registered() {
                eprintln!(
                    "{} Version {} was created but not rolled out",
                    "⚠️".yellow(),
                    request.version_label().bold()
                );
            }
            Err(err.into())
        },
    }
}
