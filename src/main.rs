use repoinsight::cli::CliArgs;
use repoinsight::config::{self, InsightConfig};
use repoinsight::pipeline::{analyze_repository, PipelineError, PipelineOutcome};
use repoinsight::util::logging::{self, LoggingConfig};
use repoinsight::VERSION;

use anyhow::Result;
use clap::Parser;
use std::env;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    dotenv::dotenv().ok();
    init_logging_from_args(&args);

    debug!("repoinsight v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match run(&args).await {
        Ok(outcome) => {
            if !args.quiet {
                println!("README written to {}", outcome.output_path.display());
            }
            0
        }
        Err(e) => {
            error!("{:#}", e);
            match e.downcast_ref::<PipelineError>() {
                Some(pipeline_error) => eprintln!("{}", pipeline_error.help_message()),
                None => eprintln!("Error: {:#}", e),
            }
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run(args: &CliArgs) -> Result<PipelineOutcome> {
    let mut config = InsightConfig::from_env_with_overrides(&args.env_overrides())
        .map_err(PipelineError::from)?;
    args.apply_lists(&mut config);
    config.validate().map_err(PipelineError::from)?;

    debug!("{}", config);
    info!(url = %args.repo_url, model = %config.model, "Generating README");

    let outcome = analyze_repository(&args.repo_url, &config).await?;

    for warning in &outcome.warnings {
        debug!(%warning, "Skipped during extraction");
    }

    Ok(outcome)
}

fn init_logging_from_args(args: &CliArgs) {
    let level = match args.effective_log_level() {
        Some(level) => logging::parse_level(&level),
        None => {
            let level_str = env::var(config::ENV_LOG_LEVEL).unwrap_or_else(|_| "info".to_string());
            logging::parse_level(&level_str)
        }
    };

    logging::init_logging(LoggingConfig::with_level(level).json_from_env());
}

