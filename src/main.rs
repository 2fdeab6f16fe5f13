use clap::Parser;
use docs_harvest::{Harvester, HarvestError, TraversalMode};
use std::fs::File;
use std::process::ExitCode;

mod args;
use args::{Args, presets_help};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command-line arguments
    let args = Args::parse();

    if let Err(e) = init_logging(&args) {
        eprintln!("Failed to open log file: {}", e);
        return ExitCode::FAILURE;
    }

    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("{}", e);
            if matches!(e, HarvestError::UnknownPreset(..) | HarvestError::MissingSetting(_)) {
                eprintln!("{}", presets_help());
            }
            return ExitCode::FAILURE;
        }
    };

    ::log::info!("Starting harvest of {}", config.start_url);

    // Print WebDriver info message for interactive traversal
    if config.mode == TraversalMode::Interactive {
        println!("Note: Interactive traversal requires a WebDriver server (e.g., ChromeDriver).");
        println!(
            "Set WEBDRIVER_URL environment variable if not using {}",
            config.interactive.webdriver_url
        );
    }

    let start_time = std::time::Instant::now();
    let harvester = Harvester::new(config);

    match harvester.run().await {
        Ok(result) => {
            println!("{}", result.stats);
            ::log::info!(
                "Harvest complete - {} pages ({} without content) in {:.2} seconds",
                result.contents.len(),
                result.failed(),
                start_time.elapsed().as_secs_f64()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            ::log::error!("Harvest failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs to stderr at `info` unless `RUST_LOG` says otherwise; `--log-file`
/// sends the log to a file instead
fn init_logging(args: &Args) -> std::io::Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if let Some(path) = &args.log_file {
        let file = File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}
