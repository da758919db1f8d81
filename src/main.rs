use clap::Parser;
use std::fs::File;
use std::process::ExitCode;
use yield_text::{FetchMode, Harvest, output, utils};

mod args;
use args::{Args, convert_mode, convert_strategy};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ::log::error!("{}", e);
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut urls = args.urls.clone();
    if let Some(path) = &args.input {
        urls.extend(utils::read_url_list(path)?);
    }
    if urls.is_empty() {
        return Err("no URLs given; pass them as arguments or with --input".into());
    }

    let mut harvest = Harvest::new();
    if let Some(path) = &args.config {
        harvest = harvest.with_config_file(path)?;
    }
    if let Some(mode) = args.mode {
        harvest = harvest.with_mode(convert_mode(mode));
    }
    if let Some(strategy) = args.strategy {
        harvest = harvest.with_strategy(convert_strategy(strategy));
    }
    if let Some(concurrency) = args.concurrency {
        harvest = harvest.with_max_concurrency(concurrency);
    }

    // Print WebDriver info message for rendered pages
    if harvest.config().mode == FetchMode::Rendered {
        eprintln!("Note: Rendered mode requires a WebDriver server (e.g., ChromeDriver).");
        eprintln!(
            "Set WEBDRIVER_URL environment variable if not using {}",
            harvest.config().fetch.webdriver_url
        );
    }

    ::log::info!("Starting batch of {} URLs", urls.len());
    let report = harvest.run(&urls).await?;
    ::log::info!(
        "Batch complete - {} of {} pages succeeded in {:.2} seconds",
        report.stats.succeeded,
        report.stats.attempted,
        report.elapsed_ms as f64 / 1000.0
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for result in &report.results {
            print!("{}", output::render_page(result, args.preview));
        }
        print!("{}", output::render_summary(&report));
    }

    if let Some(path) = &args.csv {
        let file = File::create(path)?;
        output::write_csv(&report, file)?;
        ::log::info!("Wrote results table to {}", path.display());
    }

    Ok(())
}
