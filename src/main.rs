use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use universal_notes::cli::{Cli, Commands};
use universal_notes::config::Config;
use universal_notes::pipeline::{NotesOutcome, NotesPipeline, PipelineStage};
use universal_notes::{output, shell, utils};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose { "universal_notes=debug" } else { "universal_notes=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Notes {
            url,
            output,
            format,
            pdf,
        } => {
            let url = url.trim();
            if url.is_empty() {
                eprintln!("{}", style(shell::INVALID_URL_WARNING).yellow());
                std::process::exit(2);
            }

            let config = Config::load().await?;
            let api_key = config.api_key(cli.api_key.as_deref())?;

            // OCR is optional, so a missing tesseract is only a warning
            let missing_deps = utils::check_dependencies(&config.ocr.tesseract_path).await;
            if !missing_deps.is_empty() && !cli.quiet {
                eprintln!("⚠️  Dependency check warnings:");
                for dep in missing_deps {
                    eprintln!("   • {}", dep);
                }
            }

            let pipeline = NotesPipeline::new(&config, api_key);
            tracing::info!(
                "Generating notes for URL: {} ({})",
                url,
                utils::extract_domain(url).unwrap_or_else(|| "unknown host".to_string())
            );

            let progress = if cli.quiet {
                ProgressBar::hidden()
            } else {
                ProgressBar::new_spinner()
            };
            progress.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap(),
            );
            progress.enable_steady_tick(Duration::from_millis(120));

            let spinner = progress.clone();
            let result = pipeline
                .run_with_progress(url, move |stage| match stage {
                    PipelineStage::Done | PipelineStage::Failed => spinner.finish_and_clear(),
                    stage => spinner.set_message(stage.message()),
                })
                .await;

            let outcome = match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    eprintln!("{} {:#}", style("Error:").red().bold(), e);
                    std::process::exit(1);
                }
            };

            for notice in outcome.notices() {
                eprintln!("{}", style(notice).red());
            }

            let report = match outcome {
                NotesOutcome::Summary(report) => report,
                NotesOutcome::NoContent { reason, .. } => {
                    tracing::debug!("No content: {}", reason);
                    eprintln!("{}", style(shell::NO_CONTENT_MESSAGE).red());
                    std::process::exit(1);
                }
            };

            if report.truncated {
                tracing::info!(
                    "Content was {}; only the first part was summarized",
                    utils::format_char_count(report.content_chars)
                );
            }

            match output {
                Some(path) => {
                    output::save_to_file(&report, &path, &format).await?;
                    println!("Notes saved to: {}", path.display());
                }
                None => {
                    output::print_to_console(&report, &format)?;
                }
            }

            if let Some(path) = pdf {
                match output::save_pdf(&report.summary, &path).await {
                    Ok(()) => println!("PDF saved to: {}", path.display()),
                    Err(e) => eprintln!("{} {:#}", style("PDF export failed:").red().bold(), e),
                }
            }
        }
        Commands::Serve { bind } => {
            let config = Config::load().await?;
            let api_key = config.api_key(cli.api_key.as_deref())?;

            let missing_deps = utils::check_dependencies(&config.ocr.tesseract_path).await;
            for dep in missing_deps {
                tracing::warn!("Missing dependency: {}", dep);
            }

            let addr = bind.unwrap_or(config.server.bind);
            let pipeline = Arc::new(NotesPipeline::new(&config, api_key));

            println!("{} http://{}", style(shell::TITLE).bold(), addr);
            shell::serve(addr, pipeline).await?;
        }
        Commands::Config { show } => {
            let config = Config::load().await?;
            if show {
                config.display();
            } else {
                config.save().await?;
                println!("Configuration written to: {}", Config::config_path()?.display());
                println!("Set GROQ_API_KEY (or llm.api_key in that file) before generating notes.");
            }
        }
        Commands::Sources => {
            println!("Supported sources:");
            println!("  • YouTube videos (youtube.com, youtu.be) - read through their captions");
            println!("  • Articles, blogs and news pages - main text plus OCR of leading images");
        }
    }

    Ok(())
}
