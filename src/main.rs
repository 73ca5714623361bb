//! docchunk - Split PDFs and text files into overlapping text chunks
//!
//! Scans an input tree, extracts text page by page on a worker pool and
//! writes numbered chunk files under an output tree mirroring the input.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use docchunk::clean::{clean_directory, CleanOptions};
use docchunk::cli::{ChunkArgs, CleanArgs, Cli, Commands, ConfigArgs, NumberArgs, ReportFormat};
use docchunk::config::{generate_sample_config, Config};
use docchunk::core::{CancellationFlag, ChunkPipeline};
use docchunk::numbering::number_pdfs;
use docchunk::output::{self, RunProgress};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let directive = if cli.verbose {
        "docchunk=debug"
    } else {
        "docchunk=info"
    };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    // an explicit --config must exist; the default location may be absent
    let load_config = || match cli.config {
        Some(ref path) => Config::load_from(path),
        None => Config::load(),
    };

    match cli.command {
        Commands::Chunk(args) => run_chunk(&args, load_config()?).await?,
        Commands::Clean(args) => run_clean(&args, &load_config()?)?,
        Commands::Number(args) => run_number(&args, &load_config()?)?,
        Commands::Config(args) => run_config(&args, &config_path, load_config)?,
    }

    Ok(())
}

async fn run_chunk(args: &ChunkArgs, mut config: Config) -> Result<()> {
    args.apply_to(&mut config);
    let options = config.chunk.to_pipeline_options()?;

    let cancel = CancellationFlag::new();
    let pipeline = ChunkPipeline::new(options)?.with_cancellation(cancel.clone());

    let progress = match args.report {
        ReportFormat::Human => RunProgress::new("Chunking"),
        ReportFormat::Json => RunProgress::hidden(),
    };

    let watcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            wait_for_shutdown().await;
            tracing::warn!("Shutdown requested, finishing in-flight files");
            cancel.cancel();
        }
    });

    let summary = tokio::task::spawn_blocking(move || {
        let summary = pipeline.run_with_progress(|result, summary| {
            progress.on_result(result, summary);
        });
        progress.finish();
        summary
    })
    .await
    .context("Pipeline thread panicked")??;

    watcher.abort();

    match args.report {
        ReportFormat::Human => output::print_run_summary(&summary),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    Ok(())
}

fn run_clean(args: &CleanArgs, config: &Config) -> Result<()> {
    let root = args.dir.clone().unwrap_or_else(|| config.clean.root.clone());
    let options = CleanOptions {
        root,
        delimiters: config.clean.delimiters.clone(),
        dry_run: args.dry_run,
    };

    let report = clean_directory(&options)?;
    match args.report {
        ReportFormat::Human => output::print_clean_report(&report, args.dry_run),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn run_number(args: &NumberArgs, config: &Config) -> Result<()> {
    let root = args.dir.clone().unwrap_or_else(|| config.chunk.input.clone());
    let report = number_pdfs(&root, args.dry_run)?;
    output::print_numbering_report(&report, args.dry_run);
    Ok(())
}

fn run_config<F>(args: &ConfigArgs, path: &Path, load_config: F) -> Result<()>
where
    F: FnOnce() -> Result<Config>,
{
    if args.path {
        println!("{}", path.display());
        return Ok(());
    }

    if args.init {
        if Config::ensure_exists(path)? {
            output::print_success(&format!("Wrote sample config to {}", path.display()));
        } else {
            output::print_info(&format!("Config already exists at {}", path.display()));
        }
        return Ok(());
    }

    if path.exists() {
        let config = load_config()?;
        output::print_info(&format!("Loaded from {}", path.display()));
        println!("{}", toml::to_string_pretty(&config)?);
    } else {
        output::print_info(&format!(
            "No config at {}; defaults shown below (docchunk config --init to create it)",
            path.display()
        ));
        println!("{}", generate_sample_config());
    }
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
