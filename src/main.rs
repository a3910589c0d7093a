//! Content pipeline: binary entrypoint.
//! One-shot topic and trending runs, continuous mode with an optional status
//! server, and artifact listing.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use content_pipeline::{
    api::{self, StatusState},
    config::{self, PipelineConfig},
    metrics::Metrics,
    model::{Category, PipelineRun, RunOutcome},
    runner::run_continuous,
    storage::ArtifactKind,
    PipelineRuntime,
};

/// Trend-to-video content pipeline.
#[derive(Parser)]
#[command(name = "content-pipeline", version, about)]
struct Cli {
    /// Pipeline config file (TOML).
    #[arg(long, global = true, env = config::ENV_PATH)]
    config: Option<PathBuf>,

    /// Produce scripts, audio and video but skip publishing and feedback.
    #[arg(long, global = true)]
    test_mode: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the stage pipeline for one explicit topic.
    Topic {
        #[arg(long)]
        topic: String,

        /// Comma separated language codes.
        #[arg(long, default_value = "en")]
        languages: String,

        /// finance, tech, education, lifestyle, entertainment or general.
        /// Derived from the topic text when omitted.
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        include_affiliates: bool,
    },

    /// Run one trending cycle.
    Trends {
        /// Topics to take from the ranking (defaults to `daily_count`).
        #[arg(long)]
        count: Option<usize>,

        /// Keep the process alive until deferred feedback has run.
        #[arg(long)]
        wait_feedback: bool,
    },

    /// Run trending cycles on the configured interval until Ctrl-C.
    Continuous {
        #[arg(long)]
        count: Option<usize>,
    },

    /// List produced artifacts.
    Artifacts {
        /// scripts, audio or videos; all kinds when omitted.
        #[arg(long)]
        kind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut cfg = match PipelineConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {e:#}");
            return ExitCode::from(1);
        }
    };
    cfg.test_mode |= cli.test_mode;
    init_tracing(&cfg.log_file);

    match run(cli.command, cfg).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "fatal");
            ExitCode::from(1)
        }
    }
}

async fn run(command: Commands, cfg: PipelineConfig) -> Result<ExitCode> {
    match command {
        Commands::Topic {
            topic,
            languages,
            category,
            include_affiliates,
        } => {
            let rt = PipelineRuntime::from_config(cfg)?;
            let langs = config::parse_languages(&languages);
            let category = category.as_deref().map(Category::from_label);
            let run = rt
                .orchestrator
                .run_for_topic(&topic, category, &langs, include_affiliates)
                .await?;
            // One-shot process: feedback would outlive us.
            drop_pending_feedback(&rt, false).await;
            report(&run)
        }

        Commands::Trends {
            count,
            wait_feedback,
        } => {
            let count = count.unwrap_or(cfg.daily_count);
            let rt = PipelineRuntime::from_config(cfg)?;
            let run = rt.orchestrator.run_cycle(count).await?;
            drop_pending_feedback(&rt, wait_feedback).await;
            report(&run)
        }

        Commands::Continuous { count } => {
            let count = count.unwrap_or(cfg.daily_count);
            let interval = Duration::from_secs(cfg.cycle_interval_secs.max(1));
            let status_addr = cfg.status_addr.clone();
            let rt = PipelineRuntime::from_config(cfg)?;

            let token = CancellationToken::new();
            if let Some(addr) = status_addr {
                serve_status(&addr, &rt, token.clone()).await?;
            }
            {
                let token = token.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        tracing::info!("shutdown requested");
                        token.cancel();
                    }
                });
            }

            let orch = rt.orchestrator.clone();
            let cycles = run_continuous(
                move || {
                    let orch = orch.clone();
                    async move { orch.run_cycle(count).await }
                },
                interval,
                token,
            )
            .await;

            let dropped = rt.scheduler.shutdown();
            tracing::info!(cycles, dropped_feedback = dropped, "stopped");
            Ok(ExitCode::SUCCESS)
        }

        Commands::Artifacts { kind } => {
            let layout = content_pipeline::storage::OutputLayout::new(&cfg.output_dir);
            let kinds: Vec<ArtifactKind> = match kind.as_deref() {
                None => ArtifactKind::ALL.to_vec(),
                Some(k) => vec![ArtifactKind::from_name(k)
                    .with_context(|| format!("unknown artifact kind `{k}`"))?],
            };
            for k in kinds {
                println!("{}:", k.dir_name());
                for p in layout.list(k)? {
                    println!("  {}", p.display());
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn drop_pending_feedback(rt: &PipelineRuntime, wait: bool) {
    if rt.scheduler.pending() == 0 {
        return;
    }
    if wait {
        tracing::info!(pending = rt.scheduler.pending(), "waiting for deferred feedback");
        rt.scheduler.wait_idle().await;
    } else {
        let n = rt.scheduler.shutdown();
        tracing::warn!(dropped = n, "exiting with feedback still pending; use --wait-feedback to keep it");
    }
}

async fn serve_status(addr: &str, rt: &PipelineRuntime, shutdown: CancellationToken) -> Result<()> {
    let metrics = Metrics::init()?;
    let state = StatusState {
        history: rt.history.clone(),
        scheduler: rt.scheduler.clone(),
    };
    let app = api::router(state, &metrics);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding status server on {addr}"))?;
    tracing::info!(%addr, "status server listening");
    tokio::spawn(async move {
        let res = axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await;
        if let Err(e) = res {
            tracing::error!(error = %e, "status server stopped");
        }
    });
    Ok(())
}

/// Print the run as JSON on stdout; exit 2 when every pair failed.
fn report(run: &PipelineRun) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(run)?);
    let code = match run.outcome() {
        RunOutcome::Failed => ExitCode::from(2),
        _ => ExitCode::SUCCESS,
    };
    Ok(code)
}

/// Compact logs on stderr plus an append-only plain log file.
fn init_tracing(log_file: &Path) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("content_pipeline=info,warn"));

    let file_layer = open_log(log_file).map(|f| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(f))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
}

fn open_log(path: &Path) -> Option<fs::File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).ok()?;
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => Some(f),
        Err(e) => {
            eprintln!("log file {} unavailable: {e}", path.display());
            None
        }
    }
}
