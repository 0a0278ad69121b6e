//! Sketch-of-Thought Agent
//!
//! Routes tasks to a reasoning paradigm, asks the configured model for a compact
//! sketch, and renders that sketch. Runs as an interactive REPL, a scripted demo,
//! an instruction-following batch, or an HTTP service.

mod agent;
mod handlers;
mod modes;
mod offline;
mod settings;
mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sot_sensors::{SensorDataManager, SimulatedDriver};
use sot_visual::{BitmapRasterizer, SketchRenderer};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::agent::SotAgent;
use crate::settings::Settings;
use crate::state::AppState;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Interactive,
    Demo,
    Instructions,
    Server,
}

#[derive(Parser)]
#[command(name = "sot-agent", version, about = "Sketch-of-Thought AI agent")]
struct Cli {
    /// Operation mode
    #[arg(long, value_enum, default_value_t = Mode::Interactive)]
    mode: Mode,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    init_tracing(&settings, cli.debug);

    let provider = settings.build_provider()?;

    match provider.health_check().await {
        Ok(true) => {
            tracing::info!(provider = ?settings.provider, "✓ Connected to completion provider");
            if let Ok(models) = provider.list_models().await {
                for model in models {
                    tracing::debug!("  Model: {}", model.id);
                }
            }
        }
        Ok(false) | Err(_) => {
            tracing::warn!(provider = ?settings.provider, "⚠ Provider not reachable; answers will carry errors");
        }
    }

    let agent = SotAgent::new(
        settings.text_generator(provider.clone()),
        SensorDataManager::new(Arc::new(SimulatedDriver::new())),
        build_renderer(&settings)?,
    );

    match cli.mode {
        Mode::Interactive => {
            tracing::info!("Starting interactive mode");
            let mut agent = agent;
            modes::interactive(&mut agent).await
        }
        Mode::Demo => {
            tracing::info!("Running demo");
            let mut agent = agent;
            modes::demo(&mut agent).await
        }
        Mode::Instructions => {
            tracing::info!("Running instruction set");
            modes::instructions(&agent).await
        }
        Mode::Server => serve(&settings, AppState::new(agent, provider)).await,
    }
}

/// `RUST_LOG` wins; otherwise `LOG_LEVEL`, bumped to debug by `--debug` or `DEBUG_MODE`
fn init_tracing(settings: &Settings, debug_flag: bool) {
    let filter = if debug_flag || settings.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(settings.log_level.to_lowercase()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if debug_flag || settings.debug {
        tracing::debug!("Debug mode enabled");
    }
}

fn build_renderer(settings: &Settings) -> Result<SketchRenderer> {
    let rasterizer = match &settings.font_path {
        Some(path) => BitmapRasterizer::from_font_file(path)
            .with_context(|| format!("loading SKETCH_FONT_PATH {}", path.display()))?,
        None => BitmapRasterizer::new(),
    };

    let renderer = SketchRenderer::new(Box::new(rasterizer));
    Ok(match &settings.output_dir {
        Some(dir) => renderer
            .with_output_dir(dir)
            .with_context(|| format!("creating SKETCH_OUTPUT_DIR {}", dir.display()))?,
        None => renderer,
    })
}

async fn serve(settings: &Settings, state: AppState) -> Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = handlers::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 sot-agent server running on http://{}", settings.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health           - Health check");
    tracing::info!("  GET  /api/models       - List available models");
    tracing::info!("  POST /api/reason       - Reason about a query or queued event");
    tracing::info!("  POST /api/instructions - Run an instruction set");
    tracing::info!("  POST /api/sketch       - Render a sketch or thought tree");
    tracing::info!("  POST /api/ingest       - Ingest sensor data");

    axum::serve(listener, app).await?;

    Ok(())
}
