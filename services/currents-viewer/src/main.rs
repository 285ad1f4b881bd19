//! Tidal currents viewer
//!
//! Builds the flow field for a data directory and boundary, animates the
//! particles, replays a navigation script and exports PNG layers.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use currents_viewer::{
    animate, initialize, parse_point, AnimationOptions, Session, ViewerConfig, ViewerInputs,
};
use storage::SourceConfig;

/// Tidal currents viewer
#[derive(Parser, Debug)]
#[command(name = "currents-viewer")]
#[command(about = "Animate tidal currents over a boundary and export frames")]
struct Args {
    /// Data directory or URL holding index.json, stations.json and partitions
    #[arg(long, default_value = "data/currents/partitioned", env = "CURRENTS_DATA")]
    data: String,

    /// GeoJSON boundary of the water body
    #[arg(long, env = "CURRENTS_BOUNDARY")]
    boundary: PathBuf,

    /// Starting date (YYYY-MM-DD); today or the earliest indexed date otherwise
    #[arg(long)]
    date: Option<String>,

    /// Overlay to draw (tcspd)
    #[arg(long)]
    overlay: Option<String>,

    /// YAML settings file
    #[arg(long, env = "CURRENTS_CONFIG")]
    config: Option<PathBuf>,

    /// Frames to animate; runs until interrupted when absent
    #[arg(long)]
    frames: Option<u64>,

    /// Directory for exported PNGs
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Export every Nth frame
    #[arg(long)]
    export_every: Option<u64>,

    /// Navigation offsets in minutes, applied in order (e.g. 60,-15,1440)
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    navigate: Vec<i64>,

    /// Pixel to query after navigation, as x,y (repeatable)
    #[arg(long, value_parser = parse_point)]
    query: Vec<(f64, f64)>,

    /// Particle seed
    #[arg(long)]
    seed: Option<u64>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    if args.json_logs {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .json()
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .init();
    }

    // Everything shares one thread; field builds yield between bursts.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(async move {
        tokio::select! {
            result = run(args) => result,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                Ok(())
            }
        }
    })
}

async fn run(args: Args) -> Result<()> {
    let mut config = ViewerConfig::load(args.config.as_deref())?;
    if args.overlay.is_some() {
        config.overlay = args.overlay.clone();
        config.validate()?;
    }

    let inputs = ViewerInputs {
        data: SourceConfig::new(&args.data),
        boundary: args.boundary.clone(),
        date: args.date.clone(),
        now: None,
    };

    info!(data = %args.data, boundary = ?args.boundary, "Starting tidal currents viewer");
    let initialized = match initialize(&inputs, &config).await {
        Ok(initialized) => initialized,
        Err(e) => {
            error!("Failed to initialize viewer: {:#}", e);
            return Err(e);
        }
    };
    let mut session = initialized.session;

    if let Some(dir) = &args.output_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
        write_png(dir, "basemap.png", renderer::encode_pixmap(&initialized.basemap)?).await?;
    }

    let settings = session.settings().clone();
    let options = AnimationOptions {
        frames: args.frames,
        export_every: args.export_every,
        output_dir: args.output_dir.clone(),
        seed: args.seed,
    };
    let field_rx = session.subscribe_field();

    let (report, ()) = tokio::join!(
        animate(&settings, field_rx, options),
        replay(&mut session, &args.navigate, &args.query),
    );
    let report = report?;

    if let Some(dir) = &args.output_dir {
        if let Some(png) = report.last_frame {
            write_png(dir, "particles.png", png).await?;
        }
        if let Some(overlay) = session.overlay() {
            let pixmap = renderer::paint_overlay(&overlay, settings.view)?;
            write_png(dir, "overlay.png", renderer::encode_pixmap(&pixmap)?).await?;
        }
        let points: Vec<[f64; 2]> = session.points().iter().map(|p| [p.x, p.y]).collect();
        if !points.is_empty() {
            let pixmap = renderer::render_user_points(&points, settings.view)?;
            write_png(dir, "points.png", renderer::encode_pixmap(&pixmap)?).await?;
        }
    }

    let status = session.status().current();
    info!(
        frames = report.frames,
        exported = report.exported.len(),
        status = %status.text(),
        "Viewer finished"
    );
    Ok(())
}

/// Apply each navigation step, then answer each point query.
async fn replay(session: &mut Session, navigate: &[i64], queries: &[(f64, f64)]) {
    for &offset in navigate {
        let advance = session.advance_time(offset).await;
        info!(
            offset,
            moved = advance.moved(),
            time = session.display_time().unwrap_or(""),
            "Navigated"
        );
    }

    for &(x, y) in queries {
        match session.query_point(x, y) {
            Some(details) => info!(
                x,
                y,
                location = details.location.as_deref().unwrap_or(""),
                details = %details.text(),
                "Point"
            ),
            None => warn!(x, y, "Point is outside the field"),
        }
    }
}

async fn write_png(dir: &Path, name: &str, png: Vec<u8>) -> Result<()> {
    let path = dir.join(name);
    tokio::fs::write(&path, png)
        .await
        .with_context(|| format!("Failed to write: {:?}", path))?;
    info!(path = ?path, "Wrote layer");
    Ok(())
}
