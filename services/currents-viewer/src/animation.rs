//! Particle animation loop.
//!
//! Waits for the first published field, then steps and draws the particle
//! pool once per frame tick against whatever field is current at that tick.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument};

use flow_field::{Field, ParticleSystem};
use renderer::ParticleCanvas;

use crate::session::FieldReceiver;
use crate::settings::Settings;

/// How long to animate and where frames go.
#[derive(Debug, Clone, Default)]
pub struct AnimationOptions {
    /// Stop after this many frames; run until dropped when `None`.
    pub frames: Option<u64>,
    /// Write every Nth frame as a PNG into `output_dir`.
    pub export_every: Option<u64>,
    pub output_dir: Option<PathBuf>,
    /// Fixed particle seed for reproducible frames.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct AnimationReport {
    pub frames: u64,
    pub exported: Vec<PathBuf>,
    /// PNG of the last frame drawn.
    pub last_frame: Option<Vec<u8>>,
}

/// Run the animation until `options.frames` frames have been drawn.
#[instrument(skip_all, fields(frames = ?options.frames, frame_rate_ms = settings.frame_rate_ms))]
pub async fn animate(
    settings: &Settings,
    mut field_rx: FieldReceiver,
    options: AnimationOptions,
) -> Result<AnimationReport> {
    let first: Arc<Field> = field_rx
        .wait_for(Option::is_some)
        .await
        .context("Session closed before a field was published")?
        .clone()
        .context("Published field missing")?;

    let rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut canvas = ParticleCanvas::new(settings.view, settings.display_bounds)?
        .with_fade(settings.fade_alpha);
    let mut particles = ParticleSystem::new(
        &first,
        settings.particle_count,
        settings.max_particle_age,
        settings.max_intensity,
        canvas.styles().len(),
        rng,
    );
    info!(particles = settings.particle_count, "Animation started");

    if let Some(dir) = &options.output_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(settings.frame_rate_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut report = AnimationReport::default();
    loop {
        if options.frames.is_some_and(|limit| canvas.frames() >= limit) {
            break;
        }
        ticker.tick().await;

        let field = field_rx.borrow_and_update().clone();
        if let Some(field) = field {
            particles.evolve(&field);
        }
        canvas.render_frame(&mut particles);
        metrics::counter!("frames_rendered").increment(1);

        let frame = canvas.frames();
        if let (Some(every), Some(dir)) = (options.export_every, &options.output_dir) {
            if every > 0 && frame % every == 0 {
                let path = dir.join(format!("frame-{:05}.png", frame));
                let png = canvas.encode_png()?;
                tokio::fs::write(&path, png)
                    .await
                    .with_context(|| format!("Failed to write frame: {:?}", path))?;
                debug!(path = ?path, "Frame exported");
                report.exported.push(path);
            }
        }
    }

    report.frames = canvas.frames();
    report.last_frame = Some(canvas.encode_png()?);
    info!(frames = report.frames, exported = report.exported.len(), "Animation finished");
    Ok(report)
}
