//! Staged initialization.
//!
//! Each stage names the stages it consumes. `initialize` runs them in an
//! order that satisfies those inputs, reporting a status line and timing each
//! one. Animation is started by the caller once the session exists.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDateTime};
use tiny_skia::Pixmap;
use tracing::{info, instrument};

use currents_common::{Boundary, StatusBoard};
use storage::{ObjectStoreSource, SeriesSynchronizer, SourceConfig};

use crate::config::ViewerConfig;
use crate::session::Session;
use crate::settings::Settings;

/// Named initialization stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Boundary,
    Settings,
    Mesh,
    Masks,
    Data,
    Stations,
    Field,
    Overlay,
    Animate,
}

impl Stage {
    /// Every stage, in run order.
    pub const ALL: [Stage; 9] = [
        Stage::Boundary,
        Stage::Settings,
        Stage::Mesh,
        Stage::Masks,
        Stage::Data,
        Stage::Stations,
        Stage::Field,
        Stage::Overlay,
        Stage::Animate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Boundary => "boundary",
            Stage::Settings => "settings",
            Stage::Mesh => "mesh",
            Stage::Masks => "masks",
            Stage::Data => "data",
            Stage::Stations => "stations",
            Stage::Field => "field",
            Stage::Overlay => "overlay",
            Stage::Animate => "animate",
        }
    }

    /// Stages whose outputs this stage reads.
    pub fn inputs(&self) -> &'static [Stage] {
        match self {
            Stage::Boundary => &[],
            Stage::Settings => &[Stage::Boundary],
            Stage::Mesh => &[Stage::Boundary, Stage::Settings],
            Stage::Masks => &[Stage::Mesh, Stage::Settings],
            Stage::Data => &[],
            Stage::Stations => &[Stage::Data, Stage::Mesh],
            Stage::Field => &[Stage::Data, Stage::Settings, Stage::Masks],
            Stage::Overlay => &[Stage::Data, Stage::Settings, Stage::Masks],
            Stage::Animate => &[Stage::Settings, Stage::Field],
        }
    }

    /// Status line shown while the stage runs.
    pub fn status(&self) -> &'static str {
        match self {
            Stage::Boundary => "Loading boundary...",
            Stage::Settings => "Fitting projection...",
            Stage::Mesh => "building meshes...",
            Stage::Masks => "Rendering masks...",
            Stage::Data => "Loading data...",
            Stage::Stations => "Rendering map...",
            Stage::Field => "Interpolating...",
            Stage::Overlay => "Drawing overlay...",
            Stage::Animate => "Animating...",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where the viewer reads its inputs from.
#[derive(Debug, Clone)]
pub struct ViewerInputs {
    pub data: SourceConfig,
    pub boundary: PathBuf,
    /// Starting date (`YYYY-MM-DD` or a full timestamp); today when absent.
    pub date: Option<String>,
    /// Wall-clock "now"; the local clock when absent.
    pub now: Option<NaiveDateTime>,
}

/// Everything produced before animation starts.
pub struct Initialized {
    pub session: Session,
    pub boundary: Boundary,
    /// Coastline plus station dots for the starting slice.
    pub basemap: Pixmap,
}

struct StageTimer<'a> {
    status: &'a StatusBoard,
    stage: Stage,
    start: Instant,
}

impl<'a> StageTimer<'a> {
    fn begin(status: &'a StatusBoard, stage: Stage) -> Self {
        status.report(stage.status());
        Self {
            status,
            stage,
            start: Instant::now(),
        }
    }

    fn end(self) {
        let elapsed = self.start.elapsed();
        let status = self.status.current();
        metrics::histogram!("stage_seconds", "stage" => self.stage.name())
            .record(elapsed.as_secs_f64());
        info!(
            stage = %self.stage,
            elapsed_ms = elapsed.as_millis() as u64,
            status = %status.text(),
            "Stage complete"
        );
    }
}

/// Run every stage up to the overlay and hand back the session.
///
/// A failure in any stage before the overlay aborts initialization. An
/// overlay failure is left on the status board and the session still
/// starts without one.
#[instrument(skip_all, fields(boundary = ?inputs.boundary, data = %inputs.data.base))]
pub async fn initialize(inputs: &ViewerInputs, config: &ViewerConfig) -> Result<Initialized> {
    let status = StatusBoard::new();

    let timer = StageTimer::begin(&status, Stage::Boundary);
    let content = tokio::fs::read_to_string(&inputs.boundary)
        .await
        .with_context(|| format!("Failed to read: {:?}", inputs.boundary))?;
    let boundary = Boundary::from_geojson_str(&content)
        .with_context(|| format!("Failed to parse boundary: {:?}", inputs.boundary))?;
    timer.end();

    let timer = StageTimer::begin(&status, Stage::Settings);
    let settings = Settings::from_boundary(&boundary, config);
    info!(settings = ?settings, "Settings derived");
    timer.end();

    let timer = StageTimer::begin(&status, Stage::Mesh);
    let mesh = renderer::boundary_path(&boundary, settings.projection.as_ref())
        .ok_or_else(|| anyhow!("Boundary has no drawable rings"))?;
    info!(vertices = boundary.vertex_count(), "Mesh built");
    timer.end();

    let timer = StageTimer::begin(&status, Stage::Masks);
    let mask = renderer::render_masks(&mesh, settings.view, settings.field_mask_width)?;
    timer.end();

    let timer = StageTimer::begin(&status, Stage::Data);
    let source = ObjectStoreSource::new(&inputs.data)?;
    let mut sync = SeriesSynchronizer::new(Arc::new(source));
    sync.bootstrap_catalog().await?;
    let now = inputs
        .now
        .unwrap_or_else(|| Local::now().naive_local());
    sync.start(inputs.date.as_deref(), now).await?;
    timer.end();

    let timer = StageTimer::begin(&status, Stage::Stations);
    let basemap = renderer::render_basemap(
        Some(&mesh),
        sync.current_slice(),
        settings.projection.as_ref(),
        settings.view,
    )?;
    timer.end();

    let mut session = Session::new(settings, config.clone(), Arc::new(mask), sync, status.clone());

    let timer = StageTimer::begin(&status, Stage::Field);
    session.rebuild_field().await?;
    timer.end();

    if session.overlay_kind().is_some() {
        let timer = StageTimer::begin(&status, Stage::Overlay);
        // Failures are already on the status board.
        let _ = session.rebuild_overlay().await;
        timer.end();
    }

    Ok(Initialized {
        session,
        boundary,
        basemap,
    })
}
