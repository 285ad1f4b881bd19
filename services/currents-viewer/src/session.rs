//! Viewer session state.
//!
//! The session owns the synchronizer, the masks and the status board, and
//! publishes the latest complete field and overlay through watch channels.
//! Only the session writes to the channels; the animation loop and point
//! queries read whatever was published last.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, instrument};

use currents_common::{CurrentsError, CurrentsResult, StatusBoard, TimeSlice};
use flow_field::{
    build_field, build_overlay, display_date, Field, FieldBuilder, FieldVector, Magnitude, Mask,
    Overlay, OverlayBuilder, OverlayKind,
};
use storage::{Advance, SeriesSynchronizer};

use crate::config::ViewerConfig;
use crate::format::{format_coordinates, format_overlay_value, format_vector};
use crate::settings::Settings;

pub type FieldReceiver = watch::Receiver<Option<Arc<Field>>>;

/// Details of one queried point, kept until the next navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct PointDetails {
    pub x: f64,
    pub y: f64,
    pub location: Option<String>,
    pub vector: String,
    pub overlay: Option<String>,
}

impl PointDetails {
    /// `vector | overlay`, as shown next to the point.
    pub fn text(&self) -> String {
        match &self.overlay {
            Some(overlay) => format!("{} | {}", self.vector, overlay),
            None => self.vector.clone(),
        }
    }
}

pub struct Session {
    settings: Settings,
    config: ViewerConfig,
    mask: Arc<Mask>,
    sync: SeriesSynchronizer,
    status: StatusBoard,
    field_tx: watch::Sender<Option<Arc<Field>>>,
    overlay_tx: watch::Sender<Option<Arc<Overlay>>>,
    display_time: Option<String>,
    points: Vec<PointDetails>,
}

impl Session {
    pub fn new(
        settings: Settings,
        config: ViewerConfig,
        mask: Arc<Mask>,
        sync: SeriesSynchronizer,
        status: StatusBoard,
    ) -> Self {
        let (field_tx, _) = watch::channel(None);
        let (overlay_tx, _) = watch::channel(None);
        Self {
            settings,
            config,
            mask,
            sync,
            status,
            field_tx,
            overlay_tx,
            display_time: None,
            points: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn mask(&self) -> &Arc<Mask> {
        &self.mask
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    pub fn synchronizer(&self) -> &SeriesSynchronizer {
        &self.sync
    }

    pub fn overlay_kind(&self) -> Option<OverlayKind> {
        self.config.overlay_kind()
    }

    /// Timestamp of the published field, without its offset suffix.
    pub fn display_time(&self) -> Option<&str> {
        self.display_time.as_deref()
    }

    pub fn subscribe_field(&self) -> FieldReceiver {
        self.field_tx.subscribe()
    }

    pub fn field(&self) -> Option<Arc<Field>> {
        self.field_tx.borrow().clone()
    }

    pub fn overlay(&self) -> Option<Arc<Overlay>> {
        self.overlay_tx.borrow().clone()
    }

    fn current_slice(&self) -> CurrentsResult<TimeSlice> {
        self.sync
            .current_slice()
            .cloned()
            .ok_or(CurrentsError::InsufficientSamples {
                required: 1,
                found: 0,
            })
    }

    /// Interpolate the current slice and publish the field on success.
    ///
    /// On failure the previously published field stays in place.
    #[instrument(skip(self))]
    pub async fn rebuild_field(&mut self) -> CurrentsResult<Arc<Field>> {
        let result = self.build_current_field().await;
        match result {
            Ok(field) => {
                let date = display_date(&field);
                self.status.report(date.clone());
                self.display_time = Some(date);
                self.field_tx.send_replace(Some(field.clone()));
                Ok(field)
            }
            Err(e) => {
                error!(error = %e, "Field build failed");
                self.status.error(&e);
                Err(e)
            }
        }
    }

    async fn build_current_field(&self) -> CurrentsResult<Arc<Field>> {
        let slice = self.current_slice()?;
        let builder = FieldBuilder::new(
            std::slice::from_ref(&slice),
            self.settings.projection.as_ref(),
            self.settings.display_bounds,
            self.settings.velocity_scale,
            self.mask.clone(),
            &self.config.field,
        )?;
        let status = &self.status;
        let field = build_field(builder, &self.config.field, |progress| {
            status.report(progress.to_string());
        })
        .await?;
        Ok(Arc::new(field))
    }

    /// Build and publish the overlay, when one is configured.
    #[instrument(skip(self))]
    pub async fn rebuild_overlay(&mut self) -> CurrentsResult<Option<Arc<Overlay>>> {
        let Some(kind) = self.config.overlay_kind() else {
            return Ok(None);
        };

        let result = self.build_current_overlay(kind).await;
        match result {
            Ok(overlay) => {
                self.overlay_tx.send_replace(Some(overlay.clone()));
                if let Some(date) = &self.display_time {
                    self.status.report(date.clone());
                }
                Ok(Some(overlay))
            }
            Err(e) => {
                error!(error = %e, overlay = kind.id, "Overlay build failed");
                self.status.error(&e);
                Err(e)
            }
        }
    }

    async fn build_current_overlay(&self, kind: OverlayKind) -> CurrentsResult<Arc<Overlay>> {
        let slice = self.current_slice()?;
        let builder = OverlayBuilder::new(
            kind,
            std::slice::from_ref(&slice),
            self.settings.projection.as_ref(),
            self.settings.display_bounds,
            self.mask.clone(),
        )?;
        let status = &self.status;
        let overlay = build_overlay(builder, &self.config.field, |progress| {
            status.report(progress.to_string());
        })
        .await?;
        Ok(Arc::new(overlay))
    }

    /// Move through time and rebuild the field when the slice changes.
    ///
    /// User points are cleared first. A partition that fails to load is
    /// reported as a status message; navigation still resolves against the
    /// slices already loaded. Returns after any rebuild has finished.
    #[instrument(skip(self))]
    pub async fn advance_time(&mut self, offset_minutes: i64) -> Advance {
        self.clear_points();

        let advance = self.sync.advance(offset_minutes).await;
        metrics::counter!("navigation_steps").increment(1);

        if advance.moved() {
            // Failures are already on the status board.
            let _ = self.rebuild_field().await;
        } else {
            info!(offset_minutes, "No new data found for target time");
        }

        // Reported last so the rebuilt date does not replace it.
        if let Some(e) = &advance.load_error {
            self.status.report(format!("Failed to load data: {}", e));
        }
        advance
    }

    /// Field vector at a pixel of the published field, or NIL.
    pub fn sample_field(&self, x: f64, y: f64) -> FieldVector {
        match self.field_tx.borrow().as_ref() {
            Some(field) => field.sample(x, y),
            None => FieldVector::NIL,
        }
    }

    /// Raw overlay value at a pixel, when an overlay is published.
    pub fn sample_overlay(&self, x: f64, y: f64) -> Option<f64> {
        self.overlay_tx
            .borrow()
            .as_ref()
            .map(|overlay| overlay.value_at(x, y))
    }

    /// Describe a point and remember it, unless it is outside the field.
    pub fn query_point(&mut self, x: f64, y: f64) -> Option<PointDetails> {
        let vector = self.sample_field(x, y);
        if !(vector.magnitude >= Magnitude::Invisible) {
            return None;
        }

        let scale = self.settings.velocity_scale;
        let location = self
            .settings
            .projection
            .invert(x, y)
            .map(|[lng, lat]| format_coordinates(lng, lat));
        let overlay = match (self.config.overlay_kind(), self.sample_overlay(x, y)) {
            (Some(kind), Some(value)) => Some(format_overlay_value(&kind, value)),
            _ => None,
        };

        let details = PointDetails {
            x,
            y,
            location,
            vector: format_vector(vector.u / scale, vector.v / scale),
            overlay,
        };
        info!(x, y, details = %details.text(), "Point queried");
        self.points.push(details.clone());
        Some(details)
    }

    pub fn points(&self) -> &[PointDetails] {
        &self.points
    }

    pub fn clear_points(&mut self) {
        self.points.clear();
    }
}
