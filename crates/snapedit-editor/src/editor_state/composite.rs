//! AI background and ID photo composites, including the segmentation round trip.
//!
//! Applying a composite is split in three so a UI can keep its event loop
//! running while the service works: `prepare_*` either composites straight
//! from cache or hands out a [`SegmentationJob`]; the caller runs the job;
//! [`EditorState::complete_segmentation`] consumes the outcome. A result
//! whose ticket is no longer current is discarded.

use super::{EditorState, PendingSegmentation, SegmentationRequest};
use crate::raster::RasterImage;
use crate::segmentation::{SegmentationJob, SegmentationOutcome, SegmentationService};
use crate::tools::{AiBackgroundParams, IdPhotoParams, Placement, ToolSession};
use snapedit_core::{AppEvent, NoticeLevel, Result, ServiceError, SessionError, SessionEvent};
use std::time::Duration;
use tracing::{debug, info, warn};

/// What `prepare_*` decided.
#[derive(Debug)]
pub enum CompositeStep {
    /// The cached cut-out was reused and the composite is on the canvas.
    Applied,
    /// The canvas must be segmented first.
    Segment(SegmentationJob),
}

impl EditorState {
    pub fn segmentation_timeout(&self) -> Duration {
        Duration::from_millis(self.config.segmentation.timeout_ms)
    }

    /// Starts a background replacement.
    pub fn prepare_ai_background(&mut self, params: AiBackgroundParams) -> Result<CompositeStep> {
        self.ensure_idle()?;
        let ToolSession::AiBackground(session) = &self.session else {
            return Err(SessionError::precondition("Activate the AI background tool first").into());
        };
        match session.pending_source(&self.scene)? {
            None => {
                self.finish_ai_background(&params)?;
                Ok(CompositeStep::Applied)
            }
            Some(source) => Ok(CompositeStep::Segment(
                self.begin_segmentation(SegmentationRequest::AiBackground(params), source),
            )),
        }
    }

    /// Starts an ID photo composite.
    pub fn prepare_id_photo(&mut self, params: IdPhotoParams) -> Result<CompositeStep> {
        self.ensure_idle()?;
        let ToolSession::IdPhoto(session) = &self.session else {
            return Err(SessionError::precondition("Activate the ID photo tool first").into());
        };
        match session.pending_source(&self.scene)? {
            None => {
                self.finish_id_photo(&params)?;
                Ok(CompositeStep::Applied)
            }
            Some(source) => Ok(CompositeStep::Segment(
                self.begin_segmentation(SegmentationRequest::IdPhoto(params), source),
            )),
        }
    }

    fn begin_segmentation(&mut self, request: SegmentationRequest, source: RasterImage) -> SegmentationJob {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.pending = Some(PendingSegmentation {
            ticket,
            request,
            source: source.clone(),
        });
        debug!("Segmentation #{} queued ({}x{})", ticket, source.width(), source.height());
        self.events
            .publish(AppEvent::Session(SessionEvent::SegmentationStarted { ticket }));
        SegmentationJob {
            ticket,
            image: source,
        }
    }

    /// Consumes a segmentation outcome and builds the requested composite.
    ///
    /// A failed or timed-out request leaves the scene untouched; the tool
    /// session stays active so the user can retry.
    pub fn complete_segmentation(&mut self, outcome: SegmentationOutcome) -> Result<()> {
        let Some(pending) = self.pending.take_if(|p| p.ticket == outcome.ticket) else {
            debug!("Discarding stale segmentation #{}", outcome.ticket);
            return Err(ServiceError::Stale {
                ticket: outcome.ticket,
            }
            .into());
        };

        let mask = match outcome.result {
            Ok(mask) => mask,
            Err(e) => {
                warn!("Segmentation #{} failed: {}", pending.ticket, e);
                self.events
                    .publish(AppEvent::Session(SessionEvent::SegmentationFailed {
                        ticket: pending.ticket,
                        error: e.to_string(),
                    }));
                self.notify(NoticeLevel::Error, format!("Subject detection failed: {}", e));
                return Err(e.into());
            }
        };

        self.events
            .publish(AppEvent::Session(SessionEvent::SegmentationFinished {
                ticket: pending.ticket,
                elapsed_ms: outcome.elapsed.as_millis() as u64,
            }));

        match pending.request {
            SegmentationRequest::AiBackground(params) => {
                let ToolSession::AiBackground(session) = &mut self.session else {
                    return Err(SessionError::precondition("The AI background tool is no longer active").into());
                };
                session.store_cutout(pending.source, &mask);
                self.finish_ai_background(&params)
            }
            SegmentationRequest::IdPhoto(params) => {
                let ToolSession::IdPhoto(session) = &mut self.session else {
                    return Err(SessionError::precondition("The ID photo tool is no longer active").into());
                };
                let segmentation = &self.config.segmentation;
                if let Err(e) = session.store_subject(
                    pending.source,
                    &mask,
                    segmentation.mask_threshold,
                    segmentation.sample_step,
                    &self.config.id_photo,
                ) {
                    self.notify(NoticeLevel::Error, e.to_string());
                    return Err(e.into());
                }
                self.finish_id_photo(&params).map(|_| ())
            }
        }
    }

    /// Forgets the in-flight segmentation; its result will be rejected as stale.
    pub fn cancel_pending(&mut self) -> Option<u64> {
        let pending = self.pending.take()?;
        debug!("Cancelled segmentation #{}", pending.ticket);
        Some(pending.ticket)
    }

    fn finish_ai_background(&mut self, params: &AiBackgroundParams) -> Result<()> {
        let ToolSession::AiBackground(session) = &mut self.session else {
            return Err(SessionError::precondition("Activate the AI background tool first").into());
        };
        session.compose(&mut self.scene, params)?;
        self.history.push(&self.scene)?;
        info!("Background replaced");
        self.notify(NoticeLevel::Success, "Background replaced");
        self.events.publish(AppEvent::Session(SessionEvent::CompositeApplied {
            tool: "ai-background".to_string(),
        }));
        Ok(())
    }

    fn finish_id_photo(&mut self, params: &IdPhotoParams) -> Result<Placement> {
        let ToolSession::IdPhoto(session) = &mut self.session else {
            return Err(SessionError::precondition("Activate the ID photo tool first").into());
        };
        let placement = session.compose(&mut self.scene, params, &self.config.id_photo)?;
        self.history.push(&self.scene)?;
        info!(
            "ID photo composed on {} at scale {:.3}",
            params.template.id, placement.scale
        );
        self.notify(NoticeLevel::Success, "ID photo generated");
        self.events.publish(AppEvent::Session(SessionEvent::CompositeApplied {
            tool: "id-photo".to_string(),
        }));
        Ok(placement)
    }

    /// Replaces the background, segmenting with `service` when needed.
    pub async fn apply_ai_background(
        &mut self,
        params: AiBackgroundParams,
        service: &dyn SegmentationService,
    ) -> Result<()> {
        match self.prepare_ai_background(params)? {
            CompositeStep::Applied => Ok(()),
            CompositeStep::Segment(job) => {
                let outcome = job.run(service, self.segmentation_timeout()).await;
                self.complete_segmentation(outcome)
            }
        }
    }

    /// Builds an ID photo, segmenting with `service` when needed.
    pub async fn apply_id_photo(
        &mut self,
        params: IdPhotoParams,
        service: &dyn SegmentationService,
    ) -> Result<()> {
        match self.prepare_id_photo(params)? {
            CompositeStep::Applied => Ok(()),
            CompositeStep::Segment(job) => {
                let outcome = job.run(service, self.segmentation_timeout()).await;
                self.complete_segmentation(outcome)
            }
        }
    }
}
