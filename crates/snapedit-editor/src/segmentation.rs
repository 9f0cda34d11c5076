//! Foreground segmentation service and the timed job that calls it.

use crate::raster::{Mask, RasterImage};
use async_trait::async_trait;
use snapedit_core::ServiceError;
use std::time::{Duration, Instant};

/// Locates the foreground subject of an image.
#[async_trait]
pub trait SegmentationService: Send + Sync {
    fn name(&self) -> &str;

    /// Returns a mask where bright pixels belong to the subject.
    async fn segment(&self, image: &RasterImage) -> Result<Mask, ServiceError>;
}

/// Treats the image's own alpha channel as the subject mask.
///
/// Useful for images that were cut out beforehand.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaChannelSegmenter;

#[async_trait]
impl SegmentationService for AlphaChannelSegmenter {
    fn name(&self) -> &str {
        "alpha-channel"
    }

    async fn segment(&self, image: &RasterImage) -> Result<Mask, ServiceError> {
        if !image.has_transparency() {
            tracing::warn!("Image has no transparency; the whole frame becomes the subject");
        }
        Ok(Mask::from_alpha(image))
    }
}

/// One segmentation request, tagged with the ticket that must still be
/// current when its result comes back.
#[derive(Debug, Clone)]
pub struct SegmentationJob {
    pub ticket: u64,
    pub image: RasterImage,
}

#[derive(Debug)]
pub struct SegmentationOutcome {
    pub ticket: u64,
    pub elapsed: Duration,
    pub result: Result<Mask, ServiceError>,
}

impl SegmentationJob {
    /// Calls `service`, giving up after `timeout`.
    pub async fn run(self, service: &dyn SegmentationService, timeout: Duration) -> SegmentationOutcome {
        let started = Instant::now();
        tracing::debug!("Segmentation #{} sent to {}", self.ticket, service.name());

        let result = match tokio::time::timeout(timeout, service.segment(&self.image)).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::Timeout {
                service: service.name().to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        };

        SegmentationOutcome {
            ticket: self.ticket,
            elapsed: started.elapsed(),
            result,
        }
    }
}
