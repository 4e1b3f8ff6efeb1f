//! Single-attempt upload pipeline with an explicit in-flight guard.
//!
//! The pipeline owns the draft slot, so "exactly one draft live" and "at
//! most one submission in flight" are both enforced by the data model
//! rather than by UI affordances. A submission runs Validating → Encoding
//! → Submitting and settles Succeeded or Failed; the draft is cleared only
//! on success.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use geosnap_core::{CoreError, DraftSlot, Geotag, SourceFile, UploadDraft};

use crate::api::{GalleryApi, UploadReceipt};
use crate::error::UploadError;

/// Pipeline phase, observable by the shell for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    /// Nothing in progress.
    Idle,
    /// Re-checking the draft's source file.
    Validating,
    /// Exporting the canvas raster to PNG.
    Encoding,
    /// Multipart request in flight.
    Submitting,
    /// Last submission was accepted.
    Succeeded,
    /// Last submission failed; the draft is preserved.
    Failed,
}

/// Notified with the receipt after every accepted submission. The usual
/// registration triggers a gallery refresh.
type SuccessHook = Box<dyn Fn(&UploadReceipt) + Send + Sync>;

/// Upload pipeline: file selection, validation, raster encoding, and one
/// network submission.
pub struct UploadPipeline {
    api: GalleryApi,
    slot: Mutex<DraftSlot>,
    in_flight: AtomicBool,
    phase: Mutex<UploadPhase>,
    on_success: Option<SuccessHook>,
}

impl UploadPipeline {
    /// Create a pipeline submitting through the given client.
    #[must_use]
    pub fn new(api: GalleryApi) -> Self {
        Self {
            api,
            slot: Mutex::new(DraftSlot::new()),
            in_flight: AtomicBool::new(false),
            phase: Mutex::new(UploadPhase::Idle),
            on_success: None,
        }
    }

    /// Register a hook run after every accepted submission, typically a
    /// gallery-refresh trigger. Must be called before the pipeline is
    /// shared.
    pub fn set_on_success(&mut self, hook: impl Fn(&UploadReceipt) + Send + Sync + 'static) {
        self.on_success = Some(Box::new(hook));
    }

    /// Validate and select a file, replacing any unsubmitted draft. A
    /// rejected file leaves the previous draft untouched and clears no
    /// state.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Core`] carrying the validation or decode
    /// failure.
    pub fn select_file(&self, file: SourceFile) -> Result<(), UploadError> {
        self.lock_slot().select(file)?;
        self.set_phase(UploadPhase::Idle);
        Ok(())
    }

    /// Run a closure against the live draft (style changes, pointer
    /// events, geotag updates). Returns `None` when no draft is selected.
    pub fn with_draft<R>(&self, f: impl FnOnce(&mut UploadDraft) -> R) -> Option<R> {
        self.lock_slot().draft_mut().map(f)
    }

    /// Attach a geolocation sample to the live draft.
    ///
    /// Returns `false` when no draft is selected.
    pub fn set_geotag(&self, geotag: Geotag) -> bool {
        self.with_draft(|draft| draft.geotag = Some(geotag))
            .is_some()
    }

    /// Whether a draft is currently selected.
    #[must_use]
    pub fn has_draft(&self) -> bool {
        self.lock_slot().has_draft()
    }

    /// Explicitly discard the live draft.
    pub fn reset(&self) {
        self.lock_slot().clear();
        self.set_phase(UploadPhase::Idle);
    }

    /// Current pipeline phase.
    #[must_use]
    pub fn phase(&self) -> UploadPhase {
        *self
            .phase
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a submission is currently in flight.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submit the live draft: export the canvas raster (annotations burned
    /// into the pixels) and post it with the geotag, substituting (0, 0)
    /// when no geolocation sample was obtained.
    ///
    /// Exactly one network attempt. On acceptance the draft and error
    /// state are cleared and the success hook fires; on failure the draft
    /// is preserved for manual resubmission. An in-flight upload is never
    /// cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::AlreadyInFlight`] without dispatching when a
    /// submission is in flight, [`UploadError::NoDraft`] when nothing is
    /// selected, and core/client variants for encoding and network
    /// failures.
    pub async fn submit(&self, description: Option<&str>) -> Result<UploadReceipt, UploadError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("submission rejected: one already in flight");
            return Err(UploadError::AlreadyInFlight);
        }
        let _guard = InFlightGuard {
            flag: &self.in_flight,
        };

        let result = self.run(description).await;
        match &result {
            Ok(receipt) => {
                self.lock_slot().clear();
                self.set_phase(UploadPhase::Succeeded);
                tracing::info!(url = %receipt.url, "upload accepted");
                if let Some(hook) = &self.on_success {
                    hook(receipt);
                }
            }
            Err(err) => {
                self.set_phase(UploadPhase::Failed);
                tracing::warn!("upload failed, draft preserved: {err}");
            }
        }
        result
    }

    async fn run(&self, description: Option<&str>) -> Result<UploadReceipt, UploadError> {
        // Stage the payload under the slot lock, then release it before
        // awaiting the network.
        let (png, geotag) = {
            self.set_phase(UploadPhase::Validating);
            let mut slot = self.lock_slot();
            let draft = slot.draft_mut().ok_or(UploadError::NoDraft)?;
            draft.source.validate().map_err(CoreError::from)?;

            self.set_phase(UploadPhase::Encoding);
            let png = draft.canvas.export_raster()?;
            (png, draft.geotag.unwrap_or_default())
        };

        self.set_phase(UploadPhase::Submitting);
        let receipt = self.api.upload_image(png, geotag, description).await?;
        Ok(receipt)
    }

    fn lock_slot(&self) -> MutexGuard<'_, DraftSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: UploadPhase) {
        *self
            .phase
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = phase;
    }
}

/// Releases the single-slot in-flight token on every exit path.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_starts_idle_with_no_draft() {
        let api = GalleryApi::new("http://localhost:8000").expect("api");
        let pipeline = UploadPipeline::new(api);
        assert_eq!(pipeline.phase(), UploadPhase::Idle);
        assert!(!pipeline.has_draft());
        assert!(!pipeline.is_in_flight());
    }

    #[tokio::test]
    async fn test_submit_without_draft_fails() {
        let api = GalleryApi::new("http://localhost:8000").expect("api");
        let pipeline = UploadPipeline::new(api);

        let err = pipeline.submit(None).await.expect_err("no draft");
        assert!(matches!(err, UploadError::NoDraft));
        assert_eq!(pipeline.phase(), UploadPhase::Failed);
        assert!(!pipeline.is_in_flight());
    }

    #[test]
    fn test_select_rejects_invalid_files() {
        let api = GalleryApi::new("http://localhost:8000").expect("api");
        let pipeline = UploadPipeline::new(api);

        let file = SourceFile::new("notes.txt", "text/plain", vec![0; 16]);
        assert!(pipeline.select_file(file).is_err());
        assert!(!pipeline.has_draft());
    }
}
