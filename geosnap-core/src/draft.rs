//! Upload draft lifecycle and file-selection validation.
//!
//! Validation runs before any canvas work: a rejected file creates no
//! partial draft and leaves the previously selected draft (if any) live.

use crate::canvas::AnnotationCanvas;
use crate::error::{CoreResult, ValidationError, MAX_UPLOAD_BYTES};
use crate::geo::Geotag;

/// A user-selected file with its declared media type. Untrusted until
/// validated.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Original filename.
    pub name: String,
    /// Declared MIME type, e.g. `image/png`.
    pub media_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl SourceFile {
    /// Bundle a selected file.
    #[must_use]
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Validate the declared type and size ahead of any canvas work.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotAnImage`] when the declared media type
    /// does not indicate an image, and [`ValidationError::TooLarge`] when
    /// the file exceeds [`MAX_UPLOAD_BYTES`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.media_type.starts_with("image/") {
            return Err(ValidationError::NotAnImage(self.media_type.clone()));
        }
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ValidationError::TooLarge {
                size: self.bytes.len(),
            });
        }
        Ok(())
    }
}

/// The live upload draft: source file, annotation canvas sized to the
/// source's pixel dimensions, and an optional geotag.
#[derive(Debug)]
pub struct UploadDraft {
    /// The validated source file.
    pub source: SourceFile,
    /// Canvas holding the raster buffer; mutated in place by every stroke.
    pub canvas: AnnotationCanvas,
    /// Geolocation sample, when one was obtained. Submission substitutes
    /// (0, 0) when absent.
    pub geotag: Option<Geotag>,
}

/// Owner enforcing that exactly one draft is live at a time.
///
/// A successful selection replaces any unsubmitted draft and its canvas
/// state; a failed validation leaves the previous draft untouched.
#[derive(Debug, Default)]
pub struct DraftSlot {
    current: Option<UploadDraft>,
}

impl DraftSlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and select a file.
    ///
    /// On success the slot holds a fresh draft whose canvas is initialized
    /// to the decoded image's pixel dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::Validation`] when the file is rejected
    /// and [`crate::CoreError::Decode`] when the declared image fails to
    /// decode. Either way the previous draft stays live.
    pub fn select(&mut self, file: SourceFile) -> CoreResult<&mut UploadDraft> {
        file.validate()?;
        let canvas = AnnotationCanvas::from_source(&file.bytes)?;
        tracing::debug!(
            name = %file.name,
            width = canvas.dimensions().0,
            height = canvas.dimensions().1,
            "draft selected"
        );

        Ok(self.current.insert(UploadDraft {
            source: file,
            canvas,
            geotag: None,
        }))
    }

    /// The live draft, if any.
    #[must_use]
    pub fn draft(&self) -> Option<&UploadDraft> {
        self.current.as_ref()
    }

    /// Mutable access to the live draft, if any.
    pub fn draft_mut(&mut self) -> Option<&mut UploadDraft> {
        self.current.as_mut()
    }

    /// Whether a draft is live.
    #[must_use]
    pub fn has_draft(&self) -> bool {
        self.current.is_some()
    }

    /// Discard the live draft and its canvas state. Called after a
    /// successful submission or an explicit reset.
    pub fn clear(&mut self) {
        if self.current.take().is_some() {
            tracing::debug!("draft cleared");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    fn png_file(width: u32, height: u32) -> SourceFile {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255]));
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .expect("encode test png");
        SourceFile::new("photo.png", "image/png", out)
    }

    fn jpeg_file(width: u32, height: u32) -> SourceFile {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([128, 64, 32]));
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Jpeg)
            .expect("encode test jpeg");
        SourceFile::new("photo.jpg", "image/jpeg", out)
    }

    #[test]
    fn test_non_image_type_rejected_before_canvas_work() {
        let file = SourceFile::new("notes.txt", "text/plain", vec![1, 2, 3]);
        assert_eq!(
            file.validate(),
            Err(ValidationError::NotAnImage("text/plain".to_string()))
        );

        let mut slot = DraftSlot::new();
        assert!(slot.select(file).is_err());
        assert!(!slot.has_draft());
    }

    #[test]
    fn test_oversized_file_rejected() {
        let size = MAX_UPLOAD_BYTES + 1;
        let file = SourceFile::new("big.png", "image/png", vec![0; size]);
        assert_eq!(file.validate(), Err(ValidationError::TooLarge { size }));
    }

    #[test]
    fn test_size_limit_boundary() {
        // Exactly at the limit passes validation (decode happens later).
        let file = SourceFile::new("edge.png", "image/png", vec![0; MAX_UPLOAD_BYTES]);
        assert!(file.validate().is_ok());
    }

    #[test]
    fn test_oversized_non_image_rejected_for_its_type() {
        // The type check runs first, so the size never enters into it.
        let file = SourceFile::new("big.bin", "application/zip", vec![0; MAX_UPLOAD_BYTES + 1]);
        assert_eq!(
            file.validate(),
            Err(ValidationError::NotAnImage("application/zip".to_string()))
        );
    }

    #[test]
    fn test_valid_selection_initializes_canvas_to_image_dimensions() {
        let mut slot = DraftSlot::new();
        let draft = slot.select(jpeg_file(120, 80)).expect("valid jpeg");
        assert_eq!(draft.canvas.dimensions(), (120, 80));
        assert!(draft.geotag.is_none());
    }

    #[test]
    fn test_declared_image_that_fails_to_decode_creates_no_draft() {
        let mut slot = DraftSlot::new();
        let file = SourceFile::new("fake.png", "image/png", vec![1, 2, 3, 4]);
        assert!(matches!(slot.select(file), Err(CoreError::Decode(_))));
        assert!(!slot.has_draft());
    }

    #[test]
    fn test_failed_selection_keeps_previous_draft() {
        let mut slot = DraftSlot::new();
        slot.select(png_file(40, 40)).expect("first selection");

        let rejected = SourceFile::new("notes.txt", "text/plain", vec![0; 10]);
        assert!(slot.select(rejected).is_err());

        let draft = slot.draft().expect("previous draft retained");
        assert_eq!(draft.canvas.dimensions(), (40, 40));
        assert_eq!(draft.source.name, "photo.png");
    }

    #[test]
    fn test_new_selection_replaces_unsubmitted_draft() {
        let mut slot = DraftSlot::new();
        slot.select(png_file(40, 40)).expect("first selection");
        slot.draft_mut().expect("draft").geotag = Some(Geotag::new(1.0, 2.0));

        slot.select(png_file(64, 32)).expect("second selection");
        let draft = slot.draft().expect("replaced draft");
        assert_eq!(draft.canvas.dimensions(), (64, 32));
        // The replacement is a fresh draft, not a mutation of the old one.
        assert!(draft.geotag.is_none());
    }

    #[test]
    fn test_clear_discards_draft() {
        let mut slot = DraftSlot::new();
        slot.select(png_file(8, 8)).expect("selection");
        slot.clear();
        assert!(!slot.has_draft());
        // Clearing an empty slot is harmless.
        slot.clear();
    }
}
