//! Freehand annotation canvas engine.
//!
//! A pointer-driven state machine over a [`RasterBuffer`]. Strokes render
//! incrementally: every pointer-move rasterizes one segment into the shared
//! buffer with the style snapshotted at pointer-down. Finished strokes are
//! never retained as vector objects, so the export is always a flat image
//! and there is no undo.

use crate::error::CoreResult;
use crate::raster::RasterBuffer;
use crate::stroke::StrokeStyle;

/// Pointer interaction phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasPhase {
    /// No stroke in progress.
    Idle,
    /// A stroke is being drawn.
    Drawing,
}

/// The in-progress stroke: style snapshot plus the last rasterized point.
#[derive(Debug, Clone, Copy)]
struct ActiveStroke {
    style: StrokeStyle,
    last: (f32, f32),
}

/// Pointer-driven annotation canvas over a raster buffer.
///
/// The buffer is mutated only here, and only while Drawing or during an
/// explicit [`load_source`](Self::load_source) call.
#[derive(Debug, Clone)]
pub struct AnnotationCanvas {
    buffer: RasterBuffer,
    style: StrokeStyle,
    active: Option<ActiveStroke>,
}

impl AnnotationCanvas {
    /// Create a canvas by decoding a source image; the buffer takes the
    /// image's pixel dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::Decode`] if the bytes are not a
    /// decodable image.
    pub fn from_source(bytes: &[u8]) -> CoreResult<Self> {
        Ok(Self {
            buffer: RasterBuffer::from_bytes(bytes)?,
            style: StrokeStyle::default(),
            active: None,
        })
    }

    /// Reset the buffer to a new source image, discarding all annotations
    /// and any stroke in progress. The current style is kept.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::Decode`] if the bytes are not a
    /// decodable image; on error the existing buffer is left untouched.
    pub fn load_source(&mut self, bytes: &[u8]) -> CoreResult<()> {
        let buffer = RasterBuffer::from_bytes(bytes)?;
        tracing::debug!(
            width = buffer.width(),
            height = buffer.height(),
            "canvas source loaded"
        );
        self.buffer = buffer;
        self.active = None;
        Ok(())
    }

    /// Set the style for strokes started after this call. A stroke already
    /// in progress keeps its snapshot.
    pub fn set_style(&mut self, style: StrokeStyle) {
        self.style = style;
    }

    /// The style strokes will start with.
    #[must_use]
    pub const fn style(&self) -> StrokeStyle {
        self.style
    }

    /// Current interaction phase.
    #[must_use]
    pub const fn phase(&self) -> CanvasPhase {
        if self.active.is_some() {
            CanvasPhase::Drawing
        } else {
            CanvasPhase::Idle
        }
    }

    /// Pointer pressed at canvas-space (x, y).
    ///
    /// Starts a stroke when Idle and inside the canvas bounds: records the
    /// origin and snapshots the current style. Ignored while Drawing or
    /// outside the bounds.
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if self.active.is_some() || !self.buffer.contains(x, y) {
            return;
        }
        tracing::trace!(x, y, "stroke started");
        self.active = Some(ActiveStroke {
            style: self.style,
            last: (x, y),
        });
    }

    /// Pointer moved to canvas-space (x, y).
    ///
    /// While Drawing, immediately rasterizes the segment from the previous
    /// point with the active stroke's style (round cap, round join). A
    /// no-op when Idle.
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        self.buffer.draw_segment(active.last, (x, y), &active.style);
        active.last = (x, y);
    }

    /// Pointer released; finalizes the stroke. No further coordinates are
    /// recorded until the next pointer-down.
    pub fn pointer_up(&mut self) {
        if self.active.take().is_some() {
            tracing::trace!("stroke finished");
        }
    }

    /// Pointer left the drawing surface; finalizes the stroke exactly like
    /// a pointer-up.
    pub fn pointer_leave(&mut self) {
        self.pointer_up();
    }

    /// The current pixel buffer.
    #[must_use]
    pub const fn buffer(&self) -> &RasterBuffer {
        &self.buffer
    }

    /// Buffer dimensions as (width, height).
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Encode the buffer as drawn so far into a PNG blob. Callable in any
    /// phase.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::Encode`] if encoding fails.
    pub fn export_raster(&self) -> CoreResult<Vec<u8>> {
        self.buffer.encode_png()
    }
}
