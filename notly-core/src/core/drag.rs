//! Drag-and-drop session tracking and canvas coordinate translation.
//!
//! # Responsibility
//!
//! One global drag slot, mirroring single-pointer input: `idle -> dragging
//! -> dropped | cancelled -> idle`. Starting a drag while another is active
//! resolves the prior one first. A drop over the canvas target emits exactly
//! one [`DropEvent`] with the position translated into canvas space; a drop
//! outside the target counts as a cancel and emits nothing.
//!
//! The canvas engine itself is a black box. All this module knows of it is
//! the documented camera contract captured by
//! [`CanvasViewport::screen_to_canvas`].

use serde::{Deserialize, Serialize};

/// A position in either screen or canvas space, per context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The canvas engine's camera: pan offset in canvas units plus zoom factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, zoom: 1.0 }
    }
}

/// Where the canvas sits on screen and how its camera is positioned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasViewport {
    /// Top-left corner of the canvas element in screen coordinates.
    pub origin: Point,
    pub width: f64,
    pub height: f64,
    pub camera: Camera,
}

impl CanvasViewport {
    /// Whether a screen point falls within the canvas element's bounds.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x < self.origin.x + self.width
            && point.y < self.origin.y + self.height
    }

    /// Translates a screen position into canvas space using the engine's
    /// camera contract: offset by the element origin, unscale by zoom, then
    /// remove the camera pan.
    pub fn screen_to_canvas(&self, point: Point) -> Point {
        Point {
            x: (point.x - self.origin.x) / self.camera.zoom - self.camera.x,
            y: (point.y - self.origin.y) / self.camera.zoom - self.camera.y,
        }
    }
}

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum DragPayload {
    /// An existing card dragged from the sidebar onto a board.
    Card { card_id: String },
    /// A library file dragged onto a board.
    File { file_id: String },
    /// Raw text, e.g. a selection dragged in from outside.
    Text { content: String },
}

/// A completed drop: the payload plus its landing position in canvas space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropEvent {
    pub payload: DragPayload,
    pub position: Point,
}

/// The single global drag slot.
#[derive(Debug, Default)]
pub struct DragSession {
    active: Option<DragPayload>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins dragging `payload`. An already-active drag is cancelled first
    /// and its payload returned.
    pub fn start(&mut self, payload: DragPayload) -> Option<DragPayload> {
        self.active.replace(payload)
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn payload(&self) -> Option<&DragPayload> {
        self.active.as_ref()
    }

    /// Finishes the drag at `screen`. Returns the drop event when the point
    /// is inside the canvas target; a drop outside counts as a cancel and
    /// returns `None`. Either way the session is idle afterwards.
    pub fn drop_at(&mut self, screen: Point, viewport: &CanvasViewport) -> Option<DropEvent> {
        let payload = self.active.take()?;
        if !viewport.contains(screen) {
            return None;
        }
        Some(DropEvent { payload, position: viewport.screen_to_canvas(screen) })
    }

    /// Discards the active drag without side effects, returning its payload.
    pub fn cancel(&mut self) -> Option<DragPayload> {
        self.active.take()
    }
}
