//! Mapping toolkit cursors onto the OS's standard cursors.

use std::sync::Arc;

use crate::host::{StandardCursor, WindowSystem};
use crate::toolkit::CursorKind;
use crate::types::{CursorHandle, WindowHandle};

/// The standard cursor shown for a toolkit cursor kind.
///
/// Anything without a close standard equivalent (custom, hidden, wait,
/// move, diagonal resizes) falls back to the arrow.
#[must_use]
pub fn standard_cursor(kind: CursorKind) -> StandardCursor {
    match kind {
        CursorKind::Text => StandardCursor::IBeam,
        CursorKind::Crosshair => StandardCursor::Crosshair,
        CursorKind::ClosedHand | CursorKind::OpenHand | CursorKind::PointingHand => {
            StandardCursor::Hand
        }
        CursorKind::ResizeLeft | CursorKind::ResizeRight | CursorKind::ResizeLeftRight => {
            StandardCursor::HResize
        }
        CursorKind::ResizeUp | CursorKind::ResizeDown | CursorKind::ResizeUpDown => {
            StandardCursor::VResize
        }
        CursorKind::None
        | CursorKind::Custom
        | CursorKind::Default
        | CursorKind::Disappear
        | CursorKind::Wait
        | CursorKind::ResizeSouthWest
        | CursorKind::ResizeSouthEast
        | CursorKind::ResizeNorthWest
        | CursorKind::ResizeNorthEast
        | CursorKind::Move => StandardCursor::Arrow,
    }
}

/// Owner of the one OS cursor currently installed over the window.
pub struct CursorSlot {
    system: Arc<dyn WindowSystem>,
    window: WindowHandle,
    installed: Option<CursorHandle>,
}

impl CursorSlot {
    /// An empty slot for `window`.
    pub fn new(system: Arc<dyn WindowSystem>, window: WindowHandle) -> Self {
        Self {
            system,
            window,
            installed: None,
        }
    }

    /// Destroy the previously installed cursor, then create and install the
    /// standard cursor for `kind`.
    pub fn install(&mut self, kind: CursorKind) {
        self.destroy_installed();

        let shape = standard_cursor(kind);
        let cursor = self.system.create_standard_cursor(shape);
        if cursor.is_none() {
            log::warn!("could not create standard cursor {shape:?}, using the default");
        }
        self.system.set_cursor(self.window, cursor);
        self.installed = cursor;
    }

    /// Put the default cursor back and destroy ours, if any.
    pub fn release(&mut self) {
        if self.installed.is_some() {
            self.system.set_cursor(self.window, None);
            self.destroy_installed();
        }
    }

    /// The cursor currently installed by this slot.
    pub fn installed(&self) -> Option<CursorHandle> {
        self.installed
    }

    fn destroy_installed(&mut self) {
        if let Some(cursor) = self.installed.take() {
            self.system.destroy_cursor(cursor);
        }
    }
}
