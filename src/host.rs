//! What the adapter needs from the OS windowing library (GLFW or similar).
//!
//! The host owns the window and implements [`WindowSystem`] over whatever
//! library created it. The adapter only observes the window: it never
//! creates, destroys, moves, resizes, titles or shows it.

use crate::types::{CursorHandle, WindowHandle};

/// The standard cursor shapes the windowing library provides.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StandardCursor {
    /// The regular arrow.
    Arrow,
    /// Text input I-beam.
    IBeam,
    /// Crosshair.
    Crosshair,
    /// Hand.
    Hand,
    /// Horizontal resize arrow.
    HResize,
    /// Vertical resize arrow.
    VResize,
}

/// A window-size callback: `(window, width, height)` in pixels.
pub type SizeCallback = Box<dyn FnMut(WindowHandle, i32, i32) + Send>;

/// Window operations the adapter consumes.
///
/// Size callbacks fire on the OS thread. The cursor and focus calls may come
/// from the toolkit's event thread; an implementation whose library requires
/// the main thread must marshal them itself.
pub trait WindowSystem: Send + Sync {
    /// Install `callback` as the window's size callback (or clear it with
    /// `None`), returning whatever was installed before.
    fn set_size_callback(
        &self,
        window: WindowHandle,
        callback: Option<SizeCallback>,
    ) -> Option<SizeCallback>;

    /// The window's current size in pixels.
    fn window_size(&self, window: WindowHandle) -> (i32, i32);

    /// Create one of the standard cursors. `None` if the platform has no such
    /// cursor or creation failed.
    fn create_standard_cursor(&self, shape: StandardCursor) -> Option<CursorHandle>;

    /// Destroy a cursor created by
    /// [`create_standard_cursor`](Self::create_standard_cursor).
    fn destroy_cursor(&self, cursor: CursorHandle);

    /// Show `cursor` over the window, or the default cursor for `None`.
    fn set_cursor(&self, window: WindowHandle, cursor: Option<CursorHandle>);

    /// Bring the window to the front and give it input focus.
    fn focus_window(&self, window: WindowHandle);
}
