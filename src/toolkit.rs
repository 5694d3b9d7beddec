//! The GUI toolkit's side of the embedding.
//!
//! The toolkit normally creates its own native windows. Here it is handed a
//! [`NativeWindow`] and [`NativeView`] that redirect it into the host's
//! window; in return it gives us notification sinks
//! ([`WindowNotifier`], [`SceneNotifier`]) through which size, focus and
//! destruction reach its scene graph. Every notification must be delivered on
//! the toolkit's event thread.

use std::sync::Arc;

use crate::error::Result;
use crate::types::WindowHandle;

/// Window event kinds the toolkit understands.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WindowEventKind {
    /// The window's size changed.
    Resize,
    /// The window gained input focus.
    FocusGained,
    /// The window lost input focus.
    FocusLost,
    /// The native window is gone.
    Destroy,
}

impl WindowEventKind {
    /// [`FocusGained`](Self::FocusGained) or [`FocusLost`](Self::FocusLost).
    #[must_use]
    pub fn focus(focused: bool) -> Self {
        if focused {
            Self::FocusGained
        } else {
            Self::FocusLost
        }
    }
}

/// The toolkit's logical cursor kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum CursorKind {
    None,
    Custom,
    Default,
    Text,
    Crosshair,
    ClosedHand,
    OpenHand,
    PointingHand,
    ResizeLeft,
    ResizeRight,
    ResizeUp,
    ResizeDown,
    ResizeLeftRight,
    ResizeUpDown,
    Disappear,
    Wait,
    ResizeSouthWest,
    ResizeSouthEast,
    ResizeNorthWest,
    ResizeNorthEast,
    Move,
}

impl CursorKind {
    /// Every cursor kind, in declaration order.
    pub const ALL: [Self; 21] = [
        Self::None,
        Self::Custom,
        Self::Default,
        Self::Text,
        Self::Crosshair,
        Self::ClosedHand,
        Self::OpenHand,
        Self::PointingHand,
        Self::ResizeLeft,
        Self::ResizeRight,
        Self::ResizeUp,
        Self::ResizeDown,
        Self::ResizeLeftRight,
        Self::ResizeUpDown,
        Self::Disappear,
        Self::Wait,
        Self::ResizeSouthWest,
        Self::ResizeSouthEast,
        Self::ResizeNorthWest,
        Self::ResizeNorthEast,
        Self::Move,
    ];
}

/// Pixel layouts the toolkit hands around.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit RGBA, premultiplied alpha. The offscreen buffer's layout.
    Rgba8Premultiplied,
    /// 8-bit BGRA, premultiplied alpha.
    Bgra8Premultiplied,
}

/// A block of pixels, e.g. a window icon.
#[derive(Clone, Debug)]
pub struct Pixels {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Channel layout of `data`.
    pub format: PixelFormat,
    /// Tightly packed rows, four bytes per pixel.
    pub data: Vec<u8>,
}

/// A bounds request as the toolkit issues it.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Bounds {
    /// New x position, if it should change.
    pub x: Option<i32>,
    /// New y position, if it should change.
    pub y: Option<i32>,
    /// Outer width, or a non-positive value to leave it alone.
    pub width: i32,
    /// Outer height, or a non-positive value to leave it alone.
    pub height: i32,
    /// Content width, or a non-positive value to leave it alone.
    pub content_width: i32,
    /// Content height, or a non-positive value to leave it alone.
    pub content_height: i32,
    /// Horizontal gravity in `[0, 1]`.
    pub x_gravity: f32,
    /// Vertical gravity in `[0, 1]`.
    pub y_gravity: f32,
}

/// An input-method request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputRequest {
    /// Text being edited.
    pub text: String,
    /// Toolkit-specific input type.
    pub kind: i32,
    /// Width of the editing area.
    pub width: f64,
    /// Height of the editing area.
    pub height: f64,
    /// Row-major 3x4 transform of the editing area.
    pub transform: [f64; 12],
}

/// Notifications delivered to the toolkit's window object.
///
/// Called only on the toolkit's event thread.
pub trait WindowNotifier: Send + Sync {
    /// The window has a new size.
    fn notify_resize(&self, kind: WindowEventKind, width: u32, height: u32);
    /// Focus moved to or away from the window.
    fn notify_focus(&self, kind: WindowEventKind);
    /// The native window is gone as far as the toolkit is concerned.
    fn notify_destroy(&self);
}

/// Notifications delivered to the toolkit's scene graph for a view.
///
/// Called only on the toolkit's event thread.
pub trait SceneNotifier: Send + Sync {
    /// The view has a new size.
    fn notify_view_resize(&self, width: u32, height: u32);
}

/// The toolkit's native-window contract.
///
/// The toolkit calls these from its event thread. Operations that would let
/// it control the host's OS window are accepted and dropped; operations the
/// embedding cannot offer return [`Error::Unsupported`](crate::Error).
pub trait NativeWindow: Send + Sync {
    /// The view type [`set_view`](Self::set_view) accepts.
    type View: NativeView;

    /// The native window to render into. Never creates a new one.
    fn create_window(&self) -> WindowHandle;
    /// Create a child window.
    ///
    /// # Errors
    ///
    /// Child windows are not supported.
    fn create_child_window(&self, parent: WindowHandle) -> Result<WindowHandle>;
    /// Close the window. The toolkit ignores the return value.
    fn close(&self) -> bool;
    /// Attach `view` (or detach with `None`).
    fn set_view(&self, view: Option<Arc<Self::View>>) -> bool;

    /// Move/resize request.
    fn set_bounds(&self, bounds: Bounds);
    /// Iconify request.
    fn minimize(&self, minimize: bool) -> bool;
    /// Maximize request.
    fn maximize(&self, maximize: bool, was_maximized: bool) -> bool;
    /// Title change.
    fn set_title(&self, title: &str) -> bool;
    /// Show/hide request; returns the visibility the toolkit should assume.
    fn set_visible(&self, visible: bool) -> bool;
    /// Resizability change.
    fn set_resizable(&self, resizable: bool) -> bool;
    /// Focusability change.
    fn set_focusable(&self, focusable: bool);
    /// Window level (normal, floating, ...).
    fn set_level(&self, level: i32);
    /// Window opacity.
    fn set_alpha(&self, alpha: f32);
    /// Window background color.
    fn set_background(&self, red: f32, green: f32, blue: f32) -> bool;
    /// Enable or disable input to the window.
    fn set_enabled(&self, enabled: bool);
    /// Minimum size constraint.
    fn set_minimum_size(&self, width: i32, height: i32) -> bool;
    /// Maximum size constraint.
    fn set_maximum_size(&self, width: i32, height: i32) -> bool;
    /// Window icon.
    fn set_icon(&self, icon: Option<&Pixels>);
    /// Raise above other windows.
    fn to_front(&self);
    /// Lower below other windows.
    fn to_back(&self);
    /// Enter an application-modal loop.
    fn enter_modal(&self);
    /// Enter a modal loop owned by `window`.
    fn enter_modal_with(&self, window: WindowHandle);
    /// Leave the modal loop.
    fn exit_modal(&self);

    /// Ask the OS to focus the window.
    fn request_focus(&self, event: WindowEventKind) -> bool;
    /// Show the toolkit's cursor over the window.
    fn set_cursor(&self, cursor: CursorKind);

    /// X offset when embedded in a foreign window.
    ///
    /// # Errors
    ///
    /// Embedded coordinates are not supported.
    fn embedded_x(&self) -> Result<i32>;
    /// Y offset when embedded in a foreign window.
    ///
    /// # Errors
    ///
    /// Embedded coordinates are not supported.
    fn embedded_y(&self) -> Result<i32>;
    /// Attach a native menu bar.
    ///
    /// # Errors
    ///
    /// Menu bars are not supported.
    fn set_menubar(&self, menubar: WindowHandle) -> Result<bool>;
    /// Grab input focus for popups.
    ///
    /// # Errors
    ///
    /// Focus grabs are not supported.
    fn grab_focus(&self) -> Result<bool>;
    /// Release a focus grab.
    ///
    /// # Errors
    ///
    /// Focus grabs are not supported.
    fn ungrab_focus(&self) -> Result<()>;
    /// Start an input-method session.
    ///
    /// # Errors
    ///
    /// Input methods are not supported.
    fn request_input(&self, request: &InputRequest) -> Result<()>;
    /// End an input-method session.
    ///
    /// # Errors
    ///
    /// Input methods are not supported.
    fn release_input(&self) -> Result<()>;

    /// Current width in pixels. Callable from any thread.
    fn width(&self) -> u32;
    /// Current height in pixels. Callable from any thread.
    fn height(&self) -> u32;
}

/// The toolkit's native-view contract.
pub trait NativeView: Send + Sync {
    /// Forward a size change to the scene graph.
    fn notify_resize(&self, width: u32, height: u32);
    /// The framebuffer the toolkit's renderer should bind as its default draw
    /// target. `0` means the real default framebuffer.
    fn native_frame_buffer(&self) -> u32;
    /// X position of the view inside its window.
    fn x(&self) -> i32;
    /// Y position of the view inside its window.
    fn y(&self) -> i32;
    /// Fullscreen request; returns whether fullscreen was entered.
    fn enter_fullscreen(&self, animate: bool) -> bool;
    /// Leave fullscreen.
    fn exit_fullscreen(&self, animate: bool);
    /// Software upload of a rendered frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`](crate::Error) when the view only
    /// renders through GL.
    fn upload_pixels(&self, pixels: &Pixels) -> Result<()>;
    /// Layout of the pixels the view's render target holds.
    fn pixel_format(&self) -> PixelFormat;
}
