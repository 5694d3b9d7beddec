//! The toolkit's native view, redirected into the offscreen buffer.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::toolkit::{NativeView, PixelFormat, Pixels, SceneNotifier};
use crate::window::ToolkitWindow;

/// A toolkit view bound to at most one [`ToolkitWindow`].
///
/// The toolkit creates the view and binds it with
/// [`NativeWindow::set_view`](crate::NativeWindow::set_view). While bound,
/// [`native_frame_buffer`](NativeView::native_frame_buffer) reports the
/// window's FBO, so the toolkit's renderer draws straight into the offscreen
/// texture.
pub struct ViewAdapter {
    scene: Arc<dyn SceneNotifier>,
    window: Mutex<Weak<ToolkitWindow>>,
}

impl ViewAdapter {
    /// A new, unbound view whose size changes go to `scene`.
    pub fn new(scene: Arc<dyn SceneNotifier>) -> Arc<Self> {
        Arc::new(Self {
            scene,
            window: Mutex::new(Weak::new()),
        })
    }

    /// The window this view is bound to.
    pub fn window(&self) -> Option<Arc<ToolkitWindow>> {
        self.window.lock().upgrade()
    }

    /// Whether the view is bound to a live window.
    pub fn is_bound(&self) -> bool {
        self.window.lock().strong_count() > 0
    }

    pub(crate) fn attach(&self, window: Weak<ToolkitWindow>) {
        *self.window.lock() = window;
    }

    pub(crate) fn detach(&self) {
        *self.window.lock() = Weak::new();
    }
}

impl NativeView for ViewAdapter {
    fn notify_resize(&self, width: u32, height: u32) {
        self.scene.notify_view_resize(width, height);
    }

    fn native_frame_buffer(&self) -> u32 {
        self.window().map_or(0, |window| window.fbo_id())
    }

    // The view always covers the whole host window.
    fn x(&self) -> i32 {
        0
    }

    fn y(&self) -> i32 {
        0
    }

    fn enter_fullscreen(&self, _animate: bool) -> bool {
        log::trace!("ignoring fullscreen request; the host owns the window");
        false
    }

    fn exit_fullscreen(&self, _animate: bool) {
        log::trace!("ignoring fullscreen exit; the host owns the window");
    }

    fn upload_pixels(&self, _pixels: &Pixels) -> Result<()> {
        Err(Error::Unsupported("upload_pixels"))
    }

    fn pixel_format(&self) -> PixelFormat {
        PixelFormat::Rgba8Premultiplied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Notice, Recorder};

    #[test]
    fn resize_goes_to_the_scene_graph() {
        let recorder = Recorder::new();
        let view = ViewAdapter::new(recorder.clone());
        view.notify_resize(640, 480);
        assert_eq!(recorder.notices(), vec![Notice::ViewResize(640, 480)]);
    }

    #[test]
    fn unbound_view_renders_to_the_default_framebuffer() {
        let view = ViewAdapter::new(Recorder::new());
        assert!(!view.is_bound());
        assert!(view.window().is_none());
        assert_eq!(view.native_frame_buffer(), 0);
        assert_eq!((view.x(), view.y()), (0, 0));
    }

    #[test]
    fn software_upload_and_fullscreen_are_refused() {
        let view = ViewAdapter::new(Recorder::new());
        let pixels = Pixels {
            width: 1,
            height: 1,
            format: PixelFormat::Rgba8Premultiplied,
            data: vec![0; 4],
        };
        assert!(matches!(view.upload_pixels(&pixels), Err(Error::Unsupported(_))));
        assert!(!view.enter_fullscreen(false));
        assert_eq!(view.pixel_format(), PixelFormat::Rgba8Premultiplied);
    }
}
