//! The window adapter: the toolkit's one native window, backed by the host's
//! OS window and an offscreen framebuffer.
//!
//! The adapter has two halves:
//!
//! - [`WindowAdapter`] is owned by the host on the OS thread. It drives the
//!   per-frame render steps, owns the [`OffscreenBuffer`] and the GL state
//!   snapshot, and tears everything down when dropped.
//! - [`ToolkitWindow`] is shared with the toolkit (registered through its
//!   native-window factory) and implements [`NativeWindow`]. It holds the
//!   size cache and the dirty flag that connect OS resize events to the next
//!   render step.
//!
//! Size changes flow one way: the OS size callback updates the cache and
//! marks the FBO dirty on the OS thread, then posts a job that tells the
//! toolkit on its event thread. The FBO itself only changes inside
//! [`WindowAdapter::render_begin`].

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::context::{ContextRole, ContextSwitch, GlContextPair};
use crate::cursor::CursorSlot;
use crate::error::{Error, Result};
use crate::event_thread::EventThread;
use crate::gl::GlApi;
use crate::host::{SizeCallback, WindowSystem};
use crate::offscreen::OffscreenBuffer;
use crate::state::{GlStateSnapshot, StateBits};
use crate::toolkit::{
    Bounds, CursorKind, InputRequest, NativeView, NativeWindow, Pixels, WindowEventKind,
    WindowNotifier,
};
use crate::types::{Size, SizeCell, WindowHandle};
use crate::view::ViewAdapter;

/// Set while a [`WindowAdapter`] is alive.
static LIVE: AtomicBool = AtomicBool::new(false);

/// Lifecycle of the toolkit-facing window.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WindowState {
    /// No view attached.
    Unbound,
    /// A view is attached and receives size changes.
    Bound,
    /// The toolkit closed the window, or the adapter was dropped. Terminal;
    /// the host still owns the OS window.
    Closed,
}

struct Binding {
    state: WindowState,
    view: Option<Arc<ViewAdapter>>,
}

/// The toolkit-facing half of the window adapter.
///
/// Register the `Arc` returned by [`WindowAdapter::native_window`] with the
/// toolkit's native-window factory.
pub struct ToolkitWindow {
    this: Weak<ToolkitWindow>,
    handle: WindowHandle,
    system: Arc<dyn WindowSystem>,
    events: Arc<dyn EventThread>,
    notifier: Arc<dyn WindowNotifier>,

    /// Latest OS window size. Advisory: read from any thread.
    size: SizeCell,
    /// Set when `size` changed since the FBO was last sized.
    fbo_dirty: AtomicBool,
    has_seen_first_size: AtomicBool,
    /// Set once the owning [`WindowAdapter`] is dropped.
    torn_down: AtomicBool,
    /// Published copy of the offscreen FBO name, for the view.
    fbo_id: AtomicU32,

    binding: Mutex<Binding>,
    cursor: Mutex<CursorSlot>,
    /// Size callback that was installed before ours; invoked after ours.
    chained: Mutex<Option<SizeCallback>>,
}

impl ToolkitWindow {
    /// The host's OS window.
    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    /// The cached window size.
    pub fn size(&self) -> Size {
        self.size.load()
    }

    /// Whether the offscreen buffer must be resized on the next
    /// [`WindowAdapter::render_begin`].
    pub fn is_fbo_dirty(&self) -> bool {
        self.fbo_dirty.load(Ordering::Acquire)
    }

    /// Whether any size (from the OS callback or a synchronous query) has
    /// been seen yet.
    pub fn has_seen_first_size(&self) -> bool {
        self.has_seen_first_size.load(Ordering::Acquire)
    }

    /// The offscreen FBO name, `0` before the first render.
    pub fn fbo_id(&self) -> u32 {
        self.fbo_id.load(Ordering::Acquire)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WindowState {
        self.binding.lock().state
    }

    /// The attached view, if any.
    pub fn view(&self) -> Option<Arc<ViewAdapter>> {
        self.binding.lock().view.clone()
    }

    /// Record `size`, marking the FBO dirty if it changed.
    fn update_size(&self, size: Size) -> bool {
        self.has_seen_first_size.store(true, Ordering::Release);
        let changed = self.size.swap(size) != size;
        if changed {
            self.fbo_dirty.store(true, Ordering::Release);
        }
        changed
    }

    fn query_os_size(&self) -> Size {
        let (width, height) = self.system.window_size(self.handle);
        Size::from_os(width, height)
    }

    /// The OS size callback. Runs on the OS thread.
    fn on_window_size(&self, window: WindowHandle, width: i32, height: i32) {
        let size = Size::from_os(width, height);
        if self.update_size(size) {
            log::debug!("host window resized to {}x{}", size.width, size.height);
        }

        // Even an unchanged size is passed on, so the toolkit converges on
        // whatever the OS last reported.
        self.post_resize(size);

        // The slot stays unlocked while the host's callback runs, so the
        // callback may re-enter the adapter (even drop it).
        let Some(mut previous) = self.chained.lock().take() else {
            return;
        };
        previous(window, width, height);

        let mut slot = self.chained.lock();
        if self.torn_down.load(Ordering::Acquire) {
            drop(slot);
            drop(self.system.set_size_callback(self.handle, Some(previous)));
        } else if slot.is_none() {
            *slot = Some(previous);
        }
    }

    /// Detach from the toolkit for good: close, unbind the view and give the
    /// cursor back. Called when the owning adapter is dropped.
    fn tear_down(&self) -> Option<SizeCallback> {
        let previous = {
            let mut chained = self.chained.lock();
            self.torn_down.store(true, Ordering::Release);
            chained.take()
        };

        let mut binding = self.binding.lock();
        binding.state = WindowState::Closed;
        if let Some(view) = binding.view.take() {
            view.detach();
        }
        self.cursor.lock().release();
        previous
    }

    fn post_resize(&self, size: Size) {
        let Some(this) = self.this.upgrade() else {
            return;
        };
        self.events
            .post(Box::new(move || this.deliver_resize(size)));
    }

    /// Tell the toolkit window and the attached view about `size`. Runs on
    /// the event thread.
    fn deliver_resize(&self, size: Size) {
        let view = {
            let binding = self.binding.lock();
            if binding.state == WindowState::Closed {
                return;
            }
            binding.view.clone()
        };
        self.notifier
            .notify_resize(WindowEventKind::Resize, size.width, size.height);
        if let Some(view) = view {
            view.notify_resize(size.width, size.height);
        }
    }

    fn post_focus(&self, focused: bool) {
        let Some(this) = self.this.upgrade() else {
            return;
        };
        self.events.post(Box::new(move || {
            if this.state() != WindowState::Closed {
                this.notifier.notify_focus(WindowEventKind::focus(focused));
            }
        }));
    }

    fn ignored(&self, op: &str) {
        log::trace!("ignoring {op} on {:?}; the host owns the window", self.handle);
    }
}

impl NativeWindow for ToolkitWindow {
    type View = ViewAdapter;

    fn create_window(&self) -> WindowHandle {
        self.handle
    }

    fn create_child_window(&self, _parent: WindowHandle) -> Result<WindowHandle> {
        Err(Error::Unsupported("create_child_window"))
    }

    fn close(&self) -> bool {
        {
            let mut binding = self.binding.lock();
            if binding.state == WindowState::Closed {
                return false;
            }
            binding.state = WindowState::Closed;
            if let Some(view) = binding.view.take() {
                view.detach();
            }
        }
        log::debug!("toolkit closed its window; the OS window stays with the host");
        self.notifier.notify_destroy();
        false
    }

    fn set_view(&self, view: Option<Arc<ViewAdapter>>) -> bool {
        let mut binding = self.binding.lock();
        if binding.state == WindowState::Closed {
            log::warn!("ignoring set_view on a closed window");
            return false;
        }
        if let Some(old) = binding.view.take() {
            old.detach();
        }

        let Some(view) = view else {
            binding.state = WindowState::Unbound;
            return true;
        };
        view.attach(self.this.clone());
        binding.view = Some(view);
        binding.state = WindowState::Bound;
        drop(binding);

        // The toolkit ignores resize notifications issued while it is still
        // inside set_view, so query now and notify from the event queue.
        let size = self.query_os_size();
        self.update_size(size);
        self.post_resize(size);
        true
    }

    fn set_bounds(&self, _bounds: Bounds) {
        self.ignored("set_bounds");
    }

    fn minimize(&self, _minimize: bool) -> bool {
        self.ignored("minimize");
        false
    }

    fn maximize(&self, _maximize: bool, _was_maximized: bool) -> bool {
        self.ignored("maximize");
        false
    }

    fn set_title(&self, _title: &str) -> bool {
        self.ignored("set_title");
        false
    }

    fn set_visible(&self, visible: bool) -> bool {
        self.ignored("set_visible");
        visible
    }

    fn set_resizable(&self, _resizable: bool) -> bool {
        self.ignored("set_resizable");
        false
    }

    fn set_focusable(&self, _focusable: bool) {
        self.ignored("set_focusable");
    }

    fn set_level(&self, _level: i32) {
        self.ignored("set_level");
    }

    fn set_alpha(&self, _alpha: f32) {
        self.ignored("set_alpha");
    }

    fn set_background(&self, _red: f32, _green: f32, _blue: f32) -> bool {
        self.ignored("set_background");
        false
    }

    fn set_enabled(&self, _enabled: bool) {
        self.ignored("set_enabled");
    }

    fn set_minimum_size(&self, _width: i32, _height: i32) -> bool {
        self.ignored("set_minimum_size");
        false
    }

    fn set_maximum_size(&self, _width: i32, _height: i32) -> bool {
        self.ignored("set_maximum_size");
        false
    }

    fn set_icon(&self, _icon: Option<&Pixels>) {
        self.ignored("set_icon");
    }

    fn to_front(&self) {
        self.ignored("to_front");
    }

    fn to_back(&self) {
        self.ignored("to_back");
    }

    fn enter_modal(&self) {
        self.ignored("enter_modal");
    }

    fn enter_modal_with(&self, _window: WindowHandle) {
        self.ignored("enter_modal_with");
    }

    fn exit_modal(&self) {
        self.ignored("exit_modal");
    }

    fn request_focus(&self, _event: WindowEventKind) -> bool {
        if self.state() == WindowState::Closed {
            log::trace!("ignoring request_focus on a closed window");
            return false;
        }
        self.system.focus_window(self.handle);
        true
    }

    fn set_cursor(&self, cursor: CursorKind) {
        // Held across the install so teardown cannot release in between.
        let binding = self.binding.lock();
        if binding.state == WindowState::Closed {
            log::trace!("ignoring set_cursor on a closed window");
            return;
        }
        self.cursor.lock().install(cursor);
    }

    fn embedded_x(&self) -> Result<i32> {
        Err(Error::Unsupported("embedded_x"))
    }

    fn embedded_y(&self) -> Result<i32> {
        Err(Error::Unsupported("embedded_y"))
    }

    fn set_menubar(&self, _menubar: WindowHandle) -> Result<bool> {
        Err(Error::Unsupported("set_menubar"))
    }

    fn grab_focus(&self) -> Result<bool> {
        Err(Error::Unsupported("grab_focus"))
    }

    fn ungrab_focus(&self) -> Result<()> {
        Err(Error::Unsupported("ungrab_focus"))
    }

    fn request_input(&self, _request: &InputRequest) -> Result<()> {
        Err(Error::Unsupported("request_input"))
    }

    fn release_input(&self) -> Result<()> {
        Err(Error::Unsupported("release_input"))
    }

    // No event-thread check here: a stale size is harmless, and rendering
    // uses the FBO's own size.
    fn width(&self) -> u32 {
        self.size.load().width
    }

    fn height(&self) -> u32 {
        self.size.load().height
    }
}

/// The host-facing half of the window adapter.
///
/// At most one exists per process. Create it with [`init`](Self::init) after
/// the OS window and both GL contexts exist, then each frame:
///
/// ```no_run
/// # use fbo_window_embed::{WindowAdapter, ContextSwitch, Result};
/// # unsafe fn frame<S: ContextSwitch>(adapter: &mut WindowAdapter<glow::Context, S>) -> Result<()> {
/// adapter.contexts().make_current_toolkit()?;
/// unsafe { adapter.render_begin() }?;
/// // ... the toolkit renders into adapter.fbo_id() ...
/// adapter.render_end();
///
/// adapter.contexts().make_current_app()?;
/// // ... the host draws its own scene ...
/// unsafe { adapter.render_framebuf() }?;
/// // ... the host swaps buffers ...
/// # Ok(())
/// # }
/// ```
///
/// Dropping the adapter puts back the previous size callback, releases the
/// cursor and the offscreen buffer (each GL object in the context it was
/// created in) and frees the singleton slot. The OS window is left alone.
pub struct WindowAdapter<G: GlApi, S: ContextSwitch> {
    contexts: GlContextPair<S>,
    gl: Arc<G>,
    window: Arc<ToolkitWindow>,
    buffer: Option<OffscreenBuffer<G>>,
    snapshot: GlStateSnapshot,
}

impl<G: GlApi, S: ContextSwitch> WindowAdapter<G, S> {
    /// Create the process's window adapter and hook the OS size callback.
    ///
    /// `gl` must be usable with both contexts of `contexts`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] if another adapter is alive; that adapter is
    /// not affected.
    pub fn init(
        contexts: GlContextPair<S>,
        gl: Arc<G>,
        system: Arc<dyn WindowSystem>,
        events: Arc<dyn EventThread>,
        notifier: Arc<dyn WindowNotifier>,
    ) -> Result<Self> {
        if LIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::InvalidState("a window adapter already exists"));
        }

        let handle = contexts.handle();
        let window = Arc::new_cyclic(|this| ToolkitWindow {
            this: this.clone(),
            handle,
            system: Arc::clone(&system),
            events,
            notifier,
            size: SizeCell::default(),
            fbo_dirty: AtomicBool::new(true),
            has_seen_first_size: AtomicBool::new(false),
            torn_down: AtomicBool::new(false),
            fbo_id: AtomicU32::new(0),
            binding: Mutex::new(Binding {
                state: WindowState::Unbound,
                view: None,
            }),
            cursor: Mutex::new(CursorSlot::new(Arc::clone(&system), handle)),
            chained: Mutex::new(None),
        });

        let weak = Arc::downgrade(&window);
        let previous = system.set_size_callback(
            handle,
            Some(Box::new(move |window, width, height| {
                if let Some(this) = weak.upgrade() {
                    this.on_window_size(window, width, height);
                }
            })),
        );
        *window.chained.lock() = previous;

        log::debug!("window adapter attached to {handle:?}");
        Ok(Self {
            contexts,
            gl,
            window,
            buffer: None,
            snapshot: GlStateSnapshot::new(StateBits::COMPOSITE),
        })
    }

    /// Make sure the offscreen buffer exists and matches the window size.
    ///
    /// Creates the buffer on first use and resizes it when a size change is
    /// pending. A zero-area window (e.g. iconified) keeps the current buffer
    /// until a real size arrives.
    ///
    /// # Safety
    ///
    /// Must be called on the OS thread with the toolkit's context current
    /// (made current through [`contexts`](Self::contexts)).
    ///
    /// # Errors
    ///
    /// [`Error::Gl`] if the toolkit's context is not current or the buffer
    /// cannot be created or resized; [`Error::InvalidState`] if the window
    /// has never had a drawable size.
    pub unsafe fn render_begin(&mut self) -> Result<()> {
        self.contexts.require(ContextRole::Toolkit)?;
        let window = &self.window;

        let Some(buffer) = self.buffer.as_mut() else {
            window.fbo_dirty.store(false, Ordering::Release);
            let mut size = window.size();
            if size.is_empty() && !window.has_seen_first_size() {
                size = window.query_os_size();
                window.update_size(size);
                window.fbo_dirty.store(false, Ordering::Release);
            }
            if size.is_empty() {
                window.fbo_dirty.store(true, Ordering::Release);
                return Err(Error::InvalidState("host window has no drawable area"));
            }

            let buffer = match unsafe { OffscreenBuffer::new(Arc::clone(&self.gl), size) } {
                Ok(buffer) => buffer,
                Err(err) => {
                    window.fbo_dirty.store(true, Ordering::Release);
                    return Err(err);
                }
            };
            window.fbo_id.store(buffer.fbo_id(), Ordering::Release);
            self.buffer = Some(buffer);
            return Ok(());
        };

        if window.fbo_dirty.swap(false, Ordering::AcqRel) {
            let size = window.size();
            if size.is_empty() {
                window.fbo_dirty.store(true, Ordering::Release);
                return Ok(());
            }
            if let Err(err) = unsafe { buffer.resize(size) } {
                window.fbo_dirty.store(true, Ordering::Release);
                return Err(err);
            }
            window.fbo_id.store(buffer.fbo_id(), Ordering::Release);
        }
        Ok(())
    }

    /// Counterpart of [`render_begin`](Self::render_begin). Nothing needs
    /// flushing yet.
    #[allow(clippy::unused_self)]
    pub fn render_end(&self) {}

    /// Composite the offscreen buffer over the host's current framebuffer.
    ///
    /// Alpha-blends the color texture across the whole window and leaves
    /// every bit of [`StateBits::COMPOSITE`] exactly as it found it. Does
    /// nothing before the first [`render_begin`](Self::render_begin).
    ///
    /// # Safety
    ///
    /// Must be called on the OS thread with the host's context current (made
    /// current through [`contexts`](Self::contexts)).
    ///
    /// # Errors
    ///
    /// [`Error::Gl`] if the host's context is not current or the composite
    /// quad cannot be built.
    pub unsafe fn render_framebuf(&mut self) -> Result<()> {
        self.contexts.require(ContextRole::App)?;
        let Some(buffer) = self.buffer.as_mut() else {
            return Ok(());
        };

        let gl = &*self.gl;
        let (width, height) = self.window.size().to_gl();

        unsafe { self.snapshot.backup(gl, ContextRole::App) }?;
        let composited = unsafe {
            gl.enable(glow::BLEND);
            gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            gl.viewport(0, 0, width, height);
            buffer.render()
        };
        unsafe { self.snapshot.restore(gl, ContextRole::App) }?;
        composited
    }

    /// The offscreen FBO name, `0` before the first
    /// [`render_begin`](Self::render_begin).
    pub fn fbo_id(&self) -> u32 {
        self.buffer.as_ref().map_or(0, OffscreenBuffer::fbo_id)
    }

    /// Relay an OS focus change to the toolkit (on its event thread).
    pub fn handle_focus(&self, focused: bool) {
        self.window.post_focus(focused);
    }

    /// The toolkit-facing window, for the toolkit's native-window factory.
    pub fn native_window(&self) -> Arc<ToolkitWindow> {
        Arc::clone(&self.window)
    }

    /// The app/toolkit context pair.
    pub fn contexts(&self) -> &GlContextPair<S> {
        &self.contexts
    }

    /// The cached window size.
    pub fn size(&self) -> Size {
        self.window.size()
    }

    /// Whether a resize is pending for the next
    /// [`render_begin`](Self::render_begin).
    pub fn is_fbo_dirty(&self) -> bool {
        self.window.is_fbo_dirty()
    }

    /// The offscreen buffer, once created.
    pub fn buffer(&self) -> Option<&OffscreenBuffer<G>> {
        self.buffer.as_ref()
    }
}

impl<G: GlApi, S: ContextSwitch> Drop for WindowAdapter<G, S> {
    fn drop(&mut self) {
        let window = &self.window;

        let previous = window.tear_down();
        drop(window.system.set_size_callback(window.handle, previous));

        if let Some(mut buffer) = self.buffer.take() {
            let restore_to = self.contexts.current();
            if buffer.has_quad() {
                match self.contexts.make_current_app() {
                    Ok(()) => unsafe { buffer.destroy_quad() },
                    Err(err) => log::warn!("leaking composite quad: {err}"),
                }
            }
            match self.contexts.make_current_toolkit() {
                Ok(()) => unsafe { buffer.destroy_target() },
                Err(err) => log::warn!("leaking offscreen framebuffer: {err}"),
            }
            if let Some(role) = restore_to {
                if let Err(err) = self.contexts.make_current(role) {
                    log::warn!("could not restore the {role:?} context: {err}");
                }
            }
        }
        window.fbo_id.store(0, Ordering::Release);

        LIVE.store(false, Ordering::Release);
        log::debug!("window adapter detached from {:?}", window.handle);
    }
}
