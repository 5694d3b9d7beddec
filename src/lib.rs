//! Embed a retained-mode GUI toolkit inside a host-owned OpenGL window,
//! using OpenGL via [glow].
//!
//! Normally a GUI toolkit creates and owns its native windows. This crate
//! lets a host application that already owns an OS window and its GL
//! contexts (for example a game or a visualisation tool) host the toolkit
//! instead. The toolkit is handed a [`NativeWindow`] and [`NativeView`] that
//! point it at an offscreen framebuffer, and the host composites that
//! framebuffer over its own scene every frame.
//!
//! # Overview
//!
//! - [`GlContextPair`] tracks the host's two contexts on the same window:
//!   the app context and the toolkit's (sharing objects with each other).
//! - [`OffscreenBuffer`] is the FBO and RGBA8 texture the toolkit draws into,
//!   plus the quad that draws it back.
//! - [`GlStateSnapshot`] saves and restores the few bits of GL state the
//!   composite changes, so the host's state survives it.
//! - [`WindowAdapter`] is the host's handle: per-frame
//!   [`render_begin`](WindowAdapter::render_begin) /
//!   [`render_framebuf`](WindowAdapter::render_framebuf), focus relay and
//!   teardown. Its [`ToolkitWindow`] half is what the toolkit sees.
//! - [`ViewAdapter`] reports the offscreen FBO as the view's framebuffer.
//! - [`EventQueue`] carries size and focus changes from the OS thread to the
//!   toolkit's event thread.
//! - [`FrameTimer`] logs the frame rate for diagnostics.
//!
//! The host talks to its windowing library through [`WindowSystem`] and to
//! the toolkit through [`WindowNotifier`] and [`SceneNotifier`].
//!
//! # Threads
//!
//! Rendering and every OS callback happen on the host's OS thread. Toolkit
//! notifications are posted to the toolkit's event thread and never
//! awaited, so neither thread ever blocks on the other.
//!
//! # Safety
//!
//! The render steps issue raw GL calls and are `unsafe`: each documents
//! which of the two contexts must be current when it is called.
//!
//! [glow]: https://docs.rs/glow

mod context;
mod cursor;
mod error;
mod event_thread;
mod frame_timer;
mod gl;
mod host;
mod offscreen;
mod shaders;
mod state;
mod toolkit;
mod types;
mod view;
mod window;

#[cfg(test)]
mod testing;

pub use context::{ContextRole, ContextSwitch, GlContextPair};
pub use cursor::{standard_cursor, CursorSlot};
pub use error::{Error, Result};
pub use event_thread::{spawn_event_thread, EventPoster, EventQueue, EventThread, Job};
pub use frame_timer::FrameTimer;
pub use gl::{check_error, GlApi};
pub use host::{SizeCallback, StandardCursor, WindowSystem};
pub use offscreen::OffscreenBuffer;
pub use state::{GlStateSnapshot, StateBits};
pub use toolkit::{
    Bounds, CursorKind, InputRequest, NativeView, NativeWindow, PixelFormat, Pixels,
    SceneNotifier, WindowEventKind, WindowNotifier,
};
pub use types::{CursorHandle, Size, WindowHandle};
pub use view::ViewAdapter;
pub use window::{ToolkitWindow, WindowAdapter, WindowState};
