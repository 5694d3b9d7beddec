//! The two OpenGL contexts that share the host's window.
//!
//! The host creates both contexts on the same OS window with a shared object
//! namespace: textures, buffers and programs created in one are visible in
//! the other, container objects (framebuffers, vertex arrays) and all binding
//! state are not. The toolkit renders in its own context and may leave it in
//! any state; the host keeps its state intact in the other.

use std::cell::Cell;

use crate::error::{Error, Result};
use crate::types::WindowHandle;

/// Which of the two contexts is meant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContextRole {
    /// The host application's context; the composite runs here.
    App,
    /// The context the toolkit's renderer draws in.
    Toolkit,
}

/// Host-supplied switching between the two contexts, e.g. a thin wrapper
/// around the windowing library's "make context current" call.
pub trait ContextSwitch {
    /// Make the context for `role` current on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gl`] if the platform refuses the switch.
    fn make_current(&self, role: ContextRole) -> Result<()>;

    /// The OS window both contexts were created on.
    fn window(&self) -> WindowHandle;
}

/// The app/toolkit context pair with explicit "make current" discipline.
///
/// The pair remembers which context it last made current, so callers that
/// must run in a particular context can check with [`require`](Self::require)
/// instead of issuing GL calls into the wrong one.
pub struct GlContextPair<S> {
    switch: S,
    current: Cell<Option<ContextRole>>,
}

impl<S: ContextSwitch> GlContextPair<S> {
    /// Wrap the host's contexts. `current` is whichever context is current on
    /// the calling thread right now, if any.
    pub fn new(switch: S, current: Option<ContextRole>) -> Self {
        Self {
            switch,
            current: Cell::new(current),
        }
    }

    /// Make the host application's context current.
    ///
    /// # Errors
    ///
    /// Propagates a failed switch; the pair then considers no context current.
    pub fn make_current_app(&self) -> Result<()> {
        self.make_current(ContextRole::App)
    }

    /// Make the toolkit's context current.
    ///
    /// # Errors
    ///
    /// Propagates a failed switch; the pair then considers no context current.
    pub fn make_current_toolkit(&self) -> Result<()> {
        self.make_current(ContextRole::Toolkit)
    }

    /// Make `role` current, skipping the platform call if it already is.
    ///
    /// # Errors
    ///
    /// Propagates a failed switch; the pair then considers no context current.
    pub fn make_current(&self, role: ContextRole) -> Result<()> {
        if self.current.get() == Some(role) {
            return Ok(());
        }
        self.current.set(None);
        self.switch.make_current(role)?;
        self.current.set(Some(role));
        Ok(())
    }

    /// The OS window handle both contexts render to.
    pub fn handle(&self) -> WindowHandle {
        self.switch.window()
    }

    /// The context this pair last made current.
    pub fn current(&self) -> Option<ContextRole> {
        self.current.get()
    }

    /// Check that `role` is the current context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gl`] when another context (or none) is current.
    pub fn require(&self, role: ContextRole) -> Result<()> {
        match self.current.get() {
            Some(current) if current == role => Ok(()),
            current => Err(Error::gl(format!(
                "{role:?} context not current (current: {current:?})"
            ))),
        }
    }

    /// The host's switcher.
    pub fn switch(&self) -> &S {
        &self.switch
    }
}
