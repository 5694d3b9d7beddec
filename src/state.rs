//! Save and restore of the GL state the composite step touches.
//!
//! Only the bits listed in [`StateBits`] are captured. The host is expected
//! to own everything else, and the composite never changes anything else.

use bitflags::bitflags;

use crate::context::ContextRole;
use crate::error::{Error, Result};
use crate::gl::{gl_name, GlApi};

bitflags! {
    /// The pieces of GL state a [`GlStateSnapshot`] can capture.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct StateBits: u16 {
        /// `GL_BLEND` enable flag.
        const BLEND_ENABLED = 1 << 0;
        /// Source and destination blend factors (RGB and alpha).
        const BLEND_FUNC_SRC_DST = 1 << 1;
        /// `GL_CURRENT_PROGRAM`.
        const CURRENT_PROGRAM = 1 << 2;
        /// `GL_ACTIVE_TEXTURE`.
        const ACTIVE_TEXTURE_UNIT = 1 << 3;
        /// `GL_TEXTURE_BINDING_2D` of texture unit 0.
        const TEXTURE_2D_BINDING_UNIT_0 = 1 << 4;
        /// `GL_VERTEX_ARRAY_BINDING`.
        const VERTEX_ARRAY_BINDING = 1 << 5;
        /// `GL_ARRAY_BUFFER_BINDING`.
        const ARRAY_BUFFER_BINDING = 1 << 6;
        /// `GL_VIEWPORT`.
        const VIEWPORT = 1 << 7;

        /// Everything the offscreen composite touches.
        const COMPOSITE = Self::BLEND_ENABLED.bits()
            | Self::BLEND_FUNC_SRC_DST.bits()
            | Self::CURRENT_PROGRAM.bits()
            | Self::ACTIVE_TEXTURE_UNIT.bits()
            | Self::TEXTURE_2D_BINDING_UNIT_0.bits()
            | Self::VERTEX_ARRAY_BINDING.bits()
            | Self::ARRAY_BUFFER_BINDING.bits()
            | Self::VIEWPORT.bits();
    }
}

/// Values captured by [`GlStateSnapshot::backup`].
///
/// Fields for bits the snapshot does not cover keep their defaults and are
/// never written back.
#[derive(Copy, Clone, Debug)]
struct Saved {
    context: ContextRole,
    blend_enabled: bool,
    /// `[src_rgb, dst_rgb, src_alpha, dst_alpha]`.
    blend_func: [u32; 4],
    program: u32,
    active_texture: u32,
    texture_unit_0: u32,
    vertex_array: u32,
    array_buffer: u32,
    viewport: [i32; 4],
}

/// A balanced backup/restore scope over a fixed set of GL state bits.
///
/// Allocate once and reuse every frame. Nesting is not supported: a second
/// [`backup`](Self::backup) before the matching
/// [`restore`](Self::restore) is an error.
#[derive(Debug)]
pub struct GlStateSnapshot {
    bits: StateBits,
    saved: Option<Saved>,
}

impl GlStateSnapshot {
    /// Create a snapshot covering `bits`.
    #[must_use]
    pub fn new(bits: StateBits) -> Self {
        Self { bits, saved: None }
    }

    /// The bits this snapshot covers.
    #[must_use]
    pub fn bits(&self) -> StateBits {
        self.bits
    }

    /// Whether a backup is waiting to be restored.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.saved.is_some()
    }

    /// Read every covered bit from the `context` context.
    ///
    /// # Safety
    ///
    /// `gl` must be the current context on this thread, and it must be the
    /// one `context` names.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] if a previous backup was never restored.
    pub unsafe fn backup<G: GlApi + ?Sized>(&mut self, gl: &G, context: ContextRole) -> Result<()> {
        if self.saved.is_some() {
            return Err(Error::InvalidState("GL state snapshot is already holding a backup"));
        }

        let bits = self.bits;
        let mut saved = Saved {
            context,
            blend_enabled: false,
            blend_func: [glow::ONE, glow::ZERO, glow::ONE, glow::ZERO],
            program: 0,
            active_texture: glow::TEXTURE0,
            texture_unit_0: 0,
            vertex_array: 0,
            array_buffer: 0,
            viewport: [0; 4],
        };

        unsafe {
            if bits.contains(StateBits::BLEND_ENABLED) {
                saved.blend_enabled = gl.is_enabled(glow::BLEND);
            }
            if bits.contains(StateBits::BLEND_FUNC_SRC_DST) {
                saved.blend_func = [
                    gl_name(gl.get_integer(glow::BLEND_SRC_RGB)),
                    gl_name(gl.get_integer(glow::BLEND_DST_RGB)),
                    gl_name(gl.get_integer(glow::BLEND_SRC_ALPHA)),
                    gl_name(gl.get_integer(glow::BLEND_DST_ALPHA)),
                ];
            }
            if bits.contains(StateBits::CURRENT_PROGRAM) {
                saved.program = gl_name(gl.get_integer(glow::CURRENT_PROGRAM));
            }
            if bits.intersects(StateBits::ACTIVE_TEXTURE_UNIT | StateBits::TEXTURE_2D_BINDING_UNIT_0) {
                saved.active_texture = gl_name(gl.get_integer(glow::ACTIVE_TEXTURE));
            }
            if bits.contains(StateBits::TEXTURE_2D_BINDING_UNIT_0) {
                // The binding query reads the active unit, so peek at unit 0
                // and switch straight back.
                if saved.active_texture != glow::TEXTURE0 {
                    gl.active_texture(glow::TEXTURE0);
                }
                saved.texture_unit_0 = gl_name(gl.get_integer(glow::TEXTURE_BINDING_2D));
                if saved.active_texture != glow::TEXTURE0 {
                    gl.active_texture(saved.active_texture);
                }
            }
            if bits.contains(StateBits::VERTEX_ARRAY_BINDING) {
                saved.vertex_array = gl_name(gl.get_integer(glow::VERTEX_ARRAY_BINDING));
            }
            if bits.contains(StateBits::ARRAY_BUFFER_BINDING) {
                saved.array_buffer = gl_name(gl.get_integer(glow::ARRAY_BUFFER_BINDING));
            }
            if bits.contains(StateBits::VIEWPORT) {
                gl.get_integers(glow::VIEWPORT, &mut saved.viewport);
            }
        }

        self.saved = Some(saved);
        Ok(())
    }

    /// Write the captured bits back and end the scope.
    ///
    /// Order: program, texture unit 0 binding then the active unit, vertex
    /// array, array buffer, viewport, blend factors, blend enable.
    ///
    /// # Safety
    ///
    /// `gl` must be the current context on this thread, and it must be the
    /// one `context` names.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] if there is no backup, or if `context` is not
    /// the context the backup was taken in. In the latter case the backup is
    /// kept so it can still be restored in the right context.
    pub unsafe fn restore<G: GlApi + ?Sized>(&mut self, gl: &G, context: ContextRole) -> Result<()> {
        let saved = match self.saved {
            None => return Err(Error::InvalidState("GL state restore without a backup")),
            Some(saved) if saved.context != context => {
                return Err(Error::InvalidState(
                    "GL state restore in a different context than the backup",
                ));
            }
            Some(saved) => saved,
        };
        self.saved = None;

        let bits = self.bits;
        unsafe {
            if bits.contains(StateBits::CURRENT_PROGRAM) {
                gl.use_program(saved.program);
            }
            if bits.contains(StateBits::TEXTURE_2D_BINDING_UNIT_0) {
                gl.active_texture(glow::TEXTURE0);
                gl.bind_texture(glow::TEXTURE_2D, saved.texture_unit_0);
            }
            if bits.intersects(StateBits::ACTIVE_TEXTURE_UNIT | StateBits::TEXTURE_2D_BINDING_UNIT_0) {
                gl.active_texture(saved.active_texture);
            }
            if bits.contains(StateBits::VERTEX_ARRAY_BINDING) {
                gl.bind_vertex_array(saved.vertex_array);
            }
            if bits.contains(StateBits::ARRAY_BUFFER_BINDING) {
                gl.bind_buffer(glow::ARRAY_BUFFER, saved.array_buffer);
            }
            if bits.contains(StateBits::VIEWPORT) {
                let [x, y, width, height] = saved.viewport;
                gl.viewport(x, y, width, height);
            }
            if bits.contains(StateBits::BLEND_FUNC_SRC_DST) {
                let [src_rgb, dst_rgb, src_alpha, dst_alpha] = saved.blend_func;
                gl.blend_func_separate(src_rgb, dst_rgb, src_alpha, dst_alpha);
            }
            if bits.contains(StateBits::BLEND_ENABLED) {
                if saved.blend_enabled {
                    gl.enable(glow::BLEND);
                } else {
                    gl.disable(glow::BLEND);
                }
            }
        }
        Ok(())
    }
}
