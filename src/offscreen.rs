//! The offscreen render target the toolkit draws into, and the quad that
//! composites it back over the host's framebuffer.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::gl::{check_error, gl_enum, GlApi};
use crate::shaders::{self, POSITION_ATTRIB, UV_ATTRIB};
use crate::types::{QuadVertex, Size, FULLSCREEN_QUAD};

/// GL internal format for the RGBA8 color texture, pre-cast to the `i32`
/// that `tex_image_2d` expects.
const RGBA8_INTERNAL_FORMAT: i32 = gl_enum(glow::RGBA8);

/// Program, vertex array and vertex buffer used to draw the color texture.
///
/// Vertex arrays are container objects and are not shared between contexts,
/// so this lives in the context that composites (the host's), not the one
/// the framebuffer was created in.
#[derive(Copy, Clone, Debug)]
struct CompositeQuad {
    program: u32,
    /// `u_texture`, if the driver kept it.
    sampler: Option<u32>,
    vertex_array: u32,
    vertex_buffer: u32,
}

impl CompositeQuad {
    /// Compile the quad program and upload [`FULLSCREEN_QUAD`].
    ///
    /// # Safety
    ///
    /// Requires the compositing context to be current.
    unsafe fn new<G: GlApi + ?Sized>(gl: &G) -> Result<Self> {
        let program = unsafe {
            shaders::compile_program(
                gl,
                shaders::QUAD_VERTEX_SRC,
                shaders::QUAD_FRAGMENT_SRC,
                &[(POSITION_ATTRIB, "a_position"), (UV_ATTRIB, "a_uv")],
            )
        }?;
        let sampler = unsafe { gl.uniform_location(program, "u_texture") };

        let vertex_array = match unsafe { gl.create_vertex_array() } {
            Ok(vertex_array) => vertex_array,
            Err(err) => {
                unsafe { gl.delete_program(program) };
                return Err(err);
            }
        };
        let vertex_buffer = match unsafe { gl.create_buffer() } {
            Ok(vertex_buffer) => vertex_buffer,
            Err(err) => {
                unsafe {
                    gl.delete_vertex_array(vertex_array);
                    gl.delete_program(program);
                }
                return Err(err);
            }
        };

        // QuadVertex is 16 bytes and `uv` sits 8 bytes in.
        #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let stride = std::mem::size_of::<QuadVertex>() as i32;
        #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let uv_offset = std::mem::offset_of!(QuadVertex, uv) as i32;

        unsafe {
            gl.bind_vertex_array(vertex_array);
            gl.bind_buffer(glow::ARRAY_BUFFER, vertex_buffer);
            gl.buffer_data(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&FULLSCREEN_QUAD),
                glow::STATIC_DRAW,
            );
            gl.enable_vertex_attrib_array(POSITION_ATTRIB);
            gl.vertex_attrib_pointer_f32(POSITION_ATTRIB, 2, false, stride, 0);
            gl.enable_vertex_attrib_array(UV_ATTRIB);
            gl.vertex_attrib_pointer_f32(UV_ATTRIB, 2, false, stride, uv_offset);
            gl.bind_vertex_array(0);
        }

        Ok(Self {
            program,
            sampler,
            vertex_array,
            vertex_buffer,
        })
    }

    unsafe fn destroy<G: GlApi + ?Sized>(self, gl: &G) {
        unsafe {
            gl.delete_program(self.program);
            gl.delete_vertex_array(self.vertex_array);
            gl.delete_buffer(self.vertex_buffer);
        }
    }
}

/// A framebuffer object with an RGBA8 color texture, sized to the host
/// window.
///
/// The toolkit's renderer binds [`fbo_id`](Self::fbo_id) as its default draw
/// target; the host then composites the texture with
/// [`render`](Self::render).
///
/// Resources come in two groups, each destroyed in the context it was
/// created in:
///
/// - the framebuffer and texture, created by [`new`](Self::new) in the
///   toolkit's context and released by
///   [`destroy_target`](Self::destroy_target);
/// - the composite quad, built on the first [`render`](Self::render) in the
///   host's context and released by [`destroy_quad`](Self::destroy_quad).
pub struct OffscreenBuffer<G: GlApi> {
    gl: Arc<G>,
    size: Size,
    framebuffer: u32,
    texture: u32,
    quad: Option<CompositeQuad>,
}

impl<G: GlApi> OffscreenBuffer<G> {
    /// Create the framebuffer and texture and size them to `size`.
    ///
    /// # Safety
    ///
    /// The toolkit's context must be current.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gl`] if object creation fails or the framebuffer is
    /// incomplete, and [`Error::InvalidState`] for a zero-area `size`. No GL
    /// objects are left behind on failure.
    pub unsafe fn new(gl: Arc<G>, size: Size) -> Result<Self> {
        let framebuffer = unsafe { gl.create_framebuffer() }?;
        let texture = match unsafe { gl.create_texture() } {
            Ok(texture) => texture,
            Err(err) => {
                unsafe { gl.delete_framebuffer(framebuffer) };
                return Err(err);
            }
        };

        let mut buffer = Self {
            gl,
            size: Size::default(),
            framebuffer,
            texture,
            quad: None,
        };
        if let Err(err) = unsafe { buffer.resize(size) } {
            unsafe { buffer.destroy_target() };
            return Err(err);
        }
        Ok(buffer)
    }

    /// Reallocate the color texture at `size` and reattach it.
    ///
    /// Does nothing when `size` is the current size. The recorded size only
    /// changes once the framebuffer checks complete.
    ///
    /// # Safety
    ///
    /// The toolkit's context must be current.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] for a zero-area `size`; [`Error::Gl`] with the
    /// framebuffer status if the result is incomplete.
    pub unsafe fn resize(&mut self, size: Size) -> Result<()> {
        if size == self.size {
            return Ok(());
        }
        if size.is_empty() {
            return Err(Error::InvalidState("offscreen buffer needs a non-zero size"));
        }

        let gl = &*self.gl;
        let (width, height) = size.to_gl();
        let status = unsafe {
            gl.bind_texture(glow::TEXTURE_2D, self.texture);
            gl.tex_image_2d_empty(
                glow::TEXTURE_2D,
                RGBA8_INTERNAL_FORMAT,
                width,
                height,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, gl_enum(glow::LINEAR));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, gl_enum(glow::LINEAR));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, gl_enum(glow::CLAMP_TO_EDGE));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, gl_enum(glow::CLAMP_TO_EDGE));

            gl.bind_framebuffer(glow::FRAMEBUFFER, self.framebuffer);
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                self.texture,
                0,
            );
            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);

            gl.bind_framebuffer(glow::FRAMEBUFFER, 0);
            gl.bind_texture(glow::TEXTURE_2D, 0);
            status
        };

        if status != glow::FRAMEBUFFER_COMPLETE {
            return Err(Error::Gl {
                code: status,
                message: format!(
                    "offscreen framebuffer incomplete at {}x{}",
                    size.width, size.height
                ),
            });
        }

        log::debug!("offscreen buffer sized to {}x{}", size.width, size.height);
        self.size = size;
        Ok(())
    }

    /// The framebuffer name, or `0` while it has never been sized.
    pub fn fbo_id(&self) -> u32 {
        if self.size.is_empty() {
            0
        } else {
            self.framebuffer
        }
    }

    /// The color texture attached at `GL_COLOR_ATTACHMENT0`.
    pub fn texture_id(&self) -> u32 {
        self.texture
    }

    /// The size of the last successful [`resize`](Self::resize).
    pub fn size(&self) -> Size {
        self.size
    }

    /// Whether the composite quad has been built (in the host's context).
    pub fn has_quad(&self) -> bool {
        self.quad.is_some()
    }

    /// Draw the color texture as a full-screen quad into the currently bound
    /// framebuffer.
    ///
    /// The caller sets viewport and blending and is responsible for
    /// restoring whatever this changes: program, active texture unit and its
    /// 2D binding, vertex array and array buffer.
    ///
    /// # Safety
    ///
    /// The host's context must be current, and it must be the same context
    /// on every call (the quad's vertex array lives there).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Gl`] if the quad cannot be built on first use or the
    /// draw raised a GL error.
    pub unsafe fn render(&mut self) -> Result<()> {
        let quad = match self.quad {
            Some(quad) => quad,
            None => {
                let quad = unsafe { CompositeQuad::new(&*self.gl) }?;
                self.quad = Some(quad);
                quad
            }
        };

        let gl = &*self.gl;
        unsafe {
            gl.use_program(quad.program);
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, self.texture);
            if let Some(sampler) = quad.sampler {
                gl.uniform_1_i32(sampler, 0);
            }
            gl.bind_vertex_array(quad.vertex_array);
            gl.draw_arrays(glow::TRIANGLE_STRIP, 0, 4);
            check_error(gl, "compositing the offscreen buffer")
        }
    }

    /// Release the framebuffer and color texture.
    ///
    /// # Safety
    ///
    /// The toolkit's context must be current. Must be called at most once.
    pub unsafe fn destroy_target(&mut self) {
        let gl = &*self.gl;
        unsafe {
            gl.delete_framebuffer(self.framebuffer);
            gl.delete_texture(self.texture);
        }
        self.framebuffer = 0;
        self.texture = 0;
        self.size = Size::default();
    }

    /// Release the composite quad, if it was ever built.
    ///
    /// # Safety
    ///
    /// The host's context must be current.
    pub unsafe fn destroy_quad(&mut self) {
        if let Some(quad) = self.quad.take() {
            unsafe { quad.destroy(&*self.gl) };
        }
    }
}
