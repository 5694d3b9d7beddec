//! The OpenGL entry points the adapter issues.
//!
//! [`GlApi`] is deliberately narrow: it lists only the calls the composite
//! path, the state snapshot and the offscreen buffer need. Object names cross
//! it as raw `u32` GL names with `0` meaning "none", which is also how the
//! toolkit's renderer expects to receive the FBO it should draw into.

use std::num::NonZeroU32;

use glow::{HasContext, PixelUnpackData};

use crate::error::{Error, Result};

/// GL calls used by this crate.
///
/// # Safety
///
/// Every method issues a raw GL call and requires a valid, current OpenGL
/// context on the calling thread.
#[allow(clippy::missing_safety_doc, clippy::too_many_arguments)]
pub trait GlApi {
    /// `glGetIntegerv` for a single value.
    unsafe fn get_integer(&self, pname: u32) -> i32;
    /// `glGetIntegerv` for a multi-valued parameter such as `GL_VIEWPORT`.
    unsafe fn get_integers(&self, pname: u32, out: &mut [i32]);
    /// `glIsEnabled`.
    unsafe fn is_enabled(&self, cap: u32) -> bool;
    /// `glEnable`.
    unsafe fn enable(&self, cap: u32);
    /// `glDisable`.
    unsafe fn disable(&self, cap: u32);
    /// `glBlendFunc`.
    unsafe fn blend_func(&self, src: u32, dst: u32);
    /// `glBlendFuncSeparate`.
    unsafe fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32);
    /// `glViewport`.
    unsafe fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    /// `glGetError`.
    unsafe fn get_error(&self) -> u32;

    /// `glUseProgram`; `0` unbinds.
    unsafe fn use_program(&self, program: u32);
    /// `glActiveTexture` with a `GL_TEXTUREi` enum.
    unsafe fn active_texture(&self, unit: u32);
    /// `glBindTexture`; `0` unbinds.
    unsafe fn bind_texture(&self, target: u32, texture: u32);
    /// `glBindVertexArray`; `0` unbinds.
    unsafe fn bind_vertex_array(&self, vertex_array: u32);
    /// `glBindBuffer`; `0` unbinds.
    unsafe fn bind_buffer(&self, target: u32, buffer: u32);
    /// `glBindFramebuffer`; `0` binds the default framebuffer.
    unsafe fn bind_framebuffer(&self, target: u32, framebuffer: u32);

    /// `glGenTextures` for one name.
    unsafe fn create_texture(&self) -> Result<u32>;
    /// `glDeleteTextures` for one name.
    unsafe fn delete_texture(&self, texture: u32);
    /// `glTexImage2D` allocating uninitialised storage.
    unsafe fn tex_image_2d_empty(
        &self,
        target: u32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
    );
    /// `glTexParameteri`.
    unsafe fn tex_parameter_i32(&self, target: u32, pname: u32, value: i32);

    /// `glGenFramebuffers` for one name.
    unsafe fn create_framebuffer(&self) -> Result<u32>;
    /// `glDeleteFramebuffers` for one name.
    unsafe fn delete_framebuffer(&self, framebuffer: u32);
    /// `glFramebufferTexture2D`.
    unsafe fn framebuffer_texture_2d(
        &self,
        target: u32,
        attachment: u32,
        texture_target: u32,
        texture: u32,
        level: i32,
    );
    /// `glCheckFramebufferStatus`.
    unsafe fn check_framebuffer_status(&self, target: u32) -> u32;

    /// `glCreateProgram`.
    unsafe fn create_program(&self) -> Result<u32>;
    /// `glDeleteProgram`.
    unsafe fn delete_program(&self, program: u32);
    /// `glCreateShader`.
    unsafe fn create_shader(&self, shader_type: u32) -> Result<u32>;
    /// `glDeleteShader`.
    unsafe fn delete_shader(&self, shader: u32);
    /// `glShaderSource` followed by `glCompileShader`; returns the compile
    /// status.
    unsafe fn compile_shader(&self, shader: u32, source: &str) -> bool;
    /// `glGetShaderInfoLog`.
    unsafe fn shader_info_log(&self, shader: u32) -> String;
    /// `glAttachShader`.
    unsafe fn attach_shader(&self, program: u32, shader: u32);
    /// `glDetachShader`.
    unsafe fn detach_shader(&self, program: u32, shader: u32);
    /// `glBindAttribLocation`.
    unsafe fn bind_attrib_location(&self, program: u32, index: u32, name: &str);
    /// `glLinkProgram`; returns the link status.
    unsafe fn link_program(&self, program: u32) -> bool;
    /// `glGetProgramInfoLog`.
    unsafe fn program_info_log(&self, program: u32) -> String;
    /// `glGetUniformLocation`.
    unsafe fn uniform_location(&self, program: u32, name: &str) -> Option<u32>;
    /// `glUniform1i` on the currently bound program.
    unsafe fn uniform_1_i32(&self, location: u32, value: i32);

    /// `glGenVertexArrays` for one name.
    unsafe fn create_vertex_array(&self) -> Result<u32>;
    /// `glDeleteVertexArrays` for one name.
    unsafe fn delete_vertex_array(&self, vertex_array: u32);
    /// `glGenBuffers` for one name.
    unsafe fn create_buffer(&self) -> Result<u32>;
    /// `glDeleteBuffers` for one name.
    unsafe fn delete_buffer(&self, buffer: u32);
    /// `glBufferData` from a byte slice.
    unsafe fn buffer_data(&self, target: u32, data: &[u8], usage: u32);
    /// `glEnableVertexAttribArray`.
    unsafe fn enable_vertex_attrib_array(&self, index: u32);
    /// `glVertexAttribPointer` for float attributes.
    unsafe fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );
    /// `glDrawArrays`.
    unsafe fn draw_arrays(&self, mode: u32, first: i32, count: i32);
}

/// Turn a pending `glGetError` into an [`Error::Gl`] naming `what`.
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
pub unsafe fn check_error<G: GlApi + ?Sized>(gl: &G, what: &str) -> Result<()> {
    match unsafe { gl.get_error() } {
        glow::NO_ERROR => Ok(()),
        code => Err(Error::Gl {
            code,
            message: format!("{what} failed"),
        }),
    }
}

/// Convert a (non-negative) GL integer query result into a GL name or enum.
#[expect(clippy::cast_sign_loss)]
pub(crate) fn gl_name(value: i32) -> u32 {
    value.max(0) as u32
}

/// Convert a GL enum into the `i32` some entry points take it as.
#[expect(clippy::cast_possible_wrap)]
pub(crate) const fn gl_enum(value: u32) -> i32 {
    value as i32
}

fn native<T>(name: u32, wrap: impl FnOnce(NonZeroU32) -> T) -> Option<T> {
    NonZeroU32::new(name).map(wrap)
}

impl GlApi for glow::Context {
    unsafe fn get_integer(&self, pname: u32) -> i32 {
        unsafe { self.get_parameter_i32(pname) }
    }

    unsafe fn get_integers(&self, pname: u32, out: &mut [i32]) {
        unsafe { self.get_parameter_i32_slice(pname, out) }
    }

    unsafe fn is_enabled(&self, cap: u32) -> bool {
        unsafe { HasContext::is_enabled(self, cap) }
    }

    unsafe fn enable(&self, cap: u32) {
        unsafe { HasContext::enable(self, cap) }
    }

    unsafe fn disable(&self, cap: u32) {
        unsafe { HasContext::disable(self, cap) }
    }

    unsafe fn blend_func(&self, src: u32, dst: u32) {
        unsafe { HasContext::blend_func(self, src, dst) }
    }

    unsafe fn blend_func_separate(&self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
        unsafe { HasContext::blend_func_separate(self, src_rgb, dst_rgb, src_alpha, dst_alpha) }
    }

    unsafe fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { HasContext::viewport(self, x, y, width, height) }
    }

    unsafe fn get_error(&self) -> u32 {
        unsafe { HasContext::get_error(self) }
    }

    unsafe fn use_program(&self, program: u32) {
        unsafe { HasContext::use_program(self, native(program, glow::NativeProgram)) }
    }

    unsafe fn active_texture(&self, unit: u32) {
        unsafe { HasContext::active_texture(self, unit) }
    }

    unsafe fn bind_texture(&self, target: u32, texture: u32) {
        unsafe { HasContext::bind_texture(self, target, native(texture, glow::NativeTexture)) }
    }

    unsafe fn bind_vertex_array(&self, vertex_array: u32) {
        unsafe {
            HasContext::bind_vertex_array(self, native(vertex_array, glow::NativeVertexArray));
        }
    }

    unsafe fn bind_buffer(&self, target: u32, buffer: u32) {
        unsafe { HasContext::bind_buffer(self, target, native(buffer, glow::NativeBuffer)) }
    }

    unsafe fn bind_framebuffer(&self, target: u32, framebuffer: u32) {
        unsafe {
            HasContext::bind_framebuffer(self, target, native(framebuffer, glow::NativeFramebuffer));
        }
    }

    unsafe fn create_texture(&self) -> Result<u32> {
        unsafe { HasContext::create_texture(self) }
            .map(|texture| texture.0.get())
            .map_err(Error::gl)
    }

    unsafe fn delete_texture(&self, texture: u32) {
        if let Some(texture) = native(texture, glow::NativeTexture) {
            unsafe { HasContext::delete_texture(self, texture) }
        }
    }

    unsafe fn tex_image_2d_empty(
        &self,
        target: u32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
    ) {
        unsafe {
            HasContext::tex_image_2d(
                self,
                target,
                0,
                internal_format,
                width,
                height,
                0,
                format,
                ty,
                PixelUnpackData::Slice(None),
            );
        }
    }

    unsafe fn tex_parameter_i32(&self, target: u32, pname: u32, value: i32) {
        unsafe { HasContext::tex_parameter_i32(self, target, pname, value) }
    }

    unsafe fn create_framebuffer(&self) -> Result<u32> {
        unsafe { HasContext::create_framebuffer(self) }
            .map(|framebuffer| framebuffer.0.get())
            .map_err(Error::gl)
    }

    unsafe fn delete_framebuffer(&self, framebuffer: u32) {
        if let Some(framebuffer) = native(framebuffer, glow::NativeFramebuffer) {
            unsafe { HasContext::delete_framebuffer(self, framebuffer) }
        }
    }

    unsafe fn framebuffer_texture_2d(
        &self,
        target: u32,
        attachment: u32,
        texture_target: u32,
        texture: u32,
        level: i32,
    ) {
        unsafe {
            HasContext::framebuffer_texture_2d(
                self,
                target,
                attachment,
                texture_target,
                native(texture, glow::NativeTexture),
                level,
            );
        }
    }

    unsafe fn check_framebuffer_status(&self, target: u32) -> u32 {
        unsafe { HasContext::check_framebuffer_status(self, target) }
    }

    unsafe fn create_program(&self) -> Result<u32> {
        unsafe { HasContext::create_program(self) }
            .map(|program| program.0.get())
            .map_err(Error::gl)
    }

    unsafe fn delete_program(&self, program: u32) {
        if let Some(program) = native(program, glow::NativeProgram) {
            unsafe { HasContext::delete_program(self, program) }
        }
    }

    unsafe fn create_shader(&self, shader_type: u32) -> Result<u32> {
        unsafe { HasContext::create_shader(self, shader_type) }
            .map(|shader| shader.0.get())
            .map_err(Error::gl)
    }

    unsafe fn delete_shader(&self, shader: u32) {
        if let Some(shader) = native(shader, glow::NativeShader) {
            unsafe { HasContext::delete_shader(self, shader) }
        }
    }

    unsafe fn compile_shader(&self, shader: u32, source: &str) -> bool {
        let Some(shader) = native(shader, glow::NativeShader) else {
            return false;
        };
        unsafe {
            HasContext::shader_source(self, shader, source);
            HasContext::compile_shader(self, shader);
            HasContext::get_shader_compile_status(self, shader)
        }
    }

    unsafe fn shader_info_log(&self, shader: u32) -> String {
        native(shader, glow::NativeShader)
            .map(|shader| unsafe { HasContext::get_shader_info_log(self, shader) })
            .unwrap_or_default()
    }

    unsafe fn attach_shader(&self, program: u32, shader: u32) {
        if let (Some(program), Some(shader)) = (
            native(program, glow::NativeProgram),
            native(shader, glow::NativeShader),
        ) {
            unsafe { HasContext::attach_shader(self, program, shader) }
        }
    }

    unsafe fn detach_shader(&self, program: u32, shader: u32) {
        if let (Some(program), Some(shader)) = (
            native(program, glow::NativeProgram),
            native(shader, glow::NativeShader),
        ) {
            unsafe { HasContext::detach_shader(self, program, shader) }
        }
    }

    unsafe fn bind_attrib_location(&self, program: u32, index: u32, name: &str) {
        if let Some(program) = native(program, glow::NativeProgram) {
            unsafe { HasContext::bind_attrib_location(self, program, index, name) }
        }
    }

    unsafe fn link_program(&self, program: u32) -> bool {
        let Some(program) = native(program, glow::NativeProgram) else {
            return false;
        };
        unsafe {
            HasContext::link_program(self, program);
            HasContext::get_program_link_status(self, program)
        }
    }

    unsafe fn program_info_log(&self, program: u32) -> String {
        native(program, glow::NativeProgram)
            .map(|program| unsafe { HasContext::get_program_info_log(self, program) })
            .unwrap_or_default()
    }

    unsafe fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        let program = native(program, glow::NativeProgram)?;
        unsafe { HasContext::get_uniform_location(self, program, name) }.map(|location| location.0)
    }

    unsafe fn uniform_1_i32(&self, location: u32, value: i32) {
        let location = glow::NativeUniformLocation(location);
        unsafe { HasContext::uniform_1_i32(self, Some(&location), value) }
    }

    unsafe fn create_vertex_array(&self) -> Result<u32> {
        unsafe { HasContext::create_vertex_array(self) }
            .map(|vertex_array| vertex_array.0.get())
            .map_err(Error::gl)
    }

    unsafe fn delete_vertex_array(&self, vertex_array: u32) {
        if let Some(vertex_array) = native(vertex_array, glow::NativeVertexArray) {
            unsafe { HasContext::delete_vertex_array(self, vertex_array) }
        }
    }

    unsafe fn create_buffer(&self) -> Result<u32> {
        unsafe { HasContext::create_buffer(self) }
            .map(|buffer| buffer.0.get())
            .map_err(Error::gl)
    }

    unsafe fn delete_buffer(&self, buffer: u32) {
        if let Some(buffer) = native(buffer, glow::NativeBuffer) {
            unsafe { HasContext::delete_buffer(self, buffer) }
        }
    }

    unsafe fn buffer_data(&self, target: u32, data: &[u8], usage: u32) {
        unsafe { HasContext::buffer_data_u8_slice(self, target, data, usage) }
    }

    unsafe fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { HasContext::enable_vertex_attrib_array(self, index) }
    }

    unsafe fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        unsafe {
            HasContext::vertex_attrib_pointer_f32(
                self,
                index,
                size,
                glow::FLOAT,
                normalized,
                stride,
                offset,
            );
        }
    }

    unsafe fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        unsafe { HasContext::draw_arrays(self, mode, first, count) }
    }
}
