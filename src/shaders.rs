//! GLSL shader sources and compilation helpers.
//!
//! All shaders target GLSL 1.40 (OpenGL 3.1), which is widely supported on
//! desktop platforms.

use crate::error::{Error, Result};
use crate::gl::GlApi;

/// Attribute index of `a_position` in [`QUAD_VERTEX_SRC`].
pub const POSITION_ATTRIB: u32 = 0;

/// Attribute index of `a_uv` in [`QUAD_VERTEX_SRC`].
pub const UV_ATTRIB: u32 = 1;

/// Vertex shader for the composite quad.
///
/// Positions arrive already in clip space; the texture coordinate is passed
/// through untouched.
pub const QUAD_VERTEX_SRC: &str = r"#version 140

in vec2 a_position;
in vec2 a_uv;

out vec2 v_uv;

void main() {
    v_uv = a_uv;
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

/// Fragment shader for the composite quad.
///
/// Samples the offscreen color texture as-is. Blending is configured by the
/// caller.
///
/// # Uniforms
///
/// | Name        | Type        | Description                         |
/// |-------------|-------------|-------------------------------------|
/// | `u_texture` | `sampler2D` | Texture unit holding the color buffer |
pub const QUAD_FRAGMENT_SRC: &str = r"#version 140

in vec2 v_uv;

uniform sampler2D u_texture;

out vec4 frag_color;

void main() {
    frag_color = texture(u_texture, v_uv);
}
";

/// Compile a shader program from vertex and fragment source strings.
///
/// `attributes` are bound to their indices before linking. The compiled
/// shader objects are detached and deleted after successful linking, so only
/// the program handle needs to be cleaned up by the caller.
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
///
/// # Errors
///
/// Returns [`Error::Gl`] carrying the driver log if shader compilation or
/// program linking fails.
pub unsafe fn compile_program<G: GlApi + ?Sized>(
    gl: &G,
    vertex_src: &str,
    fragment_src: &str,
    attributes: &[(u32, &str)],
) -> Result<u32> {
    let program = unsafe { gl.create_program() }?;

    let vs = match unsafe { compile_shader(gl, glow::VERTEX_SHADER, vertex_src) } {
        Ok(vs) => vs,
        Err(err) => {
            unsafe { gl.delete_program(program) };
            return Err(err);
        }
    };
    let fs = match unsafe { compile_shader(gl, glow::FRAGMENT_SHADER, fragment_src) } {
        Ok(fs) => fs,
        Err(err) => {
            unsafe {
                gl.delete_shader(vs);
                gl.delete_program(program);
            }
            return Err(err);
        }
    };

    unsafe {
        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        for &(index, name) in attributes {
            gl.bind_attrib_location(program, index, name);
        }

        if !gl.link_program(program) {
            let log = gl.program_info_log(program);
            gl.delete_program(program);
            gl.delete_shader(vs);
            gl.delete_shader(fs);
            return Err(Error::gl(format!("Program link error: {log}")));
        }

        // Shaders can be detached and deleted after successful linking.
        gl.detach_shader(program, vs);
        gl.detach_shader(program, fs);
        gl.delete_shader(vs);
        gl.delete_shader(fs);
    }

    Ok(program)
}

/// Compile a single shader stage (vertex or fragment) from source.
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
unsafe fn compile_shader<G: GlApi + ?Sized>(gl: &G, shader_type: u32, source: &str) -> Result<u32> {
    unsafe {
        let shader = gl.create_shader(shader_type)?;
        if !gl.compile_shader(shader, source) {
            let log = gl.shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(Error::gl(format!("Shader compile error: {log}")));
        }
        Ok(shader)
    }
}
