//! The graphics-device seam.
//!
//! Every GPU wrapper in this crate talks to the device through [`Device`]
//! rather than through `glow::HasContext` directly. The trait is the narrow
//! subset of GL the wrappers need, with the same handle-returning shape as
//! glow: object creation returns `Result<Handle, String>`, and uniform or
//! binding calls take `Option`s where GL accepts "none".
//!
//! [`GlowDevice`] is the production implementation. Tests use a recording
//! mock so the resource and lifecycle logic runs without a GPU.

mod gl;
#[cfg(test)]
pub(crate) mod mock;

pub use gl::GlowDevice;

use std::fmt::Debug;

/// Which buffers `clear` resets. Bits match the GL `*_BUFFER_BIT` values.
pub const CLEAR_ALL: u32 = glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT | glow::STENCIL_BUFFER_BIT;

/// A borrowed uniform payload, tagged with its GL shape.
///
/// The element count of an array uniform is derived from the slice length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformData<'a> {
    /// `float`, `vec2`, `vec3` or `vec4` (and arrays thereof).
    Float {
        /// Components per element, 1 to 4.
        components: u8,
        /// Flattened values.
        values: &'a [f32],
    },
    /// `int`, `ivec2`, `ivec3` or `ivec4` (and arrays thereof).
    Int {
        /// Components per element, 1 to 4.
        components: u8,
        /// Flattened values.
        values: &'a [i32],
    },
    /// Column-major `mat2`, `mat3` or `mat4` (and arrays thereof).
    Matrix {
        /// Matrix dimension, 2 to 4.
        dim: u8,
        /// Flattened column-major values.
        values: &'a [f32],
    },
}

impl UniformData<'_> {
    /// Whether the payload holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Float { values, .. } | Self::Matrix { values, .. } => values.is_empty(),
            Self::Int { values, .. } => values.is_empty(),
        }
    }
}

/// Graphics device operations used by the resource wrappers and the frame
/// lifecycle.
///
/// All objects created through a device belong to the context it wraps and
/// must be used and destroyed on the thread that owns that context.
pub trait Device {
    /// Shader object handle.
    type Shader: Copy + Debug;
    /// Program object handle.
    type Program: Copy + Debug;
    /// Buffer object handle.
    type Buffer: Copy + Debug;
    /// Texture object handle.
    type Texture: Copy + Debug;
    /// Vertex array object handle.
    type VertexArray: Copy + Debug;
    /// Uniform location within a linked program.
    type UniformLocation: Clone + Debug;

    /// Create a shader object of the given GL stage type.
    fn create_shader(&self, stage: u32) -> Result<Self::Shader, String>;
    /// Replace the source of `shader`.
    fn shader_source(&self, shader: Self::Shader, source: &str);
    /// Compile `shader`.
    fn compile_shader(&self, shader: Self::Shader);
    /// Whether the last compile of `shader` succeeded.
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    /// Compiler diagnostic log for `shader`.
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    /// Delete `shader`.
    fn delete_shader(&self, shader: Self::Shader);

    /// Create a program object.
    fn create_program(&self) -> Result<Self::Program, String>;
    /// Attach `shader` to `program`.
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    /// Detach `shader` from `program`.
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    /// Link `program`.
    fn link_program(&self, program: Self::Program);
    /// Whether the last link of `program` succeeded.
    fn program_link_status(&self, program: Self::Program) -> bool;
    /// Linker diagnostic log for `program`.
    fn program_info_log(&self, program: Self::Program) -> String;
    /// Delete `program`.
    fn delete_program(&self, program: Self::Program);
    /// Make `program` current, or clear the current program.
    fn use_program(&self, program: Option<Self::Program>);
    /// Location of the active vertex input `name`, if the linker kept it.
    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;
    /// Location of the active uniform `name`, if the linker kept it.
    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation>;
    /// Write a uniform of the current program. `None` is a no-op.
    fn set_uniform(&self, location: Option<&Self::UniformLocation>, data: UniformData<'_>);

    /// Enable the vertex attribute array at `location`.
    fn enable_vertex_attrib_array(&self, location: u32);
    /// Disable the vertex attribute array at `location`.
    fn disable_vertex_attrib_array(&self, location: u32);
    /// Describe how attribute `location` reads the bound array buffer.
    #[allow(clippy::too_many_arguments)]
    fn vertex_attrib_pointer(
        &self,
        location: u32,
        count: i32,
        gl_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );

    /// Create a buffer object.
    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    /// Bind `buffer` (or nothing) to the array-buffer binding point.
    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>);
    /// Replace the contents of the bound array buffer.
    fn array_buffer_data(&self, data: &[u8], usage: u32);
    /// Delete `buffer`.
    fn delete_buffer(&self, buffer: Self::Buffer);

    /// Create a texture object.
    fn create_texture(&self) -> Result<Self::Texture, String>;
    /// Select texture unit `unit` (0-based).
    fn active_texture(&self, unit: u32);
    /// Bind `texture` (or nothing) to the 2D target of the active unit.
    fn bind_texture_2d(&self, texture: Option<Self::Texture>);
    /// Upload tightly packed RGBA8 pixels to the bound 2D texture.
    fn tex_image_2d_rgba8(&self, width: i32, height: i32, pixels: &[u8]);
    /// Set an integer parameter on the bound 2D texture.
    fn tex_parameter_2d(&self, parameter: u32, value: i32);
    /// Delete `texture`.
    fn delete_texture(&self, texture: Self::Texture);

    /// Create a vertex array object.
    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    /// Bind `vertex_array`, or unbind.
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    /// Delete `vertex_array`.
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);

    /// Set the viewport rectangle.
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    /// Set the colour `clear` writes.
    fn clear_color(&self, color: [f32; 4]);
    /// Clear the buffers selected by `mask`.
    fn clear(&self, mask: u32);
}

/// Convert a size or count to the `i32` GL APIs expect, saturating.
pub(crate) fn gl_int(value: impl TryInto<i32>) -> i32 {
    value.try_into().unwrap_or(i32::MAX)
}
