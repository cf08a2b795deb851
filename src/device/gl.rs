//! [`Device`] implementation over a `glow` OpenGL context.

use glow::{HasContext, PixelUnpackData};

use super::{Device, UniformData};

/// GL internal format for RGBA8 textures, pre-cast to the `i32` that
/// `tex_image_2d` expects.
#[expect(clippy::cast_possible_wrap)]
const RGBA8_INTERNAL_FORMAT: i32 = glow::RGBA8 as i32;

/// An OpenGL device backed by [`glow::Context`].
///
/// # Safety
///
/// A `GlowDevice` can only be created through `unsafe` constructors whose
/// contract is that the wrapped context is current on the calling thread and
/// stays current for as long as the device (or any resource created through
/// it) is alive. Under that contract every [`Device`] method is sound, so
/// the trait methods are safe.
pub struct GlowDevice {
    gl: glow::Context,
}

impl GlowDevice {
    /// Wrap an existing context.
    ///
    /// When `debug_output` is set and the context supports `KHR_debug`, GL
    /// debug messages are forwarded to the `log` facade.
    ///
    /// # Safety
    ///
    /// `gl` must be current on the calling thread for the lifetime of the
    /// returned device and of every resource created through it.
    pub unsafe fn new(mut gl: glow::Context, debug_output: bool) -> Self {
        if debug_output {
            unsafe { install_debug_callback(&mut gl) };
        }
        Self { gl }
    }

    /// Resolve GL function pointers with `loader` and wrap the result.
    ///
    /// # Safety
    ///
    /// Same contract as [`new`](Self::new); `loader` must return valid
    /// function pointers for the current context.
    pub unsafe fn from_loader_function<F>(loader: F, debug_output: bool) -> Self
    where
        F: FnMut(&str) -> *const std::os::raw::c_void,
    {
        let gl = unsafe { glow::Context::from_loader_function(loader) };
        unsafe { Self::new(gl, debug_output) }
    }

    /// The wrapped context, for issuing draw calls the device seam does not
    /// cover (`draw_arrays`, depth state, blending).
    #[must_use]
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }
}

// SAFETY for every `unsafe` block below: the constructor contract guarantees
// the context is current on this thread.
impl Device for GlowDevice {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type Buffer = glow::Buffer;
    type Texture = glow::Texture;
    type VertexArray = glow::VertexArray;
    type UniformLocation = glow::UniformLocation;

    fn create_shader(&self, stage: u32) -> Result<Self::Shader, String> {
        unsafe { self.gl.create_shader(stage) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { self.gl.shader_source(shader, source) };
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.compile_shader(shader) };
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.delete_shader(shader) };
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { self.gl.create_program() }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.attach_shader(program, shader) };
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.detach_shader(program, shader) };
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { self.gl.link_program(program) };
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.gl.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.gl.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) };
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.gl.use_program(program) };
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(program, name) }
    }

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn set_uniform(&self, location: Option<&Self::UniformLocation>, data: UniformData<'_>) {
        let gl = &self.gl;
        unsafe {
            match data {
                UniformData::Float { components: 1, values } => gl.uniform_1_f32_slice(location, values),
                UniformData::Float { components: 2, values } => gl.uniform_2_f32_slice(location, values),
                UniformData::Float { components: 3, values } => gl.uniform_3_f32_slice(location, values),
                UniformData::Float { values, .. } => gl.uniform_4_f32_slice(location, values),
                UniformData::Int { components: 1, values } => gl.uniform_1_i32_slice(location, values),
                UniformData::Int { components: 2, values } => gl.uniform_2_i32_slice(location, values),
                UniformData::Int { components: 3, values } => gl.uniform_3_i32_slice(location, values),
                UniformData::Int { values, .. } => gl.uniform_4_i32_slice(location, values),
                UniformData::Matrix { dim: 2, values } => {
                    gl.uniform_matrix_2_f32_slice(location, false, values);
                }
                UniformData::Matrix { dim: 3, values } => {
                    gl.uniform_matrix_3_f32_slice(location, false, values);
                }
                UniformData::Matrix { values, .. } => {
                    gl.uniform_matrix_4_f32_slice(location, false, values);
                }
            }
        }
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(location) };
    }

    fn disable_vertex_attrib_array(&self, location: u32) {
        unsafe { self.gl.disable_vertex_attrib_array(location) };
    }

    fn vertex_attrib_pointer(
        &self,
        location: u32,
        count: i32,
        gl_type: u32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(location, count, gl_type, normalized, stride, offset);
        }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { self.gl.create_buffer() }
    }

    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>) {
        unsafe { self.gl.bind_buffer(glow::ARRAY_BUFFER, buffer) };
    }

    fn array_buffer_data(&self, data: &[u8], usage: u32) {
        unsafe { self.gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, data, usage) };
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { self.gl.delete_buffer(buffer) };
    }

    fn create_texture(&self) -> Result<Self::Texture, String> {
        unsafe { self.gl.create_texture() }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) };
    }

    fn bind_texture_2d(&self, texture: Option<Self::Texture>) {
        unsafe { self.gl.bind_texture(glow::TEXTURE_2D, texture) };
    }

    fn tex_image_2d_rgba8(&self, width: i32, height: i32, pixels: &[u8]) {
        unsafe {
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                RGBA8_INTERNAL_FORMAT,
                width,
                height,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                PixelUnpackData::Slice(Some(pixels)),
            );
        }
    }

    fn tex_parameter_2d(&self, parameter: u32, value: i32) {
        unsafe { self.gl.tex_parameter_i32(glow::TEXTURE_2D, parameter, value) };
    }

    fn delete_texture(&self, texture: Self::Texture) {
        unsafe { self.gl.delete_texture(texture) };
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        unsafe { self.gl.create_vertex_array() }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { self.gl.bind_vertex_array(vertex_array) };
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { self.gl.delete_vertex_array(vertex_array) };
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) };
    }

    fn clear_color(&self, [r, g, b, a]: [f32; 4]) {
        unsafe { self.gl.clear_color(r, g, b, a) };
    }

    fn clear(&self, mask: u32) {
        unsafe { self.gl.clear(mask) };
    }
}

/// Capabilities enabled before the debug callback is registered. Outside a
/// debug context `DEBUG_OUTPUT` starts disabled.
const DEBUG_CAPABILITIES: [u32; 2] = [glow::DEBUG_OUTPUT, glow::DEBUG_OUTPUT_SYNCHRONOUS];

/// Forward `KHR_debug` messages to `log::warn!`.
///
/// # Safety
///
/// `gl` must be current on the calling thread.
unsafe fn install_debug_callback(gl: &mut glow::Context) {
    if !gl.supports_debug() {
        log::debug!("GL debug output requested but not supported by this context");
        return;
    }
    unsafe {
        for capability in DEBUG_CAPABILITIES {
            gl.enable(capability);
        }
        gl.debug_message_callback(|source, kind, id, severity, message| {
            log::warn!(
                "[OPENGL] {id}: {} of {} severity, raised from {}: {message}",
                debug_type_name(kind),
                debug_severity_name(severity),
                debug_source_name(source),
            );
        });
    }
}

fn debug_source_name(source: u32) -> &'static str {
    match source {
        glow::DEBUG_SOURCE_API => "API",
        glow::DEBUG_SOURCE_WINDOW_SYSTEM => "WINDOW SYSTEM",
        glow::DEBUG_SOURCE_SHADER_COMPILER => "SHADER COMPILER",
        glow::DEBUG_SOURCE_THIRD_PARTY => "THIRD PARTY",
        glow::DEBUG_SOURCE_APPLICATION => "APPLICATION",
        _ => "UNKNOWN",
    }
}

fn debug_type_name(kind: u32) -> &'static str {
    match kind {
        glow::DEBUG_TYPE_ERROR => "ERROR",
        glow::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "DEPRECATED BEHAVIOR",
        glow::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "UNDEFINED BEHAVIOR",
        glow::DEBUG_TYPE_PORTABILITY => "PORTABILITY",
        glow::DEBUG_TYPE_PERFORMANCE => "PERFORMANCE",
        glow::DEBUG_TYPE_OTHER => "OTHER",
        glow::DEBUG_TYPE_MARKER => "MARKER",
        _ => "UNKNOWN",
    }
}

fn debug_severity_name(severity: u32) -> &'static str {
    match severity {
        glow::DEBUG_SEVERITY_HIGH => "HIGH",
        glow::DEBUG_SEVERITY_MEDIUM => "MEDIUM",
        glow::DEBUG_SEVERITY_LOW => "LOW",
        glow::DEBUG_SEVERITY_NOTIFICATION => "NOTIFICATION",
        _ => "UNKNOWN",
    }
}
