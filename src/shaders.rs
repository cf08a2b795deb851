//! Shader stages and their compilation.
//!
//! A [`ShaderUnit`] owns one device shader object for its whole lifetime and
//! is compiled at most once. Units are transient: once a
//! [`PipelineProgram`](crate::PipelineProgram) has linked them they can be
//! dropped.
//!
//! The built-in sources target GLSL 1.50 (OpenGL 3.2 core), the context
//! version [`SurfaceConfig`](crate::SurfaceConfig) requests by default.

use std::path::Path;
use std::rc::Rc;

use crate::device::Device;
use crate::error::{Error, Result};

/// Vertex shader for textured geometry.
///
/// # Attributes
///
/// | Name          | Type   | Description                   |
/// |---------------|--------|-------------------------------|
/// | `a_position`  | `vec3` | Vertex position               |
/// | `a_texCoord0` | `vec2` | Texture coordinate, unit 0    |
///
/// # Uniforms
///
/// | Name    | Type   | Description                          |
/// |---------|--------|--------------------------------------|
/// | `u_MVP` | `mat4` | Model-view-projection transform      |
pub const TEXTURED_VERTEX_SRC: &str = r"#version 150

in vec3 a_position;
in vec2 a_texCoord0;

uniform mat4 u_MVP;

out vec2 v_texCoord0;

void main() {
    v_texCoord0 = a_texCoord0;
    gl_Position = u_MVP * vec4(a_position, 1.0);
}
";

/// Fragment shader for textured geometry.
///
/// # Uniforms
///
/// | Name         | Type        | Description        |
/// |--------------|-------------|--------------------|
/// | `u_texture0` | `sampler2D` | Bound texture unit |
pub const TEXTURED_FRAGMENT_SRC: &str = r"#version 150

in vec2 v_texCoord0;

uniform sampler2D u_texture0;

out vec4 frag_color;

void main() {
    frag_color = texture(u_texture0, v_texCoord0);
}
";

/// A programmable pipeline stage.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Per-vertex stage; consumes the vertex attributes.
    Vertex,
    /// Per-fragment stage.
    Fragment,
}

impl ShaderStage {
    /// Infer the stage from a file extension: `vert`/`vsh` or `frag`/`fsh`.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "vert" | "vsh" => Some(Self::Vertex),
            "frag" | "fsh" => Some(Self::Fragment),
            _ => None,
        }
    }

    /// Infer the stage from the extension of `path`.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// The GL shader type enum.
    #[must_use]
    pub const fn gl_type(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

/// One shader stage compiled on the device.
pub struct ShaderUnit<D: Device> {
    device: Rc<D>,
    handle: D::Shader,
    stage: ShaderStage,
    label: String,
    source: String,
    compiled: bool,
    attempted: bool,
}

impl<D: Device> ShaderUnit<D> {
    /// Allocate the device shader object for `stage`, with no source yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Compile`] if the device cannot create the object.
    pub fn new(device: Rc<D>, stage: ShaderStage) -> Result<Self> {
        let label = format!("<{stage:?} shader>");
        let handle = device
            .create_shader(stage.gl_type())
            .map_err(|log| Error::Compile {
                label: label.clone(),
                log,
            })?;
        log::trace!("created {stage:?} shader {handle:?}");
        Ok(Self {
            device,
            handle,
            stage,
            label,
            source: String::new(),
            compiled: false,
            attempted: false,
        })
    }

    /// Allocate a unit and load `source` into it.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn from_source(device: Rc<D>, stage: ShaderStage, source: impl Into<String>) -> Result<Self> {
        let mut unit = Self::new(device, stage)?;
        unit.load_source(source);
        Ok(unit)
    }

    /// Allocate a unit for the file at `path`, inferring the stage from its
    /// extension, and load the file's text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Compile`] if the extension names no known stage or
    /// the file cannot be read. Nothing is allocated on the device in either
    /// case.
    pub fn from_file(device: Rc<D>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let Some(stage) = ShaderStage::from_path(path) else {
            log::error!("Could not infer shader stage from {label}");
            return Err(Error::Compile {
                label,
                log: "unrecognized shader file extension".to_owned(),
            });
        };
        let source = std::fs::read_to_string(path).map_err(|err| {
            log::error!("Could not open {label}: {err}");
            Error::Compile {
                label: label.clone(),
                log: err.to_string(),
            }
        })?;

        let mut unit = Self::from_source(device, stage, source)?;
        unit.label = label;
        Ok(unit)
    }

    /// Replace the source text. Has no effect once compilation was attempted.
    pub fn load_source(&mut self, source: impl Into<String>) {
        if self.attempted {
            log::warn!("{}: source replaced after compilation; ignored", self.label);
            return;
        }
        self.source = source.into();
    }

    /// Compile the loaded source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Compile`] with the compiler log if the source is
    /// empty, was already compiled, or is rejected by the device. A unit
    /// that failed to compile cannot be linked.
    pub fn compile(&mut self) -> Result<()> {
        if self.attempted {
            return Err(Error::Compile {
                label: self.label.clone(),
                log: "shader units are compiled at most once".to_owned(),
            });
        }
        if self.source.trim().is_empty() {
            return Err(Error::Compile {
                label: self.label.clone(),
                log: "shader source is empty".to_owned(),
            });
        }
        self.attempted = true;

        self.device.shader_source(self.handle, &self.source);
        self.device.compile_shader(self.handle);

        if !self.device.shader_compile_status(self.handle) {
            let log = self.device.shader_info_log(self.handle);
            log::error!("Could not compile {} : {log}", self.label);
            return Err(Error::Compile {
                label: self.label.clone(),
                log,
            });
        }

        self.compiled = true;
        log::debug!("compiled {}", self.label);
        Ok(())
    }

    /// The pipeline stage.
    #[must_use]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Whether [`compile`](Self::compile) succeeded.
    #[must_use]
    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    /// The path or label used in diagnostics.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn handle(&self) -> D::Shader {
        self.handle
    }
}

impl<D: Device> Drop for ShaderUnit<D> {
    fn drop(&mut self) {
        self.device.delete_shader(self.handle);
    }
}
