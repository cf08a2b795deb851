//! A minimal real-time rendering runtime on OpenGL via [glow].
//!
//! The crate wraps the handful of GPU objects a small application needs to
//! put textured geometry on screen, and the loop that drives it:
//!
//! - [`AttributeDescriptor`] names one vertex attribute (element type,
//!   component count, normalization).
//! - [`ShaderUnit`] is one compiled shader stage.
//! - [`PipelineProgram`] links stages and resolves the declared attributes
//!   into a packed [`VertexLayout`] (locations, offsets, stride).
//! - [`GeometryBuffer`] holds vertex records and wires them to a program's
//!   layout on bind.
//! - [`ImageTexture`] decodes an image file, converts it to RGBA8 and uploads
//!   it with clamped, linear sampling.
//! - [`FrameLifecycle`] runs setup, the per-frame events → clear → render →
//!   UI → present step, and teardown in reverse.
//!
//! Every wrapper owns its device handle and releases it on drop. All of them
//! reach the GPU through the [`Device`] trait; [`GlowDevice`] is the glow
//! implementation.
//!
//! # Safety
//!
//! [`GlowDevice`] must be created while its OpenGL context is current, and
//! that context must stay current on the same thread for as long as the
//! device or any wrapper holding it is alive. The wrappers are `!Send` so
//! they cannot leave that thread.
//!
//! [glow]: https://docs.rs/glow

mod attribute;
mod buffer;
mod config;
mod device;
mod error;
mod lifecycle;
mod program;
mod shaders;
mod texture;
mod uniform;

pub use attribute::{AttributeDescriptor, ElementType};
pub use buffer::{GeometryBuffer, UsageHint};
pub use config::{LifecycleConfig, SurfaceConfig};
pub use device::{Device, GlowDevice, UniformData, CLEAR_ALL};
pub use error::{Error, Result};
pub use lifecycle::{Application, Frame, FrameLifecycle, NullUi, Platform, UiBackend};
pub use program::{PipelineProgram, ResolvedAttribute, VertexLayout};
pub use shaders::{ShaderStage, ShaderUnit, TEXTURED_FRAGMENT_SRC, TEXTURED_VERTEX_SRC};
pub use texture::{DecodeState, ImageTexture};
pub use uniform::UniformValue;

pub use glam;
