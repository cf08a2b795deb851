//! Image textures: decode, convert to RGBA8, upload.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::device::{gl_int, Device};
use crate::error::{Error, Result};

/// Where an [`ImageTexture`] is in its decode lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecodeState {
    /// Not decoded yet.
    Empty,
    /// Pixels uploaded; the texture can be bound.
    Decoded,
    /// The asset could not be read or parsed.
    Failed,
}

/// A 2D texture decoded from an image file.
///
/// The device texture is allocated only once decoding succeeds, so a failed
/// decode leaves nothing on the device.
pub struct ImageTexture<D: Device> {
    device: Rc<D>,
    path: PathBuf,
    handle: Option<D::Texture>,
    width: u32,
    height: u32,
    state: DecodeState,
}

impl<D: Device> ImageTexture<D> {
    /// Create an undecoded texture for the image at `path`.
    pub fn new(device: Rc<D>, path: impl Into<PathBuf>) -> Self {
        Self {
            device,
            path: path.into(),
            handle: None,
            width: 0,
            height: 0,
            state: DecodeState::Empty,
        }
    }

    /// Read and decode the backing file, then upload it.
    ///
    /// On success texture unit 0 is active with this texture bound to it,
    /// replacing whatever unit 0 held before. A failed decode leaves the
    /// device untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the file is missing, unreadable, or not a
    /// supported image. The state becomes [`DecodeState::Failed`].
    pub fn decode(&mut self) -> Result<()> {
        let image = image::open(&self.path);
        self.finish_decode(image)
    }

    /// Decode from in-memory encoded bytes instead of the backing file.
    ///
    /// # Errors
    ///
    /// Same as [`decode`](Self::decode).
    pub fn decode_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let image = image::load_from_memory(bytes);
        self.finish_decode(image)
    }

    fn finish_decode(&mut self, image: image::ImageResult<image::DynamicImage>) -> Result<()> {
        let label = self.path.display().to_string();
        let image = match image {
            Ok(image) => image,
            Err(err) => {
                log::error!("Unable to load image {label}: {err}");
                self.state = DecodeState::Failed;
                return Err(Error::Decode {
                    path: label,
                    reason: err.to_string(),
                });
            }
        };

        // The source format is not preserved: everything is uploaded as RGBA8.
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();

        let handle = match self.handle {
            Some(handle) => handle,
            None => match self.device.create_texture() {
                Ok(handle) => handle,
                Err(reason) => {
                    log::error!("Unable to create texture for {label}: {reason}");
                    self.state = DecodeState::Failed;
                    return Err(Error::Decode { path: label, reason });
                }
            },
        };
        self.handle = Some(handle);

        self.device.active_texture(0);
        self.device.bind_texture_2d(Some(handle));
        self.device
            .tex_image_2d_rgba8(gl_int(width), gl_int(height), rgba.as_raw());
        set_default_tex_params(&*self.device);

        self.width = width;
        self.height = height;
        self.state = DecodeState::Decoded;
        log::debug!("decoded {label} ({width}x{height}) into texture {handle:?}");
        Ok(())
    }

    /// Attach this texture to texture unit `unit`.
    ///
    /// A texture that is not [`DecodeState::Decoded`] is not bound.
    pub fn bind(&self, unit: u32) {
        let Some(handle) = self.decoded_handle() else {
            log::warn!("texture {} bound before a successful decode", self.path.display());
            return;
        };
        self.device.active_texture(unit);
        self.device.bind_texture_2d(Some(handle));
    }

    /// Detach whatever texture is bound on unit `unit`.
    pub fn unbind(&self, unit: u32) {
        self.device.active_texture(unit);
        self.device.bind_texture_2d(None);
    }

    /// Width in pixels, 0 until decoded.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels, 0 until decoded.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Current decode state.
    #[must_use]
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// The backing image path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decoded_handle(&self) -> Option<D::Texture> {
        self.handle.filter(|_| self.state == DecodeState::Decoded)
    }
}

impl<D: Device> Drop for ImageTexture<D> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.device.delete_texture(handle);
        }
    }
}

/// Edge-clamped, linearly filtered, no mipmaps.
fn set_default_tex_params<D: Device + ?Sized>(device: &D) {
    // GL constant values are small enough that the cast is always safe.
    #[expect(clippy::cast_possible_wrap)]
    {
        device.tex_parameter_2d(glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
        device.tex_parameter_2d(glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
        device.tex_parameter_2d(glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
        device.tex_parameter_2d(glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
    }
}
