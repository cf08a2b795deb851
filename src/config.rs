//! Surface and frame-loop configuration.

/// What [`FrameLifecycle::setup`](crate::FrameLifecycle::setup) asks the
/// platform for when it creates the window and context.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceConfig {
    /// Window title.
    pub title: String,
    /// Initial window width in screen coordinates.
    pub width: u32,
    /// Initial window height in screen coordinates.
    pub height: u32,
    /// Bits per colour channel (red, green, blue).
    pub color_bits: u8,
    /// Depth buffer bits.
    pub depth_bits: u8,
    /// Stencil buffer bits.
    pub stencil_bits: u8,
    /// MSAA samples; 0 disables multisampling.
    pub msaa_samples: u8,
    /// Requested GL context version `(major, minor)`.
    pub gl_version: (u8, u8),
    /// Request a core-profile context (forward-compatible where required).
    pub core_profile: bool,
    /// Let the user resize the window.
    pub resizable: bool,
    /// Request a high-DPI drawable.
    pub high_dpi: bool,
    /// Request a debug context, so the driver reports through `KHR_debug`
    /// from the first call.
    pub debug_context: bool,
}

impl SurfaceConfig {
    /// Defaults with the given title and size.
    #[must_use]
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Self::default()
        }
    }
}

impl Default for SurfaceConfig {
    /// 800x600, RGB8 with 24-bit depth and 8-bit stencil, 4x MSAA,
    /// GL 3.2 core (the minimum RenderDoc captures).
    fn default() -> Self {
        Self {
            title: String::from("glint"),
            width: 800,
            height: 600,
            color_bits: 8,
            depth_bits: 24,
            stencil_bits: 8,
            msaa_samples: 4,
            gl_version: (3, 2),
            core_profile: true,
            resizable: true,
            high_dpi: true,
            debug_context: cfg!(debug_assertions),
        }
    }
}

/// Frame-loop settings.
#[derive(Clone, Debug, PartialEq)]
pub struct LifecycleConfig {
    /// Window and context request.
    pub surface: SurfaceConfig,
    /// Colour the frame is cleared to before rendering. The application can
    /// change it through [`Frame::set_clear_color`](crate::Frame::set_clear_color).
    pub clear_color: [f32; 4],
    /// Pace presentation to the display refresh.
    pub vsync: bool,
    /// Forward GL debug messages to the log (when the context supports it).
    /// Works in any context; pair with
    /// [`SurfaceConfig::debug_context`] for the most complete reports.
    pub debug_output: bool,
}

impl LifecycleConfig {
    /// Defaults with the given window title and size.
    #[must_use]
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            surface: SurfaceConfig::new(title, width, height),
            ..Self::default()
        }
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            surface: SurfaceConfig::default(),
            clear_color: [0.45, 0.55, 0.60, 1.00],
            vsync: true,
            debug_output: cfg!(debug_assertions),
        }
    }
}
