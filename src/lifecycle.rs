//! The application frame lifecycle.
//!
//! [`FrameLifecycle`] sequences device setup, the per-frame
//! events → clear → render → UI → present step, and teardown. The window
//! system, the immediate-mode UI and the application itself are
//! collaborators reached through the [`Platform`], [`UiBackend`] and
//! [`Application`] traits, so the lifecycle carries no global state and runs
//! against fakes in tests.
//!
//! ```text
//! Uninitialized ──setup──▶ Ready ──step──▶ Ready ... ──teardown──▶ TornDown
//!        │                  (running cleared by a quit event;
//!        └─ failure: everything acquired so far is released, no lifecycle)
//! ```

use std::rc::Rc;

use crate::config::{LifecycleConfig, SurfaceConfig};
use crate::device::{gl_int, Device, CLEAR_ALL};
use crate::error::{Error, Result};

/// Window system and context provider.
///
/// Each acquisition step reports failure as a diagnostic string; the
/// lifecycle turns it into [`Error::DeviceInit`] and calls the matching
/// release methods in reverse order.
pub trait Platform {
    /// The graphics device the context exposes.
    type Device: Device;
    /// A raw input event.
    type Event;

    /// Initialize the video subsystem.
    fn init_video(&mut self) -> Result<(), String>;
    /// Create the window with the requested surface attributes.
    fn create_window(&mut self, config: &SurfaceConfig) -> Result<(), String>;
    /// Create the GL context for the window and make it current.
    fn create_context(&mut self) -> Result<(), String>;
    /// Resolve device function pointers for the current context.
    fn load_device(&mut self, debug_output: bool) -> Result<Rc<Self::Device>, String>;
    /// Set presentation pacing. Failure is logged, not fatal.
    fn set_swap_interval(&mut self, vsync: bool) -> Result<(), String>;
    /// Drawable size in pixels (differs from the window size on high-DPI).
    fn drawable_size(&self) -> [u32; 2];
    /// Next pending event, without blocking.
    fn poll_event(&mut self) -> Option<Self::Event>;
    /// Whether `event` asks the application to quit.
    fn is_quit(&self, event: &Self::Event) -> bool;
    /// Present the back buffer. Blocks for vsync when enabled.
    fn present(&mut self);
    /// Destroy the GL context.
    fn destroy_context(&mut self);
    /// Destroy the window.
    fn destroy_window(&mut self);
    /// Shut the video subsystem down.
    fn quit_video(&mut self);
}

/// Immediate-mode UI renderer and input sink.
pub trait UiBackend<P: Platform> {
    /// Handle passed to [`Application::render_ui`] for building widgets.
    type Ui;

    /// Create the UI context and its platform/device backends.
    fn init(&mut self, platform: &mut P, device: &Rc<P::Device>) -> Result<(), String>;
    /// Feed one input event.
    fn process_event(&mut self, event: &P::Event);
    /// Begin a UI frame.
    fn new_frame(&mut self, platform: &P, display_size: [u32; 2]) -> &mut Self::Ui;
    /// Render the finished frame's draw data.
    fn render(&mut self);
    /// Release the UI context and backends.
    fn shutdown(&mut self);
}

/// The application driven by a [`FrameLifecycle`].
pub trait Application<D: Device, Ui> {
    /// Create scene resources. An error aborts setup.
    ///
    /// # Errors
    ///
    /// Whatever the application reports; typically shader, link or decode
    /// failures propagated with `?`.
    fn init(&mut self, frame: &mut Frame<'_, D>) -> Result<()>;
    /// Release scene resources while the context is still alive.
    fn shutdown(&mut self);
    /// Issue this frame's draw calls.
    fn render(&mut self, frame: &mut Frame<'_, D>);
    /// Build this frame's UI.
    fn render_ui(&mut self, frame: &mut Frame<'_, D>, ui: &mut Ui);
}

/// Per-frame state handed to the application.
pub struct Frame<'a, D> {
    device: &'a Rc<D>,
    display_size: [u32; 2],
    clear_color: &'a mut [f32; 4],
}

impl<D> Frame<'_, D> {
    /// The device, for creating and driving GPU resources.
    #[must_use]
    pub fn device(&self) -> &Rc<D> {
        self.device
    }

    /// Drawable size in pixels for this frame.
    #[must_use]
    pub fn display_size(&self) -> [u32; 2] {
        self.display_size
    }

    /// The colour frames are cleared to.
    #[must_use]
    pub fn clear_color(&self) -> [f32; 4] {
        *self.clear_color
    }

    /// Change the clear colour, from the next frame on.
    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        *self.clear_color = color;
    }
}

/// A UI backend that draws nothing.
#[derive(Debug, Default)]
pub struct NullUi;

impl<P: Platform> UiBackend<P> for NullUi {
    type Ui = Self;

    fn init(&mut self, _platform: &mut P, _device: &Rc<P::Device>) -> Result<(), String> {
        Ok(())
    }

    fn process_event(&mut self, _event: &P::Event) {}

    fn new_frame(&mut self, _platform: &P, _display_size: [u32; 2]) -> &mut Self {
        self
    }

    fn render(&mut self) {}

    fn shutdown(&mut self) {}
}

/// How far setup got, for unwinding in reverse.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Acquired {
    Nothing,
    Video,
    Window,
    Context,
    Ui,
}

/// A ready window, context and device, stepped once per frame.
///
/// Only [`setup`](Self::setup) creates one, and only when every step
/// succeeded. Dropping it (directly or through [`teardown`](Self::teardown))
/// releases the default vertex array, the UI backend, the context, the
/// window and the video subsystem, in that order.
pub struct FrameLifecycle<P: Platform, U: UiBackend<P>> {
    platform: P,
    ui: U,
    device: Rc<P::Device>,
    default_vertex_array: Option<<P::Device as Device>::VertexArray>,
    clear_color: [f32; 4],
    display_size: [u32; 2],
    running: bool,
}

impl<P: Platform, U: UiBackend<P>> FrameLifecycle<P, U> {
    /// Acquire the window, context and device, then run `app.init`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceInit`] naming the platform or UI step that
    /// failed, or the error `app.init` returned. In every case the resources
    /// acquired so far have been released before returning.
    pub fn setup<A>(mut platform: P, mut ui: U, app: &mut A, config: LifecycleConfig) -> Result<Self>
    where
        A: Application<P::Device, U::Ui>,
    {
        let mut acquired = Acquired::Nothing;
        let (device, vertex_array) =
            match Self::acquire(&mut platform, &mut ui, &config, &mut acquired) {
                Ok(resources) => resources,
                Err(err) => {
                    log::error!("{err}");
                    release(&mut platform, &mut ui, acquired);
                    return Err(err);
                }
            };

        if let Err(reason) = platform.set_swap_interval(config.vsync) {
            log::warn!("GL enable Vsync failed: {reason}");
        }

        let mut lifecycle = Self {
            display_size: platform.drawable_size(),
            platform,
            ui,
            device,
            default_vertex_array: Some(vertex_array),
            clear_color: config.clear_color,
            running: true,
        };

        let mut frame = Frame {
            device: &lifecycle.device,
            display_size: lifecycle.display_size,
            clear_color: &mut lifecycle.clear_color,
        };
        if let Err(err) = app.init(&mut frame) {
            log::error!("application init failed: {err}");
            return Err(err);
        }

        let [width, height] = lifecycle.display_size;
        log::info!("\"{}\" ready at {width}x{height}", config.surface.title);
        Ok(lifecycle)
    }

    fn acquire(
        platform: &mut P,
        ui: &mut U,
        config: &LifecycleConfig,
        acquired: &mut Acquired,
    ) -> Result<(Rc<P::Device>, <P::Device as Device>::VertexArray)> {
        platform
            .init_video()
            .map_err(Error::device_init("video subsystem initialization"))?;
        *acquired = Acquired::Video;

        platform
            .create_window(&config.surface)
            .map_err(Error::device_init("window creation"))?;
        *acquired = Acquired::Window;

        platform
            .create_context()
            .map_err(Error::device_init("GL context creation"))?;
        *acquired = Acquired::Context;

        let device = platform
            .load_device(config.debug_output)
            .map_err(Error::device_init("GL function loading"))?;

        ui.init(platform, &device)
            .map_err(Error::device_init("UI backend initialization"))?;
        *acquired = Acquired::Ui;

        let vertex_array = device
            .create_vertex_array()
            .map_err(Error::device_init("default vertex array creation"))?;
        device.bind_vertex_array(Some(vertex_array));

        Ok((device, vertex_array))
    }

    /// Run one frame: events, clear, render, UI, present.
    ///
    /// Returns whether the lifecycle is still running. A quit event clears
    /// the flag but the frame still completes; callers stop stepping once it
    /// is `false`.
    pub fn step<A>(&mut self, app: &mut A) -> bool
    where
        A: Application<P::Device, U::Ui>,
    {
        while let Some(event) = self.platform.poll_event() {
            if self.platform.is_quit(&event) {
                log::debug!("quit requested");
                self.running = false;
            }
            self.ui.process_event(&event);
        }

        // Polled every frame so resizes and DPI changes need no event.
        self.display_size = self.platform.drawable_size();
        let [width, height] = self.display_size;
        self.device.viewport(0, 0, gl_int(width), gl_int(height));
        self.device.clear_color(self.clear_color);
        self.device.clear(CLEAR_ALL);

        let mut frame = Frame {
            device: &self.device,
            display_size: self.display_size,
            clear_color: &mut self.clear_color,
        };
        app.render(&mut frame);

        let ui = self.ui.new_frame(&self.platform, self.display_size);
        app.render_ui(&mut frame, ui);
        self.ui.render();

        self.platform.present();
        self.running
    }

    /// Step until a quit event arrives.
    pub fn run<A>(&mut self, app: &mut A)
    where
        A: Application<P::Device, U::Ui>,
    {
        while self.step(app) {}
    }

    /// Shut the application down and release everything.
    pub fn teardown<A>(self, app: &mut A)
    where
        A: Application<P::Device, U::Ui>,
    {
        app.shutdown();
        log::debug!("application shut down");
    }

    /// Whether no quit event has been seen.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Drawable size measured at the start of the last step.
    #[must_use]
    pub fn display_size(&self) -> [u32; 2] {
        self.display_size
    }

    /// The current clear colour.
    #[must_use]
    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    /// The device.
    #[must_use]
    pub fn device(&self) -> &Rc<P::Device> {
        &self.device
    }

    /// The platform.
    #[must_use]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// The platform, mutably.
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }
}

impl<P: Platform, U: UiBackend<P>> Drop for FrameLifecycle<P, U> {
    fn drop(&mut self) {
        if let Some(vertex_array) = self.default_vertex_array.take() {
            self.device.bind_vertex_array(None);
            self.device.delete_vertex_array(vertex_array);
        }
        release(&mut self.platform, &mut self.ui, Acquired::Ui);
        log::debug!("frame lifecycle torn down");
    }
}

/// Release everything up to and including `acquired`, newest first.
fn release<P: Platform, U: UiBackend<P>>(platform: &mut P, ui: &mut U, acquired: Acquired) {
    if acquired >= Acquired::Ui {
        ui.shutdown();
    }
    if acquired >= Acquired::Context {
        platform.destroy_context();
    }
    if acquired >= Acquired::Window {
        platform.destroy_window();
    }
    if acquired >= Acquired::Video {
        platform.quit_video();
    }
}
