use std::num::NonZeroU32;

use anyhow::Context;
use glutin::config::{ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{Display, DisplayApiPreference, GlDisplay};
use glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use glutin_winit::GlWindow;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawWindowHandle};
use web_time::Instant;
use winit::{dpi::PhysicalSize, event_loop::ActiveEventLoop, keyboard::KeyCode, window::Window};

use crate::config::SampleConfig;
use crate::gpu::{GpuContext, driver::Driver};
use crate::listing::Sample;

/// Everything a running listing needs: its window, GL surface and context.
///
/// Fields drop in declaration order, so the listing's GL objects are released
/// while the context is still current.
pub struct State<S: Sample> {
    sample: S,
    gpu: GpuContext,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Window,
    last_frame_update: Instant,
}

impl<S: Sample> State<S> {
    pub fn new(event_loop: &ActiveEventLoop, config: &SampleConfig) -> anyhow::Result<Self> {
        let window_attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(PhysicalSize::new(config.width, config.height))
            .with_resizable(config.resizable);
        let window = event_loop.create_window(window_attributes)?;

        let raw_window_handle = window.window_handle()?.as_raw();
        let raw_display_handle = event_loop.display_handle()?.as_raw();
        let display = unsafe { Display::new(raw_display_handle, display_preference(raw_window_handle)) }
            .context("connecting to the platform GL display")?;

        // prefer the config with the most samples
        let template = ConfigTemplateBuilder::new()
            .compatible_with_native_window(raw_window_handle)
            .build();
        let gl_config = unsafe { display.find_configs(template)? }
            .reduce(|best, config| {
                if config.num_samples() > best.num_samples() {
                    config
                } else {
                    best
                }
            })
            .context("no GL config is compatible with the window")?;

        let (major, minor) = config.gl_version;
        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .build(Some(raw_window_handle));
        let not_current = unsafe { display.create_context(&gl_config, &context_attributes) }
            .with_context(|| format!("creating an OpenGL {major}.{minor} core context"))?;

        let surface_attributes =
            window.build_surface_attributes(SurfaceAttributesBuilder::default())?;
        let surface = unsafe { display.create_window_surface(&gl_config, &surface_attributes)? };
        let context = not_current.make_current(&surface)?;

        if config.vsync {
            if let Err(err) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)) {
                log::warn!("could not enable vsync: {err}");
            }
        }

        // SAFETY: `context` was just made current on this thread, and `State`
        // drops every GL object before the context.
        let gpu = unsafe {
            GpuContext::from_glow(glow::Context::from_loader_function_cstr(|symbol| {
                display.get_proc_address(symbol)
            }))
        };
        log::info!("OpenGL {}", gpu.driver().version_string());

        let size = window.inner_size();
        gpu.viewport(size.width, size.height)?;

        let sample = S::initialize(&gpu, config)
            .with_context(|| format!("initializing {}", S::name()))?;
        log::info!("{}: {}", S::name(), S::usage());

        Ok(Self {
            sample,
            gpu,
            surface,
            context,
            window,
            last_frame_update: Instant::now(),
        })
    }

    /// Handle resizing of the window.
    pub fn resize(&mut self, width: u32, height: u32) -> anyhow::Result<()> {
        let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
            log::warn!("ignoring resize to {width}x{height}");
            return Ok(());
        };
        self.surface.resize(&self.context, w, h);
        self.gpu.viewport(width, height)?;
        self.window.request_redraw();
        Ok(())
    }

    /// Update and render one frame, then present it.
    pub fn render(&mut self) -> anyhow::Result<()> {
        let now = Instant::now();
        let delta_time = now - self.last_frame_update;
        self.last_frame_update = now;

        self.sample.update(delta_time);
        self.sample.render(&self.gpu)?;
        self.surface.swap_buffers(&self.context)?;
        self.window.request_redraw();
        Ok(())
    }

    pub fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode, is_pressed: bool) {
        if (code, is_pressed) == (KeyCode::Escape, true) {
            event_loop.exit();
        } else if is_pressed {
            self.sample.process_key(code);
        }
    }
}

/// WGL needs the window up front; elsewhere the native window system's default API is used.
#[cfg(target_os = "windows")]
fn display_preference(window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::WglThenEgl(Some(window))
}

#[cfg(target_os = "macos")]
fn display_preference(_window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::Cgl
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn display_preference(_window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::Egl
}
