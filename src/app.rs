use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowId,
};

use crate::listing::Sample;
use crate::state::State;

/// Hosts one listing: creates its window on resume and forwards events to it.
pub struct App<S: Sample> {
    state: Option<State<S>>,
    error: Option<anyhow::Error>,
}

impl<S: Sample> App<S> {
    pub fn new() -> Self {
        Self {
            state: None,
            error: None,
        }
    }

    /// Record a fatal error and stop the event loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.state = None;
        self.error.get_or_insert(error);
        event_loop.exit();
    }
}

impl<S: Sample> Default for App<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sample> ApplicationHandler for App<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.error.is_some() {
            return;
        }
        let config = S::config().with_env_overrides();
        match State::new(event_loop, &config) {
            Ok(state) => self.state = Some(state),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        let result = match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                Ok(())
            }
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => state.render(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        state: key_state,
                        repeat,
                        ..
                    },
                ..
            } => {
                if let Some((code, is_pressed)) = key_action(physical_key, key_state, repeat) {
                    state.handle_key(event_loop, code, is_pressed);
                }
                Ok(())
            }
            _ => Ok(()),
        };

        if let Err(err) = result {
            self.fail(event_loop, err);
        }
    }
}

/// The key and press state to forward, skipping auto-repeats and unidentified keys.
fn key_action(key: PhysicalKey, state: ElementState, repeat: bool) -> Option<(KeyCode, bool)> {
    match key {
        PhysicalKey::Code(code) if !repeat => Some((code, state.is_pressed())),
        _ => None,
    }
}

/// Open a window for `S` and run it until the window closes or a frame fails.
pub fn run<S: Sample>() -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    let mut app = App::<S>::new();
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
