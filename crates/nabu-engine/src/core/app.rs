use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};

use super::scene;
use crate::config::EngineConfig;
use crate::device::{Device, GpuContext};
use crate::events::{Event, EventKind, EventRegistry};
use crate::hal::Api;
use crate::input::{Key, KeyState};
use crate::logging::LogDiagnostics;
use crate::render::{RenderData, Renderer};
use crate::time::{FrameClock, FrameStatsAccumulator};
use crate::window::Window;

/// Composition root: owns the window, the GPU context, the renderer and the
/// loaded scene, and drives the frame loop.
///
/// The GPU context is released before the window it presents to.
pub struct Application<A: Api, W: Window> {
    renderer: Renderer,
    scene: RenderData,
    gpu: Option<GpuContext<A>>,
    events: EventRegistry,
    running: Rc<Cell<bool>>,
    escape_pressed: Rc<Cell<bool>>,
    clock: FrameClock,
    stats: FrameStatsAccumulator,
    window: W,
}

impl<A: Api, W: Window> Application<A, W> {
    /// Creates the device on the best adapter and loads the scene.
    pub fn new(window: W, config: &EngineConfig) -> Result<Self> {
        let device = Device::new(&config.gpu, Arc::new(LogDiagnostics)).context("failed to create GPU device")?;
        Self::with_device(window, device, config)
    }

    pub fn with_device(window: W, device: Device<A>, config: &EngineConfig) -> Result<Self> {
        log::info!(
            "initializing on {} ({}, feature level {})",
            device.adapter_info().name,
            A::NAME,
            device.feature_level()
        );

        let mut gpu = GpuContext::with_device(
            device,
            &window,
            window.width(),
            window.height(),
            config.gpu.clone(),
            config.resources,
        )
        .context("failed to initialize the GPU context")?;

        let scene = scene::load_triangle(&mut gpu, config.gpu.debug_layer).context("failed to load the scene")?;
        let renderer = Renderer::new(&gpu, &config.renderer);

        let mut events = EventRegistry::new();
        let running = Rc::new(Cell::new(true));
        let escape_pressed = Rc::new(Cell::new(false));

        let r = running.clone();
        events.register(EventKind::WindowClose, move |_| r.set(false));
        let e = escape_pressed.clone();
        events.register(EventKind::KeyboardKey, move |event| {
            if let Event::KeyboardKey {
                key: Key::Escape,
                state: KeyState::Pressed,
                ..
            } = event
            {
                e.set(true);
            }
        });

        Ok(Self {
            renderer,
            scene,
            gpu: Some(gpu),
            events,
            running,
            escape_pressed,
            clock: FrameClock::new(),
            stats: FrameStatsAccumulator::default(),
            window,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn events_mut(&mut self) -> &mut EventRegistry {
        &mut self.events
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// `None` once terminated.
    pub fn gpu(&self) -> Option<&GpuContext<A>> {
        self.gpu.as_ref()
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    /// Ticks window and events, then renders, until a window-close event arrives.
    pub fn run(&mut self) -> Result<()> {
        log::info!("entering main loop");
        self.clock.reset();

        while self.running.get() {
            self.window.tick(&mut self.events).context("window tick failed")?;
            self.events.tick();
            if self.escape_pressed.replace(false) {
                self.events.notify(&Event::WindowClose);
            }
            if !self.running.get() {
                break;
            }

            let gpu = self.gpu.as_mut().context("application already terminated")?;
            self.renderer
                .render(gpu, &self.scene)
                .with_context(|| format!("failed to render frame {}", self.renderer.frames()))?;

            let time = self.clock.tick();
            if let Some(stats) = self.stats.record(&time) {
                log::debug!(
                    "{:.1} fps ({:.2} ms/frame over {} frames)",
                    stats.fps,
                    stats.avg_frame_ms,
                    stats.frames
                );
            }
        }

        log::info!("main loop exited after {} frames", self.renderer.frames());
        Ok(())
    }

    /// Waits for the GPU, then releases resources, swap chain, command
    /// objects and device in that order. Idempotent.
    pub fn terminate(&mut self) {
        let Some(mut gpu) = self.gpu.take() else {
            return;
        };
        self.running.set(false);

        if let Err(e) = gpu.flush() {
            log::error!("failed to drain the GPU during shutdown: {e}");
        }
        gpu.resources_mut().clear();
        log::info!("resource manager terminated");
        drop(gpu);
        log::info!("GPU context terminated");
    }
}

impl<A: Api, W: Window> Drop for Application<A, W> {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::Headless;
    use crate::testing;
    use crate::window::{HeadlessWindow, WindowSettings};

    fn app(frame_limit: Option<u64>) -> Application<Headless, HeadlessWindow> {
        let config = EngineConfig {
            gpu: testing::settings(),
            ..EngineConfig::default()
        };
        let window = HeadlessWindow::new(&WindowSettings::default(), frame_limit);
        Application::with_device(window, testing::device(), &config).unwrap()
    }

    #[test]
    fn runs_until_the_window_closes() {
        let mut app = app(Some(5));
        app.run().unwrap();

        assert!(!app.is_running());
        assert_eq!(app.renderer().frames(), 5);
        let gpu = app.gpu().unwrap();
        // Frames still in flight under per-slot fencing retire here.
        gpu.device().raw().drain();
        assert_eq!(gpu.device().raw().stats().validation_errors, 0);
        assert_eq!(gpu.device().raw().stats().presents, 5);
    }

    #[test]
    fn escape_closes_the_window() {
        let mut app = app(None);
        app.events_mut().notify_delayed(Event::KeyboardKey {
            key: Key::Escape,
            state: KeyState::Pressed,
            scancode: 1,
        });

        app.run().unwrap();
        assert_eq!(app.renderer().frames(), 0);
        assert_eq!(app.window().ticks(), 1);
    }

    #[test]
    fn terminate_is_idempotent() {
        let mut app = app(Some(3));
        app.run().unwrap();

        app.terminate();
        assert!(app.gpu().is_none());
        app.terminate();
        assert!(app.run().is_ok());
    }
}
