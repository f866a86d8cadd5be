use std::time::Duration;

use anyhow::{Context, Result, bail};
use raw_window_handle::{HandleError, HasWindowHandle, WindowHandle};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window as OsWindow, WindowAttributes, WindowId};

use super::{Window, WindowSettings};
use crate::events::{Event, EventRegistry};
use crate::input::platform::winit::translate_window_event;

/// Native window driven by pumping the winit event loop once per frame.
pub struct WinitWindow {
    state: WindowState,
    event_loop: EventLoop<()>,
}

struct WindowState {
    attributes: WindowAttributes,
    window: Option<OsWindow>,
    size: PhysicalSize<u32>,
    pending: Vec<Event>,
    error: Option<anyhow::Error>,
}

impl ApplicationHandler for WindowState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match event_loop.create_window(self.attributes.clone()) {
            Ok(window) => {
                self.size = window.inner_size();
                log::info!("window created ({}x{})", self.size.width, self.size.height);
                self.window = Some(window);
            }
            Err(e) => self.error = Some(anyhow::Error::new(e).context("failed to create window")),
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => self.pending.push(Event::WindowClose),
            WindowEvent::Resized(size) => {
                self.size = *size;
                self.pending.push(Event::WindowResize {
                    width: size.width,
                    height: size.height,
                });
            }
            _ => {}
        }

        if let Some(event) = translate_window_event(&event) {
            self.pending.push(event);
        }
    }
}

impl WinitWindow {
    /// Creates the event loop and pumps it until the window exists.
    pub fn new(settings: &WindowSettings) -> Result<Self> {
        let mut event_loop = EventLoop::new().context("failed to create winit EventLoop")?;

        let attributes = OsWindow::default_attributes()
            .with_title(settings.title.clone())
            .with_inner_size(PhysicalSize::new(settings.width, settings.height))
            .with_resizable(false);
        let mut state = WindowState {
            attributes,
            window: None,
            size: PhysicalSize::new(settings.width, settings.height),
            pending: Vec::new(),
            error: None,
        };

        while state.window.is_none() {
            if let PumpStatus::Exit(code) = event_loop.pump_app_events(Some(Duration::ZERO), &mut state) {
                bail!("event loop exited with code {code} before the window was created");
            }
            if let Some(e) = state.error.take() {
                return Err(e);
            }
        }

        Ok(Self { state, event_loop })
    }
}

impl Window for WinitWindow {
    fn width(&self) -> u32 {
        self.state.size.width
    }

    fn height(&self) -> u32 {
        self.state.size.height
    }

    fn tick(&mut self, events: &mut EventRegistry) -> Result<()> {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.state);
        if let Some(e) = self.state.error.take() {
            return Err(e);
        }
        if let PumpStatus::Exit(code) = status {
            log::debug!("event loop exited with code {code}");
            self.state.pending.push(Event::WindowClose);
        }

        for event in self.state.pending.drain(..) {
            events.notify_delayed(event);
        }
        Ok(())
    }
}

impl HasWindowHandle for WinitWindow {
    fn window_handle(&self) -> Result<WindowHandle<'_>, HandleError> {
        self.state
            .window
            .as_ref()
            .ok_or(HandleError::Unavailable)?
            .window_handle()
    }
}
