//! Shared fixtures for unit tests.

use std::sync::{Arc, Mutex, PoisonError};

use raw_window_handle::{HandleError, HasWindowHandle, WindowHandle};

use crate::backend::headless::{Headless, HeadlessInstance};
use crate::device::{Device, GpuSettings};
use crate::hal::{DiagnosticsSink, Severity};

/// Debug layer on, everything else default.
pub(crate) fn settings() -> GpuSettings {
    GpuSettings {
        debug_layer: true,
        ..GpuSettings::default()
    }
}

pub(crate) fn device() -> Device<Headless> {
    Device::with_instance(HeadlessInstance::default(), &settings(), CollectingSink::new())
        .expect("headless device")
}

/// Records every diagnostics message.
#[derive(Default)]
pub(crate) struct CollectingSink {
    messages: Mutex<Vec<(Severity, String)>>,
}

impl CollectingSink {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn messages(&self) -> Vec<(Severity, String)> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Corruption- and error-severity messages.
    pub(crate) fn errors(&self) -> usize {
        self.messages()
            .iter()
            .filter(|(severity, _)| *severity <= Severity::Error)
            .count()
    }
}

impl DiagnosticsSink for CollectingSink {
    fn on_message(&self, severity: Severity, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((severity, message.to_owned()));
    }
}

/// Window stand-in for backends that never look at the handle.
pub(crate) struct NoWindow;

impl HasWindowHandle for NoWindow {
    fn window_handle(&self) -> Result<WindowHandle<'_>, HandleError> {
        Err(HandleError::Unavailable)
    }
}
