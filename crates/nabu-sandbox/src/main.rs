use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use nabu_engine::backend::headless::Headless;
use nabu_engine::config::EngineConfig;
use nabu_engine::core::Application;
use nabu_engine::hal::Api;
use nabu_engine::logging::init_logging;
use nabu_engine::window::{HeadlessWindow, Window};

/// Frames rendered by the headless backend when `NABU_FRAMES` is unset.
const DEFAULT_HEADLESS_FRAMES: u64 = 300;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Backend {
    Dx12,
    Headless,
}

fn backend_from_env() -> Result<Backend> {
    let Ok(value) = std::env::var("NABU_BACKEND") else {
        return Ok(if cfg!(windows) { Backend::Dx12 } else { Backend::Headless });
    };
    match value.to_ascii_lowercase().as_str() {
        "dx12" => Ok(Backend::Dx12),
        "headless" => Ok(Backend::Headless),
        other => bail!("unknown NABU_BACKEND '{other}' (expected 'dx12' or 'headless')"),
    }
}

fn frame_limit_from_env() -> Result<Option<u64>> {
    match std::env::var("NABU_FRAMES") {
        Ok(value) => {
            let frames = value
                .parse()
                .with_context(|| format!("NABU_FRAMES must be a frame count, got '{value}'"))?;
            Ok(Some(frames))
        }
        Err(_) => Ok(None),
    }
}

fn run_app<A: Api, W: Window>(window: W, config: &EngineConfig) -> Result<()> {
    let mut app = Application::<A, W>::new(window, config)?;
    let result = app.run();
    app.terminate();
    result
}

#[cfg(windows)]
fn run_dx12(config: &EngineConfig) -> Result<()> {
    use nabu_engine::backend::dx12::Dx12;
    use nabu_engine::window::WinitWindow;

    let window = WinitWindow::new(&config.window)?;
    run_app::<Dx12, _>(window, config)
}

#[cfg(not(windows))]
fn run_dx12(_config: &EngineConfig) -> Result<()> {
    bail!("the dx12 backend is only available on Windows; set NABU_BACKEND=headless")
}

fn run() -> Result<()> {
    let config = EngineConfig::default();
    init_logging(config.logging.clone());

    let backend = backend_from_env()?;
    log::info!("backend: {backend:?}");
    match backend {
        Backend::Dx12 => run_dx12(&config),
        Backend::Headless => {
            let frames = frame_limit_from_env()?.unwrap_or(DEFAULT_HEADLESS_FRAMES);
            let window = HeadlessWindow::new(&config.window, Some(frames));
            run_app::<Headless, _>(window, &config)
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
