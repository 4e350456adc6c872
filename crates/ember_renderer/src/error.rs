use ember_core::SettingsError;
use thiserror::Error;

/// Errors that can occur while setting up a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to spawn render worker: {0}")]
    Spawn(#[from] std::io::Error),
}
