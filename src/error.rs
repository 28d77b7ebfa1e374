//! Errors raised while bringing an example up.

use std::path::PathBuf;

use thiserror::Error;

use crate::abs::GlError;

/// Setup and runtime failures of an example program.
#[derive(Error, Debug)]
pub enum AppError {
    /// SDL reports its failures as plain strings.
    #[error("SDL initialization failed: {0}")]
    Sdl(String),
    #[error("window creation failed: {0}")]
    Window(#[from] sdl2::video::WindowBuildError),
    #[error("OpenGL context creation failed: {0}")]
    Context(String),
    #[error("could not install the logger: {0}")]
    Logger(#[from] log::SetLoggerError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("could not read config file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error(transparent)]
    Gl(#[from] GlError),
}
