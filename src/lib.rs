//! Small OpenGL sample programs and the helpers they share.
//!
//! The binaries under `src/bin` each implement [`Example`] and hand it to [`launch`].

pub mod abs;
pub mod config;
pub mod error;
pub mod example;
pub mod logging;
pub mod mesh;

pub use config::ExampleConfig;
pub use error::AppError;
pub use example::{Example, ExampleContext, InputEvent, Stage, dispatch, launch, run};
pub use mesh::Mesh;
