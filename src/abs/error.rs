//! Error types shared by the OpenGL resource wrappers.

use std::path::PathBuf;

use thiserror::Error;

use crate::abs::ShaderKind;

/// Everything that can go wrong while creating or using a GPU resource.
#[derive(Error, Debug)]
pub enum GlError {
    /// The driver refused to allocate an object.
    #[error("OpenGL object allocation failed: {0}")]
    Backend(String),
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to compile {kind} shader:\n{log}")]
    Compile { kind: ShaderKind, log: String },
    #[error("failed to link program:\n{0}")]
    Link(String),
    #[error("a program needs at least one shader stage")]
    NoShaderStages,
    /// The uniform does not exist in the program, or was optimized out by the compiler.
    #[error("uniform `{0}` not found in program")]
    UnknownUniform(String),
    #[error("vertex attribute `{0}` not found in program")]
    UnknownAttribute(String),
    /// An operation that needs a live GPU object was called on a wrapper that has none.
    #[error("{0} is not allocated")]
    Unallocated(&'static str),
    #[error("{len} bytes at offset {offset} exceed buffer size {size}")]
    OutOfRange {
        offset: usize,
        len: usize,
        size: usize,
    },
    #[error("initial data is {actual} bytes but the buffer size is {expected}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("{size} bytes does not fit an OpenGL size")]
    TooLarge { size: usize },
    #[error("cannot load the image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture unit {unit} exceeds maximum texture unit index {max}")]
    TextureUnit { unit: u32, max: u32 },
}
