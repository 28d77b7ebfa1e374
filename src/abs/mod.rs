//! Thin owners of OpenGL objects: buffers, vertex arrays, shaders, programs and textures, plus
//! the window they are drawn into.
//!
//! Every wrapper keeps an `Arc` to the context it was created on and deletes its object on drop.

pub mod app;
pub mod buffer;
pub mod device;
pub mod error;
pub mod shader;
pub mod texture;
pub mod vertex_array;

pub use app::*;
pub use buffer::*;
pub use device::Device;
pub use error::*;
pub use shader::*;
pub use texture::*;
pub use vertex_array::*;
