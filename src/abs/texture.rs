//! Structs and functions for handling textures.
//!
//! The module provides the [`Texture2D`] struct which is a CPU representation of a GPU texture
//! decoded from an image file.

use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, GenericImageView};

use crate::abs::{Device, GlError};

/// Represents a 2D texture stored on the GPU side.
pub struct Texture2D<D: Device = glow::Context> {
    gl: Arc<D>,
    id: Option<D::Texture>,
    width: u32,
    height: u32,
    channels: u8,
    has_mipmap: bool,
    /// `GL_MAX_COMBINED_TEXTURE_IMAGE_UNITS`, fixed for the life of the context.
    max_units: u32,
}

impl<D: Device> Texture2D<D> {
    /// Decodes the image at `path` and uploads it.
    ///
    /// Nothing is allocated on the device when decoding fails.
    pub fn create(
        gl: &Arc<D>,
        path: impl AsRef<Path>,
        generate_mipmap: bool,
    ) -> Result<Self, GlError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| {
            log::error!("Cannot load the image: {}", path.display());
            GlError::Image {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let texture = Self::from_image(gl, &image, generate_mipmap)?;
        log::debug!(
            "Loaded texture {} ({}x{}, {} channels)",
            path.display(),
            texture.width,
            texture.height,
            texture.channels
        );
        Ok(texture)
    }

    /// Creates a new texture from the given [`image::DynamicImage`].
    ///
    /// The image is flipped vertically and always uploaded as 8-bit RGB, whatever its source
    /// layout. Wrapping repeats and filtering is linear.
    pub fn from_image(
        gl: &Arc<D>,
        image: &DynamicImage,
        generate_mipmap: bool,
    ) -> Result<Self, GlError> {
        let (width, height) = image.dimensions();
        let channels = image.color().channel_count();
        let data = image.flipv().to_rgb8().into_raw();

        let too_large = |size: u32| GlError::TooLarge { size: size as usize };
        let gl_width = i32::try_from(width).map_err(|_| too_large(width))?;
        let gl_height = i32::try_from(height).map_err(|_| too_large(height))?;

        unsafe {
            let texture = gl.create_texture().map_err(GlError::Backend)?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            // RGB rows are not 4-byte aligned in general.
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGB8 as i32,
                gl_width,
                gl_height,
                0,
                glow::RGB,
                glow::UNSIGNED_BYTE,
                Some(data.as_slice()),
            );
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);

            if generate_mipmap {
                gl.generate_mipmap(glow::TEXTURE_2D);
            }

            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            gl.bind_texture(glow::TEXTURE_2D, None);

            let max_units = gl.get_parameter_i32(glow::MAX_COMBINED_TEXTURE_IMAGE_UNITS);
            Ok(Self {
                gl: Arc::clone(gl),
                id: Some(texture),
                width,
                height,
                channels,
                has_mipmap: generate_mipmap,
                max_units: u32::try_from(max_units).unwrap_or(0),
            })
        }
    }

    /// Binds the texture to the specified texture unit.
    pub fn bind(&self, unit: u32) -> Result<(), GlError> {
        let id = self.id.ok_or(GlError::Unallocated("texture"))?;
        if unit >= self.max_units {
            return Err(GlError::TextureUnit {
                unit,
                max: self.max_units.saturating_sub(1),
            });
        }

        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(id));
        }
        Ok(())
    }

    /// Clears the 2D binding of the active texture unit.
    pub fn unbind(&self) {
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    /// Returns the width of the texture.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the texture.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channel count of the source image, before conversion to RGB.
    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn has_mipmap(&self) -> bool {
        self.has_mipmap
    }

    /// Deletes the texture object. Later calls do nothing.
    pub fn destroy(&mut self) {
        if let Some(id) = self.id.take() {
            unsafe {
                self.gl.delete_texture(id);
            }
        }
    }
}

impl<D: Device> Drop for Texture2D<D> {
    fn drop(&mut self) {
        self.destroy();
    }
}
