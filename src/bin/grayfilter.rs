//! Draws a texture at its native pixel size through a grayscale fragment shader.

use std::process::ExitCode;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use glow::HasContext;
use glsamples::abs::{
    BufferFlag, GlError, IndexBuffer, Shader, ShaderKind, ShaderProgram, Texture2D, VertexArray,
    VertexBuffer,
};
use glsamples::mesh::{Mesh, POSITION_COMPONENTS};
use glsamples::{Example, ExampleContext};

const TEXTURE_UNIT: u32 = 0;

/// Projection mapping one unit to one pixel, centered on the window.
fn pixel_projection(width: u32, height: u32) -> Mat4 {
    let (half_w, half_h) = (width as f32 / 2.0, height as f32 / 2.0);
    let proj = Mat4::orthographic_rh_gl(-half_w, half_w, -half_h, half_h, 1.0, 100.0);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    proj * view
}

fn attrib(program: &ShaderProgram, name: &str) -> Result<u32, GlError> {
    program
        .attrib_location(name)
        .ok_or_else(|| GlError::UnknownAttribute(name.to_string()))
}

struct Resources {
    program: ShaderProgram,
    texture: Texture2D,
    vertex_array: VertexArray,
    index_count: i32,
    _positions: VertexBuffer,
    _tex_coords: VertexBuffer,
    _indices: IndexBuffer,
}

#[derive(Default)]
struct GrayfilterExample {
    resources: Option<Resources>,
}

impl Example for GrayfilterExample {
    fn prepare(&mut self, gl: &Arc<glow::Context>, ctx: &ExampleContext) -> Result<(), GlError> {
        let vert = Shader::create(
            gl,
            ctx.shader_path("grayfilter", "grayfilter.vert"),
            ShaderKind::Vertex,
        )?;
        let frag = Shader::create(
            gl,
            ctx.shader_path("grayfilter", "grayfilter.frag"),
            ShaderKind::Fragment,
        )?;
        let program = ShaderProgram::create(gl, Some(&vert), Some(&frag))?;
        let vertex_location = attrib(&program, "a_vertex")?;
        let tex_coord_location = attrib(&program, "a_texCoord")?;

        let texture = Texture2D::create(gl, ctx.texture_path("desert.tga"), false)?;
        let plane = Mesh::plane_xy(texture.width() as f32 / 2.0, texture.height() as f32 / 2.0);

        let positions = VertexBuffer::from_slice(gl, &plane.vertices, BufferFlag::None)?;
        let tex_coords = VertexBuffer::from_slice(gl, &plane.tex_coords, BufferFlag::None)?;
        let indices = IndexBuffer::from_slice(gl, &plane.indices, BufferFlag::None)?;

        let vertex_array = VertexArray::new(gl)?;
        vertex_array.attribute(
            &positions,
            vertex_location,
            POSITION_COMPONENTS as i32,
            0,
            0,
        )?;
        vertex_array.attribute(&tex_coords, tex_coord_location, 2, 0, 0)?;
        vertex_array.bind_index_buffer(&indices)?;

        self.resources = Some(Resources {
            program,
            texture,
            vertex_array,
            index_count: plane.indices.len() as i32,
            _positions: positions,
            _tex_coords: tex_coords,
            _indices: indices,
        });
        Ok(())
    }

    fn render(&mut self, gl: &Arc<glow::Context>, ctx: &ExampleContext) -> Result<(), GlError> {
        let Some(res) = &self.resources else {
            return Ok(());
        };

        unsafe {
            gl.viewport(0, 0, ctx.width() as i32, ctx.height() as i32);
            gl.clear_color(0.0, 0.0, 0.0, 0.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        res.program.use_program();
        res.program.set_uniform(
            "u_modelViewProjectionMatrix",
            pixel_projection(ctx.width(), ctx.height()),
        )?;
        res.program.set_uniform("u_texture", TEXTURE_UNIT as i32)?;
        res.texture.bind(TEXTURE_UNIT)?;

        res.vertex_array.bind();
        unsafe {
            gl.draw_elements(glow::TRIANGLES, res.index_count, glow::UNSIGNED_INT, 0);
        }
        res.vertex_array.unbind();
        Ok(())
    }
}

fn main() -> ExitCode {
    glsamples::launch("Grayfilter", GrayfilterExample::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn window_corners_map_to_clip_corners() {
        let mvp = pixel_projection(800, 600);

        let top_right = mvp * Vec4::new(400.0, 300.0, 0.0, 1.0);
        assert!((top_right.x - 1.0).abs() < 1e-5);
        assert!((top_right.y - 1.0).abs() < 1e-5);

        let bottom_left = mvp * Vec4::new(-400.0, -300.0, 0.0, 1.0);
        assert!((bottom_left.x + 1.0).abs() < 1e-5);
        assert!((bottom_left.y + 1.0).abs() < 1e-5);
        // The plane sits between the near and far planes.
        assert!(bottom_left.z > -1.0 && bottom_left.z < 1.0);
    }
}
