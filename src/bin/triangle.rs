//! One triangle with a color per corner.

use std::process::ExitCode;
use std::sync::Arc;

use glow::HasContext;
use glsamples::abs::{
    BufferFlag, GlError, IndexBuffer, Shader, ShaderKind, ShaderProgram, Vertex, VertexArray,
    VertexBuffer,
};
use glsamples::{Example, ExampleContext};

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct ColorVertex {
    position: [f32; 3],
    color: [f32; 3],
}

impl Vertex for ColorVertex {
    const ATTRIBUTES: &'static [(u32, i32)] = &[(0, 3), (1, 3)];
}

const VERTICES: [ColorVertex; 3] = [
    ColorVertex { position: [0.5, 0.5, 0.0], color: [1.0, 0.0, 0.0] },
    ColorVertex { position: [0.5, -0.5, 0.0], color: [0.0, 1.0, 0.0] },
    ColorVertex { position: [-0.5, -0.5, 0.0], color: [0.0, 0.0, 1.0] },
];
const INDICES: [u32; 3] = [0, 1, 2];

struct Resources {
    program: ShaderProgram,
    vertex_array: VertexArray,
    // Kept alive for the vertex array.
    _vertices: VertexBuffer,
    _indices: IndexBuffer,
}

#[derive(Default)]
struct TriangleExample {
    resources: Option<Resources>,
}

impl Example for TriangleExample {
    fn prepare(&mut self, gl: &Arc<glow::Context>, ctx: &ExampleContext) -> Result<(), GlError> {
        let vertices = VertexBuffer::from_slice(gl, &VERTICES, BufferFlag::None)?;
        let indices = IndexBuffer::from_slice(gl, &INDICES, BufferFlag::None)?;
        let vertex_array = VertexArray::new(gl)?;
        vertex_array.attach_vertex_buffer::<ColorVertex>(&vertices)?;
        vertex_array.bind_index_buffer(&indices)?;

        let vert = Shader::create(
            gl,
            ctx.shader_path("triangle", "triangle.vert"),
            ShaderKind::Vertex,
        )?;
        let frag = Shader::create(
            gl,
            ctx.shader_path("triangle", "triangle.frag"),
            ShaderKind::Fragment,
        )?;
        let program = ShaderProgram::create(gl, Some(&vert), Some(&frag))?;

        self.resources = Some(Resources {
            program,
            vertex_array,
            _vertices: vertices,
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
            gl.clear_color(0.0, 0.0, 0.0, 1.0);
            gl.clear_depth_f64(1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        res.program.use_program();
        res.vertex_array.bind();
        unsafe {
            gl.draw_elements(glow::TRIANGLES, INDICES.len() as i32, glow::UNSIGNED_INT, 0);
        }
        res.vertex_array.unbind();
        Ok(())
    }
}

fn main() -> ExitCode {
    glsamples::launch("Triangle", TriangleExample::default())
}
