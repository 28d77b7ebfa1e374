//! A grid of spinning cubes. Keys 1-5 switch between the five ways of indexing the same eight
//! corners: triangle list, triangle strip, line list, line strip and points.

use std::process::ExitCode;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use glow::HasContext;
use glsamples::abs::{
    BufferFlag, GlError, IndexBuffer, Shader, ShaderKind, ShaderProgram, Uniform, Vertex,
    VertexArray, VertexBuffer,
};
use glsamples::{Example, ExampleContext};
use sdl2::keyboard::Keycode;

const MVP_UNIFORM: &str = "u_modelViewProjectionMatrix";
const GRID: u32 = 11;

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct CubeVertex {
    position: [f32; 3],
    color: [f32; 4],
}

impl Vertex for CubeVertex {
    const ATTRIBUTES: &'static [(u32, i32)] = &[(0, 3), (1, 4)];
}

#[rustfmt::skip]
const VERTICES: [CubeVertex; 8] = [
    CubeVertex { position: [-1.0,  1.0,  1.0], color: [0.0, 0.0, 0.0, 1.0] },
    CubeVertex { position: [ 1.0,  1.0,  1.0], color: [1.0, 0.0, 0.0, 1.0] },
    CubeVertex { position: [-1.0, -1.0,  1.0], color: [0.0, 1.0, 0.0, 1.0] },
    CubeVertex { position: [ 1.0, -1.0,  1.0], color: [1.0, 1.0, 0.0, 1.0] },
    CubeVertex { position: [-1.0,  1.0, -1.0], color: [0.0, 0.0, 1.0, 1.0] },
    CubeVertex { position: [ 1.0,  1.0, -1.0], color: [1.0, 0.0, 1.0, 1.0] },
    CubeVertex { position: [-1.0, -1.0, -1.0], color: [0.0, 1.0, 1.0, 1.0] },
    CubeVertex { position: [ 1.0, -1.0, -1.0], color: [1.0, 1.0, 1.0, 1.0] },
];

#[rustfmt::skip]
const TRI_LIST: [u32; 36] = [
    0, 1, 2,  1, 3, 2,
    4, 6, 5,  5, 6, 7,
    0, 2, 4,  4, 2, 6,
    1, 5, 3,  5, 7, 3,
    0, 4, 1,  4, 5, 1,
    2, 3, 6,  6, 3, 7,
];

const TRI_STRIP: [u16; 14] = [0, 1, 2, 3, 7, 1, 5, 0, 4, 2, 6, 7, 4, 5];

#[rustfmt::skip]
const LINE_LIST: [u32; 24] = [
    0, 1,  0, 2,  0, 4,  1, 3,
    1, 5,  2, 3,  2, 6,  3, 7,
    4, 5,  4, 6,  5, 7,  6, 7,
];

const LINE_STRIP: [u16; 17] = [0, 2, 3, 1, 5, 7, 6, 4, 0, 2, 6, 4, 5, 7, 3, 1, 0];

const POINTS: [u16; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

/// How the cube corners are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topology {
    TriList,
    TriStrip,
    LineList,
    LineStrip,
    Points,
}

impl Topology {
    const ALL: [Topology; 5] = [
        Topology::TriList,
        Topology::TriStrip,
        Topology::LineList,
        Topology::LineStrip,
        Topology::Points,
    ];

    fn from_key(key: Keycode) -> Option<Self> {
        match key {
            Keycode::Num1 => Some(Topology::TriList),
            Keycode::Num2 => Some(Topology::TriStrip),
            Keycode::Num3 => Some(Topology::LineList),
            Keycode::Num4 => Some(Topology::LineStrip),
            Keycode::Num5 => Some(Topology::Points),
            _ => None,
        }
    }

    fn primitive(self) -> u32 {
        match self {
            Topology::TriList => glow::TRIANGLES,
            Topology::TriStrip => glow::TRIANGLE_STRIP,
            Topology::LineList => glow::LINES,
            Topology::LineStrip => glow::LINE_STRIP,
            Topology::Points => glow::POINTS,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// An index buffer plus what a draw call needs to read it.
struct IndexSet {
    buffer: IndexBuffer,
    count: i32,
    element_type: u32,
}

impl IndexSet {
    fn u32(gl: &Arc<glow::Context>, indices: &[u32]) -> Result<Self, GlError> {
        Ok(Self {
            buffer: IndexBuffer::from_slice(gl, indices, BufferFlag::None)?,
            count: indices.len() as i32,
            element_type: glow::UNSIGNED_INT,
        })
    }

    fn u16(gl: &Arc<glow::Context>, indices: &[u16]) -> Result<Self, GlError> {
        Ok(Self {
            buffer: IndexBuffer::from_slice(gl, indices, BufferFlag::None)?,
            count: indices.len() as i32,
            element_type: glow::UNSIGNED_SHORT,
        })
    }
}

/// Rotation about X by `ax`, then about Y by `ay`.
fn rotate_xy(ax: f32, ay: f32) -> Mat4 {
    let (sx, cx) = ax.sin_cos();
    let (sy, cy) = ay.sin_cos();
    #[rustfmt::skip]
    let cols = [
        cy,      0.0, sy,       0.0,
        sx * sy, cx,  -sx * cy, 0.0,
        -cx * sy, sx, cx * cy,  0.0,
        0.0,     0.0, 0.0,      1.0,
    ];
    Mat4::from_cols_array(&cols)
}

/// Model matrix of the cube at grid cell `(x, y)` after `time` seconds.
fn cube_model(x: u32, y: u32, time: f32) -> Mat4 {
    let mut model = rotate_xy(time + x as f32 * 0.21, time + y as f32 * 0.37);
    model.w_axis.x = -15.0 + x as f32 * 3.0;
    model.w_axis.y = -15.0 + y as f32 * 3.0;
    model
}

struct Resources {
    program: ShaderProgram,
    mvp_location: glow::UniformLocation,
    vertex_array: VertexArray,
    _vertices: VertexBuffer,
    indices: Vec<IndexSet>,
    /// Topology whose index buffer is attached to the vertex array.
    attached: Topology,
}

struct CubesExample {
    topology: Topology,
    resources: Option<Resources>,
}

impl Default for CubesExample {
    fn default() -> Self {
        Self {
            topology: Topology::LineList,
            resources: None,
        }
    }
}

impl Example for CubesExample {
    fn prepare(&mut self, gl: &Arc<glow::Context>, ctx: &ExampleContext) -> Result<(), GlError> {
        let vertices = VertexBuffer::from_slice(gl, &VERTICES, BufferFlag::None)?;
        let indices = vec![
            IndexSet::u32(gl, &TRI_LIST)?,
            IndexSet::u16(gl, &TRI_STRIP)?,
            IndexSet::u32(gl, &LINE_LIST)?,
            IndexSet::u16(gl, &LINE_STRIP)?,
            IndexSet::u16(gl, &POINTS)?,
        ];
        debug_assert_eq!(indices.len(), Topology::ALL.len());

        let vertex_array = VertexArray::new(gl)?;
        vertex_array.attach_vertex_buffer::<CubeVertex>(&vertices)?;
        vertex_array.bind_index_buffer(&indices[self.topology.index()].buffer)?;

        let vert = Shader::create(gl, ctx.shader_path("cubes", "cubes.vert"), ShaderKind::Vertex)?;
        let frag = Shader::create(
            gl,
            ctx.shader_path("cubes", "cubes.frag"),
            ShaderKind::Fragment,
        )?;
        let program = ShaderProgram::create(gl, Some(&vert), Some(&frag))?;
        let mvp_location = program
            .uniform_location(MVP_UNIFORM)
            .ok_or_else(|| GlError::UnknownUniform(MVP_UNIFORM.to_string()))?;

        self.resources = Some(Resources {
            program,
            mvp_location,
            vertex_array,
            _vertices: vertices,
            indices,
            attached: self.topology,
        });
        Ok(())
    }

    fn render(&mut self, gl: &Arc<glow::Context>, ctx: &ExampleContext) -> Result<(), GlError> {
        let Some(res) = &mut self.resources else {
            return Ok(());
        };

        if res.attached != self.topology {
            res.vertex_array
                .bind_index_buffer(&res.indices[self.topology.index()].buffer)?;
            res.attached = self.topology;
        }
        let indices = &res.indices[self.topology.index()];

        unsafe {
            gl.viewport(0, 0, ctx.width() as i32, ctx.height() as i32);
            gl.clear_color(0.0, 0.0, 0.0, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
            gl.enable(glow::DEPTH_TEST);
            gl.depth_mask(true);
            gl.depth_func(glow::LESS);
            gl.enable(glow::PROGRAM_POINT_SIZE);
            gl.polygon_mode(glow::FRONT_AND_BACK, glow::LINE);
        }

        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, -35.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh_gl(60f32.to_radians(), ctx.aspect_ratio(), 0.1, 100.0);
        let view_proj = proj * view;
        let time = ctx.elapsed().as_secs_f32();

        res.program.use_program();
        res.vertex_array.bind();
        for y in 0..GRID {
            for x in 0..GRID {
                let mvp = view_proj * cube_model(x, y, time);
                mvp.set_uniform(&**gl, &res.mvp_location);
                unsafe {
                    gl.draw_elements(
                        self.topology.primitive(),
                        indices.count,
                        indices.element_type,
                        0,
                    );
                }
            }
        }
        res.vertex_array.unbind();
        Ok(())
    }

    fn on_key_down(&mut self, key: Keycode, _ctx: &mut ExampleContext) {
        if let Some(topology) = Topology::from_key(key) {
            log::info!("Drawing {:?}", topology);
            self.topology = topology;
        }
    }
}

fn main() -> ExitCode {
    glsamples::launch("Cubes", CubesExample::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_xy_composes_axis_rotations() {
        assert!(rotate_xy(0.0, 0.0).abs_diff_eq(Mat4::IDENTITY, 1e-6));
        assert!(rotate_xy(0.4, 0.0).abs_diff_eq(Mat4::from_rotation_x(-0.4), 1e-6));
        assert!(rotate_xy(0.0, 0.7).abs_diff_eq(Mat4::from_rotation_y(-0.7), 1e-6));
    }

    #[test]
    fn grid_is_centered_on_the_origin_row() {
        let first = cube_model(0, 0, 0.0);
        let last = cube_model(GRID - 1, GRID - 1, 0.0);
        assert_eq!((first.w_axis.x, first.w_axis.y), (-15.0, -15.0));
        assert_eq!((last.w_axis.x, last.w_axis.y), (15.0, 15.0));
        assert_eq!(first.w_axis.z, 0.0);
    }

    #[test]
    fn number_keys_pick_topologies() {
        let mut example = CubesExample::default();
        assert_eq!(example.topology, Topology::LineList);

        let keys = [Keycode::Num1, Keycode::Num2, Keycode::Num3, Keycode::Num4, Keycode::Num5];
        for (key, expected) in keys.into_iter().zip(Topology::ALL) {
            assert_eq!(Topology::from_key(key), Some(expected));
            assert_eq!(Topology::ALL[expected.index()], expected);
        }

        // Unrelated keys keep the current topology.
        assert_eq!(Topology::from_key(Keycode::A), None);
        example.topology = Topology::Points;
        assert_eq!(example.topology.primitive(), glow::POINTS);
    }

    #[test]
    fn every_index_stays_inside_the_cube() {
        let max = VERTICES.len() as u32;
        assert!(TRI_LIST.iter().all(|&i| i < max));
        assert!(LINE_LIST.iter().all(|&i| i < max));
        assert!(TRI_STRIP.iter().chain(&LINE_STRIP).chain(&POINTS).all(|&i| u32::from(i) < max));
        assert_eq!(TRI_LIST.len() % 3, 0);
        assert_eq!(LINE_LIST.len() % 2, 0);
    }
}
