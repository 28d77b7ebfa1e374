//! Procedural geometry.
//!
//! [`Mesh`] is plain host-side data: parallel attribute arrays plus an index list. It owns nothing
//! on the GPU; hand its arrays to a [`crate::abs::VertexBuffer`] to draw it.

/// Positions of the unit plane, as xyzw.
const PLANE_POSITIONS: [f32; 16] = [
    -1.0, -1.0, 0.0, 1.0, //
    1.0, -1.0, 0.0, 1.0, //
    -1.0, 1.0, 0.0, 1.0, //
    1.0, 1.0, 0.0, 1.0,
];
const PLANE_NORMALS: [f32; 12] = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
const PLANE_TANGENTS: [f32; 12] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
const PLANE_TEX_COORDS: [f32; 8] = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0];
const PLANE_INDICES: [u32; 6] = [0, 1, 2, 1, 3, 2];

/// Components per position.
pub const POSITION_COMPONENTS: usize = 4;

/// Host-side geometry with one entry per vertex in each attribute array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// xyzw per vertex.
    pub vertices: Vec<f32>,
    /// xyz per vertex.
    pub normals: Vec<f32>,
    /// xyz per vertex.
    pub tangents: Vec<f32>,
    /// xyz per vertex, empty when the shape has none.
    pub bitangents: Vec<f32>,
    /// uv per vertex.
    pub tex_coords: Vec<f32>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// A square in the XY plane facing +Z, spanning `-half_extent..half_extent` on both axes.
    pub fn plane(half_extent: f32) -> Self {
        Self::plane_xy(half_extent, half_extent)
    }

    /// A rectangle in the XY plane facing +Z, `2 * horizontal` wide and `2 * vertical` tall.
    pub fn plane_xy(horizontal: f32, vertical: f32) -> Self {
        let mut vertices = PLANE_POSITIONS.to_vec();
        for position in vertices.chunks_exact_mut(POSITION_COMPONENTS) {
            position[0] *= horizontal;
            position[1] *= vertical;
        }

        Self {
            vertices,
            normals: PLANE_NORMALS.to_vec(),
            tangents: PLANE_TANGENTS.to_vec(),
            bitangents: Vec::new(),
            tex_coords: PLANE_TEX_COORDS.to_vec(),
            indices: PLANE_INDICES.to_vec(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / POSITION_COMPONENTS
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
