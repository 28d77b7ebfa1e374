//! Vertex array objects.
//!
//! A [`VertexArray`] records which buffers feed which attribute locations, and which index buffer
//! a draw call reads from. Vertex types describe their own layout through the [`Vertex`] trait.

use std::sync::Arc;

use crate::abs::{Device, GlError, IndexBuffer, VertexBuffer};

/// Trait that defines the attribute layout of an interleaved vertex.
///
/// Every attribute is made of `f32` components, laid out in declaration order.
pub trait Vertex: bytemuck::Pod {
    /// `(location, component count)` for each attribute.
    const ATTRIBUTES: &'static [(u32, i32)];
}

/// Represents a vertex array object stored on the GPU side.
pub struct VertexArray<D: Device = glow::Context> {
    gl: Arc<D>,
    id: Option<D::VertexArray>,
}

impl<D: Device> VertexArray<D> {
    pub fn new(gl: &Arc<D>) -> Result<Self, GlError> {
        let id = unsafe { gl.create_vertex_array() }.map_err(GlError::Backend)?;
        Ok(Self {
            gl: Arc::clone(gl),
            id: Some(id),
        })
    }

    fn id(&self) -> Result<D::VertexArray, GlError> {
        self.id.ok_or(GlError::Unallocated("vertex array"))
    }

    /// Feeds attribute `location` from `buffer`, reading `components` floats per vertex.
    ///
    /// `stride` and `offset` are in bytes; a stride of zero means tightly packed.
    pub fn attribute(
        &self,
        buffer: &VertexBuffer<D>,
        location: u32,
        components: i32,
        stride: i32,
        offset: i32,
    ) -> Result<(), GlError> {
        let vao = self.id()?;
        let vbo = buffer.raw().ok_or(GlError::Unallocated("vertex buffer"))?;
        unsafe {
            self.gl.bind_vertex_array(Some(vao));
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            self.gl
                .vertex_attrib_pointer_f32(location, components, glow::FLOAT, false, stride, offset);
            self.gl.enable_vertex_attrib_array(location);
            self.gl.bind_vertex_array(None);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
        Ok(())
    }

    /// Sets up every attribute of `V` from an interleaved buffer.
    pub fn attach_vertex_buffer<V: Vertex>(&self, buffer: &VertexBuffer<D>) -> Result<(), GlError> {
        let stride = std::mem::size_of::<V>() as i32;
        let mut offset = 0;
        for &(location, components) in V::ATTRIBUTES {
            self.attribute(buffer, location, components, stride, offset)?;
            offset += components * std::mem::size_of::<f32>() as i32;
        }
        debug_assert_eq!(offset, stride, "vertex layout does not cover the whole vertex");
        Ok(())
    }

    /// Makes `buffer` the element source of this vertex array.
    pub fn bind_index_buffer(&self, buffer: &IndexBuffer<D>) -> Result<(), GlError> {
        let vao = self.id()?;
        let ebo = buffer.raw().ok_or(GlError::Unallocated("index buffer"))?;
        unsafe {
            self.gl.bind_vertex_array(Some(vao));
            self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            // The element binding is vertex array state; leave it in place.
            self.gl.bind_vertex_array(None);
        }
        Ok(())
    }

    pub fn bind(&self) {
        if let Some(id) = self.id {
            unsafe {
                self.gl.bind_vertex_array(Some(id));
            }
        }
    }

    pub fn unbind(&self) {
        unsafe {
            self.gl.bind_vertex_array(None);
        }
    }

    /// Deletes the vertex array object. Later calls do nothing.
    pub fn destroy(&mut self) {
        if let Some(id) = self.id.take() {
            unsafe {
                self.gl.delete_vertex_array(id);
            }
        }
    }
}

impl<D: Device> Drop for VertexArray<D> {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abs::BufferFlag;
    use crate::abs::device::fake::{Call, FakeDevice};

    #[repr(C)]
    #[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
    struct ColoredVertex {
        position: [f32; 3],
        color: [f32; 4],
    }

    impl Vertex for ColoredVertex {
        const ATTRIBUTES: &'static [(u32, i32)] = &[(0, 3), (1, 4)];
    }

    #[test]
    fn interleaved_layout_offsets() {
        let gl = Arc::new(FakeDevice::default());
        let vertices = [ColoredVertex {
            position: [0.0; 3],
            color: [1.0; 4],
        }; 3];
        let vbo = VertexBuffer::from_slice(&gl, &vertices, BufferFlag::None).unwrap();
        let vao = VertexArray::new(&gl).unwrap();

        vao.attach_vertex_buffer::<ColoredVertex>(&vbo).unwrap();

        let pointers: Vec<Call> = gl
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::AttribPointer { .. }))
            .collect();
        let (vao_id, vbo_id) = (vao.id.unwrap(), vbo.raw().unwrap());
        assert_eq!(
            pointers,
            vec![
                Call::AttribPointer { vertex_array: vao_id, buffer: vbo_id, index: 0, size: 3, stride: 28, offset: 0 },
                Call::AttribPointer { vertex_array: vao_id, buffer: vbo_id, index: 1, size: 4, stride: 28, offset: 12 },
            ]
        );
        assert_eq!(gl.bound_vertex_array.get(), None);
    }

    #[test]
    fn unallocated_buffers_are_rejected() {
        let gl = Arc::new(FakeDevice::default());
        let vao = VertexArray::new(&gl).unwrap();

        let err = vao.attribute(&VertexBuffer::new(&gl), 0, 4, 0, 0).unwrap_err();
        assert!(matches!(err, GlError::Unallocated("vertex buffer")));
        let err = vao.bind_index_buffer(&IndexBuffer::new(&gl)).unwrap_err();
        assert!(matches!(err, GlError::Unallocated("index buffer")));
    }

    #[test]
    fn index_buffer_binding_survives_unbind() {
        let gl = Arc::new(FakeDevice::default());
        let ibo = IndexBuffer::from_slice(&gl, &[0u32, 1, 2], BufferFlag::None).unwrap();
        let vao = VertexArray::new(&gl).unwrap();

        vao.bind_index_buffer(&ibo).unwrap();
        assert_eq!(gl.bindings.borrow()[&glow::ELEMENT_ARRAY_BUFFER], ibo.raw());
    }

    #[test]
    fn drop_releases_the_vertex_array() {
        let gl = Arc::new(FakeDevice::default());
        let vao = VertexArray::new(&gl).unwrap();
        drop(vao);
        assert!(gl.live_vertex_arrays.borrow().is_empty());
    }
}
